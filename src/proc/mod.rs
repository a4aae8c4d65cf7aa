//! # Proc - Effect-Interpreting Procedure Engine
//!
//! Procedures describe side effects by yielding [`Effect`] descriptors and
//! futures instead of performing them. The engine performs the effects, waits
//! on the futures and feeds the results back.
//!
//! ## Components
//!
//! 1. **Effect descriptors** (`effect`): immutable call descriptions plus the
//!    call executor
//! 2. **Futures** (`future`): the `Awaitable` capability and `Deferred`
//! 3. **Step engine** (`step`): resume once, classify, execute
//! 4. **Cancellation** (`cancel`): forced unwind through cleanup blocks
//! 5. **Driver** (`driver`): runs a procedure to `Done` behind a
//!    cancellable [`ProcHandle`]
//!
//! Effects within one proc run strictly in yield order. Suspension only
//! happens on `Wait`; everything between two waits runs synchronously.

pub mod cancel;
pub mod driver;
pub mod effect;
pub mod error;
pub mod future;
pub mod inputs;
pub mod mock;
pub mod procedure;
pub mod run;
pub mod step;
pub mod testing;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use driver::{spawn, start, ProcHandle};
pub use effect::{
    call, call_method, call_sync, call_sync_with_receiver, call_with_receiver, execute_call,
    CallMode, CallResult, Callable, Effect,
};
pub use error::ProcError;
pub use future::{delay, never, Awaitable, Deferred, FutureRef, Settlement};
pub use inputs::InputStream;
pub use mock::mock_calls;
pub use procedure::{Procedure, Resumed, Yielded};
pub use run::{run, run_sync};
pub use step::{step, Detached};
pub use testing::{ProcTester, TesterError};
pub use types::{json_to_val, val_to_json, ProcStatus, StepOutcome, Val};
