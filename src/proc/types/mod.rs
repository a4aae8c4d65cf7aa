//! Type definitions for the engine
//!
//! - Runtime values (Val)
//! - Step outcomes and proc states

pub mod outcome;
pub mod values;

pub use outcome::{ProcStatus, StepOutcome};
pub use values::{json_to_val, val_to_json, Val};
