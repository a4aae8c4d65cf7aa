//! Convenience drivers

use super::cancel::cancel_detached;
use super::driver::spawn;
use super::error::ProcError;
use super::procedure::Procedure;
use super::step::{step, Detached};
use super::types::{StepOutcome, Val};

/// Run a procedure to completion on the caller's stack
///
/// Every yielded effect must resolve without suspending. Reaching a future
/// to wait on fails with `WouldBlock`: the procedure is unwound until its
/// cleanup completes or waits again, and every future it left behind is
/// cancelled.
pub fn run_sync<P>(mut procedure: P) -> Result<Val, ProcError>
where
    P: Procedure,
{
    let mut detached = Detached::new();
    let mut next = StepOutcome::initial();

    let result = loop {
        match step(&mut procedure, next, &mut detached) {
            Ok(StepOutcome::Done(value)) => break Ok(value),
            Ok(StepOutcome::Wait(future)) => {
                detached.push(future);
                unwind_sync(&mut procedure, &mut detached);
                break Err(ProcError::WouldBlock);
            }
            Ok(outcome) => next = outcome,
            Err(error) => break Err(error),
        }
    };

    cancel_detached(&mut detached);
    result
}

fn unwind_sync<P>(procedure: &mut P, detached: &mut Detached)
where
    P: Procedure,
{
    let mut next = StepOutcome::Return(Val::Null);
    loop {
        match step(procedure, next, detached) {
            Ok(StepOutcome::Wait(future)) => {
                detached.push(future);
                return;
            }
            Ok(StepOutcome::Done(_)) | Err(_) => return,
            Ok(outcome) => next = outcome,
        }
    }
}

/// Spawn a procedure and wait for its result
pub async fn run<P>(procedure: P) -> Result<Val, ProcError>
where
    P: Procedure + 'static,
{
    spawn(procedure).join().await
}
