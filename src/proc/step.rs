//! Step Engine
//!
//! One call to [`step`] resumes a procedure exactly once, classifies what it
//! yielded and performs the effect if there is one. Purely synchronous
//! effects come back as `Normal` without any suspension.

use super::effect::{execute_call, CallMode, Effect};
use super::error::ProcError;
use super::future::{same_future, wait_for, FutureRef};
use super::procedure::{Procedure, Resumed, Yielded};
use super::types::{StepOutcome, Val};
use tracing::{debug, warn};

/* ===================== Detached Futures ===================== */

/// Futures handed to a procedure by SYNC calls and not awaited yet
///
/// Appended by the step engine, claimed back when the procedure awaits one
/// or when it settles, and drained by the driver when the proc finishes or
/// is cancelled.
#[derive(Default)]
pub struct Detached {
    futures: Vec<FutureRef>,
}

impl Detached {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, future: FutureRef) {
        if !self.contains(&future) {
            self.futures.push(future);
        }
    }

    pub fn contains(&self, future: &FutureRef) -> bool {
        self.futures.iter().any(|f| same_future(f, future))
    }

    /// Stop tracking `future` because the procedure is now awaiting it
    pub fn claim(&mut self, future: &FutureRef) -> bool {
        let before = self.futures.len();
        self.futures.retain(|f| !same_future(f, future));
        self.futures.len() != before
    }

    /// Take over `other`'s futures, returning the ones not tracked before
    pub fn absorb(&mut self, other: Detached) -> Vec<FutureRef> {
        let mut added = Vec::new();
        for future in other.futures {
            if !self.contains(&future) {
                self.futures.push(future.clone());
                added.push(future);
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn drain(&mut self) -> Vec<FutureRef> {
        std::mem::take(&mut self.futures)
    }
}

/* ===================== Step ===================== */

/// Resume `procedure` once with `previous` and return what happens next
///
/// `previous` picks the resume channel: `Normal`, `Error` or `Return`
/// (forced unwind). Passing `Wait` or `Done` is an `InvalidResume` error.
pub fn step<P>(
    procedure: &mut P,
    previous: StepOutcome,
    detached: &mut Detached,
) -> Result<StepOutcome, ProcError>
where
    P: Procedure + ?Sized,
{
    debug!(procedure = procedure.name(), input = previous.kind(), "resuming");

    let resumed = match previous {
        StepOutcome::Normal(value) => procedure.resume_normal(value),
        StepOutcome::Error(error) => procedure.resume_error(error),
        StepOutcome::Return(value) => procedure.resume_force_unwind(value),
        other @ (StepOutcome::Wait(_) | StepOutcome::Done(_)) => {
            return Err(ProcError::InvalidResume(other.kind()));
        }
    };

    let yielded = match resumed {
        Ok(Resumed::Yield(yielded)) => yielded,
        Ok(Resumed::Complete(value)) => return Ok(StepOutcome::Done(value)),
        Err(error) => return Err(ProcError::Unhandled(error)),
    };

    match yielded {
        Yielded::Future(future) => Ok(StepOutcome::Wait(future)),
        Yielded::Effect(effect) => Ok(perform(&effect, detached)),
        Yielded::Other(value) => {
            warn!(
                procedure = procedure.name(),
                found = value.type_name(),
                "procedure yielded a value that is not an effect or future"
            );
            Err(ProcError::contract_violation(&value))
        }
    }
}

/// Execute an effect and turn its result into the next outcome
fn perform(effect: &Effect, detached: &mut Detached) -> StepOutcome {
    debug!(target_fn = effect.target().name(), mode = ?effect.mode(), "executing call");

    match execute_call(effect) {
        Err(error) => StepOutcome::Error(error),
        Ok(Val::Future(future)) => match effect.mode() {
            CallMode::Async => StepOutcome::Wait(future),
            CallMode::Sync => {
                detached.push(future.clone());
                StepOutcome::Normal(Val::Future(future))
            }
        },
        Ok(value) => StepOutcome::Normal(value),
    }
}

/// Wait for a `Wait` outcome's future and map it to the next resume
pub async fn settle(future: &FutureRef) -> StepOutcome {
    StepOutcome::from_settlement(wait_for(future).await)
}
