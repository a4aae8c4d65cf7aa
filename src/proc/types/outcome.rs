//! Step outcomes and proc lifecycle states

use super::values::Val;
use crate::proc::future::{same_future, FutureRef};
use std::fmt;

/* ===================== Step Outcome ===================== */

/// Result of one Step Engine invocation
///
/// `Normal`, `Error` and `Return` are fed back into the procedure on the next
/// resume. `Wait` and `Done` require driver action instead.
#[derive(Clone)]
pub enum StepOutcome {
    /// Value for the normal resume channel
    Normal(Val),
    /// Error for the error resume channel
    Error(Val),
    /// Forced unwind, only produced by cancellation
    Return(Val),
    /// Suspended on an external future
    Wait(FutureRef),
    /// The procedure has completed
    Done(Val),
}

impl StepOutcome {
    /// Outcome fed into a procedure that has never been resumed
    pub fn initial() -> Self {
        StepOutcome::Normal(Val::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StepOutcome::Normal(_) => "normal",
            StepOutcome::Error(_) => "error",
            StepOutcome::Return(_) => "return",
            StepOutcome::Wait(_) => "wait",
            StepOutcome::Done(_) => "done",
        }
    }

    /// Map a settled future into the next resume
    pub fn from_settlement(settled: Result<Val, Val>) -> Self {
        match settled {
            Ok(value) => StepOutcome::Normal(value),
            Err(error) => StepOutcome::Error(error),
        }
    }
}

/// Payloads compare by value; `Wait` compares futures by identity
impl PartialEq for StepOutcome {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StepOutcome::Normal(a), StepOutcome::Normal(b))
            | (StepOutcome::Error(a), StepOutcome::Error(b))
            | (StepOutcome::Return(a), StepOutcome::Return(b))
            | (StepOutcome::Done(a), StepOutcome::Done(b)) => a == b,
            (StepOutcome::Wait(a), StepOutcome::Wait(b)) => same_future(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Normal(v) => f.debug_tuple("Normal").field(v).finish(),
            StepOutcome::Error(v) => f.debug_tuple("Error").field(v).finish(),
            StepOutcome::Return(v) => f.debug_tuple("Return").field(v).finish(),
            StepOutcome::Wait(_) => write!(f, "Wait(..)"),
            StepOutcome::Done(v) => f.debug_tuple("Done").field(v).finish(),
        }
    }
}

/* ===================== Proc Status ===================== */

/// Lifecycle of one proc
///
/// `Created -> Running <-> Awaiting -> Running -> Done`, with cancellation
/// moving `Running|Awaiting` into `Unwinding`. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcStatus {
    Created,
    Running,
    Awaiting,
    Unwinding,
    Done,
}

impl ProcStatus {
    pub fn is_terminal(self) -> bool {
        self == ProcStatus::Done
    }
}
