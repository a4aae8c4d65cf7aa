//! Suspendable procedures
//!
//! A procedure is an explicit coroutine: the engine resumes it through one of
//! three channels and it answers with the next thing it wants done, or with
//! its final value.

use super::effect::Effect;
use super::future::FutureRef;
use super::types::Val;
use std::fmt;

/// What a procedure handed to the engine at a suspension point
#[derive(Clone)]
pub enum Yielded {
    /// A call for the engine to perform
    Effect(Effect),
    /// A future for the engine to wait on
    Future(FutureRef),
    /// Anything else; the engine rejects it as a contract violation
    Other(Val),
}

impl Yielded {
    /// Classify a value by type; futures wait, everything else is `Other`
    pub fn from_val(value: Val) -> Self {
        match value {
            Val::Future(future) => Yielded::Future(future),
            other => Yielded::Other(other),
        }
    }
}

impl From<Effect> for Yielded {
    fn from(effect: Effect) -> Self {
        Yielded::Effect(effect)
    }
}

impl From<FutureRef> for Yielded {
    fn from(future: FutureRef) -> Self {
        Yielded::Future(future)
    }
}

impl fmt::Debug for Yielded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yielded::Effect(effect) => f.debug_tuple("Effect").field(effect).finish(),
            Yielded::Future(_) => write!(f, "Future(..)"),
            Yielded::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}

/// Result of one resume: either a yield or completion
#[derive(Debug, Clone)]
pub enum Resumed {
    Yield(Yielded),
    Complete(Val),
}

/// A suspendable computation driven by the engine
///
/// Each resume runs the procedure up to its next yield or to completion.
/// `Err` means an error propagated past the procedure's outermost frame.
///
/// Once complete, `resume_normal` answers `Complete(Null)`,
/// `resume_force_unwind(v)` answers `Complete(v)` and `resume_error(e)`
/// answers `Err(e)`.
pub trait Procedure: Send {
    /// Continue with the result of the last yield
    fn resume_normal(&mut self, value: Val) -> Result<Resumed, Val>;

    /// Raise `error` at the current suspension point
    fn resume_error(&mut self, error: Val) -> Result<Resumed, Val>;

    /// Exit from the current suspension point, running pending cleanup blocks
    fn resume_force_unwind(&mut self, value: Val) -> Result<Resumed, Val>;

    /// Name used in logs
    fn name(&self) -> &str {
        "procedure"
    }
}

impl<P: Procedure + ?Sized> Procedure for Box<P> {
    fn resume_normal(&mut self, value: Val) -> Result<Resumed, Val> {
        (**self).resume_normal(value)
    }

    fn resume_error(&mut self, error: Val) -> Result<Resumed, Val> {
        (**self).resume_error(error)
    }

    fn resume_force_unwind(&mut self, value: Val) -> Result<Resumed, Val> {
        (**self).resume_force_unwind(value)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
