//! Cancellation and cleanup protocol
//!
//! Cancelling a procedure resumes it through the forced-unwind channel, which
//! runs its innermost pending cleanup block. Cleanup may yield more effects or
//! wait on more futures, so the unwind is not finished until a step reports
//! `Done`.

use super::error::ProcError;
use super::future::FutureRef;
use super::procedure::Procedure;
use super::step::{step, Detached};
use super::types::{StepOutcome, Val};
use tracing::debug;

/// Cancel a pending future if it supports cancellation
pub fn cancel_pending(future: &FutureRef) {
    if future.is_cancellable() {
        debug!("cancelling pending future");
        future.cancel();
    }
}

/// Cancel every future in `detached`, exactly once each
pub fn cancel_detached(detached: &mut Detached) -> usize {
    let futures = detached.drain();
    let count = futures.len();
    for future in futures {
        cancel_pending(&future);
    }
    count
}

/// Force `procedure` onto its unwind path
///
/// Cancels `pending` first, then resumes with `Return(Null)`. The result may
/// be another `Wait` or a `Normal` when cleanup performs effects; keep
/// stepping until `Done`.
pub fn unwind<P>(
    procedure: &mut P,
    pending: Option<&FutureRef>,
    detached: &mut Detached,
) -> Result<StepOutcome, ProcError>
where
    P: Procedure + ?Sized,
{
    if let Some(future) = pending {
        cancel_pending(future);
    }
    step(procedure, StepOutcome::Return(Val::Null), detached)
}
