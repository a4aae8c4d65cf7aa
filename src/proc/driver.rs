//! Proc Driver
//!
//! Runs a procedure to completion by stepping it until `Done`. Effects that
//! resolve synchronously are fed straight back; on `Wait` the driver registers
//! a continuation on the future and returns, and the continuation picks the
//! loop back up when the future settles.
//!
//! ## Single-writer discipline
//!
//! All bookkeeping lives in `ProcState` behind one mutex. The procedure is
//! taken out of the state while it runs, so cancellation and settlements that
//! arrive mid-step only record a request (`unwind_requested`, `queued`) that
//! the loop consumes after the step. No user code runs with the lock held.

use super::cancel::cancel_pending;
use super::error::ProcError;
use super::future::{Awaitable, Continuation, Deferred, FutureRef, Settlement};
use super::procedure::Procedure;
use super::step::{step, Detached};
use super::types::{ProcStatus, StepOutcome, Val};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/* ===================== Public API ===================== */

/// Instantiate a procedure from `factory` and start driving it
pub fn start<F, P>(factory: F, args: Vec<Val>) -> ProcHandle
where
    F: FnOnce(Vec<Val>) -> P,
    P: Procedure + 'static,
{
    spawn(factory(args))
}

/// Start driving an already constructed procedure
///
/// Returns once the procedure completes or first waits on a future. A
/// procedure whose effects never suspend is `Done` when this returns.
pub fn spawn<P>(procedure: P) -> ProcHandle
where
    P: Procedure + 'static,
{
    let handle = ProcHandle::new(Box::new(procedure));
    info!(proc_id = %handle.id(), name = %handle.name(), "starting proc");
    handle.inner.drive(StepOutcome::initial());
    handle
}

/* ===================== Proc State ===================== */

struct ProcState {
    status: ProcStatus,
    /// `None` while a step is running or after `Done`
    procedure: Option<Box<dyn Procedure>>,
    /// Future the proc is suspended on
    pending: Option<FutureRef>,
    /// Bumped on every wait and cancel; stale settlements are ignored
    generation: u64,
    detached: Detached,
    /// A driver loop is active
    driving: bool,
    /// Outcome delivered while the loop was active
    queued: Option<StepOutcome>,
    /// Cancel arrived and has not been fed to the procedure yet
    unwind_requested: bool,
    /// The procedure is on its unwind path
    unwinding: bool,
    result: Option<Result<Val, ProcError>>,
}

struct ProcInner {
    id: Uuid,
    name: String,
    state: Mutex<ProcState>,
    /// Settles when the proc reaches `Done`
    outcome: Deferred,
}

impl ProcInner {
    /// Step the procedure until it completes or waits
    fn drive(self: &Arc<Self>, first: StepOutcome) {
        {
            let mut state = self.state.lock();
            if state.status.is_terminal() {
                return;
            }
            if state.driving {
                state.queued = Some(first);
                return;
            }
            state.driving = true;
        }

        let mut next = first;
        loop {
            let mut procedure = {
                let mut state = self.state.lock();
                if state.unwind_requested {
                    state.unwind_requested = false;
                    state.unwinding = true;
                    next = StepOutcome::Return(Val::Null);
                    debug!(proc_id = %self.id, "unwinding");
                }
                state.status = if state.unwinding {
                    ProcStatus::Unwinding
                } else {
                    ProcStatus::Running
                };
                match state.procedure.take() {
                    Some(procedure) => procedure,
                    None => {
                        state.driving = false;
                        return;
                    }
                }
            };

            let mut spawned = Detached::new();
            let result = step(procedure.as_mut(), next, &mut spawned);

            let mut state = self.state.lock();
            state.procedure = Some(procedure);
            let added = state.detached.absorb(spawned);
            if !added.is_empty() {
                // Continuations of settled futures run inline and take the lock
                drop(state);
                self.release_on_settle(&added);
                state = self.state.lock();
            }

            match result {
                Ok(StepOutcome::Wait(future)) => {
                    state.detached.claim(&future);

                    if state.unwind_requested {
                        // Cancelled while the step ran: never wait on this future.
                        drop(state);
                        cancel_pending(&future);
                        next = StepOutcome::Return(Val::Null);
                        continue;
                    }

                    state.generation += 1;
                    let generation = state.generation;
                    state.pending = Some(future.clone());
                    if !state.unwinding {
                        state.status = ProcStatus::Awaiting;
                    }
                    drop(state);

                    trace!(proc_id = %self.id, generation, "waiting on future");
                    let inner = Arc::clone(self);
                    future.on_settle(Box::new(move |settled| {
                        inner.on_settled(generation, settled);
                    }));

                    // The future may have settled during registration.
                    let mut state = self.state.lock();
                    match state.queued.take() {
                        Some(queued) => {
                            next = queued;
                        }
                        None => {
                            state.driving = false;
                            return;
                        }
                    }
                }
                Ok(StepOutcome::Done(value)) => {
                    drop(state);
                    self.finish(Ok(value));
                    return;
                }
                Ok(outcome) => {
                    next = outcome;
                }
                Err(error) => {
                    drop(state);
                    self.finish(Err(error));
                    return;
                }
            }
        }
    }

    /// Stop tracking each detached future once it settles
    fn release_on_settle(self: &Arc<Self>, futures: &[FutureRef]) {
        for future in futures {
            let inner = Arc::downgrade(self);
            let tracked = Arc::downgrade(future);
            future.on_settle(Box::new(move |_settled| {
                let (Some(inner), Some(future)) = (inner.upgrade(), tracked.upgrade()) else {
                    return;
                };
                if inner.state.lock().detached.claim(&future) {
                    trace!(proc_id = %inner.id, "detached future settled");
                }
            }));
        }
    }

    fn on_settled(self: &Arc<Self>, generation: u64, settled: Settlement) {
        let outcome = StepOutcome::from_settlement(settled);
        {
            let mut state = self.state.lock();
            if state.status.is_terminal()
                || state.generation != generation
                || state.pending.is_none()
            {
                trace!(proc_id = %self.id, generation, "ignoring stale settlement");
                return;
            }
            state.pending = None;
            if state.driving {
                state.queued = Some(outcome);
                return;
            }
        }
        self.drive(outcome);
    }

    fn cancel(self: &Arc<Self>) {
        let (pending, detached, drive_now) = {
            let mut state = self.state.lock();
            if state.status.is_terminal()
                || state.unwind_requested
                || (state.unwinding && state.pending.is_none())
            {
                trace!(proc_id = %self.id, "cancel ignored");
                return;
            }

            state.unwind_requested = true;
            let pending = state.pending.take();
            let mut drive_now = false;
            if pending.is_some() {
                state.generation += 1;
                if state.driving {
                    state.queued = Some(StepOutcome::Return(Val::Null));
                } else {
                    drive_now = true;
                }
            }
            (pending, state.detached.drain(), drive_now)
        };

        debug!(proc_id = %self.id, detached = detached.len(), "cancel requested");
        if let Some(future) = &pending {
            cancel_pending(future);
        }
        for future in &detached {
            cancel_pending(future);
        }
        if drive_now {
            self.drive(StepOutcome::Return(Val::Null));
        }
    }

    fn finish(&self, result: Result<Val, ProcError>) {
        let (procedure, detached) = {
            let mut state = self.state.lock();
            if state.status.is_terminal() {
                return;
            }
            state.status = ProcStatus::Done;
            state.driving = false;
            state.queued = None;
            state.pending = None;
            state.unwind_requested = false;
            state.result = Some(result.clone());
            (state.procedure.take(), state.detached.drain())
        };
        drop(procedure);

        for future in &detached {
            cancel_pending(future);
        }

        match result {
            Ok(value) => {
                info!(proc_id = %self.id, result = %value, "proc finished");
                self.outcome.resolve(value);
            }
            Err(error) => {
                warn!(proc_id = %self.id, error = %error, "proc failed");
                self.outcome.reject(error.to_val());
            }
        }
    }
}

/* ===================== Handle ===================== */

/// Cancellable handle to a running proc
///
/// The handle is itself an [`Awaitable`]: it settles with the proc's final
/// value, and cancelling it cancels the proc. Returning a handle from a SYNC
/// call therefore ties the child's lifetime to the parent.
#[derive(Clone)]
pub struct ProcHandle {
    inner: Arc<ProcInner>,
}

impl ProcHandle {
    fn new(procedure: Box<dyn Procedure>) -> Self {
        let name = procedure.name().to_string();
        let state = ProcState {
            status: ProcStatus::Created,
            procedure: Some(procedure),
            pending: None,
            generation: 0,
            detached: Detached::new(),
            driving: false,
            queued: None,
            unwind_requested: false,
            unwinding: false,
            result: None,
        };

        Self {
            inner: Arc::new(ProcInner {
                id: Uuid::new_v4(),
                name,
                state: Mutex::new(state),
                outcome: Deferred::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn status(&self) -> ProcStatus {
        self.inner.state.lock().status
    }

    pub fn is_done(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether cancellation has been requested at any point
    pub fn is_cancelled(&self) -> bool {
        let state = self.inner.state.lock();
        state.unwinding || state.unwind_requested
    }

    /// Number of SYNC-returned futures the proc has not awaited
    pub fn detached_count(&self) -> usize {
        self.inner.state.lock().detached.len()
    }

    /// Request cancellation
    ///
    /// The pending future (if any) is cancelled and the procedure is resumed
    /// on its unwind path. Repeated calls before the unwind suspends again,
    /// and calls after `Done`, do nothing.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Final result, if the proc is done
    pub fn try_result(&self) -> Option<Result<Val, ProcError>> {
        self.inner.state.lock().result.clone()
    }

    /// Wait for the proc to reach `Done`
    ///
    /// A cancelled proc settles with whatever its unwind returns. If cleanup
    /// never finishes, neither does this future.
    pub async fn join(&self) -> Result<Val, ProcError> {
        let settled = self.inner.outcome.wait().await;
        match self.try_result() {
            Some(result) => result,
            None => settled.map_err(ProcError::Unhandled),
        }
    }

    pub fn as_future(&self) -> FutureRef {
        Arc::new(self.clone())
    }
}

impl Awaitable for ProcHandle {
    fn on_settle(&self, continuation: Continuation) {
        self.inner.outcome.on_settle(continuation);
    }

    fn cancel(&self) {
        ProcHandle::cancel(self);
    }

    fn is_cancellable(&self) -> bool {
        true
    }
}

impl From<ProcHandle> for Val {
    fn from(handle: ProcHandle) -> Self {
        Val::Future(handle.as_future())
    }
}

impl fmt::Debug for ProcHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcHandle")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("status", &self.status())
            .finish()
    }
}
