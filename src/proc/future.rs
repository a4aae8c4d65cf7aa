//! Awaitable futures
//!
//! The engine never polls Rust futures itself. Anything a procedure can wait
//! on implements [`Awaitable`]: it accepts one continuation per registration,
//! runs it exactly once when the value settles, and may support cancellation.
//!
//! [`Deferred`] is the settle-by-hand implementation used by hosts, the driver
//! and the tokio bridge ([`spawn`], [`delay`]).

use super::types::Val;
use crate::errors::{self, ErrorInfo};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Final state of a future: `Ok` on success, `Err` with the rejection value
pub type Settlement = Result<Val, Val>;

/// Callback run once a future settles
pub type Continuation = Box<dyn FnOnce(Settlement) + Send>;

/// Capability interface for anything a procedure can suspend on
pub trait Awaitable: Send + Sync {
    /// Register a continuation. Runs immediately if the future already settled.
    fn on_settle(&self, continuation: Continuation);

    /// Request cancellation. Best effort and safe to call repeatedly.
    fn cancel(&self) {}

    fn is_cancellable(&self) -> bool {
        false
    }
}

/// Shared handle to an awaitable
pub type FutureRef = Arc<dyn Awaitable>;

/// Identity comparison for futures
pub fn same_future(a: &FutureRef, b: &FutureRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Await any awaitable from async code
pub async fn wait_for(future: &FutureRef) -> Settlement {
    let (tx, rx) = oneshot::channel();
    future.on_settle(Box::new(move |settled| {
        let _ = tx.send(settled);
    }));
    rx.await
        .unwrap_or_else(|_| Err(Val::error(errors::INTERNAL_ERROR, "Future was dropped")))
}

/* ===================== Deferred ===================== */

type CancelHook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct DeferredState {
    settled: Option<Settlement>,
    waiters: Vec<Continuation>,
    cancellable: bool,
    cancelled: bool,
    on_cancel: Option<CancelHook>,
}

/// A future settled by calling [`Deferred::resolve`] or [`Deferred::reject`]
///
/// Clones share state. Settling a second time is ignored. The cancel hook runs
/// at most once, and never after the deferred has settled.
#[derive(Clone, Default)]
pub struct Deferred {
    state: Arc<Mutex<DeferredState>>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved(value: Val) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    pub fn rejected(error: Val) -> Self {
        let deferred = Self::new();
        deferred.reject(error);
        deferred
    }

    /// Attach a cancel hook, making this deferred cancellable
    pub fn with_cancel<F>(self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.set_cancel(hook);
        self
    }

    pub fn set_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        state.cancellable = true;
        if state.settled.is_none() && !state.cancelled {
            state.on_cancel = Some(Box::new(hook));
        }
    }

    pub fn resolve(&self, value: Val) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: Val) -> bool {
        self.settle(Err(error))
    }

    fn settle(&self, settled: Settlement) -> bool {
        let waiters = {
            let mut state = self.state.lock();
            if state.settled.is_some() {
                return false;
            }
            state.settled = Some(settled.clone());
            state.on_cancel = None;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            waiter(settled.clone());
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.state.lock().settled.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Settlement so far, without waiting
    pub fn peek(&self) -> Option<Settlement> {
        self.state.lock().settled.clone()
    }

    /// Wait for the deferred from async code
    pub fn wait(&self) -> impl Future<Output = Settlement> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.on_settle(Box::new(move |settled| {
            let _ = tx.send(settled);
        }));
        let keep_alive = self.clone();
        async move {
            let settled = rx.await;
            drop(keep_alive);
            settled.unwrap_or_else(|_| {
                Err(Val::error(errors::INTERNAL_ERROR, "Deferred was dropped"))
            })
        }
    }

    pub fn into_ref(self) -> FutureRef {
        Arc::new(self)
    }
}

impl Awaitable for Deferred {
    fn on_settle(&self, continuation: Continuation) {
        let settled = {
            let mut state = self.state.lock();
            match &state.settled {
                Some(settled) => settled.clone(),
                None => {
                    state.waiters.push(continuation);
                    return;
                }
            }
        };
        continuation(settled);
    }

    fn cancel(&self) {
        let hook = {
            let mut state = self.state.lock();
            if state.cancelled || state.settled.is_some() {
                return;
            }
            state.cancelled = true;
            state.on_cancel.take()
        };

        if let Some(hook) = hook {
            hook();
        }
    }

    fn is_cancellable(&self) -> bool {
        self.state.lock().cancellable
    }
}

impl From<Deferred> for Val {
    fn from(deferred: Deferred) -> Self {
        Val::Future(deferred.into_ref())
    }
}

/* ===================== Tokio Bridge ===================== */

/// Run a Rust future on the current tokio runtime as a cancellable deferred
///
/// Cancelling the deferred aborts the task. Without a runtime the deferred is
/// rejected with `RuntimeUnavailable`.
pub fn spawn<F>(future: F) -> Deferred
where
    F: Future<Output = Settlement> + Send + 'static,
{
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(err) => {
            return Deferred::rejected(Val::Error(ErrorInfo::new(
                errors::RUNTIME_UNAVAILABLE,
                format!("No tokio runtime to spawn on: {}", err),
            )))
        }
    };

    let deferred = Deferred::new();
    let settle = deferred.clone();
    let task = handle.spawn(async move {
        match future.await {
            Ok(value) => settle.resolve(value),
            Err(error) => settle.reject(error),
        };
    });

    let abort = task.abort_handle();
    deferred.set_cancel(move || abort.abort());
    deferred
}

/// Future that resolves with `Null` after `duration`; cancelling stops the timer
pub fn delay(duration: Duration) -> Deferred {
    spawn(async move {
        tokio::time::sleep(duration).await;
        Ok(Val::Null)
    })
}

/// Future that never settles on its own; it is cancellable
pub fn never() -> Deferred {
    Deferred::new().with_cancel(|| {})
}
