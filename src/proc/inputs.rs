//! Externally fed inputs
//!
//! Hosts push values into an [`InputStream`] while a procedure runs; the
//! procedure awaits `next()` to observe them one at a time.

use super::future::Deferred;
use super::types::Val;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct StreamState {
    buffered: VecDeque<Val>,
    waiters: VecDeque<Deferred>,
    closed: bool,
}

/// Queue of values delivered to procedures through futures
///
/// Each `next()` future receives exactly one pushed value, in push order.
/// After `close()`, pending and future `next()` calls resolve with `Null`
/// once the buffered values are drained.
#[derive(Clone, Default)]
pub struct InputStream {
    state: Arc<Mutex<StreamState>>,
}

impl InputStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a value to the oldest waiter, or buffer it
    pub fn push(&self, value: Val) -> bool {
        let mut value = Some(value);
        loop {
            let waiter = {
                let mut state = self.state.lock();
                if state.closed {
                    return false;
                }
                match state.waiters.pop_front() {
                    Some(waiter) => waiter,
                    None => {
                        if let Some(value) = value.take() {
                            state.buffered.push_back(value);
                        }
                        return true;
                    }
                }
            };

            // A cancelled waiter no longer wants the value; try the next one.
            if waiter.is_cancelled() {
                continue;
            }
            if let Some(value) = value.take() {
                waiter.resolve(value);
            }
            return true;
        }
    }

    /// Future for the next value
    pub fn next(&self) -> Deferred {
        let mut state = self.state.lock();
        if let Some(value) = state.buffered.pop_front() {
            return Deferred::resolved(value);
        }
        if state.closed {
            return Deferred::resolved(Val::Null);
        }

        state
            .waiters
            .retain(|waiter| !waiter.is_cancelled() && !waiter.is_settled());
        let waiter = Deferred::new().with_cancel(|| {});
        state.waiters.push_back(waiter.clone());
        waiter
    }

    pub fn close(&self) {
        let waiters = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            waiter.resolve(Val::Null);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Waiters held by the stream, including cancelled ones not yet pruned
    #[cfg(test)]
    pub(crate) fn queued_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    pub fn pending_waiters(&self) -> usize {
        self.state
            .lock()
            .waiters
            .iter()
            .filter(|w| !w.is_cancelled() && !w.is_settled())
            .count()
    }
}
