//! Call mocking
//!
//! Wraps a procedure and swaps the target of every yielded effect whose
//! target name has a mock. The procedure itself is unchanged.

use super::effect::{Callable, Effect};
use super::procedure::{Procedure, Resumed, Yielded};
use super::types::Val;
use std::collections::HashMap;

pub struct MockCalls<P> {
    inner: P,
    mocks: HashMap<String, Callable>,
}

/// Substitute effect targets by name
pub fn mock_calls<P>(procedure: P, mocks: HashMap<String, Callable>) -> MockCalls<P>
where
    P: Procedure,
{
    MockCalls {
        inner: procedure,
        mocks,
    }
}

impl<P> MockCalls<P> {
    pub fn into_inner(self) -> P {
        self.inner
    }

    fn substitute(&self, resumed: Result<Resumed, Val>) -> Result<Resumed, Val> {
        match resumed? {
            Resumed::Yield(Yielded::Effect(effect)) => {
                Ok(Resumed::Yield(Yielded::Effect(self.mocked(effect))))
            }
            other => Ok(other),
        }
    }

    fn mocked(&self, effect: Effect) -> Effect {
        let name = effect.target().name();
        match self.mocks.get(name) {
            Some(mock) => effect.with_target(mock.renamed(name)),
            None => effect,
        }
    }
}

impl<P> Procedure for MockCalls<P>
where
    P: Procedure,
{
    fn resume_normal(&mut self, value: Val) -> Result<Resumed, Val> {
        let resumed = self.inner.resume_normal(value);
        self.substitute(resumed)
    }

    fn resume_error(&mut self, error: Val) -> Result<Resumed, Val> {
        let resumed = self.inner.resume_error(error);
        self.substitute(resumed)
    }

    fn resume_force_unwind(&mut self, value: Val) -> Result<Resumed, Val> {
        let resumed = self.inner.resume_force_unwind(value);
        self.substitute(resumed)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
