//! Step-by-step assertions for procedures
//!
//! [`ProcTester`] resumes a procedure by hand without executing anything, so
//! a test can check each yielded call and decide what the call "returned".
//!
//! ```ignore
//! ProcTester::new(procedure)
//!     .calls("fetch", vec![Val::from("a")])?
//!     .returns(Val::Num(1.0))
//!     .calls("store", vec![Val::Num(1.0)])?
//!     .ends()?;
//! ```

use super::procedure::{Procedure, Resumed, Yielded};
use super::types::Val;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TesterError {
    #[error("expected {expected}, procedure yielded {found}")]
    Unexpected { expected: String, found: String },

    #[error("procedure raised an unhandled error: {0}")]
    Raised(Val),
}

enum Feed {
    Value(Val),
    Error(Val),
}

pub struct ProcTester<P> {
    procedure: P,
    next: Option<Feed>,
}

impl<P> ProcTester<P>
where
    P: Procedure,
{
    pub fn new(procedure: P) -> Self {
        Self {
            procedure,
            next: None,
        }
    }

    /// Expect a call of `name` with `args` and no receiver
    pub fn calls(&mut self, name: &str, args: Vec<Val>) -> Result<&mut Self, TesterError> {
        self.applies(None, name, args)
    }

    /// Expect a call of `name` with `receiver` and `args`; the mode is ignored
    pub fn applies(
        &mut self,
        receiver: Option<Val>,
        name: &str,
        args: Vec<Val>,
    ) -> Result<&mut Self, TesterError> {
        let resumed = self.advance()?;
        if let Resumed::Yield(Yielded::Effect(effect)) = &resumed {
            if effect.target().name() == name
                && effect.args() == args.as_slice()
                && effect.receiver() == receiver.as_ref()
            {
                return Ok(self);
            }
        }

        Err(TesterError::Unexpected {
            expected: format!("call {}", render_call(name, &args)),
            found: describe(&resumed),
        })
    }

    pub fn yields_future(&mut self) -> Result<&mut Self, TesterError> {
        let resumed = self.advance()?;
        match resumed {
            Resumed::Yield(Yielded::Future(_)) => Ok(self),
            other => Err(TesterError::Unexpected {
                expected: "a future".to_string(),
                found: describe(&other),
            }),
        }
    }

    /// Value the procedure receives at its next resume
    pub fn returns(&mut self, value: Val) -> &mut Self {
        self.next = Some(Feed::Value(value));
        self
    }

    /// Error raised in the procedure at its next resume
    pub fn throws(&mut self, error: Val) -> &mut Self {
        self.next = Some(Feed::Error(error));
        self
    }

    /// Resume once without checking what comes out
    pub fn skip(&mut self) -> Result<&mut Self, TesterError> {
        self.advance()?;
        Ok(self)
    }

    /// Expect completion and return the final value
    pub fn ends(&mut self) -> Result<Val, TesterError> {
        match self.advance()? {
            Resumed::Complete(value) => Ok(value),
            other => Err(TesterError::Unexpected {
                expected: "completion".to_string(),
                found: describe(&other),
            }),
        }
    }

    fn advance(&mut self) -> Result<Resumed, TesterError> {
        let resumed = match self.next.take() {
            Some(Feed::Error(error)) => self.procedure.resume_error(error),
            Some(Feed::Value(value)) => self.procedure.resume_normal(value),
            None => self.procedure.resume_normal(Val::Null),
        };
        resumed.map_err(TesterError::Raised)
    }
}

fn render_call(name: &str, args: &[Val]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("{}({})", name, args.join(", "))
}

fn describe(resumed: &Resumed) -> String {
    match resumed {
        Resumed::Yield(Yielded::Effect(effect)) => {
            format!("call {}", render_call(effect.target().name(), effect.args()))
        }
        Resumed::Yield(Yielded::Future(_)) => "a future".to_string(),
        Resumed::Yield(Yielded::Other(value)) => format!("the value {}", value),
        Resumed::Complete(value) => format!("completion with {}", value),
    }
}
