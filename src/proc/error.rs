//! Engine errors

use super::types::Val;
use crate::errors::{self, ErrorInfo};
use thiserror::Error;

/// Failure of a proc or of a single engine step
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcError {
    /// The procedure yielded something that is neither an effect nor a future
    #[error("procedure yielded a {found} value ({value}); only effects and futures may be yielded")]
    ContractViolation { found: &'static str, value: String },

    /// An error escaped the procedure's outermost frame
    #[error("unhandled error: {0}")]
    Unhandled(Val),

    /// The step engine was asked to resume with a non-resumable outcome
    #[error("cannot resume a procedure with a {0} outcome")]
    InvalidResume(&'static str),

    /// A synchronous run reached a future it would have to wait on
    #[error("procedure suspended on a future during a synchronous run")]
    WouldBlock,
}

impl ProcError {
    pub fn contract_violation(yielded: &Val) -> Self {
        ProcError::ContractViolation {
            found: yielded.type_name(),
            value: yielded.to_string(),
        }
    }

    /// Value used when this error has to travel as a rejected future
    pub fn to_val(&self) -> Val {
        match self {
            ProcError::Unhandled(value) => value.clone(),
            ProcError::ContractViolation { .. } => {
                Val::Error(ErrorInfo::new(errors::CONTRACT_VIOLATION, self.to_string()))
            }
            ProcError::InvalidResume(_) | ProcError::WouldBlock => {
                Val::Error(ErrorInfo::new(errors::INTERNAL_ERROR, self.to_string()))
            }
        }
    }
}
