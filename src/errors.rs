//! Error payloads carried as values
//!
//! Errors thrown by effects, futures and scripts travel through procedures as
//! `Val::Error(ErrorInfo)` so a procedure can catch and inspect them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const ERROR: &str = "Error";
pub const TYPE_ERROR: &str = "TypeError";
pub const UNDEFINED_VARIABLE: &str = "UndefinedVariable";
pub const PROPERTY_NOT_FOUND: &str = "PropertyNotFound";
pub const METHOD_NOT_FOUND: &str = "MethodNotFound";
pub const NOT_CALLABLE: &str = "NotCallable";
pub const WRONG_ARG_COUNT: &str = "WrongArgCount";
pub const WRONG_ARG_TYPE: &str = "WrongArgType";
pub const RUNTIME_UNAVAILABLE: &str = "RuntimeUnavailable";
pub const CONTRACT_VIOLATION: &str = "ContractViolation";
pub const INTERNAL_ERROR: &str = "InternalError";

/// Error value with code and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
