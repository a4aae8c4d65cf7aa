//! Basic stdlib functions

use crate::errors::{self, ErrorInfo};
use crate::proc::{CallResult, Val};
use tracing::info;

/// log(...values) - Write the values to the log and return null
pub fn log(_receiver: Option<&Val>, args: &[Val]) -> CallResult {
    let line: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    info!(target: "rhythm_proc::script", "{}", line.join(" "));
    Ok(Val::Null)
}

/// add(a, b) - Sum of two numbers
pub fn add(_receiver: Option<&Val>, args: &[Val]) -> CallResult {
    match args {
        [Val::Num(a), Val::Num(b)] => Ok(Val::Num(a + b)),
        _ => Err(Val::Error(ErrorInfo::new(
            errors::WRONG_ARG_TYPE,
            "add expects two numbers",
        ))),
    }
}

/// concat(...values) - String concatenation of every argument
pub fn concat(_receiver: Option<&Val>, args: &[Val]) -> CallResult {
    Ok(Val::Str(args.iter().map(|arg| arg.to_string()).collect()))
}

/// fail(message) - Throw an `Error` with the given message
pub fn fail(_receiver: Option<&Val>, args: &[Val]) -> CallResult {
    let message = match args.first() {
        Some(Val::Str(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => "failed".to_string(),
    };
    Err(Val::Error(ErrorInfo::new(errors::ERROR, message)))
}
