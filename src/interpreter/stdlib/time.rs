//! Timer stdlib functions
//!
//! Both return futures, so an ASYNC call suspends the procedure and a SYNC
//! call hands the future back as a value.

use crate::errors::{self, ErrorInfo};
use crate::proc::{delay as delay_for, never as never_settles, CallResult, Val};
use std::time::Duration;

/// delay(ms) - Future that resolves with null after `ms` milliseconds
pub fn delay(_receiver: Option<&Val>, args: &[Val]) -> CallResult {
    let ms = match args {
        [Val::Num(ms)] if ms.is_finite() && *ms >= 0.0 => *ms,
        _ => {
            return Err(Val::Error(ErrorInfo::new(
                errors::WRONG_ARG_TYPE,
                "delay expects a non-negative number of milliseconds",
            )))
        }
    };
    Ok(delay_for(Duration::from_millis(ms as u64)).into())
}

/// never() - Future that only settles by cancellation
pub fn never(_receiver: Option<&Val>, _args: &[Val]) -> CallResult {
    Ok(never_settles().into())
}
