//! Standard library functions
//!
//! Every function is a plain [`Callable`]; `Registry::with_stdlib` registers them all.

pub mod basic;
pub mod time;

use crate::proc::Callable;

/// All stdlib functions, ready to register
pub fn functions() -> Vec<Callable> {
    vec![
        Callable::new("log", basic::log),
        Callable::with_arity("add", 2, basic::add),
        Callable::new("concat", basic::concat),
        Callable::new("fail", basic::fail),
        Callable::with_arity("delay", 1, time::delay),
        Callable::with_arity("never", 0, time::never),
    ]
}
