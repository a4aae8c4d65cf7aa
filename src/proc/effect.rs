//! Effect descriptors and the call executor
//!
//! A procedure never calls a host function directly. It yields an [`Effect`]
//! describing the call and the engine performs it with [`execute_call`].

use super::types::Val;
use crate::errors::{self, ErrorInfo};
use std::fmt;
use std::sync::Arc;

/// Result of invoking a host function: `Err` carries the thrown value
pub type CallResult = Result<Val, Val>;

type HostFn = dyn Fn(Option<&Val>, &[Val]) -> CallResult + Send + Sync;

/* ===================== Callable ===================== */

/// A named host function that effects can target
///
/// The function receives the effect's receiver (if any) and its positional
/// arguments. Two callables are equal only if they share the same function.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    arity: Option<usize>,
    func: Arc<HostFn>,
}

impl Callable {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(Option<&Val>, &[Val]) -> CallResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            arity: None,
            func: Arc::new(func),
        }
    }

    /// Create a callable that rejects calls with the wrong number of arguments
    pub fn with_arity<F>(name: &str, arity: usize, func: F) -> Self
    where
        F: Fn(Option<&Val>, &[Val]) -> CallResult + Send + Sync + 'static,
    {
        Self {
            arity: Some(arity),
            ..Self::new(name, func)
        }
    }

    /// Same function under a different name
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: Arc::from(name),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn invoke(&self, receiver: Option<&Val>, args: &[Val]) -> CallResult {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(Val::Error(ErrorInfo::new(
                    errors::WRONG_ARG_COUNT,
                    format!(
                        "{} expected {} arguments, got {}",
                        self.name,
                        arity,
                        args.len()
                    ),
                )));
            }
        }
        (self.func)(receiver, args)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/* ===================== Effect Descriptor ===================== */

/// How the engine treats a future returned by the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Await a returned future before resuming the procedure
    Async,
    /// Hand a returned future back to the procedure as a plain value
    Sync,
}

/// Immutable description of one function call
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    receiver: Option<Val>,
    target: Callable,
    args: Vec<Val>,
    mode: CallMode,
}

impl Effect {
    pub fn receiver(&self) -> Option<&Val> {
        self.receiver.as_ref()
    }

    pub fn target(&self) -> &Callable {
        &self.target
    }

    pub fn args(&self) -> &[Val] {
        &self.args
    }

    pub fn mode(&self) -> CallMode {
        self.mode
    }

    /// Same call, different target; receiver, args and mode are kept
    pub fn with_target(&self, target: Callable) -> Effect {
        Effect {
            target,
            ..self.clone()
        }
    }
}

pub fn call(target: Callable, args: Vec<Val>) -> Effect {
    Effect {
        receiver: None,
        target,
        args,
        mode: CallMode::Async,
    }
}

pub fn call_with_receiver(receiver: Val, target: Callable, args: Vec<Val>) -> Effect {
    Effect {
        receiver: Some(receiver),
        target,
        args,
        mode: CallMode::Async,
    }
}

pub fn call_sync(target: Callable, args: Vec<Val>) -> Effect {
    Effect {
        receiver: None,
        target,
        args,
        mode: CallMode::Sync,
    }
}

pub fn call_sync_with_receiver(receiver: Val, target: Callable, args: Vec<Val>) -> Effect {
    Effect {
        receiver: Some(receiver),
        target,
        args,
        mode: CallMode::Sync,
    }
}

/// Call the function stored under `method` on an object receiver
pub fn call_method(receiver: Val, method: &str, args: Vec<Val>) -> Result<Effect, ErrorInfo> {
    let target = lookup_method(&receiver, method)?;
    Ok(call_with_receiver(receiver, target, args))
}

fn lookup_method(receiver: &Val, method: &str) -> Result<Callable, ErrorInfo> {
    let Val::Obj(map) = receiver else {
        return Err(ErrorInfo::new(
            errors::TYPE_ERROR,
            format!(
                "Cannot call method '{}' on non-object value ({})",
                method,
                receiver.type_name()
            ),
        ));
    };

    match map.get(method) {
        Some(Val::Func(target)) => Ok(target.clone()),
        Some(other) => Err(ErrorInfo::new(
            errors::NOT_CALLABLE,
            format!("Property '{}' is a {}, not a function", method, other.type_name()),
        )),
        None => Err(ErrorInfo::new(
            errors::METHOD_NOT_FOUND,
            format!("Method '{}' not found", method),
        )),
    }
}

/* ===================== Call Executor ===================== */

/// Invoke the effect's target with its receiver and arguments
///
/// A thrown value is returned as `Err` unchanged. There are no retries.
pub fn execute_call(effect: &Effect) -> CallResult {
    effect.target.invoke(effect.receiver.as_ref(), &effect.args)
}
