//! Runtime value types

use crate::errors::{self, ErrorInfo};
use crate::proc::effect::Callable;
use crate::proc::future::{same_future, FutureRef};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Runtime value type
///
/// Everything a procedure sends or receives is a `Val`: effect arguments and
/// results, awaited future results, thrown errors and final return values.
#[derive(Clone)]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
    /// Error value with code and message
    Error(ErrorInfo),
    /// Host function that an effect can target
    Func(Callable),
    /// Handle to a value that settles later
    Future(FutureRef),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Bool(b) => *b,
            Val::Null => false,
            _ => true,
        }
    }

    /// Shorthand for an error value
    pub fn error(code: &str, message: impl Into<String>) -> Val {
        Val::Error(ErrorInfo::new(code, message))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Null => "null",
            Val::Bool(_) => "bool",
            Val::Num(_) => "number",
            Val::Str(_) => "string",
            Val::List(_) => "list",
            Val::Obj(_) => "object",
            Val::Error(_) => "error",
            Val::Func(_) => "function",
            Val::Future(_) => "future",
        }
    }

    pub fn as_future(&self) -> Option<&FutureRef> {
        match self {
            Val::Future(future) => Some(future),
            _ => None,
        }
    }
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Null, Val::Null) => true,
            (Val::Bool(a), Val::Bool(b)) => a == b,
            (Val::Num(a), Val::Num(b)) => a == b,
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Obj(a), Val::Obj(b)) => a == b,
            (Val::Error(a), Val::Error(b)) => a == b,
            (Val::Func(a), Val::Func(b)) => a == b,
            (Val::Future(a), Val::Future(b)) => same_future(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => write!(f, "Null"),
            Val::Bool(b) => write!(f, "Bool({b})"),
            Val::Num(n) => write!(f, "Num({n})"),
            Val::Str(s) => write!(f, "Str({s:?})"),
            Val::List(items) => f.debug_tuple("List").field(items).finish(),
            Val::Obj(map) => f.debug_tuple("Obj").field(map).finish(),
            Val::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Val::Func(func) => write!(f, "Func({})", func.name()),
            Val::Future(_) => write!(f, "Future(..)"),
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => write!(f, "null"),
            Val::Bool(b) => write!(f, "{b}"),
            Val::Num(n) => write!(f, "{n}"),
            Val::Str(s) => write!(f, "{s}"),
            Val::Error(err) => write!(f, "{err}"),
            Val::Func(func) => write!(f, "[function {}]", func.name()),
            Val::Future(_) => write!(f, "[future]"),
            Val::List(_) | Val::Obj(_) => match val_to_json(self) {
                Ok(json) => write!(f, "{json}"),
                Err(_) => write!(f, "[{}]", self.type_name()),
            },
        }
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl From<ErrorInfo> for Val {
    fn from(err: ErrorInfo) -> Self {
        Val::Error(err)
    }
}

impl From<FutureRef> for Val {
    fn from(future: FutureRef) -> Self {
        Val::Future(future)
    }
}

/* ===================== JSON Conversion ===================== */

/// Convert a JSON value into a runtime value
///
/// Objects shaped like `{"code": .., "message": ..}` stay plain objects; only
/// values produced at runtime become `Val::Error`.
pub fn json_to_val(json: &JsonValue) -> Val {
    match json {
        JsonValue::Null => Val::Null,
        JsonValue::Bool(b) => Val::Bool(*b),
        JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Val::Str(s.clone()),
        JsonValue::Array(items) => Val::List(items.iter().map(json_to_val).collect()),
        JsonValue::Object(map) => Val::Obj(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_val(v)))
                .collect(),
        ),
    }
}

/// Convert a runtime value into JSON
///
/// Functions and futures only exist in-process and cannot be converted.
pub fn val_to_json(val: &Val) -> Result<JsonValue, ErrorInfo> {
    match val {
        Val::Null => Ok(JsonValue::Null),
        Val::Bool(b) => Ok(JsonValue::Bool(*b)),
        Val::Num(n) => Ok(serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)),
        Val::Str(s) => Ok(JsonValue::String(s.clone())),
        Val::List(items) => items
            .iter()
            .map(val_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Val::Obj(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), val_to_json(v)?);
            }
            Ok(JsonValue::Object(out))
        }
        Val::Error(err) => Ok(serde_json::json!({
            "code": err.code,
            "message": err.message,
        })),
        Val::Func(_) | Val::Future(_) => Err(ErrorInfo::new(
            errors::TYPE_ERROR,
            format!("Cannot convert a {} to JSON", val.type_name()),
        )),
    }
}
