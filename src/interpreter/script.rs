//! Script loading and instantiation
//!
//! A script is a JSON document: an optional name, parameter names and a
//! statement body. [`Script::instantiate`] binds arguments and registry
//! entries into a fresh [`VM`] that the proc engine can drive.

use super::stdlib;
use super::types::Stmt;
use super::validator::{validate, ValidationError};
use super::vm::VM;
use crate::proc::{Callable, InputStream, Val};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {}", render_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/* ===================== Script ===================== */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
    pub body: Stmt,
}

impl Script {
    pub fn from_json(source: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        validate(&self.body).map_err(ScriptError::Invalid)
    }

    /// Create a VM with the registry as globals and `args` bound to params
    ///
    /// Missing arguments are bound to `Null`; extra arguments are ignored.
    pub fn instantiate(&self, registry: &Registry, args: Vec<Val>) -> VM {
        let mut globals = registry.globals();
        let mut args = args.into_iter();
        for param in &self.params {
            globals.insert(param.clone(), args.next().unwrap_or(Val::Null));
        }

        let vm = VM::new(self.body.clone(), globals);
        match &self.name {
            Some(name) => vm.with_name(name.clone()),
            None => vm,
        }
    }
}

/* ===================== Registry ===================== */

/// Names visible to every script
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Val>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdlib() -> Self {
        let mut registry = Self::new();
        for callable in stdlib::functions() {
            registry.register(callable);
        }
        registry
    }

    /// Expose a function under its own name
    pub fn register(&mut self, callable: Callable) -> &mut Self {
        self.entries
            .insert(callable.name().to_string(), Val::Func(callable));
        self
    }

    pub fn define(&mut self, name: &str, value: Val) -> &mut Self {
        self.entries.insert(name.to_string(), value);
        self
    }

    /// Expose an input stream as an object with a `next()` method
    ///
    /// `Call` on `name.next()` waits for the next pushed value.
    pub fn register_input_stream(&mut self, name: &str, stream: &InputStream) -> &mut Self {
        let source = stream.clone();
        let next = Callable::with_arity("next", 0, move |_receiver, _args| {
            Ok(source.next().into())
        });
        let object = HashMap::from([("next".to_string(), Val::Func(next))]);
        self.define(name, Val::Obj(object))
    }

    pub fn get(&self, name: &str) -> Option<&Val> {
        self.entries.get(name)
    }

    pub fn globals(&self) -> HashMap<String, Val> {
        self.entries.clone()
    }
}
