//! Lexical environment
//!
//! A stack of scopes. The bottom scope holds globals (registry functions and
//! script parameters) and is never popped.

use crate::errors::{self, ErrorInfo};
use crate::proc::Val;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Env {
    scopes: Vec<HashMap<String, Val>>,
}

impl Env {
    pub fn new(globals: HashMap<String, Val>) -> Self {
        Self {
            scopes: vec![globals],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drop scopes above `depth`
    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
    }

    /// Declare (or shadow) a variable in the innermost scope
    pub fn declare(&mut self, name: &str, value: Val) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Update the nearest existing binding
    pub fn assign(&mut self, name: &str, value: Val) -> Result<(), Val> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(undefined(name))
    }

    pub fn lookup(&self, name: &str) -> Result<&Val, Val> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| undefined(name))
    }
}

fn undefined(name: &str) -> Val {
    Val::Error(ErrorInfo::new(
        errors::UNDEFINED_VARIABLE,
        format!("Undefined variable '{}'", name),
    ))
}
