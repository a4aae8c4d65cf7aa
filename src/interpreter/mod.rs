//! Scripted procedures
//!
//! A resumable frame-stack interpreter for procedures written as JSON ASTs.
//! The VM implements [`Procedure`](crate::proc::Procedure): every `Call`,
//! `CallSync` and `Await` in a script is a yield to the proc engine, and all
//! interpreter state lives in the frame stack between resumes.
//!
//! ## Architecture
//! - `types`: AST, frames, control flow and phases
//! - `vm`: VM state and frame management
//! - `exec_loop`: step loop and unwinding
//! - `statements` / `expressions`: per-node handlers
//! - `validator`: placement checks run before instantiation
//! - `script` / `stdlib`: loading, registry and built-in functions

pub mod env;
pub mod exec_loop;
pub mod expressions;
pub mod script;
pub mod statements;
pub mod stdlib;
pub mod types;
pub mod validator;
pub mod vm;

#[cfg(test)]
mod tests;

pub use env::Env;
pub use script::{Registry, Script, ScriptError};
pub use types::{BinOp, Control, Expr, Stmt};
pub use validator::{validate, ValidationError};
pub use vm::VM;
