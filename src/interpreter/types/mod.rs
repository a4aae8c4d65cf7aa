//! Type definitions for the interpreter
//!
//! - AST nodes (Stmt, Expr)
//! - Control flow (Control, Frame, FrameKind)
//! - Execution phases for each statement type

pub mod ast;
pub mod control;
pub mod phase;

pub use ast::{BinOp, Expr, Stmt};
pub use control::{Control, Frame, FrameKind};
pub use phase::*;
