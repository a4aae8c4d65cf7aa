//! Control flow and execution frame types

use super::ast::Stmt;
use super::phase::{BlockPhase, EvalPhase, IfPhase, TryPhase, WhilePhase};
use crate::proc::Val;

/* ===================== Control Flow ===================== */

/// Control flow state
///
/// This represents active control flow (break, continue, return, throw).
/// When control != None, the VM unwinds the stack to find the appropriate
/// handler. Forced unwinds from the engine enter as `Return`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Control {
    #[default]
    None,
    Break,
    Continue,
    Return(Val),
    Throw(Val),
}

/* ===================== Frames ===================== */

/// Frame kind - the type and state of a statement being executed
#[derive(Debug, Clone, PartialEq)]
pub enum FrameKind {
    Block { phase: BlockPhase, idx: usize },
    Let { phase: EvalPhase },
    Assign { phase: EvalPhase },
    Expr { phase: EvalPhase },
    Return { phase: EvalPhase },
    Throw,
    If { phase: IfPhase },
    While { phase: WhilePhase },
    Break,
    Continue,
    /// `saved` holds the control flow interrupted by the finally block
    Try { phase: TryPhase, saved: Control },
}

/// Execution frame - one per active statement
///
/// The frame stack replaces the system call stack, which is what lets a
/// procedure stop at a yield and continue later.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The kind and state of this frame
    pub kind: FrameKind,

    /// Scope depth when the frame was pushed; restored when it is popped
    pub scope_base_sp: usize,

    /// The AST node (statement) this frame represents
    pub node: Stmt,
}
