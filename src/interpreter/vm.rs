//! Virtual Machine state
//!
//! The VM holds all execution state:
//! - frames: Stack of active statements
//! - env: Scopes of variables
//! - control: Current control flow state (return, break, throw, etc.)
//!
//! Because everything lives in these fields, the VM can stop at any effect
//! and continue later. That is what makes it a [`Procedure`].

use super::env::Env;
use super::exec_loop::run_until_yield;
use super::types::{BlockPhase, Control, EvalPhase, Frame, FrameKind, IfPhase, Stmt, TryPhase, WhilePhase};
use crate::proc::{Procedure, Resumed, Val, Yielded};
use std::collections::HashMap;

/* ===================== VM ===================== */

/// Virtual Machine state
#[derive(Debug, Clone)]
pub struct VM {
    /// Stack of execution frames
    pub frames: Vec<Frame>,

    /// Variable scopes
    pub env: Env,

    /// Current control flow state
    pub control: Control,

    /// Value delivered by the engine for the frame in `Resume` phase
    pub resume_value: Option<Val>,

    /// Suspended at an effect or await
    pub awaiting: bool,

    /// Ran out of frames
    pub finished: bool,

    name: String,
}

impl VM {
    /// Create a new VM with a program
    ///
    /// The program is wrapped in a root frame. Nothing runs until the first
    /// resume.
    pub fn new(program: Stmt, globals: HashMap<String, Val>) -> Self {
        let mut vm = VM {
            frames: vec![],
            env: Env::new(globals),
            control: Control::None,
            resume_value: None,
            awaiting: false,
            finished: false,
            name: "script".to_string(),
        };

        push_stmt(&mut vm, &program);

        vm
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/* ===================== Frame Management ===================== */

/// Push a new frame for a statement onto the stack
///
/// This determines the initial phase based on the statement type.
pub fn push_stmt(vm: &mut VM, stmt: &Stmt) {
    let kind = match stmt {
        Stmt::Block { .. } => FrameKind::Block {
            phase: BlockPhase::Enter,
            idx: 0,
        },
        Stmt::Let { .. } => FrameKind::Let {
            phase: EvalPhase::Eval,
        },
        Stmt::Assign { .. } => FrameKind::Assign {
            phase: EvalPhase::Eval,
        },
        Stmt::Expr { .. } => FrameKind::Expr {
            phase: EvalPhase::Eval,
        },
        Stmt::Return { .. } => FrameKind::Return {
            phase: EvalPhase::Eval,
        },
        Stmt::Throw { .. } => FrameKind::Throw,
        Stmt::If { .. } => FrameKind::If {
            phase: IfPhase::Eval,
        },
        Stmt::While { .. } => FrameKind::While {
            phase: WhilePhase::Check,
        },
        Stmt::Break => FrameKind::Break,
        Stmt::Continue => FrameKind::Continue,
        Stmt::Try { .. } => FrameKind::Try {
            phase: TryPhase::Enter,
            saved: Control::None,
        },
    };

    vm.frames.push(Frame {
        kind,
        scope_base_sp: vm.env.depth(),
        node: stmt.clone(),
    });
}

/// Pop the top frame and drop any scopes it opened
pub fn pop_frame(vm: &mut VM) {
    if let Some(frame) = vm.frames.pop() {
        vm.env.truncate(frame.scope_base_sp);
    }
}

/// Replace the kind of the top frame
pub fn set_top_kind(vm: &mut VM, kind: FrameKind) {
    if let Some(frame) = vm.frames.last_mut() {
        frame.kind = kind;
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Hand an effect or future to the engine
    Yield(Yielded),
    /// Execution complete
    Done,
}

/* ===================== Procedure ===================== */

impl Procedure for VM {
    fn resume_normal(&mut self, value: Val) -> Result<Resumed, Val> {
        if self.finished {
            return Ok(Resumed::Complete(Val::Null));
        }
        if self.awaiting {
            self.awaiting = false;
            self.resume_value = Some(value);
        }
        run_until_yield(self)
    }

    fn resume_error(&mut self, error: Val) -> Result<Resumed, Val> {
        if self.finished {
            return Err(error);
        }
        self.awaiting = false;
        self.resume_value = None;
        self.control = Control::Throw(error);
        run_until_yield(self)
    }

    fn resume_force_unwind(&mut self, value: Val) -> Result<Resumed, Val> {
        if self.finished {
            return Ok(Resumed::Complete(value));
        }
        self.awaiting = false;
        self.resume_value = None;
        self.control = Control::Return(value);
        run_until_yield(self)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
