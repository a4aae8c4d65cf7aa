//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! It processes one frame at a time, advancing execution phases and managing
//! the frame stack.
//!
//! ## Function Organization
//! 1. run_until_yield() - Top-level driver (calls step until a yield or the end)
//! 2. step() - Main execution loop (dispatches to statement handlers)
//! 3. unwind() - Moves active control flow to its handler

use super::statements::{
    execute_assign, execute_block, execute_break, execute_continue, execute_expr, execute_if,
    execute_let, execute_return, execute_throw, execute_try, execute_while,
};
use super::types::{Control, FrameKind, Stmt, TryPhase, WhilePhase};
use super::vm::{pop_frame, push_stmt, set_top_kind, Step, VM};
use crate::errors;
use crate::proc::{Resumed, Val};
use tracing::trace;

/* ===================== Public API ===================== */

/// Run the VM until it yields or completes
///
/// A completed VM reports its final control flow: `Return(v)` completes with
/// `v`, `Throw(e)` escapes as `Err(e)`, and falling off the end completes
/// with `Null`.
pub fn run_until_yield(vm: &mut VM) -> Result<Resumed, Val> {
    loop {
        match step(vm) {
            Step::Continue => continue,
            Step::Yield(yielded) => {
                trace!(depth = vm.frames.len(), ?yielded, "script yielded");
                vm.awaiting = true;
                return Ok(Resumed::Yield(yielded));
            }
            Step::Done => {
                vm.finished = true;
                return match std::mem::take(&mut vm.control) {
                    Control::Return(value) => Ok(Resumed::Complete(value)),
                    Control::Throw(error) => Err(error),
                    Control::None | Control::Break | Control::Continue => {
                        Ok(Resumed::Complete(Val::Null))
                    }
                };
            }
        }
    }
}

/// Execute one step of the VM
///
/// 1. Checks for active control flow and unwinds if needed
/// 2. Gets the top frame
/// 3. Dispatches on frame kind and statement node
pub fn step(vm: &mut VM) -> Step {
    if vm.control != Control::None {
        return unwind(vm);
    }

    let Some(frame_idx) = vm.frames.len().checked_sub(1) else {
        return Step::Done;
    };

    // Clone frame data we need (to avoid borrow checker issues)
    let (kind, node) = {
        let f = &vm.frames[frame_idx];
        (f.kind.clone(), f.node.clone())
    };

    match (kind, node) {
        (FrameKind::Block { phase, idx }, Stmt::Block { body }) => {
            execute_block(vm, phase, idx, &body)
        }

        (FrameKind::Let { phase }, Stmt::Let { name, init }) => {
            execute_let(vm, phase, &name, init.as_ref())
        }

        (FrameKind::Assign { phase }, Stmt::Assign { name, expr }) => {
            execute_assign(vm, phase, &name, &expr)
        }

        (FrameKind::Expr { phase }, Stmt::Expr { expr }) => execute_expr(vm, phase, &expr),

        (FrameKind::Return { phase }, Stmt::Return { value }) => {
            execute_return(vm, phase, value.as_ref())
        }

        (FrameKind::Throw, Stmt::Throw { value }) => execute_throw(vm, &value),

        (FrameKind::If { phase }, Stmt::If { test, then_s, else_s }) => {
            execute_if(vm, phase, &test, &then_s, else_s.as_deref())
        }

        (FrameKind::While { phase }, Stmt::While { test, body }) => {
            execute_while(vm, phase, &test, &body)
        }

        (FrameKind::Break, Stmt::Break) => execute_break(vm),

        (FrameKind::Continue, Stmt::Continue) => execute_continue(vm),

        (FrameKind::Try { phase, saved }, Stmt::Try { body, finally_s, .. }) => {
            execute_try(vm, phase, saved, &body, finally_s.as_deref())
        }

        // Frame kind does not match node; surface it as a script error
        (kind, _) => {
            pop_frame(vm);
            vm.control = Control::Throw(Val::error(
                errors::INTERNAL_ERROR,
                format!("Frame {:?} does not match its statement", kind),
            ));
            Step::Continue
        }
    }
}

/* ===================== Control Flow ===================== */

/// Unwind the stack when control flow is active
///
/// Pops frames until a handler takes the control flow or no frames remain:
/// - `Break`/`Continue` stop at the nearest loop
/// - `Throw` stops at a try with a catch block
/// - every kind stops at a pending finally block, which saves it and
///   restores it once the finally block completes normally
pub fn unwind(vm: &mut VM) -> Step {
    loop {
        let Some(frame_idx) = vm.frames.len().checked_sub(1) else {
            return Step::Done;
        };

        let (kind, node, base) = {
            let f = &vm.frames[frame_idx];
            (f.kind.clone(), f.node.clone(), f.scope_base_sp)
        };

        if vm.control == Control::None {
            return Step::Continue;
        }
        let throwing = matches!(vm.control, Control::Throw(_));

        match (kind, node) {
            (FrameKind::While { .. }, _) if vm.control == Control::Break => {
                pop_frame(vm);
                vm.control = Control::None;
                return Step::Continue;
            }

            (FrameKind::While { .. }, _) if vm.control == Control::Continue => {
                vm.env.truncate(base);
                set_top_kind(
                    vm,
                    FrameKind::While {
                        phase: WhilePhase::Check,
                    },
                );
                vm.control = Control::None;
                return Step::Continue;
            }

            (
                FrameKind::Try {
                    phase: TryPhase::Body,
                    ..
                },
                Stmt::Try {
                    catch_var,
                    catch_s: Some(catch_s),
                    ..
                },
            ) if throwing => {
                let error = match std::mem::take(&mut vm.control) {
                    Control::Throw(error) => error,
                    _ => Val::Null,
                };
                trace!(?error, "caught");

                vm.env.truncate(base);
                vm.env.push_scope();
                if let Some(name) = &catch_var {
                    vm.env.declare(name, error);
                }
                set_top_kind(
                    vm,
                    FrameKind::Try {
                        phase: TryPhase::Catch,
                        saved: Control::None,
                    },
                );
                push_stmt(vm, &catch_s);
                return Step::Continue;
            }

            (
                FrameKind::Try {
                    phase: TryPhase::Body | TryPhase::Catch,
                    ..
                },
                Stmt::Try {
                    finally_s: Some(finally_s),
                    ..
                },
            ) => {
                let saved = std::mem::take(&mut vm.control);
                trace!(?saved, "running finally");

                vm.env.truncate(base);
                set_top_kind(
                    vm,
                    FrameKind::Try {
                        phase: TryPhase::Finally,
                        saved,
                    },
                );
                push_stmt(vm, &finally_s);
                return Step::Continue;
            }

            _ => pop_frame(vm),
        }
    }
}
