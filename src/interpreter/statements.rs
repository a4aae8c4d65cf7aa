//! Statement execution handlers
//!
//! Each statement type has its own handler function that processes
//! the statement based on its current execution phase.

use super::expressions::{eval_expr, eval_yield};
use super::types::{
    BlockPhase, Control, EvalPhase, Expr, FrameKind, IfPhase, Stmt, TryPhase, WhilePhase,
};
use super::vm::{pop_frame, push_stmt, set_top_kind, Step, VM};
use crate::proc::Val;

/* ===================== Statement Values ===================== */

/// Value of a statement's expression
///
/// An effectful expression is yielded to the engine on the `Eval` phase and
/// its result is picked up on the `Resume` phase. `Err` carries the step to
/// return when no value is available yet (a yield or a throw).
fn statement_value(
    vm: &mut VM,
    phase: EvalPhase,
    expr: &Expr,
    resumed: FrameKind,
) -> Result<Val, Step> {
    match phase {
        EvalPhase::Resume => Ok(vm.resume_value.take().unwrap_or(Val::Null)),

        EvalPhase::Eval if expr.is_effectful() => match eval_yield(expr, &vm.env) {
            Ok(yielded) => {
                // Keep the frame; it continues in Resume phase
                set_top_kind(vm, resumed);
                Err(Step::Yield(yielded))
            }
            Err(error) => {
                vm.control = Control::Throw(error);
                Err(Step::Continue)
            }
        },

        EvalPhase::Eval => eval_expr(expr, &vm.env).map_err(|error| {
            vm.control = Control::Throw(error);
            Step::Continue
        }),
    }
}

/// Throw `error` from the current statement
fn throw(vm: &mut VM, error: Val) -> Step {
    vm.control = Control::Throw(error);
    Step::Continue
}

/* ===================== Statement Handlers ===================== */

/// Execute Block statement
pub fn execute_block(vm: &mut VM, phase: BlockPhase, idx: usize, body: &[Stmt]) -> Step {
    match phase {
        BlockPhase::Enter => {
            vm.env.push_scope();
            set_top_kind(
                vm,
                FrameKind::Block {
                    phase: BlockPhase::Execute,
                    idx: 0,
                },
            );
            Step::Continue
        }

        BlockPhase::Execute => {
            let Some(child_stmt) = body.get(idx) else {
                // Block complete; popping drops its scope
                pop_frame(vm);
                return Step::Continue;
            };

            set_top_kind(
                vm,
                FrameKind::Block {
                    phase: BlockPhase::Execute,
                    idx: idx + 1,
                },
            );
            push_stmt(vm, child_stmt);

            Step::Continue
        }
    }
}

/// Execute Let statement
pub fn execute_let(vm: &mut VM, phase: EvalPhase, name: &str, init: Option<&Expr>) -> Step {
    let value = match init {
        Some(expr) => {
            let resumed = FrameKind::Let {
                phase: EvalPhase::Resume,
            };
            match statement_value(vm, phase, expr, resumed) {
                Ok(value) => value,
                Err(step) => return step,
            }
        }
        None => Val::Null,
    };

    vm.env.declare(name, value);
    vm.frames.pop();
    Step::Continue
}

/// Execute Assign statement
pub fn execute_assign(vm: &mut VM, phase: EvalPhase, name: &str, expr: &Expr) -> Step {
    let resumed = FrameKind::Assign {
        phase: EvalPhase::Resume,
    };
    let value = match statement_value(vm, phase, expr, resumed) {
        Ok(value) => value,
        Err(step) => return step,
    };

    if let Err(error) = vm.env.assign(name, value) {
        return throw(vm, error);
    }

    vm.frames.pop();
    Step::Continue
}

/// Execute Expr statement; the value is discarded
pub fn execute_expr(vm: &mut VM, phase: EvalPhase, expr: &Expr) -> Step {
    let resumed = FrameKind::Expr {
        phase: EvalPhase::Resume,
    };
    if let Err(step) = statement_value(vm, phase, expr, resumed) {
        return step;
    }

    vm.frames.pop();
    Step::Continue
}

/// Execute Return statement
pub fn execute_return(vm: &mut VM, phase: EvalPhase, value: Option<&Expr>) -> Step {
    let value = match value {
        Some(expr) => {
            let resumed = FrameKind::Return {
                phase: EvalPhase::Resume,
            };
            match statement_value(vm, phase, expr, resumed) {
                Ok(value) => value,
                Err(step) => return step,
            }
        }
        None => Val::Null,
    };

    vm.control = Control::Return(value);
    pop_frame(vm);
    Step::Continue
}

/// Execute Throw statement
pub fn execute_throw(vm: &mut VM, value: &Expr) -> Step {
    let error = eval_expr(value, &vm.env).unwrap_or_else(|error| error);
    pop_frame(vm);
    throw(vm, error)
}

/// Execute If statement
pub fn execute_if(
    vm: &mut VM,
    phase: IfPhase,
    test: &Expr,
    then_s: &Stmt,
    else_s: Option<&Stmt>,
) -> Step {
    match phase {
        IfPhase::Eval => {
            let test = match eval_expr(test, &vm.env) {
                Ok(test) => test,
                Err(error) => return throw(vm, error),
            };

            let branch = if test.is_truthy() { Some(then_s) } else { else_s };
            match branch {
                Some(branch) => {
                    set_top_kind(
                        vm,
                        FrameKind::If {
                            phase: IfPhase::Done,
                        },
                    );
                    push_stmt(vm, branch);
                }
                None => pop_frame(vm),
            }
            Step::Continue
        }

        IfPhase::Done => {
            pop_frame(vm);
            Step::Continue
        }
    }
}

/// Execute While statement
pub fn execute_while(vm: &mut VM, phase: WhilePhase, test: &Expr, body: &Stmt) -> Step {
    match phase {
        WhilePhase::Check => {
            let test = match eval_expr(test, &vm.env) {
                Ok(test) => test,
                Err(error) => return throw(vm, error),
            };

            if test.is_truthy() {
                set_top_kind(
                    vm,
                    FrameKind::While {
                        phase: WhilePhase::Body,
                    },
                );
                push_stmt(vm, body);
            } else {
                pop_frame(vm);
            }
            Step::Continue
        }

        WhilePhase::Body => {
            set_top_kind(
                vm,
                FrameKind::While {
                    phase: WhilePhase::Check,
                },
            );
            Step::Continue
        }
    }
}

/// Execute Break statement
pub fn execute_break(vm: &mut VM) -> Step {
    vm.control = Control::Break;
    pop_frame(vm);
    Step::Continue
}

/// Execute Continue statement
pub fn execute_continue(vm: &mut VM) -> Step {
    vm.control = Control::Continue;
    pop_frame(vm);
    Step::Continue
}

/// Execute Try statement
///
/// Only normal completion of a child reaches this handler. Errors and other
/// control flow are routed to catch and finally blocks by the unwinder.
pub fn execute_try(
    vm: &mut VM,
    phase: TryPhase,
    saved: Control,
    body: &Stmt,
    finally_s: Option<&Stmt>,
) -> Step {
    match phase {
        TryPhase::Enter => {
            set_top_kind(
                vm,
                FrameKind::Try {
                    phase: TryPhase::Body,
                    saved: Control::None,
                },
            );
            push_stmt(vm, body);
            Step::Continue
        }

        TryPhase::Body | TryPhase::Catch => {
            match finally_s {
                Some(finally_s) => {
                    if let Some(frame) = vm.frames.last() {
                        let base = frame.scope_base_sp;
                        vm.env.truncate(base);
                    }
                    set_top_kind(
                        vm,
                        FrameKind::Try {
                            phase: TryPhase::Finally,
                            saved: Control::None,
                        },
                    );
                    push_stmt(vm, finally_s);
                }
                None => pop_frame(vm),
            }
            Step::Continue
        }

        TryPhase::Finally => {
            // Resume whatever the finally block interrupted
            vm.control = saved;
            pop_frame(vm);
            Step::Continue
        }
    }
}
