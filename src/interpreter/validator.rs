//! Static checks on script ASTs
//!
//! Run before a script is instantiated so placement mistakes surface as one
//! list of errors instead of a runtime failure halfway through a procedure.

use super::types::{Expr, Stmt};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} is only allowed as the whole value of an Expr, Let, Assign or Return statement ({context})")]
    EffectOutsideStatement { kind: &'static str, context: String },

    #[error("Break is only allowed inside a loop")]
    BreakOutsideLoop,

    #[error("Continue is only allowed inside a loop")]
    ContinueOutsideLoop,

    #[error("Try needs a catch block or a finally block")]
    TryWithoutHandler,
}

/// Check a statement tree, collecting every error found
pub fn validate(stmt: &Stmt) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_stmt(stmt, 0, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_stmt(stmt: &Stmt, loop_depth: usize, errors: &mut Vec<ValidationError>) {
    match stmt {
        Stmt::Block { body } => {
            for child in body {
                check_stmt(child, loop_depth, errors);
            }
        }

        Stmt::Let { init, .. } => {
            if let Some(init) = init {
                check_statement_value(init, "Let", errors);
            }
        }

        Stmt::Assign { expr, .. } => check_statement_value(expr, "Assign", errors),

        Stmt::Expr { expr } => check_statement_value(expr, "Expr", errors),

        Stmt::Return { value } => {
            if let Some(value) = value {
                check_statement_value(value, "Return", errors);
            }
        }

        Stmt::Throw { value } => check_pure(value, "Throw value", errors),

        Stmt::If {
            test,
            then_s,
            else_s,
        } => {
            check_pure(test, "If test", errors);
            check_stmt(then_s, loop_depth, errors);
            if let Some(else_s) = else_s {
                check_stmt(else_s, loop_depth, errors);
            }
        }

        Stmt::While { test, body } => {
            check_pure(test, "While test", errors);
            check_stmt(body, loop_depth + 1, errors);
        }

        Stmt::Break => {
            if loop_depth == 0 {
                errors.push(ValidationError::BreakOutsideLoop);
            }
        }

        Stmt::Continue => {
            if loop_depth == 0 {
                errors.push(ValidationError::ContinueOutsideLoop);
            }
        }

        Stmt::Try {
            body,
            catch_s,
            finally_s,
            ..
        } => {
            if catch_s.is_none() && finally_s.is_none() {
                errors.push(ValidationError::TryWithoutHandler);
            }
            check_stmt(body, loop_depth, errors);
            if let Some(catch_s) = catch_s {
                check_stmt(catch_s, loop_depth, errors);
            }
            if let Some(finally_s) = finally_s {
                check_stmt(finally_s, loop_depth, errors);
            }
        }
    }
}

/// The top of a statement value may be effectful; its operands may not
fn check_statement_value(expr: &Expr, context: &str, errors: &mut Vec<ValidationError>) {
    match expr {
        Expr::Call { callee, args } | Expr::CallSync { callee, args } => {
            check_pure(callee, context, errors);
            for arg in args {
                check_pure(arg, context, errors);
            }
        }
        Expr::Await { inner } => check_pure(inner, context, errors),
        other => check_pure(other, context, errors),
    }
}

fn check_pure(expr: &Expr, context: &str, errors: &mut Vec<ValidationError>) {
    let kind = match expr {
        Expr::Call { .. } => Some("Call"),
        Expr::CallSync { .. } => Some("CallSync"),
        Expr::Await { .. } => Some("Await"),
        _ => None,
    };
    if let Some(kind) = kind {
        errors.push(ValidationError::EffectOutsideStatement {
            kind,
            context: context.to_string(),
        });
    }

    match expr {
        Expr::LitNull
        | Expr::LitBool { .. }
        | Expr::LitNum { .. }
        | Expr::LitStr { .. }
        | Expr::Ident { .. } => {}
        Expr::Member { object, .. } => check_pure(object, context, errors),
        Expr::List { items } => {
            for item in items {
                check_pure(item, context, errors);
            }
        }
        Expr::Obj { fields } => {
            for value in fields.values() {
                check_pure(value, context, errors);
            }
        }
        Expr::Not { inner } | Expr::Await { inner } => check_pure(inner, context, errors),
        Expr::Binary { left, right, .. } => {
            check_pure(left, context, errors);
            check_pure(right, context, errors);
        }
        Expr::Call { callee, args } | Expr::CallSync { callee, args } => {
            check_pure(callee, context, errors);
            for arg in args {
                check_pure(arg, context, errors);
            }
        }
    }
}
