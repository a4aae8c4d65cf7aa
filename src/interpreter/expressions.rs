//! Expression evaluation
//!
//! Pure expressions evaluate directly to a value. Effectful expressions
//! (`Call`, `CallSync`, `Await`) become a [`Yielded`] for the engine and are
//! only legal as the whole value of a statement.
//!
//! Errors are returned as `Err(Val)` and become `Control::Throw` in the
//! statement that evaluated them, so scripts can catch them.

use super::env::Env;
use super::types::{BinOp, Expr};
use crate::errors::{self, ErrorInfo};
use crate::proc::effect::{call, call_sync, call_sync_with_receiver, call_with_receiver, CallMode};
use crate::proc::{Effect, Val, Yielded};
use std::collections::HashMap;

/// Evaluate a pure expression
pub fn eval_expr(expr: &Expr, env: &Env) -> Result<Val, Val> {
    match expr {
        Expr::LitNull => Ok(Val::Null),

        Expr::LitBool { v } => Ok(Val::Bool(*v)),

        Expr::LitNum { v } => Ok(Val::Num(*v)),

        Expr::LitStr { v } => Ok(Val::Str(v.clone())),

        Expr::Ident { name } => env.lookup(name).cloned(),

        Expr::Member { object, property } => {
            let object = eval_expr(object, env)?;
            member(&object, property)
        }

        Expr::List { items } => items
            .iter()
            .map(|item| eval_expr(item, env))
            .collect::<Result<Vec<_>, _>>()
            .map(Val::List),

        Expr::Obj { fields } => {
            let mut map = HashMap::with_capacity(fields.len());
            for (key, value) in fields {
                map.insert(key.clone(), eval_expr(value, env)?);
            }
            Ok(Val::Obj(map))
        }

        Expr::Not { inner } => Ok(Val::Bool(!eval_expr(inner, env)?.is_truthy())),

        Expr::Binary { op, left, right } => eval_binary(*op, left, right, env),

        Expr::Call { .. } | Expr::CallSync { .. } | Expr::Await { .. } => Err(Val::Error(
            ErrorInfo::new(
                errors::TYPE_ERROR,
                "Calls and awaits can only be used as a whole statement value",
            ),
        )),
    }
}

/// Turn an effectful expression into what the VM yields
pub fn eval_yield(expr: &Expr, env: &Env) -> Result<Yielded, Val> {
    match expr {
        Expr::Call { callee, args } => build_effect(callee, args, CallMode::Async, env),
        Expr::CallSync { callee, args } => build_effect(callee, args, CallMode::Sync, env),
        Expr::Await { inner } => Ok(Yielded::from_val(eval_expr(inner, env)?)),
        other => eval_expr(other, env).map(Yielded::Other),
    }
}

fn build_effect(
    callee: &Expr,
    args: &[Expr],
    mode: CallMode,
    env: &Env,
) -> Result<Yielded, Val> {
    let effect: Effect = match callee {
        // obj.method(...) passes obj as the receiver
        Expr::Member { object, property } => {
            let receiver = eval_expr(object, env)?;
            let target = match member(&receiver, property)? {
                Val::Func(target) => target,
                other => return Err(not_callable(property, &other)),
            };
            let args = eval_args(args, env)?;
            match mode {
                CallMode::Async => call_with_receiver(receiver, target, args),
                CallMode::Sync => call_sync_with_receiver(receiver, target, args),
            }
        }
        _ => {
            let target = match eval_expr(callee, env)? {
                Val::Func(target) => target,
                other => return Err(not_callable(&describe_callee(callee), &other)),
            };
            let args = eval_args(args, env)?;
            match mode {
                CallMode::Async => call(target, args),
                CallMode::Sync => call_sync(target, args),
            }
        }
    };

    Ok(Yielded::Effect(effect))
}

fn eval_args(args: &[Expr], env: &Env) -> Result<Vec<Val>, Val> {
    args.iter().map(|arg| eval_expr(arg, env)).collect()
}

/// Property of an object, or `code`/`message` of an error value
fn member(object: &Val, property: &str) -> Result<Val, Val> {
    match object {
        Val::Obj(map) => map.get(property).cloned().ok_or_else(|| {
            Val::Error(ErrorInfo::new(
                errors::PROPERTY_NOT_FOUND,
                format!("Property '{}' not found", property),
            ))
        }),
        Val::Error(info) if property == "code" => Ok(Val::Str(info.code.clone())),
        Val::Error(info) if property == "message" => Ok(Val::Str(info.message.clone())),
        _ => Err(Val::Error(ErrorInfo::new(
            errors::TYPE_ERROR,
            format!(
                "Cannot access property '{}' on non-object value ({})",
                property,
                object.type_name()
            ),
        ))),
    }
}

fn not_callable(name: &str, value: &Val) -> Val {
    Val::Error(ErrorInfo::new(
        errors::NOT_CALLABLE,
        format!("'{}' is a {}, not a function", name, value.type_name()),
    ))
}

fn describe_callee(callee: &Expr) -> String {
    match callee {
        Expr::Ident { name } => name.clone(),
        _ => "expression".to_string(),
    }
}

/* ===================== Operators ===================== */

fn eval_binary(op: BinOp, left: &Expr, right: &Expr, env: &Env) -> Result<Val, Val> {
    let left = eval_expr(left, env)?;

    // Short-circuit: the right side is only evaluated when it decides the result
    match op {
        BinOp::And if !left.is_truthy() => return Ok(left),
        BinOp::Or if left.is_truthy() => return Ok(left),
        BinOp::And | BinOp::Or => return eval_expr(right, env),
        _ => {}
    }

    let right = eval_expr(right, env)?;
    match (op, &left, &right) {
        (BinOp::Eq, _, _) => Ok(Val::Bool(left == right)),
        (BinOp::Ne, _, _) => Ok(Val::Bool(left != right)),

        (BinOp::Add, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a + b)),
        (BinOp::Add, Val::Str(a), Val::Str(b)) => Ok(Val::Str(format!("{a}{b}"))),
        (BinOp::Sub, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a - b)),
        (BinOp::Mul, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a * b)),
        (BinOp::Div, Val::Num(a), Val::Num(b)) => Ok(Val::Num(a / b)),

        (BinOp::Lt, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a < b)),
        (BinOp::Le, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a <= b)),
        (BinOp::Gt, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a > b)),
        (BinOp::Ge, Val::Num(a), Val::Num(b)) => Ok(Val::Bool(a >= b)),
        (BinOp::Lt, Val::Str(a), Val::Str(b)) => Ok(Val::Bool(a < b)),
        (BinOp::Le, Val::Str(a), Val::Str(b)) => Ok(Val::Bool(a <= b)),
        (BinOp::Gt, Val::Str(a), Val::Str(b)) => Ok(Val::Bool(a > b)),
        (BinOp::Ge, Val::Str(a), Val::Str(b)) => Ok(Val::Bool(a >= b)),

        _ => Err(Val::Error(ErrorInfo::new(
            errors::TYPE_ERROR,
            format!(
                "Operator {:?} is not supported for {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ),
        ))),
    }
}
