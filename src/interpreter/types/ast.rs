//! Abstract Syntax Tree node types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statement AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Stmt {
    Block {
        body: Vec<Stmt>,
    },
    Let {
        name: String,
        #[serde(default)]
        init: Option<Expr>,
    },
    Assign {
        name: String,
        expr: Expr,
    },
    Expr {
        expr: Expr,
    },
    If {
        test: Expr,
        then_s: Box<Stmt>,
        #[serde(default)]
        else_s: Option<Box<Stmt>>,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return {
        #[serde(default)]
        value: Option<Expr>,
    },
    Throw {
        value: Expr,
    },
    Try {
        body: Box<Stmt>,
        #[serde(default)]
        catch_var: Option<String>,
        #[serde(default)]
        catch_s: Option<Box<Stmt>>,
        #[serde(default)]
        finally_s: Option<Box<Stmt>>,
    },
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Expr {
    LitNull,
    LitBool { v: bool },
    LitNum { v: f64 },
    LitStr { v: String },
    Ident { name: String },
    Member { object: Box<Expr>, property: String },
    List { items: Vec<Expr> },
    Obj { fields: BTreeMap<String, Expr> },
    Not { inner: Box<Expr> },
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    /// Call performed by the engine; a returned future is awaited
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Call performed by the engine; a returned future is handed back as is
    CallSync { callee: Box<Expr>, args: Vec<Expr> },
    /// Suspend until the operand future settles
    Await { inner: Box<Expr> },
}

impl Expr {
    /// Whether evaluating this expression yields to the engine
    pub fn is_effectful(&self) -> bool {
        matches!(
            self,
            Expr::Call { .. } | Expr::CallSync { .. } | Expr::Await { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}
