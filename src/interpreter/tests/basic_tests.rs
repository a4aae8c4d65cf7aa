//! Tests for pure statements and expressions
//!
//! Variables, scopes, operators, conditionals and loops

use super::helpers::run_program;
use crate::errors;
use crate::proc::{ProcError, Val};
use maplit::hashmap;

#[test]
fn test_return_literal() {
    let program = r#"{
        "t": "Block",
        "body": [{
            "t": "Return",
            "value": {"t": "LitNum", "v": 42}
        }]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Num(42.0)));
}

#[test]
fn test_let_and_assign() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "x", "init": {"t": "LitNum", "v": 1}},
            {"t": "Assign", "name": "x", "expr": {
                "t": "Binary", "op": "Add",
                "left": {"t": "Ident", "name": "x"},
                "right": {"t": "LitNum", "v": 2}
            }},
            {"t": "Return", "value": {"t": "Ident", "name": "x"}}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Num(3.0)));
}

#[test]
fn test_let_without_init_is_null() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "x"},
            {"t": "Return", "value": {"t": "Ident", "name": "x"}}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Null));
}

#[test]
fn test_inner_block_shadows_then_restores() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "x", "init": {"t": "LitNum", "v": 1}},
            {"t": "Block", "body": [
                {"t": "Let", "name": "x", "init": {"t": "LitNum", "v": 2}},
                {"t": "Let", "name": "y", "init": {"t": "LitNum", "v": 3}}
            ]},
            {"t": "Return", "value": {"t": "Ident", "name": "x"}}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Num(1.0)));
}

#[test]
fn test_inner_block_variable_is_gone_after_block() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Block", "body": [
                {"t": "Let", "name": "y", "init": {"t": "LitNum", "v": 3}}
            ]},
            {"t": "Return", "value": {"t": "Ident", "name": "y"}}
        ]
    }"#;

    let Err(ProcError::Unhandled(Val::Error(err))) = run_program(program) else {
        unreachable!("Expected undefined variable error");
    };
    assert_eq!(err.code, errors::UNDEFINED_VARIABLE);
}

#[test]
fn test_assign_updates_outer_scope() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "x", "init": {"t": "LitNum", "v": 1}},
            {"t": "Block", "body": [
                {"t": "Assign", "name": "x", "expr": {"t": "LitNum", "v": 5}}
            ]},
            {"t": "Return", "value": {"t": "Ident", "name": "x"}}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Num(5.0)));
}

#[test]
fn test_if_else() {
    let program = |n: i32| {
        format!(
            r#"{{
            "t": "Block",
            "body": [{{
                "t": "If",
                "test": {{
                    "t": "Binary", "op": "Gt",
                    "left": {{"t": "LitNum", "v": {n}}},
                    "right": {{"t": "LitNum", "v": 3}}
                }},
                "then_s": {{"t": "Return", "value": {{"t": "LitStr", "v": "big"}}}},
                "else_s": {{"t": "Return", "value": {{"t": "LitStr", "v": "small"}}}}
            }}]
        }}"#
        )
    };

    assert_eq!(run_program(&program(5)), Ok(Val::from("big")));
    assert_eq!(run_program(&program(1)), Ok(Val::from("small")));
}

#[test]
fn test_while_with_break_and_continue() {
    // let i = 0; let sum = 0;
    // while (true) { i = i + 1; if (i > 5) break; if (i == 3) continue; sum = sum + i }
    // return sum
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "i", "init": {"t": "LitNum", "v": 0}},
            {"t": "Let", "name": "sum", "init": {"t": "LitNum", "v": 0}},
            {"t": "While", "test": {"t": "LitBool", "v": true}, "body": {"t": "Block", "body": [
                {"t": "Assign", "name": "i", "expr": {
                    "t": "Binary", "op": "Add",
                    "left": {"t": "Ident", "name": "i"}, "right": {"t": "LitNum", "v": 1}
                }},
                {"t": "If", "test": {
                    "t": "Binary", "op": "Gt",
                    "left": {"t": "Ident", "name": "i"}, "right": {"t": "LitNum", "v": 5}
                }, "then_s": {"t": "Break"}},
                {"t": "If", "test": {
                    "t": "Binary", "op": "Eq",
                    "left": {"t": "Ident", "name": "i"}, "right": {"t": "LitNum", "v": 3}
                }, "then_s": {"t": "Continue"}},
                {"t": "Assign", "name": "sum", "expr": {
                    "t": "Binary", "op": "Add",
                    "left": {"t": "Ident", "name": "sum"}, "right": {"t": "Ident", "name": "i"}
                }}
            ]}},
            {"t": "Return", "value": {"t": "Ident", "name": "sum"}}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Num(12.0)));
}

#[test]
fn test_falling_off_the_end_returns_null() {
    let program = r#"{
        "t": "Block",
        "body": [{"t": "Let", "name": "x", "init": {"t": "LitNum", "v": 1}}]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Null));
}

#[test]
fn test_list_and_object_literals() {
    let program = r#"{
        "t": "Block",
        "body": [{
            "t": "Return",
            "value": {"t": "Obj", "fields": {
                "items": {"t": "List", "items": [{"t": "LitNum", "v": 1}, {"t": "LitNull"}]},
                "ok": {"t": "Not", "inner": {"t": "LitBool", "v": false}}
            }}
        }]
    }"#;

    assert_eq!(
        run_program(program),
        Ok(Val::Obj(hashmap! {
            "items".to_string() => Val::List(vec![Val::Num(1.0), Val::Null]),
            "ok".to_string() => Val::Bool(true),
        }))
    );
}

#[test]
fn test_member_access() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "o", "init": {"t": "Obj", "fields": {
                "inner": {"t": "Obj", "fields": {"v": {"t": "LitStr", "v": "deep"}}}
            }}},
            {"t": "Return", "value": {
                "t": "Member",
                "object": {"t": "Member", "object": {"t": "Ident", "name": "o"}, "property": "inner"},
                "property": "v"
            }}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::from("deep")));
}

#[test]
fn test_logical_operators_short_circuit() {
    // false && missing never looks up `missing`
    let program = r#"{
        "t": "Block",
        "body": [{
            "t": "Return",
            "value": {
                "t": "Binary", "op": "Or",
                "left": {
                    "t": "Binary", "op": "And",
                    "left": {"t": "LitBool", "v": false},
                    "right": {"t": "Ident", "name": "missing"}
                },
                "right": {"t": "LitStr", "v": "fallback"}
            }
        }]
    }"#;

    assert_eq!(run_program(program), Ok(Val::from("fallback")));
}

#[test]
fn test_string_concatenation_and_comparison() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "s", "init": {
                "t": "Binary", "op": "Add",
                "left": {"t": "LitStr", "v": "ab"}, "right": {"t": "LitStr", "v": "c"}
            }},
            {"t": "Return", "value": {
                "t": "Binary", "op": "Lt",
                "left": {"t": "Ident", "name": "s"}, "right": {"t": "LitStr", "v": "abd"}
            }}
        ]
    }"#;

    assert_eq!(run_program(program), Ok(Val::Bool(true)));
}

/* ===================== Errors ===================== */

#[test]
fn test_property_not_found_throws() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "obj", "init": {"t": "Obj", "fields": {}}},
            {"t": "Return", "value": {
                "t": "Member", "object": {"t": "Ident", "name": "obj"}, "property": "missing"
            }}
        ]
    }"#;

    let Err(ProcError::Unhandled(Val::Error(err))) = run_program(program) else {
        unreachable!("Expected property error");
    };
    assert_eq!(err.code, errors::PROPERTY_NOT_FOUND);
    assert!(err.message.contains("Property 'missing' not found"));
}

#[test]
fn test_member_access_on_non_object_throws() {
    let program = r#"{
        "t": "Block",
        "body": [{"t": "Return", "value": {
            "t": "Member", "object": {"t": "LitNum", "v": 42}, "property": "foo"
        }}]
    }"#;

    let Err(ProcError::Unhandled(Val::Error(err))) = run_program(program) else {
        unreachable!("Expected type error");
    };
    assert_eq!(err.code, errors::TYPE_ERROR);
    assert!(err.message.contains("Cannot access property 'foo' on non-object value"));
}

#[test]
fn test_mismatched_operands_throw() {
    let program = r#"{
        "t": "Block",
        "body": [{"t": "Return", "value": {
            "t": "Binary", "op": "Sub",
            "left": {"t": "LitNum", "v": 1}, "right": {"t": "LitStr", "v": "a"}
        }}]
    }"#;

    let Err(ProcError::Unhandled(Val::Error(err))) = run_program(program) else {
        unreachable!("Expected type error");
    };
    assert_eq!(err.code, errors::TYPE_ERROR);
}

#[test]
fn test_assign_to_undeclared_throws() {
    let program = r#"{
        "t": "Block",
        "body": [{"t": "Assign", "name": "nope", "expr": {"t": "LitNum", "v": 1}}]
    }"#;

    let Err(ProcError::Unhandled(Val::Error(err))) = run_program(program) else {
        unreachable!("Expected undefined variable error");
    };
    assert_eq!(err.code, errors::UNDEFINED_VARIABLE);
}

#[test]
fn test_throw_statement_escapes_with_value() {
    let program = r#"{
        "t": "Block",
        "body": [
            {"t": "Throw", "value": {"t": "LitStr", "v": "custom"}},
            {"t": "Return", "value": {"t": "LitNum", "v": 1}}
        ]
    }"#;

    assert_eq!(
        run_program(program),
        Err(ProcError::Unhandled(Val::from("custom")))
    );
}
