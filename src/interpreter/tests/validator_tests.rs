//! Tests for static script checks

use crate::interpreter::{validate, Script, ScriptError, Stmt, ValidationError};

fn parse(source: &str) -> Stmt {
    serde_json::from_str(source).unwrap()
}

#[test]
fn test_valid_program_passes() {
    let program = parse(
        r#"{
        "t": "Block",
        "body": [
            {"t": "Let", "name": "a", "init": {"t": "Call", "callee": {"t": "Ident", "name": "add"}, "args": [{"t": "LitNum", "v": 1}, {"t": "LitNum", "v": 2}]}},
            {"t": "While", "test": {"t": "LitBool", "v": true}, "body": {"t": "Break"}},
            {"t": "Return", "value": {"t": "Await", "inner": {"t": "Ident", "name": "a"}}}
        ]
    }"#,
    );

    assert_eq!(validate(&program), Ok(()));
}

#[test]
fn test_nested_call_is_rejected() {
    let program = parse(
        r#"{
        "t": "Return",
        "value": {"t": "Binary", "op": "Add",
            "left": {"t": "Call", "callee": {"t": "Ident", "name": "f"}, "args": []},
            "right": {"t": "LitNum", "v": 1}
        }
    }"#,
    );

    assert_eq!(
        validate(&program),
        Err(vec![ValidationError::EffectOutsideStatement {
            kind: "Call",
            context: "Return".to_string(),
        }])
    );
}

#[test]
fn test_effect_in_argument_and_condition_is_rejected() {
    let program = parse(
        r#"{
        "t": "Block",
        "body": [
            {"t": "Expr", "expr": {"t": "Call", "callee": {"t": "Ident", "name": "f"}, "args": [
                {"t": "Await", "inner": {"t": "Ident", "name": "x"}}
            ]}},
            {"t": "If", "test": {"t": "CallSync", "callee": {"t": "Ident", "name": "g"}, "args": []},
             "then_s": {"t": "Block", "body": []}}
        ]
    }"#,
    );

    assert_eq!(
        validate(&program),
        Err(vec![
            ValidationError::EffectOutsideStatement {
                kind: "Await",
                context: "Expr".to_string(),
            },
            ValidationError::EffectOutsideStatement {
                kind: "CallSync",
                context: "If test".to_string(),
            },
        ])
    );
}

#[test]
fn test_break_and_continue_need_a_loop() {
    let program = parse(
        r#"{
        "t": "Block",
        "body": [
            {"t": "Break"},
            {"t": "If", "test": {"t": "LitBool", "v": true}, "then_s": {"t": "Continue"}}
        ]
    }"#,
    );

    assert_eq!(
        validate(&program),
        Err(vec![
            ValidationError::BreakOutsideLoop,
            ValidationError::ContinueOutsideLoop,
        ])
    );
}

#[test]
fn test_try_needs_catch_or_finally() {
    let program = parse(r#"{"t": "Try", "body": {"t": "Block", "body": []}}"#);

    assert_eq!(
        validate(&program),
        Err(vec![ValidationError::TryWithoutHandler])
    );
}

#[test]
fn test_script_validate_wraps_errors() {
    let script = Script::from_json(
        r#"{"params": [], "body": {"t": "Block", "body": [{"t": "Break"}]}}"#,
    )
    .unwrap();

    let Err(ScriptError::Invalid(errors)) = script.validate() else {
        unreachable!("Expected invalid script");
    };
    assert_eq!(errors, vec![ValidationError::BreakOutsideLoop]);
}

#[test]
fn test_script_parse_error() {
    let result = Script::from_json(r#"{"params": [], "body": {"t": "Nope"}}"#);

    assert!(matches!(result, Err(ScriptError::Parse(_))));
}
