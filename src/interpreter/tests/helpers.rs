//! Test helpers for interpreter tests
//!
//! Common utilities for parsing programs and building VMs

use crate::interpreter::{Registry, Stmt, VM};
use crate::proc::{run_sync, Callable, ProcError, Val};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub type Log = Arc<Mutex<Vec<String>>>;

/// Parse a program, round-trip it through JSON and build a VM with the
/// stdlib plus `globals`
pub fn build_vm(source: &str, globals: HashMap<String, Val>) -> VM {
    let program: Stmt = serde_json::from_str(source).expect("Parse program failed");
    crate::interpreter::validate(&program).expect("Program validation failed");
    let json = serde_json::to_string(&program).expect("Program serialization failed");
    let program: Stmt = serde_json::from_str(&json).expect("Program deserialization failed");

    let mut env = Registry::with_stdlib().globals();
    env.extend(globals);
    VM::new(program, env)
}

/// Run a program that never waits
pub fn run_program(source: &str) -> Result<Val, ProcError> {
    run_sync(build_vm(source, HashMap::new()))
}

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

/// `record(x)` appends the display form of `x` to the log
pub fn recorder(log: &Log) -> Val {
    let log = log.clone();
    Val::Func(Callable::new("record", move |_receiver, args| {
        let line: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        log.lock().push(line.join(" "));
        Ok(Val::Null)
    }))
}

/// Globals with `record` bound to a fresh log
pub fn recording_globals() -> (HashMap<String, Val>, Log) {
    let log = new_log();
    let globals = HashMap::from([("record".to_string(), recorder(&log))]);
    (globals, log)
}
