//! Test helpers for proc engine tests
//!
//! `TestProc` is a hand-written procedure shaped like
//! `try { body } finally { cleanup }`: it yields the body items in order,
//! then the cleanup items, and records every resume it receives.

use crate::errors;
use crate::proc::{Callable, Procedure, Resumed, Val, Yielded};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

/* ===================== Callables ===================== */

/// Records `name(args)` in `log` and returns null
pub fn recorder(name: &str, log: &Log) -> Callable {
    let log = log.clone();
    let label = name.to_string();
    Callable::new(name, move |_receiver, args| {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        log.lock().push(format!("{}({})", label, args.join(", ")));
        Ok(Val::Null)
    })
}

pub fn adder() -> Callable {
    Callable::with_arity("add", 2, |_receiver, args| match args {
        [Val::Num(a), Val::Num(b)] => Ok(Val::Num(a + b)),
        _ => Err(Val::error(errors::WRONG_ARG_TYPE, "add expects numbers")),
    })
}

/// Always returns a clone of `value`
pub fn returning(name: &str, value: Val) -> Callable {
    Callable::new(name, move |_receiver, _args| Ok(value.clone()))
}

pub fn failing(name: &str, message: &str) -> Callable {
    let message = message.to_string();
    Callable::new(name, move |_receiver, _args| {
        Err(Val::error(errors::ERROR, message.clone()))
    })
}

/* ===================== Test Procedure ===================== */

enum Exit {
    Normal(Val),
    Throw(Val),
    Return(Val),
}

enum Stage {
    Body,
    Cleanup(Exit),
    Finished,
}

pub struct TestProc {
    body: VecDeque<Yielded>,
    cleanup: VecDeque<Yielded>,
    stage: Stage,
    last: Val,
    seen: Log,
}

impl TestProc {
    pub fn new(body: Vec<Yielded>) -> Self {
        Self {
            body: body.into(),
            cleanup: VecDeque::new(),
            stage: Stage::Body,
            last: Val::Null,
            seen: new_log(),
        }
    }

    pub fn with_cleanup(mut self, cleanup: Vec<Yielded>) -> Self {
        self.cleanup = cleanup.into();
        self
    }

    /// Shared record of resumes: `normal:v`, `error:e`, `unwind:v`
    pub fn seen(&self) -> Log {
        self.seen.clone()
    }

    fn record(&self, entry: String) {
        self.seen.lock().push(entry);
    }

    fn enter_cleanup(&mut self, exit: Exit) -> Result<Resumed, Val> {
        self.stage = Stage::Cleanup(exit);
        self.advance_cleanup()
    }

    fn advance_cleanup(&mut self) -> Result<Resumed, Val> {
        match self.cleanup.pop_front() {
            Some(yielded) => Ok(Resumed::Yield(yielded)),
            None => match std::mem::replace(&mut self.stage, Stage::Finished) {
                Stage::Cleanup(exit) => self.finish(exit),
                _ => Ok(Resumed::Complete(Val::Null)),
            },
        }
    }

    fn finish(&mut self, exit: Exit) -> Result<Resumed, Val> {
        self.stage = Stage::Finished;
        match exit {
            Exit::Normal(value) | Exit::Return(value) => Ok(Resumed::Complete(value)),
            Exit::Throw(error) => Err(error),
        }
    }
}

impl Procedure for TestProc {
    fn resume_normal(&mut self, value: Val) -> Result<Resumed, Val> {
        self.record(format!("normal:{}", value));
        match self.stage {
            Stage::Body => {
                self.last = value;
                match self.body.pop_front() {
                    Some(yielded) => Ok(Resumed::Yield(yielded)),
                    None => {
                        let last = std::mem::replace(&mut self.last, Val::Null);
                        self.enter_cleanup(Exit::Normal(last))
                    }
                }
            }
            Stage::Cleanup(_) => self.advance_cleanup(),
            Stage::Finished => Ok(Resumed::Complete(Val::Null)),
        }
    }

    fn resume_error(&mut self, error: Val) -> Result<Resumed, Val> {
        self.record(format!("error:{}", error));
        match self.stage {
            Stage::Body => self.enter_cleanup(Exit::Throw(error)),
            // An error in cleanup replaces the pending exit
            Stage::Cleanup(_) => self.finish(Exit::Throw(error)),
            Stage::Finished => Err(error),
        }
    }

    fn resume_force_unwind(&mut self, value: Val) -> Result<Resumed, Val> {
        self.record(format!("unwind:{}", value));
        match self.stage {
            Stage::Body => self.enter_cleanup(Exit::Return(value)),
            // Abandon the rest of the cleanup block
            Stage::Cleanup(_) => self.finish(Exit::Return(value)),
            Stage::Finished => Ok(Resumed::Complete(value)),
        }
    }

    fn name(&self) -> &str {
        "test-proc"
    }
}
