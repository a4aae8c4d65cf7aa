//! Tests for the convenience drivers

use super::helpers::{adder, entries, new_log, recorder, TestProc};
use crate::proc::{call, call_sync, never, run, run_sync, Deferred, ProcError, Val, Yielded};

#[test]
fn test_run_sync_completes_synchronous_proc() {
    let procedure = TestProc::new(vec![
        call(adder(), vec![Val::Num(2.0), Val::Num(2.0)]).into(),
        call(adder(), vec![Val::Num(4.0), Val::Num(1.0)]).into(),
    ]);

    assert_eq!(run_sync(procedure), Ok(Val::Num(5.0)));
}

#[test]
fn test_run_sync_settled_future_still_blocks() {
    let procedure = TestProc::new(vec![Yielded::Future(
        Deferred::resolved(Val::Null).into_ref(),
    )]);

    assert_eq!(run_sync(procedure), Err(ProcError::WouldBlock));
}

#[test]
fn test_run_sync_unwinds_on_would_block() {
    let log = new_log();
    let pending = never();
    let leftover = never();
    let procedure = TestProc::new(vec![
        call_sync(
            crate::proc::Callable::new("start", {
                let leftover = leftover.clone();
                move |_receiver, _args| Ok(leftover.clone().into())
            }),
            vec![],
        )
        .into(),
        Yielded::Future(pending.clone().into_ref()),
    ])
    .with_cleanup(vec![call(recorder("cleanup", &log), vec![]).into()]);

    assert_eq!(run_sync(procedure), Err(ProcError::WouldBlock));
    assert_eq!(entries(&log), ["cleanup()"]);
    assert!(pending.is_cancelled());
    assert!(leftover.is_cancelled());
}

#[test]
fn test_run_sync_reports_unhandled_error() {
    let procedure = TestProc::new(vec![call(adder(), vec![Val::from("a"), Val::Num(1.0)]).into()]);

    assert!(matches!(run_sync(procedure), Err(ProcError::Unhandled(_))));
}

#[tokio::test]
async fn test_run_waits_on_futures() {
    let procedure = TestProc::new(vec![
        Yielded::Future(crate::proc::delay(std::time::Duration::from_millis(1)).into_ref()),
        call(adder(), vec![Val::Num(1.0), Val::Num(1.0)]).into(),
    ]);

    assert_eq!(run(procedure).await, Ok(Val::Num(2.0)));
}
