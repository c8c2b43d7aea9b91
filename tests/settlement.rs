//! Settlement engine behavior: write-once transitions, adoption, and the
//! unhandled-rejection policy.

mod common;
use common::{capturing_lab, init_test_logging, lab};

use deferred::{Completion, Promise, Rejection, RejectionKind, StateKind};

#[test]
fn resolve_fulfills_with_exactly_that_value() {
    init_test_logging();
    let (lab, sched) = lab();

    let promise = Promise::resolve(&sched, 42);
    assert!(promise.is_pending(), "settlement is never synchronous");
    lab.run_until_idle();
    assert_eq!(promise.state(), StateKind::Fulfilled);
    assert_eq!(promise.value(), Some(42));
}

#[test]
fn second_settlement_is_a_silent_no_op() {
    let (lab, sched) = lab();
    let (promise, completer) = Promise::deferred(&sched);

    completer.fulfill(1).unwrap();
    completer.reject("too late");
    completer.fulfill(2).unwrap();
    lab.run_until_idle();

    assert_eq!(promise.value(), Some(1));
}

#[test]
fn reject_then_fulfill_keeps_the_rejection() {
    let (lab, sched) = capturing_lab();
    let (promise, completer) = Promise::<i32>::deferred(&sched);

    completer.reject("first");
    completer.fulfill(5).unwrap();
    lab.run_until_idle();

    assert_eq!(promise.state(), StateKind::Rejected);
    assert_eq!(promise.rejection().map(|r| r.message().to_string()), Some("first".into()));
}

#[test]
fn adoption_of_a_pending_inner_promise() {
    let (lab, sched) = lab();
    let (inner, inner_completer) = Promise::deferred(&sched);
    let outer = Promise::resolve(&sched, inner);

    lab.run_until_idle();
    assert!(outer.is_pending(), "outer waits for the inner outcome");

    inner_completer.fulfill("eventual").unwrap();
    lab.run_until_idle();
    assert_eq!(outer.value(), Some("eventual"));
}

#[test]
fn adoption_of_a_pending_inner_rejection() {
    let (lab, sched) = capturing_lab();
    let (inner, inner_completer) = Promise::<i32>::deferred(&sched);
    let outer: Promise<i32> = Promise::resolve(&sched, inner);

    lab.run_until_idle();
    inner_completer.reject("inner failed");
    lab.run_until_idle();

    assert_eq!(outer.state(), StateKind::Rejected);
    assert_eq!(
        outer.rejection().map(|r| r.message().to_string()),
        Some("inner failed".into())
    );
}

#[test]
fn adoption_of_a_settled_inner_adopts_rather_than_nests() {
    let (lab, sched) = lab();
    let inner = Promise::resolve(&sched, 7);
    lab.run_until_idle();
    assert_eq!(inner.state(), StateKind::Fulfilled);

    let outer = Promise::resolve(&sched, inner);
    assert!(outer.is_pending(), "adoption is never synchronous");
    lab.run_until_idle();
    assert_eq!(outer.value(), Some(7));
}

#[test]
fn self_resolution_fails_synchronously() {
    let (lab, sched) = lab();
    let (promise, completer) = Promise::<i32>::deferred(&sched);

    let err = completer
        .fulfill(Completion::chain(promise.clone()))
        .unwrap_err();
    assert_eq!(err.kind(), RejectionKind::SelfResolution);
    assert!(promise.is_pending());
    assert_eq!(lab.run_until_idle(), 0, "nothing was scheduled");
}

#[test]
fn producer_runs_as_its_own_task() {
    let (lab, sched) = lab();
    let promise = Promise::new(&sched, |completer| completer.fulfill("from producer"));

    assert!(promise.is_pending());
    assert_eq!(lab.queued(), 1);
    lab.run_until_idle();
    assert_eq!(promise.value(), Some("from producer"));
}

#[test]
#[should_panic(expected = "unhandled rejection")]
fn unhandled_rejection_is_fatal_by_default() {
    let (lab, sched) = lab();
    let _promise: Promise<i32> = Promise::reject(&sched, "nobody listening");
    lab.run_until_idle();
}

#[test]
fn unhandled_rejection_can_be_captured_by_the_host() {
    let (lab, sched) = capturing_lab();
    let promise: Promise<i32> = Promise::reject(&sched, "lost reason");
    lab.run_until_idle();

    assert_eq!(promise.state(), StateKind::Rejected);
    let unhandled = lab.take_unhandled();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].message(), "lost reason");
}

#[test]
fn unhandled_rejection_fires_inside_the_propagation_task() {
    let (lab, sched) = capturing_lab();
    let (promise, completer) = Promise::<i32>::deferred(&sched);
    // A success-only dependent: the reason forwards through to its
    // downstream, which has no handler of its own.
    let _downstream = promise.then(|v| Ok(Completion::value(v)));

    completer.reject("propagated");
    assert!(
        lab.unhandled().is_empty(),
        "the source promise itself is handled by the forwarding link"
    );
    lab.run_until_idle();

    let unhandled = lab.take_unhandled();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].message(), "propagated");
}

#[test]
fn failure_handler_failure_is_tagged_with_the_original_reason() {
    let (lab, sched) = capturing_lab();
    let promise: Promise<i32> = Promise::reject(&sched, "original");
    let downstream = promise.catch(|_rejection| Err(Rejection::new("secondary")));
    lab.run_until_idle();

    let rejection = downstream.rejection().expect("downstream rejected");
    assert_eq!(rejection.message(), "secondary");
    assert_eq!(rejection.cause().map(Rejection::message), Some("original"));
    assert_eq!(rejection.root_cause().message(), "original");
}

#[test]
fn pending_task_handle_is_recorded_for_diagnostics() {
    let (lab, sched) = lab();
    let (promise, completer) = Promise::deferred(&sched);
    assert_eq!(promise.pending_task(), None);

    let downstream = promise.then(|v: i32| Ok(Completion::value(v)));
    completer.fulfill(1).unwrap();
    assert!(
        downstream.pending_task().is_some(),
        "fan-out records the scheduled task on the downstream promise"
    );
    lab.run_until_idle();
}
