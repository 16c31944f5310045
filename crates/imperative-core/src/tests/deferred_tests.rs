use futures::executor::block_on;

use crate::{create_deferred, Deferred, Rejection, Runtime};

#[test]
fn first_resolve_wins_over_later_calls() {
    let deferred: Deferred<&'static str> = create_deferred();
    let promise = deferred.promise();

    assert!(deferred.resolve("first"));
    assert!(!deferred.reject(Rejection::from("late")));
    assert!(!deferred.resolve("second"));

    assert_eq!(block_on(promise), Ok("first"));
}

#[test]
fn first_reject_wins_over_later_resolve() {
    let deferred: Deferred<u32> = create_deferred();
    let promise = deferred.promise();

    assert!(deferred.reject("nope".into()));
    assert!(!deferred.resolve(7));

    assert_eq!(block_on(promise), Err(Rejection::new("nope")));
}

#[test]
fn every_clone_observes_the_same_outcome() {
    let deferred: Deferred<String, i32> = Deferred::new();
    let first = deferred.promise();
    let second = first.clone();
    let third = deferred.promise();

    deferred.resolve("shared".to_string());

    assert_eq!(block_on(first), Ok("shared".to_string()));
    assert_eq!(block_on(second), Ok("shared".to_string()));
    assert_eq!(block_on(third), Ok("shared".to_string()));
}

#[test]
fn peek_reports_settlement_without_polling() {
    let deferred: Deferred<u8> = Deferred::new();
    let promise = deferred.promise();
    assert!(promise.peek().is_none());
    assert!(!deferred.is_settled());

    deferred.resolve(3);

    assert!(deferred.is_settled());
    assert_eq!(promise.peek(), Some(Ok(3)));
    assert!(promise.is_settled());
}

#[test]
fn awaited_and_unpolled_clones_agree() {
    let deferred: Deferred<u8, Rejection> = Deferred::new();
    let awaited = deferred.promise();
    let untouched = awaited.clone();
    assert!(!untouched.is_settled());

    deferred.reject(Rejection::new("closed"));

    assert_eq!(untouched.peek(), Some(Err(Rejection::new("closed"))));
    assert_eq!(block_on(awaited), Err(Rejection::new("closed")));
    assert_eq!(untouched.peek(), Some(Err(Rejection::new("closed"))));
    assert_eq!(block_on(untouched), Err(Rejection::new("closed")));
}

#[test]
fn promise_taken_before_settlement_resolves_on_the_runtime() {
    let runtime = Runtime::default();
    let deferred: Deferred<&'static str> = Deferred::new();
    let early = deferred.promise();
    let watcher = deferred.promise();
    let handle = runtime.handle();
    handle.spawn_task(Box::new(move || {
        deferred.resolve("later");
    }));

    assert_eq!(runtime.run_to_completion(early), Some(Ok("later")));
    assert_eq!(watcher.peek(), Some(Ok("later")));
}

#[test]
fn settling_after_every_promise_is_dropped_still_counts() {
    let deferred: Deferred<u8> = Deferred::new();
    drop(deferred.promise());
    assert!(deferred.resolve(1));
    assert!(!deferred.resolve(2));
}

#[test]
fn dropping_an_unsettled_deferred_leaves_the_promise_pending() {
    let runtime = Runtime::default();
    let deferred: Deferred<u8> = Deferred::new();
    let promise = deferred.promise();
    drop(deferred);

    assert_eq!(runtime.run_to_completion(promise), None);
}
