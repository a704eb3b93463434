//! Lockout engine over a shared counter store
use std::sync::Arc;
use std::time::Duration;

use backend_lib::auth::{FailureOutcome, LockoutEngine};
use backend_lib::clock::ManualClock;
use backend_lib::counter::{CounterStore, MemoryCounterStore};
use backend_lib::error::AppError;

fn shared_store() -> (Arc<MemoryCounterStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    (Arc::new(MemoryCounterStore::new(clock.clone())), clock)
}

#[tokio::test]
async fn test_engines_sharing_a_store_see_one_count() {
    // two server instances behind a load balancer
    let (store, _clock) = shared_store();
    let first = LockoutEngine::with_defaults(store.clone());
    let second = LockoutEngine::with_defaults(store.clone());

    assert_eq!(first.record_failure("han@rebels.org").await.unwrap(), FailureOutcome::Remaining(4));
    assert_eq!(second.record_failure("han@rebels.org").await.unwrap(), FailureOutcome::Remaining(3));
    assert_eq!(first.record_failure("han@rebels.org").await.unwrap(), FailureOutcome::Remaining(2));
    assert_eq!(second.record_failure("han@rebels.org").await.unwrap(), FailureOutcome::Remaining(1));
    assert_eq!(
        first.record_failure("han@rebels.org").await.unwrap(),
        FailureOutcome::LockedOut { threshold: 5 }
    );

    assert!(matches!(
        second.ensure_not_locked_out("han@rebels.org").await,
        Err(AppError::LockedOut { threshold: 5 })
    ));
}

#[tokio::test]
async fn test_store_keys_follow_the_documented_layout() {
    let (store, _clock) = shared_store();
    let engine = LockoutEngine::with_defaults(store.clone());

    engine.record_failure("han@rebels.org").await.unwrap();
    engine.record_failure("han@rebels.org").await.unwrap();
    assert_eq!(
        store.get("login:tries:han@rebels.org").await.unwrap().as_deref(),
        Some("2")
    );
    assert!(store.get("locked_out:limit:han@rebels.org").await.unwrap().is_none());

    for _ in 0..3 {
        engine.record_failure("han@rebels.org").await.unwrap();
    }
    assert!(store.get("locked_out:limit:han@rebels.org").await.unwrap().is_some());
    // the count does not outlive the lockout it produced
    assert!(store.get("login:tries:han@rebels.org").await.unwrap().is_none());
}

#[tokio::test]
async fn test_each_failure_refreshes_the_window() {
    let (store, clock) = shared_store();
    let engine = LockoutEngine::new(store, 3, Duration::from_secs(60));

    engine.record_failure("han@rebels.org").await.unwrap();
    clock.advance(chrono::Duration::seconds(50));
    engine.record_failure("han@rebels.org").await.unwrap();
    clock.advance(chrono::Duration::seconds(50));

    // the first failure is 100s old but the count was refreshed at 50s
    assert_eq!(engine.failed_attempts("han@rebels.org").await.unwrap(), 2);
    assert_eq!(
        engine.record_failure("han@rebels.org").await.unwrap(),
        FailureOutcome::LockedOut { threshold: 3 }
    );
}

#[tokio::test]
async fn test_outcomes_map_to_errors() {
    let remaining: AppError = FailureOutcome::Remaining(2).into();
    assert_eq!(remaining.error_code(), 702);
    assert_eq!(remaining.to_string(), "invalid password entered, 2 login attempts remaining");

    let locked: AppError = FailureOutcome::LockedOut { threshold: 5 }.into();
    assert_eq!(locked.error_code(), 707);
}
