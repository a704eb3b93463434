//! Behaviour every `AccountStore` must share
use std::sync::Arc;

use backend_lib::clock::{Clock, ManualClock};
use backend_lib::error::AppError;
use backend_lib::storage::{AccountPatch, AccountStore, FlatFileAccountStore, MemoryAccountStore, NewAccount};
use chrono::{Duration, NaiveDate};
use identity_common::Role;
use tempfile::tempdir;

fn new_account(email: &str) -> NewAccount {
    NewAccount {
        first_name: "Leia".to_string(),
        last_name: "Organa".to_string(),
        email: email.to_string(),
        dob: NaiveDate::from_ymd_opt(1977, 5, 25),
        role: Role::User,
        password_hash: "$scrypt$placeholder".to_string(),
    }
}

async fn check_store_contract(store: Arc<dyn AccountStore>, clock: Arc<ManualClock>) {
    let created = store.create(new_account("leia@rebels.org")).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);
    assert!(created.current_token.is_none());

    // uniqueness is enforced by the store itself
    assert!(matches!(
        store.create(new_account("leia@rebels.org")).await,
        Err(AppError::IdentityExists)
    ));
    assert!(store.email_in_use("leia@rebels.org").await.unwrap());
    assert!(!store.email_in_use("han@rebels.org").await.unwrap());

    clock.advance(Duration::minutes(5));
    let login_at = clock.now();
    let updated = store
        .update(&created.id, AccountPatch::login("token-a".to_string(), login_at))
        .await
        .unwrap();
    assert!(updated.holds_token("token-a"));
    assert_eq!(updated.last_login, Some(login_at));
    assert!(updated.updated_at > created.updated_at);

    // a later write replaces the live token
    store
        .update(&created.id, AccountPatch::token("token-b".to_string()))
        .await
        .unwrap();
    let fetched = store.find_by_id(&created.id).await.unwrap().unwrap();
    assert!(!fetched.holds_token("token-a"));
    assert!(fetched.holds_token("token-b"));

    let logged_out = store.update(&created.id, AccountPatch::logout()).await.unwrap();
    assert!(!logged_out.holds_token("token-b"));

    let moved = store
        .update(
            &created.id,
            AccountPatch {
                email: Some("organa@rebels.org".to_string()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.email, "organa@rebels.org");
    assert!(store.find_by_email("leia@rebels.org").await.unwrap().is_none());
    assert_eq!(
        store.find_by_email("organa@rebels.org").await.unwrap().unwrap().id,
        created.id
    );
    // the released address is free again
    store.create(new_account("leia@rebels.org")).await.unwrap();

    let other = store.create(new_account("han@rebels.org")).await.unwrap();
    let clash = store
        .update(
            &other.id,
            AccountPatch {
                email: Some("organa@rebels.org".to_string()),
                ..AccountPatch::default()
            },
        )
        .await;
    assert!(matches!(clash, Err(AppError::IdentityExists)));
}

#[tokio::test]
async fn test_memory_store_contract() {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(MemoryAccountStore::new(clock.clone()));
    check_store_contract(store, clock).await;
}

#[tokio::test]
async fn test_flat_file_store_contract() {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::starting_now());
    let store = FlatFileAccountStore::open_with_clock(dir.path(), clock.clone())
        .await
        .unwrap();
    check_store_contract(Arc::new(store), clock).await;
}

#[tokio::test]
async fn test_flat_file_store_reopens_with_index() {
    let dir = tempdir().unwrap();
    let id = {
        let store = FlatFileAccountStore::open(dir.path()).await.unwrap();
        let account = store.create(new_account("leia@rebels.org")).await.unwrap();
        store
            .update(&account.id, AccountPatch::token("live".to_string()))
            .await
            .unwrap();
        account.id
    };

    let store = FlatFileAccountStore::open(dir.path()).await.unwrap();
    let account = store.find_by_email("leia@rebels.org").await.unwrap().unwrap();
    assert_eq!(account.id, id);
    assert!(account.holds_token("live"));
    assert!(matches!(
        store.create(new_account("leia@rebels.org")).await,
        Err(AppError::IdentityExists)
    ));
}
