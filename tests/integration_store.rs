//! Integration tests for the PostgreSQL stores
//!
//! Skipped unless DATABASE_URL points at a scratch database.

use std::sync::Arc;

use chrono::{Duration, Utc};

use nutrition_coach::aggregate::{Account, ProfileSeed};
use nutrition_coach::auth::{hash_token, Session};
use nutrition_coach::domain::{OperationContext, Weight};
use nutrition_coach::handlers::{AppendWeightLogCommand, JournalHandler};
use nutrition_coach::store::{AccountStore, PgAccountStore, PgSessionStore, SessionStore, StoreError};

mod common;

fn new_account(username: &str) -> Account {
    let seed = ProfileSeed {
        height_cm: Some(175.0),
        initial_weight: Some(80.0),
        ..Default::default()
    };
    Account::create(username, "hash".to_string(), seed, Utc::now()).unwrap()
}

#[tokio::test]
async fn test_account_insert_and_find() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let store = PgAccountStore::new(pool);
    let username = common::unique_username("pg_find");

    let stored = store.insert(new_account(&username)).await.unwrap();
    assert_eq!(stored.version(), 1);

    let found = store.find(&username).await.unwrap().unwrap();
    assert_eq!(found.username(), username);
    assert_eq!(found.height_cm(), Some(175.0));
    assert_eq!(found.weight_logs().len(), 1);
    assert_eq!(found.version(), 1);

    let duplicate = store.insert(new_account(&username)).await;
    assert!(matches!(duplicate, Err(StoreError::Duplicate(_))));
}

#[tokio::test]
async fn test_account_upsert_detects_stale_version() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let store = PgAccountStore::new(pool);
    let username = common::unique_username("pg_conflict");
    store.insert(new_account(&username)).await.unwrap();

    let mut first = store.find(&username).await.unwrap().unwrap();
    let mut second = first.clone();

    first.append_weight_log(Weight::new(79.0).unwrap(), Utc::now(), Utc::now());
    let first = store.upsert(first).await.unwrap();
    assert_eq!(first.version(), 2);

    second.append_weight_log(Weight::new(78.0).unwrap(), Utc::now(), Utc::now());
    let result = store.upsert(second).await;
    assert!(matches!(
        result,
        Err(StoreError::ConcurrencyConflict { expected: 1, actual: 2, .. })
    ));
}

#[tokio::test]
async fn test_concurrent_appends_survive() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool));
    let username = common::unique_username("pg_race");
    store.insert(new_account(&username)).await.unwrap();

    let journal = Arc::new(JournalHandler::new(Arc::clone(&store)));
    let tasks: Vec<_> = [79.0, 78.0]
        .into_iter()
        .map(|weight| {
            let journal = Arc::clone(&journal);
            let username = username.clone();
            tokio::spawn(async move {
                journal
                    .append_weight_log(
                        AppendWeightLogCommand::new(username, weight),
                        &OperationContext::new(),
                    )
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = store.find(&username).await.unwrap().unwrap();
    assert_eq!(stored.weight_logs().len(), 3);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let Some(pool) = common::setup_test_db().await else {
        return;
    };
    let accounts = PgAccountStore::new(pool.clone());
    let sessions = PgSessionStore::new(pool);
    let username = common::unique_username("pg_session");
    accounts.insert(new_account(&username)).await.unwrap();

    let now = Utc::now();
    let live = hash_token(&common::unique_username("live"));
    let expired = hash_token(&common::unique_username("expired"));
    sessions
        .save(Session {
            token_hash: live.clone(),
            username: username.clone(),
            expires_at: now + Duration::minutes(30),
        })
        .await
        .unwrap();
    sessions
        .save(Session {
            token_hash: expired.clone(),
            username: username.clone(),
            expires_at: now - Duration::minutes(1),
        })
        .await
        .unwrap();

    assert_eq!(sessions.resolve(&live, now).await.unwrap(), Some(username.clone()));
    assert_eq!(sessions.resolve(&expired, now).await.unwrap(), None);

    assert!(sessions.purge_expired(now).await.unwrap() >= 1);
    assert!(sessions.revoke(&live).await.unwrap());
    assert_eq!(sessions.resolve(&live, now).await.unwrap(), None);
}
