//! Read-modify-write with optimistic retry
//!
//! Every account mutation loads the document, applies a change and writes
//! it back with the loaded version. A concurrent write in between makes the
//! store reject ours; the whole sequence is then replayed on fresh data.

use std::time::Duration;

use crate::aggregate::Account;
use crate::domain::DomainError;
use crate::error::AppError;
use crate::store::{AccountStore, StoreError};

const MAX_ATTEMPTS: u32 = 3;

/// Load `username`, apply `mutate`, and store the result.
///
/// `mutate` may run more than once and must not have side effects outside
/// the account it is given.
pub async fn modify_account<T, F>(
    store: &dyn AccountStore,
    username: &str,
    mut mutate: F,
) -> Result<(Account, T), AppError>
where
    F: FnMut(&mut Account) -> Result<T, AppError>,
{
    for attempt in 0..MAX_ATTEMPTS {
        let mut account = store
            .find(username)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(username.to_string()))?;

        let outcome = mutate(&mut account)?;

        match store.upsert(account).await {
            Ok(stored) => return Ok((stored, outcome)),
            Err(StoreError::ConcurrencyConflict { .. }) if attempt < MAX_ATTEMPTS - 1 => {
                let delay = Duration::from_millis(50 * (attempt as u64 + 1));
                tracing::warn!(
                    username = %username,
                    "Concurrent account update, retrying (attempt {}/{})",
                    attempt + 1,
                    MAX_ATTEMPTS
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::VersionConflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ProfileSeed;
    use crate::store::MemoryAccountStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store whose first `conflicts` upserts report a concurrent write
    struct ConflictingStore {
        inner: MemoryAccountStore,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl AccountStore for ConflictingStore {
        async fn find(&self, username: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find(username).await
        }

        async fn insert(&self, account: Account) -> Result<Account, StoreError> {
            self.inner.insert(account).await
        }

        async fn upsert(&self, account: Account) -> Result<Account, StoreError> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::ConcurrencyConflict {
                    key: account.username().to_string(),
                    expected: account.version(),
                    actual: account.version() + 1,
                });
            }
            self.inner.upsert(account).await
        }

        async fn count(&self) -> Result<u64, StoreError> {
            self.inner.count().await
        }
    }

    async fn store_with_conflicts(conflicts: u32) -> ConflictingStore {
        let inner = MemoryAccountStore::new();
        let account =
            Account::create("alice", "hash".to_string(), ProfileSeed::default(), Utc::now()).unwrap();
        inner.insert(account).await.unwrap();
        ConflictingStore {
            inner,
            conflicts: AtomicU32::new(conflicts),
        }
    }

    #[tokio::test]
    async fn test_modify_account_stores_change() {
        let store = store_with_conflicts(0).await;

        let (stored, calls) = modify_account(&store, "alice", |_| Ok(1)).await.unwrap();

        assert_eq!(calls, 1);
        assert_eq!(stored.version(), 2);
    }

    #[tokio::test]
    async fn test_modify_account_retries_conflicts() {
        let store = store_with_conflicts(2).await;
        let mut calls = 0;

        let result = modify_account(&store, "alice", |_| {
            calls += 1;
            Ok(())
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_modify_account_gives_up() {
        let store = store_with_conflicts(5).await;

        let result = modify_account(&store, "alice", |_| Ok(())).await;
        assert!(matches!(result, Err(AppError::VersionConflict)));
    }

    #[tokio::test]
    async fn test_modify_account_missing() {
        let store = MemoryAccountStore::new();

        let result = modify_account(&store, "ghost", |_| Ok(())).await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::AccountNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_modify_account_propagates_mutation_error() {
        let store = store_with_conflicts(0).await;

        let result: Result<(Account, ()), AppError> =
            modify_account(&store, "alice", |_| Err(DomainError::NoFieldsProvided.into())).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NoFieldsProvided))
        ));
        // Nothing was written
        let stored = store.find("alice").await.unwrap().unwrap();
        assert_eq!(stored.version(), 1);
    }
}
