//! In-memory stores
//!
//! Used when no database is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::aggregate::Account;
use crate::auth::Session;

use super::{AccountStore, SessionStore, StoreError};

/// Account documents held in a map behind a read-write lock
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    documents: RwLock<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.documents.read().await.get(username).cloned())
    }

    async fn insert(&self, mut account: Account) -> Result<Account, StoreError> {
        let mut documents = self.documents.write().await;

        if documents.contains_key(account.username()) {
            return Err(StoreError::Duplicate(account.username().to_string()));
        }

        account.set_version(1);
        documents.insert(account.username().to_string(), account.clone());
        Ok(account)
    }

    async fn upsert(&self, mut account: Account) -> Result<Account, StoreError> {
        let mut documents = self.documents.write().await;

        let next_version = match documents.get(account.username()) {
            Some(stored) if stored.version() != account.version() => {
                return Err(StoreError::ConcurrencyConflict {
                    key: account.username().to_string(),
                    expected: account.version(),
                    actual: stored.version(),
                });
            }
            Some(stored) => stored.version() + 1,
            None => 1,
        };

        account.set_version(next_version);
        documents.insert(account.username().to_string(), account.clone());
        Ok(account)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.documents.read().await.len() as u64)
    }
}

/// Sessions held in a map keyed by token hash
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn resolve(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(token_hash)
            .filter(|session| session.expires_at > now)
            .map(|session| session.username.clone()))
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(token_hash).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
