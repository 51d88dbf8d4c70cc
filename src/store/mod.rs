//! Record Store module
//!
//! Persistence of account documents keyed by username, and of session
//! records keyed by token hash. Each store has an in-memory and a
//! PostgreSQL implementation behind the same trait.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::aggregate::Account;
use crate::auth::Session;

pub use error::StoreError;
pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use postgres::{PgAccountStore, PgSessionStore};

/// Account document persistence.
///
/// Every write replaces the whole document; there is no partial-field
/// update. Writes are version-checked against `Account::version`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Load the document for `username`
    async fn find(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new document; fails with `Duplicate` if the username exists
    async fn insert(&self, account: Account) -> Result<Account, StoreError>;

    /// Insert when absent, else replace the stored document.
    ///
    /// Replacing fails with `ConcurrencyConflict` when the stored version
    /// differs from the one the caller loaded. The returned account carries
    /// the new version.
    async fn upsert(&self, account: Account) -> Result<Account, StoreError>;

    /// Number of stored documents
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Bearer session persistence. Only token hashes are stored.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: Session) -> Result<(), StoreError>;

    /// Username owning an unexpired session with this token hash
    async fn resolve(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError>;

    /// Returns whether a session was removed
    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Remove sessions that expired before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
