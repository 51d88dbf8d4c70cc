//! PostgreSQL stores
//!
//! One JSONB document per account row, with the version kept in its own
//! column so conflicting writes can be detected in a single statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::aggregate::Account;
use crate::auth::Session;

use super::{AccountStore, SessionStore, StoreError};

/// Account documents in the `account_documents` table
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stored_version(&self, username: &str) -> Result<Option<i64>, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM account_documents WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(version)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<(Json<Account>, i64)> = sqlx::query_as(
            "SELECT document, version FROM account_documents WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(mut account), version)| {
            account.set_version(version);
            account
        }))
    }

    async fn insert(&self, mut account: Account) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO account_documents (username, document, version, created_at, updated_at)
            VALUES ($1, $2, 1, NOW(), NOW())
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(account.username())
        .bind(Json(&account))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(account.username().to_string()));
        }

        account.set_version(1);
        Ok(account)
    }

    async fn upsert(&self, mut account: Account) -> Result<Account, StoreError> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE account_documents
            SET document = $2, version = version + 1, updated_at = NOW()
            WHERE username = $1 AND version = $3
            RETURNING version
            "#,
        )
        .bind(account.username())
        .bind(Json(&account))
        .bind(account.version())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(version) = updated {
            account.set_version(version);
            return Ok(account);
        }

        match self.stored_version(account.username()).await? {
            Some(actual) => Err(StoreError::ConcurrencyConflict {
                key: account.username().to_string(),
                expected: account.version(),
                actual,
            }),
            None => match self.insert(account).await {
                // Lost a race with a concurrent insert
                Err(StoreError::Duplicate(key)) => Err(StoreError::ConcurrencyConflict {
                    key,
                    expected: 0,
                    actual: 1,
                }),
                other => other,
            },
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account_documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

/// Sessions in the `sessions` table
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn save(&self, session: Session) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, username, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&session.token_hash)
        .bind(&session.username)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn resolve(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        let username: Option<String> = sqlx::query_scalar(
            "SELECT username FROM sessions WHERE token_hash = $1 AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(username)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
