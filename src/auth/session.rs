//! Bearer sessions
//!
//! Tokens are 32 random bytes, hex encoded. Only the SHA-256 of a token is
//! persisted, so a leaked session table cannot be replayed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::store::{SessionStore, StoreError};

const TOKEN_BYTES: usize = 32;

/// A persisted session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token_hash: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Session issuance failures
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session expiry is out of range")]
    ExpiryOutOfRange,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly issued bearer token (the only time the plaintext exists)
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues, resolves and revokes bearer sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Start a session for `username`
    pub async fn issue(&self, username: &str) -> Result<IssuedToken, SessionError> {
        let token = generate_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(SessionError::ExpiryOutOfRange)?;

        self.store
            .save(Session {
                token_hash: hash_token(&token),
                username: username.to_string(),
                expires_at,
            })
            .await?;

        tracing::debug!(username = %username, %expires_at, "Session issued");
        Ok(IssuedToken { token, expires_at })
    }

    /// Resolve a bearer token to a username, `None` if unknown or expired
    pub async fn authenticate(&self, token: &str) -> Result<Option<String>, StoreError> {
        self.store.resolve(&hash_token(token), Utc::now()).await
    }

    pub async fn revoke(&self, token: &str) -> Result<bool, StoreError> {
        self.store.revoke(&hash_token(token)).await
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
