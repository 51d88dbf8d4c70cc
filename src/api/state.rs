//! Shared application state

use std::sync::Arc;

use crate::analysis::{DisabledAnalyzer, MealAnalyzer};
use crate::auth::{PasswordHasher, SessionManager};
use crate::store::{AccountStore, MemoryAccountStore, MemorySessionStore};

/// Everything a request handler needs, cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: SessionManager,
    pub hasher: PasswordHasher,
    pub analyzer: Arc<dyn MealAnalyzer>,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: SessionManager,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            accounts,
            sessions,
            hasher,
            analyzer: Arc::new(DisabledAnalyzer),
        }
    }

    /// State backed by the in-memory stores
    pub fn in_memory(session_ttl: chrono::Duration, hasher: PasswordHasher) -> Self {
        Self::new(
            Arc::new(MemoryAccountStore::new()),
            SessionManager::new(Arc::new(MemorySessionStore::new()), session_ttl),
            hasher,
        )
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn MealAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
