//! Store Errors
//!
//! Error types for record store operations.

/// Errors that can occur in the record stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document with this key already exists
    #[error("Document already exists: {0}")]
    Duplicate(String),

    /// Optimistic concurrency conflict
    #[error("Concurrency conflict for {key}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        key: String,
        expected: i64,
        actual: i64,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
