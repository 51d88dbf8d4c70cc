//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// An account with this username already exists
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    /// Unknown username or wrong password. Deliberately carries no detail.
    #[error("Invalid credentials")]
    InvalidCredential,

    /// Account document not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Period filter could not be parsed
    #[error("Invalid period format: {0}")]
    InvalidPeriodFormat(String),

    /// Sparse update carried no fields
    #[error("No fields provided for update")]
    NoFieldsProvided,

    /// A field failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credential_has_no_detail() {
        let err = DomainError::InvalidCredential;
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_duplicate_account_error() {
        let err = DomainError::DuplicateAccount("alice".to_string());
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_invalid_input_helper() {
        let err = DomainError::invalid_input("weight must be positive");
        assert_eq!(err, DomainError::InvalidInput("weight must be positive".to_string()));
    }
}
