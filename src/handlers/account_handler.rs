//! Account Handlers
//!
//! Signup and login.

use std::sync::Arc;

use chrono::Utc;

use crate::aggregate::{Account, MIN_PASSWORD_LEN};
use crate::auth::{IssuedToken, PasswordHasher, SessionManager};
use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::store::AccountStore;

use super::{CreateAccountCommand, CreateAccountResult, LoginCommand};

// =========================================================================
// CreateAccountHandler
// =========================================================================

/// Handler for account creation
pub struct CreateAccountHandler {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
}

impl CreateAccountHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, hasher: PasswordHasher) -> Self {
        Self { accounts, hasher }
    }

    /// Execute the create account command
    pub async fn execute(
        &self,
        command: CreateAccountCommand,
        context: &OperationContext,
    ) -> Result<CreateAccountResult, AppError> {
        if command.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))
            .into());
        }

        let username = command.username.trim();

        // Skip the hashing cost for names that are obviously taken; the
        // store insert is still the authority.
        if self.accounts.find(username).await?.is_some() {
            return Err(DomainError::DuplicateAccount(username.to_string()).into());
        }

        let password_hash = self.hasher.hash(&command.password)?;
        let account = Account::create(username, password_hash, command.profile, Utc::now())?;
        let account = self.accounts.insert(account).await?;

        tracing::info!(
            username = %account.username(),
            correlation_id = ?context.correlation_id,
            "Account created"
        );

        Ok(CreateAccountResult {
            username: account.username().to_string(),
            created_at: account.created_at(),
        })
    }
}

// =========================================================================
// LoginHandler
// =========================================================================

/// Handler for credential checks and session issuance
pub struct LoginHandler {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    sessions: SessionManager,
}

impl LoginHandler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: PasswordHasher,
        sessions: SessionManager,
    ) -> Self {
        Self {
            accounts,
            hasher,
            sessions,
        }
    }

    /// Execute the login command.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn execute(
        &self,
        command: LoginCommand,
        context: &OperationContext,
    ) -> Result<IssuedToken, AppError> {
        let username = command.username.trim();

        let verified = match self.accounts.find(username).await? {
            Some(account) => self.hasher.verify(&command.password, account.password_hash()),
            None => {
                // Burn the same work a real check costs
                let _ = self.hasher.hash(&command.password)?;
                false
            }
        };

        if !verified {
            tracing::info!(
                correlation_id = ?context.correlation_id,
                "Login rejected"
            );
            return Err(DomainError::InvalidCredential.into());
        }

        let issued = self.sessions.issue(username).await?;

        tracing::info!(
            username = %username,
            correlation_id = ?context.correlation_id,
            "Login succeeded"
        );

        Ok(issued)
    }
}
