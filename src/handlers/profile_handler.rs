//! Profile Update Handler

use std::sync::Arc;

use chrono::Utc;

use crate::aggregate::AccountProfile;
use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::store::AccountStore;

use super::mutation::modify_account;
use super::UpdateProfileCommand;

/// Handler for sparse profile updates
pub struct UpdateProfileHandler {
    accounts: Arc<dyn AccountStore>,
}

impl UpdateProfileHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Execute the update profile command and return the new profile
    pub async fn execute(
        &self,
        command: UpdateProfileCommand,
        context: &OperationContext,
    ) -> Result<AccountProfile, AppError> {
        if command.changes.is_empty() {
            return Err(DomainError::NoFieldsProvided.into());
        }

        let (account, appended) =
            modify_account(self.accounts.as_ref(), &command.username, |account| {
                Ok(account.update_profile(command.changes.clone(), Utc::now())?)
            })
            .await?;

        tracing::info!(
            username = %command.username,
            weight_logged = appended.is_some(),
            version = account.version(),
            correlation_id = ?context.correlation_id,
            "Profile updated"
        );

        Ok(account.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Account, ProfileSeed};
    use crate::domain::{FieldUpdate, ProfileChanges};
    use crate::store::MemoryAccountStore;

    async fn store_with_alice() -> Arc<dyn AccountStore> {
        let store = MemoryAccountStore::new();
        let seed = ProfileSeed {
            display_name: Some("Alice".into()),
            height_cm: Some(175.0),
            initial_weight: Some(80.0),
            ..Default::default()
        };
        store
            .insert(Account::create("alice", "hash".into(), seed, Utc::now()).unwrap())
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_update_touches_only_given_fields() {
        let handler = UpdateProfileHandler::new(store_with_alice().await);
        let changes = ProfileChanges {
            objective: FieldUpdate::Set("lose weight".into()),
            current_weight: Some(78.0),
            ..Default::default()
        };

        let profile = handler
            .execute(
                UpdateProfileCommand::new("alice".into(), changes),
                &OperationContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
        assert_eq!(profile.objective.as_deref(), Some("lose weight"));
        assert_eq!(profile.height_cm, Some(175.0));
        assert_eq!(profile.weight_logs.len(), 2);
        assert_eq!(profile.weight_logs[1].weight, 78.0);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let handler = UpdateProfileHandler::new(store_with_alice().await);

        let result = handler
            .execute(
                UpdateProfileCommand::new("alice".into(), ProfileChanges::default()),
                &OperationContext::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::NoFieldsProvided))
        ));
    }

    #[tokio::test]
    async fn test_invalid_height_leaves_profile_untouched() {
        let store = store_with_alice().await;
        let handler = UpdateProfileHandler::new(Arc::clone(&store));
        let changes = ProfileChanges {
            display_name: FieldUpdate::Set("Bob".into()),
            height_cm: FieldUpdate::Set(-3.0),
            ..Default::default()
        };

        let result = handler
            .execute(
                UpdateProfileCommand::new("alice".into(), changes),
                &OperationContext::new(),
            )
            .await;
        assert!(result.is_err());

        let stored = store.find("alice").await.unwrap().unwrap();
        assert_eq!(stored.display_name(), Some("Alice"));
        assert_eq!(stored.version(), 1);
    }
}
