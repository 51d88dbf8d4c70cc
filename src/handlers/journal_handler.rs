//! Journal Handlers
//!
//! Append-only collections on an account: weight logs, chat transcript and
//! saved meals. Each append goes through the retrying read-modify-write so
//! concurrent appends to the same account are all kept.

use std::sync::Arc;

use chrono::Utc;

use crate::aggregate::{ChatEntry, MealEntry, WeightLogEntry};
use crate::domain::{OperationContext, Weight};
use crate::error::AppError;
use crate::store::AccountStore;

use super::mutation::modify_account;
use super::{AppendChatMessageCommand, AppendMealCommand, AppendWeightLogCommand};

/// Handler for journal appends
pub struct JournalHandler {
    accounts: Arc<dyn AccountStore>,
}

impl JournalHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Record a weight measurement
    pub async fn append_weight_log(
        &self,
        command: AppendWeightLogCommand,
        context: &OperationContext,
    ) -> Result<WeightLogEntry, AppError> {
        let weight = Weight::new(command.weight)?;

        let (_, entry) = modify_account(self.accounts.as_ref(), &command.username, |account| {
            let now = Utc::now();
            let recorded_at = command.recorded_at.unwrap_or_else(|| now.fixed_offset());
            Ok(account.append_weight_log(weight, recorded_at, now))
        })
        .await?;

        tracing::info!(
            username = %command.username,
            weight = %weight,
            correlation_id = ?context.correlation_id,
            "Weight logged"
        );

        Ok(entry)
    }

    /// Append a chat message to the transcript
    pub async fn append_chat_message(
        &self,
        command: AppendChatMessageCommand,
        context: &OperationContext,
    ) -> Result<ChatEntry, AppError> {
        let (_, entry) = modify_account(self.accounts.as_ref(), &command.username, |account| {
            let now = Utc::now();
            let entry = ChatEntry {
                role: command.role,
                text: command.text.clone(),
                kind: command.kind.clone(),
                image_url: command.image_url.clone(),
                created_at: command.created_at.unwrap_or(now),
            };
            account.append_chat_message(entry.clone(), now);
            Ok(entry)
        })
        .await?;

        tracing::debug!(
            username = %command.username,
            role = ?entry.role,
            correlation_id = ?context.correlation_id,
            "Chat message saved"
        );

        Ok(entry)
    }

    /// Save a meal analysis
    pub async fn append_meal(
        &self,
        command: AppendMealCommand,
        context: &OperationContext,
    ) -> Result<MealEntry, AppError> {
        let (_, entry) = modify_account(self.accounts.as_ref(), &command.username, |account| {
            let now = Utc::now();
            let entry = MealEntry {
                analysis_text: command.analysis_text.clone(),
                image_name: command.image_name.clone(),
                created_at: now,
            };
            account.append_meal(entry.clone(), now);
            Ok(entry)
        })
        .await?;

        tracing::info!(
            username = %command.username,
            correlation_id = ?context.correlation_id,
            "Meal saved"
        );

        Ok(entry)
    }
}
