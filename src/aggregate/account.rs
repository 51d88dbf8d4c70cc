//! Account Aggregate
//!
//! The single persisted document per user: credential, profile and the
//! append-only weight-log, chat and meal collections.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HeightCm, ProfileChanges, Weight};

use super::records::{ChatEntry, MealEntry, WeightLogEntry};

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// Optional profile fields captured at signup
#[derive(Debug, Clone, Default)]
pub struct ProfileSeed {
    pub display_name: Option<String>,
    pub objective: Option<String>,
    pub height_cm: Option<f64>,
    pub initial_weight: Option<f64>,
}

/// Account Aggregate
///
/// Keyed by `username`. The store owns `version`; it is not part of the
/// serialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    username: String,

    password_hash: String,

    #[serde(default, alias = "nome")]
    display_name: Option<String>,

    #[serde(default, alias = "objetivo")]
    objective: Option<String>,

    #[serde(default)]
    height_cm: Option<f64>,

    #[serde(default)]
    initial_weight: Option<f64>,

    #[serde(default)]
    weight_logs: Vec<WeightLogEntry>,

    #[serde(default)]
    chat_history: Vec<ChatEntry>,

    #[serde(default)]
    meals: Vec<MealEntry>,

    created_at: DateTime<Utc>,

    updated_at: DateTime<Utc>,

    #[serde(skip)]
    version: i64,
}

/// Public view of an account (never includes the credential)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub objective: Option<String>,
    pub height_cm: Option<f64>,
    pub initial_weight: Option<f64>,
    pub weight_logs: Vec<WeightLogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    // =========================================================================
    // Account::create()
    // =========================================================================

    /// Create a new account.
    ///
    /// The password must already be hashed. When `initial_weight` is given,
    /// the weight log is seeded with one entry at `now`.
    pub fn create(
        username: &str,
        password_hash: String,
        seed: ProfileSeed,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::invalid_input("username must not be empty"));
        }

        let height_cm = seed.height_cm.map(HeightCm::new).transpose()?;
        let initial_weight = seed.initial_weight.map(Weight::new).transpose()?;

        let weight_logs = initial_weight
            .map(|weight| vec![WeightLogEntry::new(weight, now)])
            .unwrap_or_default();

        Ok(Self {
            username: username.to_string(),
            password_hash,
            display_name: seed.display_name,
            objective: seed.objective,
            height_cm: height_cm.map(|h| h.centimetres()),
            initial_weight: initial_weight.map(|w| w.kilograms()),
            weight_logs,
            chat_history: Vec::new(),
            meals: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    // =========================================================================
    // Account::update_profile()
    // =========================================================================

    /// Apply a sparse profile update.
    ///
    /// Returns the weight-log entry appended for `current_weight`, if any.
    pub fn update_profile(
        &mut self,
        changes: ProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<WeightLogEntry>, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::NoFieldsProvided);
        }

        // Validate everything before touching state
        let height_cm = changes
            .height_cm
            .try_map(|h| HeightCm::new(h).map(|h| h.centimetres()))?;
        let initial_weight = changes
            .initial_weight
            .try_map(|w| Weight::new(w).map(|w| w.kilograms()))?;
        let current_weight = changes.current_weight.map(Weight::new).transpose()?;

        changes.display_name.apply_to(&mut self.display_name);
        changes.objective.apply_to(&mut self.objective);
        height_cm.apply_to(&mut self.height_cm);
        initial_weight.apply_to(&mut self.initial_weight);

        let appended = current_weight.map(|weight| self.append_weight_log(weight, now, now));
        self.updated_at = now;

        Ok(appended)
    }

    // =========================================================================
    // Append-only collections
    // =========================================================================

    /// Append a weight measurement. No deduplication, no ordering check.
    pub fn append_weight_log<Tz>(
        &mut self,
        weight: Weight,
        recorded_at: DateTime<Tz>,
        now: DateTime<Utc>,
    ) -> WeightLogEntry
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let entry = WeightLogEntry::new(weight, recorded_at);
        self.weight_logs.push(entry.clone());
        self.updated_at = now;
        entry
    }

    pub fn append_chat_message(&mut self, entry: ChatEntry, now: DateTime<Utc>) {
        self.chat_history.push(entry);
        self.updated_at = now;
    }

    pub fn append_meal(&mut self, entry: MealEntry, now: DateTime<Utc>) {
        self.meals.push(entry);
        self.updated_at = now;
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn objective(&self) -> Option<&str> {
        self.objective.as_deref()
    }

    pub fn height_cm(&self) -> Option<f64> {
        self.height_cm
    }

    pub fn initial_weight(&self) -> Option<f64> {
        self.initial_weight
    }

    pub fn weight_logs(&self) -> &[WeightLogEntry] {
        &self.weight_logs
    }

    pub fn chat_history(&self) -> &[ChatEntry] {
        &self.chat_history
    }

    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stored document version; 0 for an account never persisted
    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            objective: self.objective.clone(),
            height_cm: self.height_cm,
            initial_weight: self.initial_weight,
            weight_logs: self.weight_logs.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
