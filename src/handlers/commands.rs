//! Command definitions
//!
//! Commands represent intentions to change an account.

use chrono::{DateTime, FixedOffset, Utc};

use crate::aggregate::{ChatRole, ProfileSeed};
use crate::domain::ProfileChanges;

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to sign up a new account
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub username: String,
    pub password: String,
    pub profile: ProfileSeed,
}

impl CreateAccountCommand {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            profile: ProfileSeed::default(),
        }
    }

    pub fn with_profile(mut self, profile: ProfileSeed) -> Self {
        self.profile = profile;
        self
    }
}

/// Result of a successful signup
#[derive(Debug, Clone)]
pub struct CreateAccountResult {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// LoginCommand
// =========================================================================

/// Command to exchange credentials for a bearer token
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

// =========================================================================
// UpdateProfileCommand
// =========================================================================

/// Command to apply a sparse profile update
#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub username: String,
    pub changes: ProfileChanges,
}

impl UpdateProfileCommand {
    pub fn new(username: String, changes: ProfileChanges) -> Self {
        Self { username, changes }
    }
}

// =========================================================================
// Journal commands
// =========================================================================

/// Command to record a body-weight measurement
#[derive(Debug, Clone)]
pub struct AppendWeightLogCommand {
    pub username: String,
    pub weight: f64,
    /// Defaults to the time the command is handled; the offset is stored as given
    pub recorded_at: Option<DateTime<FixedOffset>>,
}

impl AppendWeightLogCommand {
    pub fn new(username: String, weight: f64) -> Self {
        Self {
            username,
            weight,
            recorded_at: None,
        }
    }

    pub fn recorded_at(mut self, recorded_at: DateTime<FixedOffset>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }
}

/// Command to append a chat transcript entry
#[derive(Debug, Clone)]
pub struct AppendChatMessageCommand {
    pub username: String,
    pub role: ChatRole,
    pub text: String,
    pub kind: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AppendChatMessageCommand {
    pub fn new(username: String, role: ChatRole, text: String) -> Self {
        Self {
            username,
            role,
            text,
            kind: None,
            image_url: None,
            created_at: None,
        }
    }
}

/// Command to save a meal analysis
#[derive(Debug, Clone)]
pub struct AppendMealCommand {
    pub username: String,
    pub analysis_text: String,
    pub image_name: Option<String>,
}

impl AppendMealCommand {
    pub fn new(username: String, analysis_text: String) -> Self {
        Self {
            username,
            analysis_text,
            image_name: None,
        }
    }

    pub fn with_image_name(mut self, image_name: String) -> Self {
        self.image_name = Some(image_name);
        self
    }
}
