//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::store::{SessionStore, StoreError};

// =========================================================================
// Expired Session Purge Job
// =========================================================================

/// Delete sessions whose expiry has passed
pub async fn purge_expired_sessions(
    sessions: &dyn SessionStore,
    now: DateTime<Utc>,
) -> Result<u64, JobError> {
    let rows_deleted = sessions.purge_expired(now).await?;

    if rows_deleted > 0 {
        tracing::info!(rows_deleted = rows_deleted, "Purged expired sessions");
    }

    Ok(rows_deleted)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval for the expired session purge (default: 5 minutes)
    pub session_purge_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            session_purge_interval: Duration::from_secs(300),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    sessions: Arc<dyn SessionStore>,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create a new job scheduler
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            sessions,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(sessions: Arc<dyn SessionStore>, config: JobSchedulerConfig) -> Self {
        Self { sessions, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!(
            session_purge_interval_secs = self.config.session_purge_interval.as_secs(),
            "Job scheduler started"
        );

        let mut purge_interval = interval(self.config.session_purge_interval);

        loop {
            purge_interval.tick().await;
            if let Err(e) = purge_expired_sessions(self.sessions.as_ref(), Utc::now()).await {
                tracing::error!(error = %e, "Session purge failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match purge_expired_sessions(self.sessions.as_ref(), Utc::now()).await {
            Ok(count) => report.sessions_purged = count,
            Err(e) => report.errors.push(format!("Session purge: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub sessions_purged: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// =========================================================================
// Tests
// =========================================================================
