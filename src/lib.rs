//! nutrition_coach Library
//!
//! Re-exports modules for integration testing and the server binary.

pub mod aggregate;
pub mod analysis;
pub mod api;
pub mod auth;
pub mod domain;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod store;

pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainError, OperationContext, Period, Weight};
pub use aggregate::{Account, AccountProfile};
pub use metrics::DashboardReport;
