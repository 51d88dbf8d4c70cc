//! Domain module
//!
//! Core domain types and business rules.

pub mod context;
pub mod error;
pub mod measurement;
pub mod period;
pub mod update;

pub use context::OperationContext;
pub use error::DomainError;
pub use measurement::{HeightCm, MeasurementError, Weight};
pub use period::Period;
pub use update::{FieldUpdate, ProfileChanges};
