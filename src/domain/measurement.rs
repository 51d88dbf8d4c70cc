//! Body measurements
//!
//! Domain primitives for body weight and height with validation.
//! Values are checked at construction time, so a `Weight` or `HeightCm`
//! always holds a positive, finite number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound accepted for a body weight in kilograms
const MAX_WEIGHT_KG: f64 = 1000.0;

/// Upper bound accepted for a body height in centimetres
const MAX_HEIGHT_CM: f64 = 300.0;

/// Errors that can occur when creating a measurement
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} exceeds maximum allowed value ({max})")]
    OutOfRange { field: &'static str, max: f64 },
}

fn validate(field: &'static str, value: f64, max: f64) -> Result<f64, MeasurementError> {
    if !value.is_finite() {
        return Err(MeasurementError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(MeasurementError::NotPositive { field, value });
    }
    if value > max {
        return Err(MeasurementError::OutOfRange { field, max });
    }
    Ok(value)
}

/// Body weight in kilograms.
///
/// # Invariants
/// - Finite and strictly positive
/// - At most 1000 kg
///
/// # Example
/// ```
/// use nutrition_coach::domain::Weight;
///
/// let weight = Weight::new(72.5).unwrap();
/// assert_eq!(weight.kilograms(), 72.5);
/// assert!(Weight::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    /// Create a new Weight with validation.
    pub fn new(kilograms: f64) -> Result<Self, MeasurementError> {
        validate("weight", kilograms, MAX_WEIGHT_KG).map(Self)
    }

    /// Get the value in kilograms.
    pub fn kilograms(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} kg", self.0)
    }
}

impl TryFrom<f64> for Weight {
    type Error = MeasurementError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

/// Body height in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct HeightCm(f64);

impl HeightCm {
    /// Create a new HeightCm with validation.
    pub fn new(centimetres: f64) -> Result<Self, MeasurementError> {
        validate("height_cm", centimetres, MAX_HEIGHT_CM).map(Self)
    }

    pub fn centimetres(&self) -> f64 {
        self.0
    }

    pub fn metres(&self) -> f64 {
        self.0 / 100.0
    }
}

impl TryFrom<f64> for HeightCm {
    type Error = MeasurementError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        HeightCm::new(value)
    }
}

impl From<HeightCm> for f64 {
    fn from(height: HeightCm) -> Self {
        height.0
    }
}

impl From<MeasurementError> for super::DomainError {
    fn from(err: MeasurementError) -> Self {
        super::DomainError::InvalidInput(err.to_string())
    }
}
