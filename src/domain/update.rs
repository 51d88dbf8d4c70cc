//! Sparse profile updates
//!
//! JSON patch bodies distinguish three states per field: absent (leave the
//! stored value alone), explicit `null` (clear it), and a value (overwrite).

use serde::{Deserialize, Deserializer};

/// Tri-state field change
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate<T> {
    /// Field not present in the request
    Unset,
    /// Field present as `null`
    Clear,
    /// Field present with a value
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Write this change into a stored optional field.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Self::Unset => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }

    /// Validate or convert the carried value, keeping the state.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        Ok(match self {
            Self::Unset => FieldUpdate::Unset,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(value) => FieldUpdate::Set(f(value)?),
        })
    }
}

// Only called when the key is present; a missing key falls back to `Default`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

/// Requested changes to an account profile
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileChanges {
    #[serde(default, alias = "nome")]
    pub display_name: FieldUpdate<String>,

    #[serde(default, alias = "objetivo")]
    pub objective: FieldUpdate<String>,

    #[serde(default)]
    pub height_cm: FieldUpdate<f64>,

    #[serde(default)]
    pub initial_weight: FieldUpdate<f64>,

    /// Appends a weight log instead of editing a stored field
    #[serde(default)]
    pub current_weight: Option<f64>,
}

impl ProfileChanges {
    /// True when no field was supplied at all
    pub fn is_empty(&self) -> bool {
        self.display_name.is_unset()
            && self.objective.is_unset()
            && self.height_cm.is_unset()
            && self.initial_weight.is_unset()
            && self.current_weight.is_none()
    }
}
