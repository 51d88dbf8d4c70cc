//! Aggregate module
//!
//! The account document and the records embedded in it.

pub mod account;
pub mod records;

pub use account::{Account, AccountProfile, ProfileSeed, MIN_PASSWORD_LEN};
pub use records::{parse_timestamp, ChatEntry, ChatRole, MealEntry, WeightLogEntry};
