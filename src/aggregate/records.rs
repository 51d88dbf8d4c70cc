//! Embedded records
//!
//! Append-only collections stored inside an account document.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Weight;

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, naive date-times (read as UTC) and bare
/// dates (midnight UTC). The offset is kept so the recorded calendar day
/// survives.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// A single body-weight measurement.
///
/// `recorded_at` is kept as the ISO-8601 text it was stored with; documents
/// written by older clients may hold naive timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLogEntry {
    pub weight: f64,
    pub recorded_at: String,
}

impl WeightLogEntry {
    pub fn new<Tz>(weight: Weight, recorded_at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            weight: weight.kilograms(),
            recorded_at: recorded_at.to_rfc3339(),
        }
    }

    /// Parsed timestamp, `None` if the stored text is unreadable
    pub fn recorded_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.recorded_at)
    }
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

/// A chat transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "imageUrl", alias = "image_url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A saved meal analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub analysis_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2024-01-02T10:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let parsed = parse_timestamp("2024-01-02T10:30:00.123456").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let parsed = parse_timestamp("2024-01-02T10:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date() {
        let parsed = parse_timestamp("2024-01-03").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_weight_log_entry_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let entry = WeightLogEntry::new(Weight::new(80.0).unwrap(), at);

        assert_eq!(entry.weight, 80.0);
        assert_eq!(entry.recorded_at(), Some(at.fixed_offset()));
    }

    #[test]
    fn test_offset_is_preserved() {
        let parsed = parse_timestamp("2024-01-02T00:30:00+02:00").unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        let entry = WeightLogEntry::new(Weight::new(80.0).unwrap(), parsed);
        assert_eq!(entry.recorded_at, "2024-01-02T00:30:00+02:00");
        assert_eq!(entry.recorded_at(), Some(parsed));
    }

    #[test]
    fn test_chat_entry_wire_names() {
        let json = r#"{
            "role": "bot",
            "text": "Drink more water",
            "type": "text",
            "imageUrl": "https://example.com/plate.jpg",
            "created_at": "2024-01-01T08:00:00Z"
        }"#;

        let entry: ChatEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.role, ChatRole::Bot);
        assert_eq!(entry.kind.as_deref(), Some("text"));

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["imageUrl"], "https://example.com/plate.jpg");
    }
}
