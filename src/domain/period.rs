//! Recency window for weight-log queries.
//!
//! A period is written as `<integer><unit>`: `7d`, `30d`, `1y`.
//! A year counts as 365 days, not calendar-aware.

use chrono::{DateTime, Duration, Utc};

use super::DomainError;

const DAYS_PER_YEAR: i64 = 365;

/// Parsed recency window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Keep every entry
    All,
    Days(i64),
    Years(i64),
}

impl Period {
    /// Parse an optional period string.
    ///
    /// - absent or empty: no filtering
    /// - quantity prefix that is not an integer: `InvalidPeriodFormat`
    /// - integer quantity with an unknown unit: no filtering
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(Self::All),
        };

        let mut chars = raw.chars();
        let unit = chars.next_back();
        let quantity: i64 = chars
            .as_str()
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidPeriodFormat(raw.to_string()))?;

        let period = match unit {
            Some('d') => Self::Days(quantity),
            Some('y') => Self::Years(quantity),
            _ => {
                tracing::debug!(period = raw, "Unrecognized period unit, not filtering");
                Self::All
            }
        };

        // Reject windows that cannot be represented before anything is filtered.
        if period != Self::All && period.window().is_none() {
            return Err(DomainError::InvalidPeriodFormat(raw.to_string()));
        }

        Ok(period)
    }

    fn window(&self) -> Option<Duration> {
        match *self {
            Self::All => None,
            Self::Days(days) => Duration::try_days(days),
            Self::Years(years) => years
                .checked_mul(DAYS_PER_YEAR)
                .and_then(Duration::try_days),
        }
    }

    /// Earliest timestamp kept by this window, or `None` when unbounded.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window()
            .and_then(|window| now.checked_sub_signed(window))
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::All
    }
}
