//! Metrics Engine
//!
//! Pure computations over an account's weight-log history: recency
//! filtering, chronological ordering and the dashboard summary.
//! Nothing here touches storage, so results depend only on the inputs.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate::{Account, WeightLogEntry};
use crate::domain::Period;

/// A weight-log entry with its timestamp parsed, in the offset it was recorded with
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedWeight {
    pub weight: f64,
    pub recorded_at: DateTime<FixedOffset>,
}

/// One point of the dashboard chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

/// Dashboard summary for one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub objective: Option<String>,
    pub height_cm: Option<f64>,
    pub initial_weight: Option<f64>,
    pub current_weight: Option<f64>,
    pub weight_lost: Option<f64>,
    pub bmi: Option<f64>,
    pub progress_percent: f64,
    pub history: Vec<HistoryPoint>,
}

// =========================================================================
// Weight-log ordering and filtering
// =========================================================================

/// Parse, sort and window a weight-log collection.
///
/// Entries whose timestamp cannot be parsed are dropped. The sort is stable,
/// so entries sharing a timestamp keep their insertion order. Entries at or
/// after the period's cutoff are kept.
pub fn chronological(logs: &[WeightLogEntry], period: Period, now: DateTime<Utc>) -> Vec<DatedWeight> {
    let mut dated: Vec<DatedWeight> = logs
        .iter()
        .filter_map(|entry| match entry.recorded_at() {
            Some(recorded_at) => Some(DatedWeight {
                weight: entry.weight,
                recorded_at,
            }),
            None => {
                tracing::warn!(
                    recorded_at = %entry.recorded_at,
                    "Discarding weight log with unparseable timestamp"
                );
                None
            }
        })
        .collect();

    dated.sort_by_key(|entry| entry.recorded_at);

    if let Some(cutoff) = period.cutoff(now) {
        let cutoff = cutoff.fixed_offset();
        dated.retain(|entry| entry.recorded_at >= cutoff);
    }

    dated
}

// =========================================================================
// Summary statistics
// =========================================================================

/// Zero counts as "not provided" for stored weights and heights.
fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Body-mass index: weight (kg) / height (m)².
pub fn compute_bmi(weight: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let weight = non_zero(weight)?;
    let height_m = non_zero(height_cm)? / 100.0;
    Some(weight / (height_m * height_m))
}

/// Weight change since signup; positive means weight was lost.
pub fn compute_weight_lost(initial: Option<f64>, current: Option<f64>) -> Option<f64> {
    Some(non_zero(initial)? - non_zero(current)?)
}

/// Share of the initial weight lost, clamped to `[0, 100]`.
pub fn compute_progress(initial: Option<f64>, current: Option<f64>) -> f64 {
    match (non_zero(initial), current) {
        (Some(initial), Some(current)) => {
            let pct = (initial - current) / initial * 100.0;
            pct.clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

// =========================================================================
// Dashboard
// =========================================================================

/// Build the dashboard report for an account.
pub fn dashboard(account: &Account, period: Period, now: DateTime<Utc>) -> DashboardReport {
    let logs = chronological(account.weight_logs(), period, now);

    let current_weight = logs.last().map(|entry| entry.weight);
    let initial_weight = account.initial_weight();
    let height_cm = account.height_cm();

    let history = logs
        .iter()
        .map(|entry| HistoryPoint {
            date: entry.recorded_at.date_naive(),
            weight: entry.weight,
        })
        .collect();

    DashboardReport {
        objective: account.objective().map(str::to_string),
        height_cm,
        initial_weight,
        current_weight,
        weight_lost: compute_weight_lost(initial_weight, current_weight),
        bmi: compute_bmi(current_weight, height_cm),
        progress_percent: compute_progress(initial_weight, current_weight),
        history,
    }
}
