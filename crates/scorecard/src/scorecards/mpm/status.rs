//! Action-plan health classification.

use rust_decimal::Decimal;

use super::domain::{ActionPlanStatus, QuarterlyData};
use crate::config::ScoringConfig;

/// Health of a single reported quarter.
pub fn classify(actual: Decimal, target: Decimal, thresholds: &ScoringConfig) -> ActionPlanStatus {
    if actual >= target * thresholds.on_track_ratio {
        ActionPlanStatus::OnTrack
    } else if actual >= target * thresholds.at_risk_ratio {
        ActionPlanStatus::AtRisk
    } else {
        ActionPlanStatus::OffTrack
    }
}

/// The most recent quarter that carries an actual, if any.
pub fn latest_reported<'a, I>(rows: I) -> Option<&'a QuarterlyData>
where
    I: IntoIterator<Item = &'a QuarterlyData>,
{
    rows.into_iter()
        .filter(|row| row.actual_value.is_some())
        .max_by(|a, b| a.quarter.cmp(&b.quarter))
}

/// Plan status from its latest reported quarter; On Track when nothing is reported.
pub fn plan_status<'a, I>(rows: I, thresholds: &ScoringConfig) -> ActionPlanStatus
where
    I: IntoIterator<Item = &'a QuarterlyData>,
{
    latest_reported(rows)
        .and_then(|row| {
            row.actual_value
                .map(|actual| classify(actual, row.target_value, thresholds))
        })
        .unwrap_or(ActionPlanStatus::OnTrack)
}
