use rust_decimal::Decimal;
use serde::Deserialize;

use super::{parse_decimal, Cells};
use crate::periods::PeriodId;
use crate::scorecards::common::ScorecardError;
use crate::scorecards::mpm::NewMpmIndicator;

pub(crate) const MPM_COLUMNS: &[&str] = &[
    "KPI",
    "KPI Definition",
    "Weight",
    "UOM",
    "Category",
    "YTD Calculation",
    "Target",
    "Perspective",
];

/// Prefix of optional per-month target columns, e.g. `Target_Jan-25`.
const MONTHLY_TARGET_PREFIX: &str = "Target_";

#[derive(Debug, Deserialize)]
pub(crate) struct MpmIndicatorRow {
    #[serde(rename = "KPI")]
    kpi: String,
    #[serde(rename = "KPI Definition", default)]
    kpi_definition: String,
    #[serde(rename = "Weight")]
    weight: String,
    #[serde(rename = "UOM")]
    uom: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "YTD Calculation")]
    ytd_calculation: String,
    #[serde(rename = "Target")]
    target: String,
    #[serde(rename = "Perspective", default)]
    perspective: Option<String>,
}

impl MpmIndicatorRow {
    /// The indicator plus any `(month, target)` pairs found in `Target_*` columns.
    pub(crate) fn into_new(
        self,
        period_id: PeriodId,
        cells: Cells<'_>,
    ) -> Result<(NewMpmIndicator, Vec<(String, Decimal)>), ScorecardError> {
        if self.kpi.is_empty() {
            return Err(ScorecardError::Validation("KPI must not be empty".to_string()));
        }

        let perspective = match self.perspective.as_deref() {
            None | Some("") => None,
            Some(value) => Some(value.parse()?),
        };

        let mut monthly_targets: Vec<(String, Decimal)> = Vec::new();
        for (month, value) in cells.with_prefix(MONTHLY_TARGET_PREFIX) {
            let month = month.trim();
            if month.is_empty() {
                return Err(ScorecardError::Validation(format!(
                    "column '{MONTHLY_TARGET_PREFIX}' is missing its month"
                )));
            }
            if monthly_targets.iter().any(|(seen, _)| seen == month) {
                return Err(ScorecardError::Validation(format!(
                    "month {month} appears in more than one target column"
                )));
            }
            monthly_targets.push((month.to_string(), parse_decimal(month, value)?));
        }

        let indicator = NewMpmIndicator {
            period_id,
            perspective,
            kpi: self.kpi,
            kpi_definition: self.kpi_definition,
            weight: parse_decimal("weight", &self.weight)?,
            uom: self.uom.parse()?,
            category: self.category.parse()?,
            ytd_calculation: self.ytd_calculation.parse()?,
            target: parse_decimal("target", &self.target)?,
        };
        Ok((indicator, monthly_targets))
    }
}
