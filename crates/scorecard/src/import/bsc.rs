use serde::Deserialize;

use super::parse_decimal;
use crate::periods::PeriodId;
use crate::scorecards::bsc::NewBscIndicator;
use crate::scorecards::common::ScorecardError;

pub(crate) const BSC_COLUMNS: &[&str] = &[
    "Perspective",
    "Code",
    "KPI",
    "KPI Definition",
    "Weight",
    "UOM",
    "Category",
    "Calculation",
    "Target",
    "Related PIC",
];

/// One BSC indicator row, as exported from the scorecard template.
#[derive(Debug, Deserialize)]
pub(crate) struct BscIndicatorRow {
    #[serde(rename = "Perspective")]
    perspective: String,
    #[serde(rename = "Code")]
    code: String,
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
    #[serde(rename = "Calculation")]
    calculation: String,
    #[serde(rename = "Target")]
    target: String,
    #[serde(rename = "Related PIC", default)]
    related_pic: Option<String>,
}

impl BscIndicatorRow {
    pub(crate) fn into_new(self, period_id: PeriodId) -> Result<NewBscIndicator, ScorecardError> {
        if self.code.is_empty() {
            return Err(ScorecardError::Validation("code must not be empty".to_string()));
        }

        Ok(NewBscIndicator {
            period_id,
            perspective: self.perspective.parse()?,
            code: self.code,
            kpi: self.kpi,
            kpi_definition: self.kpi_definition,
            weight: parse_decimal("weight", &self.weight)?,
            uom: self.uom.parse()?,
            category: self.category.parse()?,
            calculation: self.calculation.parse()?,
            target: self.target,
            related_pic: self.related_pic.filter(|pic| !pic.is_empty()),
        })
    }
}
