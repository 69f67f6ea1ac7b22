use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scorecards::common::ScorecardError;
use crate::store::{Lifecycle, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodId(pub Uuid);

impl PeriodId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Active,
    Closed,
}

impl PeriodStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Closed => "Closed",
        }
    }
}

/// Reporting window that owns BSC and MPM indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub period_type: PeriodType,
    pub year: i32,
    /// Month number for monthly periods, `Q1`..`Q4` for quarterly ones.
    pub label: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PeriodStatus,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Period {
    pub fn is_active(&self) -> bool {
        self.status == PeriodStatus::Active
    }
}

impl Record for Period {
    type Id = PeriodId;

    fn id(&self) -> PeriodId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

/// Payload for creating a period; status always starts as Draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPeriod {
    pub period_type: PeriodType,
    pub year: i32,
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial period update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodUpdate {
    pub period_type: Option<PeriodType>,
    pub year: Option<i32>,
    pub label: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PeriodStatus>,
}

/// Filters for the period search; every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PeriodSearch {
    pub period_type: Option<PeriodType>,
    pub year: Option<i32>,
    pub status: Option<PeriodStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PeriodSearch {
    pub(crate) fn matches(&self, period: &Period) -> bool {
        self.period_type.map_or(true, |period_type| period.period_type == period_type)
            && self.year.map_or(true, |year| period.year == year)
            && self.status.map_or(true, |status| period.status == status)
    }
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Normalise and check the period label for its type.
pub(crate) fn normalize_label(period_type: PeriodType, label: &str) -> Result<String, ScorecardError> {
    let label = label.trim();
    match period_type {
        PeriodType::Monthly => match label.parse::<u8>() {
            Ok(month @ 1..=12) => Ok(month.to_string()),
            _ => Err(ScorecardError::Validation(format!(
                "monthly period label '{label}' must be a month number between 1 and 12"
            ))),
        },
        PeriodType::Quarterly => {
            let upper = label.to_ascii_uppercase();
            if matches!(upper.as_str(), "Q1" | "Q2" | "Q3" | "Q4") {
                Ok(upper)
            } else {
                Err(ScorecardError::Validation(format!(
                    "quarterly period label '{label}' must be one of Q1, Q2, Q3, Q4"
                )))
            }
        }
        PeriodType::Yearly => {
            if label.is_empty() {
                Err(ScorecardError::Validation(
                    "yearly period label must not be empty".to_string(),
                ))
            } else {
                Ok(label.to_string())
            }
        }
    }
}

/// Display name such as `Jan-25`, `Q1-2025`, or `FY-2025`.
pub(crate) fn display_name(period_type: PeriodType, label: &str, year: i32) -> String {
    match period_type {
        PeriodType::Monthly => {
            let short_year = year.rem_euclid(100);
            let month = label
                .parse::<usize>()
                .ok()
                .and_then(|month| MONTHS.get(month.wrapping_sub(1)))
                .copied()
                .unwrap_or(label);
            format!("{month}-{short_year:02}")
        }
        PeriodType::Quarterly => format!("{label}-{year}"),
        PeriodType::Yearly => format!("FY-{year}"),
    }
}
