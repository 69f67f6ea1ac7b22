use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::periods::PeriodId;
use crate::scorecards::common::{
    ActualId, Calculation, Category, IndicatorId, Perspective, ScorecardError, UnitOfMeasure,
};
use crate::store::{Lifecycle, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyTargetId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPlanId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MpmApproverId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuarterlyDataId(pub Uuid);

impl MonthlyTargetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl ActionPlanId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl MpmApproverId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MpmApproverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl QuarterlyDataId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MonthlyTargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for ActionPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for QuarterlyDataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Management Performance Measurement indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpmIndicator {
    pub id: IndicatorId,
    pub period_id: PeriodId,
    pub perspective: Option<Perspective>,
    /// Position within the perspective, assigned on create.
    pub kpi_number: Option<u32>,
    pub kpi: String,
    pub kpi_definition: String,
    pub weight: Decimal,
    pub uom: UnitOfMeasure,
    pub category: Category,
    pub ytd_calculation: Calculation,
    pub target: Decimal,
    pub is_active: bool,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for MpmIndicator {
    type Id = IndicatorId;

    fn id(&self) -> IndicatorId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMpmIndicator {
    pub period_id: PeriodId,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    pub kpi: String,
    #[serde(default)]
    pub kpi_definition: String,
    pub weight: Decimal,
    pub uom: UnitOfMeasure,
    pub category: Category,
    pub ytd_calculation: Calculation,
    pub target: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpmIndicatorUpdate {
    pub perspective: Option<Perspective>,
    pub kpi_number: Option<u32>,
    pub kpi: Option<String>,
    pub kpi_definition: Option<String>,
    pub weight: Option<Decimal>,
    pub uom: Option<UnitOfMeasure>,
    pub category: Option<Category>,
    pub ytd_calculation: Option<Calculation>,
    pub target: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl MpmIndicator {
    pub(crate) fn apply(&mut self, update: MpmIndicatorUpdate) {
        if update.perspective.is_some() {
            self.perspective = update.perspective;
        }
        if update.kpi_number.is_some() {
            self.kpi_number = update.kpi_number;
        }
        if let Some(kpi) = update.kpi {
            self.kpi = kpi;
        }
        if let Some(definition) = update.kpi_definition {
            self.kpi_definition = definition;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(uom) = update.uom {
            self.uom = uom;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(calculation) = update.ytd_calculation {
            self.ytd_calculation = calculation;
        }
        if let Some(target) = update.target {
            self.target = target;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}

/// Indicator search filters. `kpi` matches as a substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MpmIndicatorSearch {
    pub period_id: Option<PeriodId>,
    pub perspective: Option<Perspective>,
    pub kpi: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl MpmIndicatorSearch {
    pub(crate) fn matches(&self, indicator: &MpmIndicator) -> bool {
        self.period_id.map_or(true, |period_id| indicator.period_id == period_id)
            && self
                .perspective
                .map_or(true, |perspective| indicator.perspective == Some(perspective))
            && self
                .kpi
                .as_deref()
                .map_or(true, |kpi| indicator.kpi.contains(kpi))
            && self.is_active.map_or(true, |is_active| indicator.is_active == is_active)
    }
}

/// Target for one month, keyed by a month label such as `Jan-25`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTarget {
    pub id: MonthlyTargetId,
    pub indicator_id: IndicatorId,
    pub month: String,
    pub target_value: Decimal,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for MonthlyTarget {
    type Id = MonthlyTargetId;

    fn id(&self) -> MonthlyTargetId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMonthlyTarget {
    pub indicator_id: IndicatorId,
    pub month: String,
    pub target_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyTargetUpdate {
    pub month: Option<String>,
    pub target_value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpmActual {
    pub id: ActualId,
    pub indicator_id: IndicatorId,
    pub actual_value: Decimal,
    pub achievement: Decimal,
    pub score: Decimal,
    pub problem_identification: Option<String>,
    pub corrective_action: Option<String>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for MpmActual {
    type Id = ActualId;

    fn id(&self) -> ActualId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMpmActual {
    pub indicator_id: IndicatorId,
    pub actual_value: Decimal,
    pub achievement: Decimal,
    #[serde(default)]
    pub problem_identification: Option<String>,
    #[serde(default)]
    pub corrective_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpmActualUpdate {
    pub actual_value: Option<Decimal>,
    pub achievement: Option<Decimal>,
    pub problem_identification: Option<String>,
    pub corrective_action: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPlanStatus {
    #[default]
    OnTrack,
    AtRisk,
    OffTrack,
}

impl ActionPlanStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::OnTrack, Self::AtRisk, Self::OffTrack]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::AtRisk => "At Risk",
            Self::OffTrack => "Off Track",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: ActionPlanId,
    pub indicator_id: IndicatorId,
    pub description: String,
    pub responsible_person: String,
    pub deadline: NaiveDate,
    pub status: ActionPlanStatus,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ActionPlan {
    type Id = ActionPlanId;

    fn id(&self) -> ActionPlanId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActionPlan {
    pub indicator_id: IndicatorId,
    pub description: String,
    pub responsible_person: String,
    pub deadline: NaiveDate,
}

/// Editable plan fields. Status stays with the recompute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPlanUpdate {
    pub description: Option<String>,
    pub responsible_person: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl ActionPlan {
    pub(crate) fn apply(&mut self, update: ActionPlanUpdate) {
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(responsible_person) = update.responsible_person {
            self.responsible_person = responsible_person;
        }
        if let Some(deadline) = update.deadline {
            self.deadline = deadline;
        }
    }
}

/// Person who signs off MPM results. `user_id` links an account held elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpmApprover {
    pub id: MpmApproverId,
    pub name: String,
    pub position: String,
    pub department: String,
    pub user_id: Option<Uuid>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for MpmApprover {
    type Id = MpmApproverId;

    fn id(&self) -> MpmApproverId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMpmApprover {
    pub name: String,
    pub position: String,
    pub department: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpmApproverUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub user_id: Option<Uuid>,
}

impl MpmApprover {
    pub(crate) fn apply(&mut self, update: MpmApproverUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(department) = update.department {
            self.department = department;
        }
        if update.user_id.is_some() {
            self.user_id = update.user_id;
        }
    }
}

/// Quarter label `Q1`..`Q4`, optionally tagged with a year (`Q3 2025`).
///
/// Ordering is chronological: year first, then quarter. Untagged labels sort
/// before any tagged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuarterLabel {
    year: Option<i32>,
    quarter: u8,
}

impl QuarterLabel {
    pub fn new(quarter: u8, year: Option<i32>) -> Result<Self, ScorecardError> {
        if !(1..=4).contains(&quarter) {
            return Err(ScorecardError::Validation(format!(
                "quarter {quarter} must be between 1 and 4"
            )));
        }
        Ok(Self { year, quarter })
    }

    pub fn quarter(self) -> u8 {
        self.quarter
    }

    pub fn year(self) -> Option<i32> {
        self.year
    }
}

impl std::str::FromStr for QuarterLabel {
    type Err = ScorecardError;

    /// Accepts `Q1`, `q2`, `Q3 2025`, and `Q4-2025`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ScorecardError::Validation(format!(
                "quarter '{value}' must look like Q1..Q4 with an optional year"
            ))
        };

        let trimmed = value.trim();
        let rest = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .ok_or_else(invalid)?;
        let mut chars = rest.chars();
        let quarter = chars
            .next()
            .and_then(|digit| digit.to_digit(10))
            .ok_or_else(invalid)?;

        let suffix = chars.as_str();
        let year = if suffix.is_empty() {
            None
        } else {
            let year = suffix
                .strip_prefix(' ')
                .or_else(|| suffix.strip_prefix('-'))
                .ok_or_else(invalid)?;
            Some(year.trim().parse::<i32>().map_err(|_| invalid())?)
        };

        Self::new(quarter as u8, year).map_err(|_| invalid())
    }
}

impl TryFrom<String> for QuarterLabel {
    type Error = ScorecardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuarterLabel> for String {
    fn from(label: QuarterLabel) -> Self {
        label.to_string()
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "Q{} {year}", self.quarter),
            None => write!(f, "Q{}", self.quarter),
        }
    }
}

/// Target and optional reported actual for one quarter of an action plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyData {
    pub id: QuarterlyDataId,
    pub action_plan_id: ActionPlanId,
    pub quarter: QuarterLabel,
    pub target_value: Decimal,
    pub actual_value: Option<Decimal>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for QuarterlyData {
    type Id = QuarterlyDataId;

    fn id(&self) -> QuarterlyDataId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuarterlyData {
    pub action_plan_id: ActionPlanId,
    pub quarter: QuarterLabel,
    pub target_value: Decimal,
    #[serde(default)]
    pub actual_value: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyDataUpdate {
    pub target_value: Option<Decimal>,
    pub actual_value: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_labels_parse_with_and_without_year() {
        let plain: QuarterLabel = "q2".parse().expect("plain");
        assert_eq!(plain.to_string(), "Q2");
        assert_eq!(plain.year(), None);

        let dashed: QuarterLabel = "Q4-2025".parse().expect("dashed");
        assert_eq!(dashed.to_string(), "Q4 2025");
        assert_eq!("Q4 2025".parse::<QuarterLabel>().expect("spaced"), dashed);

        assert!("Q5".parse::<QuarterLabel>().is_err());
        assert!("Q1 twenty".parse::<QuarterLabel>().is_err());
        assert!("H1".parse::<QuarterLabel>().is_err());
        assert!("Q12".parse::<QuarterLabel>().is_err());
    }

    #[test]
    fn quarter_labels_order_chronologically() {
        let q4_2024: QuarterLabel = "Q4 2024".parse().expect("label");
        let q1_2025: QuarterLabel = "Q1 2025".parse().expect("label");
        let q3: QuarterLabel = "Q3".parse().expect("label");
        assert!(q1_2025 > q4_2024);
        assert!(q3 < q4_2024);
        assert!("Q2".parse::<QuarterLabel>().expect("label") < q3);
    }

    #[test]
    fn quarter_label_serializes_as_text() {
        let label: QuarterLabel = "Q1 2025".parse().expect("label");
        let json = serde_json::to_string(&label).expect("serialize");
        assert_eq!(json, "\"Q1 2025\"");
        let back: QuarterLabel = serde_json::from_str("\"q1-2025\"").expect("deserialize");
        assert_eq!(back, label);
    }
}
