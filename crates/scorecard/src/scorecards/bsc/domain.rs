use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scoring::BscScore;
use crate::periods::PeriodId;
use crate::scorecards::common::{
    optional_text_or_number, text_or_number, ActualId, Calculation, Category, IndicatorId,
    Perspective, UnitOfMeasure,
};
use crate::store::{Lifecycle, Record};

/// Balanced Scorecard indicator definition owned by a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BscIndicator {
    pub id: IndicatorId,
    pub period_id: PeriodId,
    pub perspective: Perspective,
    pub code: String,
    pub kpi: String,
    pub kpi_definition: String,
    pub weight: Decimal,
    pub uom: UnitOfMeasure,
    pub category: Category,
    pub calculation: Calculation,
    /// Numeric or textual target, kept verbatim.
    pub target: String,
    pub related_pic: Option<String>,
    pub is_active: bool,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for BscIndicator {
    type Id = IndicatorId;

    fn id(&self) -> IndicatorId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBscIndicator {
    pub period_id: PeriodId,
    pub perspective: Perspective,
    pub code: String,
    pub kpi: String,
    #[serde(default)]
    pub kpi_definition: String,
    pub weight: Decimal,
    pub uom: UnitOfMeasure,
    pub category: Category,
    pub calculation: Calculation,
    #[serde(deserialize_with = "text_or_number")]
    pub target: String,
    #[serde(default)]
    pub related_pic: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BscIndicatorUpdate {
    pub period_id: Option<PeriodId>,
    pub perspective: Option<Perspective>,
    pub code: Option<String>,
    pub kpi: Option<String>,
    pub kpi_definition: Option<String>,
    pub weight: Option<Decimal>,
    pub uom: Option<UnitOfMeasure>,
    pub category: Option<Category>,
    pub calculation: Option<Calculation>,
    #[serde(deserialize_with = "optional_text_or_number")]
    pub target: Option<String>,
    pub related_pic: Option<String>,
    pub is_active: Option<bool>,
}

impl BscIndicator {
    pub(crate) fn apply(&mut self, update: BscIndicatorUpdate) {
        if let Some(period_id) = update.period_id {
            self.period_id = period_id;
        }
        if let Some(perspective) = update.perspective {
            self.perspective = perspective;
        }
        if let Some(code) = update.code {
            self.code = code;
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
        if let Some(calculation) = update.calculation {
            self.calculation = calculation;
        }
        if let Some(target) = update.target {
            self.target = target;
        }
        if update.related_pic.is_some() {
            self.related_pic = update.related_pic;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}

/// Indicator search filters. `code` matches as a substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BscIndicatorSearch {
    pub period_id: Option<PeriodId>,
    pub perspective: Option<Perspective>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl BscIndicatorSearch {
    pub(crate) fn matches(&self, indicator: &BscIndicator) -> bool {
        self.period_id.map_or(true, |period_id| indicator.period_id == period_id)
            && self
                .perspective
                .map_or(true, |perspective| indicator.perspective == perspective)
            && self
                .code
                .as_deref()
                .map_or(true, |code| indicator.code.contains(code))
            && self.is_active.map_or(true, |is_active| indicator.is_active == is_active)
    }
}

/// Reported BSC actual with its server-derived score fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BscActual {
    pub id: ActualId,
    pub indicator_id: IndicatorId,
    pub actual_value: String,
    pub achievement: Decimal,
    pub score: Decimal,
    pub active_weight: Decimal,
    pub total_score: Decimal,
    pub score_akhir: Decimal,
    pub problem_identification: Option<String>,
    pub corrective_action: Option<String>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BscActual {
    pub(crate) fn set_score(&mut self, score: BscScore) {
        self.score = score.score;
        self.active_weight = score.active_weight;
        self.total_score = score.total_score;
        self.score_akhir = score.score_akhir;
    }
}

impl Record for BscActual {
    type Id = ActualId;

    fn id(&self) -> ActualId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBscActual {
    pub indicator_id: IndicatorId,
    #[serde(deserialize_with = "text_or_number")]
    pub actual_value: String,
    pub achievement: Decimal,
    #[serde(default)]
    pub problem_identification: Option<String>,
    #[serde(default)]
    pub corrective_action: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BscActualUpdate {
    #[serde(deserialize_with = "optional_text_or_number")]
    pub actual_value: Option<String>,
    pub achievement: Option<Decimal>,
    pub problem_identification: Option<String>,
    pub corrective_action: Option<String>,
}
