use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::store::RepositoryError;

/// Identifier wrapper for BSC and MPM indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(pub Uuid);

impl IndicatorId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for reported actuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActualId(pub Uuid);

impl ActualId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ActualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    Financial,
    Customer,
    InternalBusinessProcess,
    LearningGrowth,
}

impl Perspective {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Financial,
            Self::Customer,
            Self::InternalBusinessProcess,
            Self::LearningGrowth,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Financial => "Financial",
            Self::Customer => "Customer",
            Self::InternalBusinessProcess => "Internal Business Process",
            Self::LearningGrowth => "Learning & Growth",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Customer => "customer",
            Self::InternalBusinessProcess => "internal_business_process",
            Self::LearningGrowth => "learning_growth",
        }
    }
}

impl FromStr for Perspective {
    type Err = ScorecardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        find_variant(Self::ordered(), value, "perspective", |variant| {
            (variant.label(), variant.key())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Currency,
    Number,
    Days,
    Percentage,
    Kriteria,
    NumberTon,
}

impl UnitOfMeasure {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Currency,
            Self::Number,
            Self::Days,
            Self::Percentage,
            Self::Kriteria,
            Self::NumberTon,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Currency => "Currency",
            Self::Number => "Number",
            Self::Days => "Days",
            Self::Percentage => "%",
            Self::Kriteria => "Kriteria",
            Self::NumberTon => "Number (Ton)",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Number => "number",
            Self::Days => "days",
            Self::Percentage => "percentage",
            Self::Kriteria => "kriteria",
            Self::NumberTon => "number_ton",
        }
    }
}

impl FromStr for UnitOfMeasure {
    type Err = ScorecardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        find_variant(Self::ordered(), value, "unit of measure", |variant| {
            (variant.label(), variant.key())
        })
    }
}

/// Polarity rule describing which direction of the actual is "better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Max,
    Min,
    OnTarget,
    MaxIs100,
    MinIs0,
}

impl Category {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Max,
            Self::Min,
            Self::OnTarget,
            Self::MaxIs100,
            Self::MinIs0,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Max => "Max",
            Self::Min => "Min",
            Self::OnTarget => "On Target",
            Self::MaxIs100 => "Max is 100",
            Self::MinIs0 => "Min is 0",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::OnTarget => "on_target",
            Self::MaxIs100 => "max_is100",
            Self::MinIs0 => "min_is0",
        }
    }

    /// MPM indicators only carry the three basic polarities.
    pub const fn allowed_for_mpm(self) -> bool {
        matches!(self, Self::Max | Self::Min | Self::OnTarget)
    }
}

impl FromStr for Category {
    type Err = ScorecardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        find_variant(Self::ordered(), value, "category", |variant| {
            (variant.label(), variant.key())
        })
    }
}

/// Year-to-date calculation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calculation {
    Average,
    Accumulative,
    LastValue,
}

impl Calculation {
    pub const fn ordered() -> [Self; 3] {
        [Self::Average, Self::Accumulative, Self::LastValue]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Accumulative => "Accumulative",
            Self::LastValue => "Last Value",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Accumulative => "accumulative",
            Self::LastValue => "last_value",
        }
    }
}

impl FromStr for Calculation {
    type Err = ScorecardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        find_variant(Self::ordered(), value, "calculation", |variant| {
            (variant.label(), variant.key())
        })
    }
}

/// Error raised by the scorecard, period, and import services.
#[derive(Debug, thiserror::Error)]
pub enum ScorecardError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScorecardError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

fn find_variant<T, const N: usize>(
    variants: [T; N],
    value: &str,
    field: &str,
    names: impl Fn(T) -> (&'static str, &'static str),
) -> Result<T, ScorecardError>
where
    T: Copy,
{
    let value = value.trim();
    variants
        .into_iter()
        .find(|variant| {
            let (label, key) = names(*variant);
            label.eq_ignore_ascii_case(value) || key.eq_ignore_ascii_case(value)
        })
        .ok_or_else(|| ScorecardError::Validation(format!("unknown {field} '{value}'")))
}

/// Accepts either a JSON string or a JSON number for free-form value fields.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

pub(crate) fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "text_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(value)| value))
}

const MAX_WEIGHT: Decimal = Decimal::ONE_HUNDRED;

pub fn validate_weight(weight: Decimal) -> Result<(), ScorecardError> {
    if weight < Decimal::ZERO || weight > MAX_WEIGHT {
        return Err(ScorecardError::Validation(format!(
            "weight {weight} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Over-achievement is allowed; negative achievement is not.
pub fn validate_achievement(achievement: Decimal) -> Result<(), ScorecardError> {
    if achievement < Decimal::ZERO {
        return Err(ScorecardError::Validation(format!(
            "achievement {achievement} must not be negative"
        )));
    }
    Ok(())
}
