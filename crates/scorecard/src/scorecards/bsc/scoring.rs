use rust_decimal::Decimal;
use serde::Serialize;

// Rollup constants used by the scorecard template; reproduced as-is.
const ACTIVE_WEIGHT_FACTOR: Decimal = Decimal::TWO;
const TOTAL_SCORE_FACTOR: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Derived fields stored on every BSC actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BscScore {
    pub score: Decimal,
    pub active_weight: Decimal,
    pub total_score: Decimal,
    pub score_akhir: Decimal,
}

impl BscScore {
    pub fn compute(weight: Decimal, achievement: Decimal) -> Self {
        let score = weight * (achievement / Decimal::ONE_HUNDRED);
        let total_score = score * TOTAL_SCORE_FACTOR;
        Self {
            score,
            active_weight: weight * ACTIVE_WEIGHT_FACTOR,
            total_score,
            score_akhir: total_score,
        }
    }
}
