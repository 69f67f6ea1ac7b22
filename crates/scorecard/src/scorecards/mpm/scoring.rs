use rust_decimal::Decimal;

/// Weighted MPM score: `weight × achievement / 100`.
pub fn mpm_score(weight: Decimal, achievement: Decimal) -> Decimal {
    weight * achievement / Decimal::ONE_HUNDRED
}
