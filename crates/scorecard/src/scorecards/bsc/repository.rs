use super::domain::{BscActual, BscIndicator};
use crate::periods::PeriodId;
use crate::scorecards::common::{ActualId, IndicatorId};
use crate::store::RepositoryError;

/// Indicator storage. Reads never return deleted indicators.
pub trait BscIndicatorRepository: Send + Sync {
    fn insert(&self, indicator: BscIndicator) -> Result<BscIndicator, RepositoryError>;
    fn update(&self, indicator: BscIndicator) -> Result<BscIndicator, RepositoryError>;
    fn fetch(&self, id: IndicatorId) -> Result<Option<BscIndicator>, RepositoryError>;
    fn by_period(&self, period_id: PeriodId) -> Result<Vec<BscIndicator>, RepositoryError>;
    /// Every live indicator in insertion order.
    fn list(&self) -> Result<Vec<BscIndicator>, RepositoryError>;
    fn by_code(
        &self,
        code: &str,
        period_id: PeriodId,
    ) -> Result<Option<BscIndicator>, RepositoryError>;
}

/// Actual storage.
pub trait BscActualRepository: Send + Sync {
    fn insert(&self, actual: BscActual) -> Result<BscActual, RepositoryError>;
    fn update(&self, actual: BscActual) -> Result<BscActual, RepositoryError>;
    fn fetch(&self, id: ActualId) -> Result<Option<BscActual>, RepositoryError>;
    /// Newest first by creation time; equal timestamps keep insertion order.
    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<BscActual>, RepositoryError>;

    fn latest_for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Option<BscActual>, RepositoryError> {
        Ok(self.for_indicator(indicator_id)?.into_iter().next())
    }
}
