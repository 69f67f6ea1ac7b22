use super::domain::{Period, PeriodId, PeriodType};
use crate::store::RepositoryError;

/// Storage abstraction for reporting periods. Deleted periods are never returned.
pub trait PeriodRepository: Send + Sync {
    fn insert(&self, period: Period) -> Result<Period, RepositoryError>;
    fn update(&self, period: Period) -> Result<Period, RepositoryError>;
    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError>;
    fn find(
        &self,
        year: i32,
        label: &str,
        period_type: PeriodType,
    ) -> Result<Option<Period>, RepositoryError>;
    fn active(&self) -> Result<Option<Period>, RepositoryError>;
    fn list(&self) -> Result<Vec<Period>, RepositoryError>;
}
