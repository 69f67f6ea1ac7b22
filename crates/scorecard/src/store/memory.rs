use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{Record, RepositoryError};
use crate::periods::{Period, PeriodId, PeriodRepository, PeriodType};
use crate::scorecards::bsc::{BscActual, BscActualRepository, BscIndicator, BscIndicatorRepository};
use crate::scorecards::common::{ActualId, IndicatorId, Perspective};
use crate::scorecards::mpm::{
    ActionPlan, ActionPlanId, ActionPlanRepository, MonthlyTarget, MonthlyTargetId,
    MonthlyTargetRepository, MpmActual, MpmActualRepository, MpmApprover, MpmApproverId,
    MpmApproverRepository, MpmIndicator, MpmIndicatorRepository, MpmStore, QuarterlyData,
    QuarterlyDataId, QuarterlyDataRepository,
};

/// Insertion-ordered table. Every read skips soft-deleted rows.
pub struct MemoryTable<T> {
    rows: Mutex<Vec<T>>,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>, RepositoryError> {
        self.rows
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn insert(&self, row: T) -> Result<T, RepositoryError> {
        let mut rows = self.lock()?;
        if rows.iter().any(|existing| existing.id() == row.id()) {
            return Err(RepositoryError::Conflict);
        }
        rows.push(row.clone());
        Ok(row)
    }

    /// Replace a stored row in place. Deleted rows cannot be updated.
    pub fn update(&self, row: T) -> Result<T, RepositoryError> {
        let mut rows = self.lock()?;
        let slot = rows
            .iter_mut()
            .find(|existing| existing.id() == row.id() && existing.lifecycle().is_live())
            .ok_or(RepositoryError::NotFound)?;
        *slot = row.clone();
        Ok(row)
    }

    pub fn fetch(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .find(|row| row.id() == id && row.lifecycle().is_live())
            .cloned())
    }

    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, RepositoryError>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .filter(|row| row.lifecycle().is_live() && predicate(row))
            .cloned()
            .collect())
    }

    pub fn first<F>(&self, predicate: F) -> Result<Option<T>, RepositoryError>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .find(|row| row.lifecycle().is_live() && predicate(row))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPeriodRepository {
    table: Arc<MemoryTable<Period>>,
}

impl PeriodRepository for InMemoryPeriodRepository {
    fn insert(&self, period: Period) -> Result<Period, RepositoryError> {
        self.table.insert(period)
    }

    fn update(&self, period: Period) -> Result<Period, RepositoryError> {
        self.table.update(period)
    }

    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError> {
        self.table.fetch(id)
    }

    fn find(
        &self,
        year: i32,
        label: &str,
        period_type: PeriodType,
    ) -> Result<Option<Period>, RepositoryError> {
        self.table.first(|period| {
            period.year == year && period.label == label && period.period_type == period_type
        })
    }

    fn active(&self) -> Result<Option<Period>, RepositoryError> {
        self.table.first(|period| period.is_active())
    }

    fn list(&self) -> Result<Vec<Period>, RepositoryError> {
        self.table.filter(|_| true)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBscIndicatorRepository {
    table: Arc<MemoryTable<BscIndicator>>,
}

impl BscIndicatorRepository for InMemoryBscIndicatorRepository {
    fn insert(&self, indicator: BscIndicator) -> Result<BscIndicator, RepositoryError> {
        self.table.insert(indicator)
    }

    fn update(&self, indicator: BscIndicator) -> Result<BscIndicator, RepositoryError> {
        self.table.update(indicator)
    }

    fn fetch(&self, id: IndicatorId) -> Result<Option<BscIndicator>, RepositoryError> {
        self.table.fetch(id)
    }

    fn by_period(&self, period_id: PeriodId) -> Result<Vec<BscIndicator>, RepositoryError> {
        self.table.filter(|indicator| indicator.period_id == period_id)
    }

    fn list(&self) -> Result<Vec<BscIndicator>, RepositoryError> {
        self.table.filter(|_| true)
    }

    fn by_code(
        &self,
        code: &str,
        period_id: PeriodId,
    ) -> Result<Option<BscIndicator>, RepositoryError> {
        self.table
            .first(|indicator| indicator.period_id == period_id && indicator.code == code)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBscActualRepository {
    table: Arc<MemoryTable<BscActual>>,
}

impl BscActualRepository for InMemoryBscActualRepository {
    fn insert(&self, actual: BscActual) -> Result<BscActual, RepositoryError> {
        self.table.insert(actual)
    }

    fn update(&self, actual: BscActual) -> Result<BscActual, RepositoryError> {
        self.table.update(actual)
    }

    fn fetch(&self, id: ActualId) -> Result<Option<BscActual>, RepositoryError> {
        self.table.fetch(id)
    }

    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<BscActual>, RepositoryError> {
        let mut actuals = self
            .table
            .filter(|actual| actual.indicator_id == indicator_id)?;
        actuals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(actuals)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMpmIndicatorRepository {
    table: Arc<MemoryTable<MpmIndicator>>,
}

impl MpmIndicatorRepository for InMemoryMpmIndicatorRepository {
    fn insert(&self, indicator: MpmIndicator) -> Result<MpmIndicator, RepositoryError> {
        self.table.insert(indicator)
    }

    fn update(&self, indicator: MpmIndicator) -> Result<MpmIndicator, RepositoryError> {
        self.table.update(indicator)
    }

    fn fetch(&self, id: IndicatorId) -> Result<Option<MpmIndicator>, RepositoryError> {
        self.table.fetch(id)
    }

    fn by_period(&self, period_id: PeriodId) -> Result<Vec<MpmIndicator>, RepositoryError> {
        self.table.filter(|indicator| indicator.period_id == period_id)
    }

    fn list(&self) -> Result<Vec<MpmIndicator>, RepositoryError> {
        self.table.filter(|_| true)
    }

    fn by_kpi(&self, kpi: &str, period_id: PeriodId) -> Result<Option<MpmIndicator>, RepositoryError> {
        self.table
            .first(|indicator| indicator.period_id == period_id && indicator.kpi == kpi)
    }

    fn max_kpi_number(
        &self,
        perspective: Perspective,
        period_id: PeriodId,
    ) -> Result<Option<u32>, RepositoryError> {
        let indicators = self.table.filter(|indicator| {
            indicator.period_id == period_id && indicator.perspective == Some(perspective)
        })?;
        Ok(indicators
            .iter()
            .filter_map(|indicator| indicator.kpi_number)
            .max())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMpmActualRepository {
    table: Arc<MemoryTable<MpmActual>>,
}

impl MpmActualRepository for InMemoryMpmActualRepository {
    fn insert(&self, actual: MpmActual) -> Result<MpmActual, RepositoryError> {
        self.table.insert(actual)
    }

    fn update(&self, actual: MpmActual) -> Result<MpmActual, RepositoryError> {
        self.table.update(actual)
    }

    fn fetch(&self, id: ActualId) -> Result<Option<MpmActual>, RepositoryError> {
        self.table.fetch(id)
    }

    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<MpmActual>, RepositoryError> {
        let mut actuals = self
            .table
            .filter(|actual| actual.indicator_id == indicator_id)?;
        actuals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(actuals)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMonthlyTargetRepository {
    table: Arc<MemoryTable<MonthlyTarget>>,
}

impl MonthlyTargetRepository for InMemoryMonthlyTargetRepository {
    fn insert(&self, target: MonthlyTarget) -> Result<MonthlyTarget, RepositoryError> {
        self.table.insert(target)
    }

    fn update(&self, target: MonthlyTarget) -> Result<MonthlyTarget, RepositoryError> {
        self.table.update(target)
    }

    fn fetch(&self, id: MonthlyTargetId) -> Result<Option<MonthlyTarget>, RepositoryError> {
        self.table.fetch(id)
    }

    fn for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Vec<MonthlyTarget>, RepositoryError> {
        self.table.filter(|target| target.indicator_id == indicator_id)
    }

    fn by_month(
        &self,
        indicator_id: IndicatorId,
        month: &str,
    ) -> Result<Option<MonthlyTarget>, RepositoryError> {
        self.table
            .first(|target| target.indicator_id == indicator_id && target.month == month)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryActionPlanRepository {
    table: Arc<MemoryTable<ActionPlan>>,
}

impl ActionPlanRepository for InMemoryActionPlanRepository {
    fn insert(&self, plan: ActionPlan) -> Result<ActionPlan, RepositoryError> {
        self.table.insert(plan)
    }

    fn update(&self, plan: ActionPlan) -> Result<ActionPlan, RepositoryError> {
        self.table.update(plan)
    }

    fn fetch(&self, id: ActionPlanId) -> Result<Option<ActionPlan>, RepositoryError> {
        self.table.fetch(id)
    }

    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<ActionPlan>, RepositoryError> {
        self.table.filter(|plan| plan.indicator_id == indicator_id)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryQuarterlyDataRepository {
    table: Arc<MemoryTable<QuarterlyData>>,
}

impl QuarterlyDataRepository for InMemoryQuarterlyDataRepository {
    fn insert(&self, data: QuarterlyData) -> Result<QuarterlyData, RepositoryError> {
        self.table.insert(data)
    }

    fn update(&self, data: QuarterlyData) -> Result<QuarterlyData, RepositoryError> {
        self.table.update(data)
    }

    fn fetch(&self, id: QuarterlyDataId) -> Result<Option<QuarterlyData>, RepositoryError> {
        self.table.fetch(id)
    }

    fn for_action_plan(
        &self,
        action_plan_id: ActionPlanId,
    ) -> Result<Vec<QuarterlyData>, RepositoryError> {
        let mut rows = self.table.filter(|data| data.action_plan_id == action_plan_id)?;
        rows.sort_by(|a, b| a.quarter.cmp(&b.quarter));
        Ok(rows)
    }

    fn list(&self) -> Result<Vec<QuarterlyData>, RepositoryError> {
        self.table.filter(|_| true)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryMpmApproverRepository {
    table: Arc<MemoryTable<MpmApprover>>,
}

impl MpmApproverRepository for InMemoryMpmApproverRepository {
    fn insert(&self, approver: MpmApprover) -> Result<MpmApprover, RepositoryError> {
        self.table.insert(approver)
    }

    fn update(&self, approver: MpmApprover) -> Result<MpmApprover, RepositoryError> {
        self.table.update(approver)
    }

    fn fetch(&self, id: MpmApproverId) -> Result<Option<MpmApprover>, RepositoryError> {
        self.table.fetch(id)
    }

    fn list(&self) -> Result<Vec<MpmApprover>, RepositoryError> {
        self.table.filter(|_| true)
    }

    fn by_user(&self, user_id: Uuid) -> Result<Option<MpmApprover>, RepositoryError> {
        self.table.first(|approver| approver.user_id == Some(user_id))
    }
}

/// Every MPM table, held in memory. Periods are shared with the period service.
#[derive(Default, Clone)]
pub struct InMemoryMpmStore {
    pub periods: InMemoryPeriodRepository,
    pub indicators: InMemoryMpmIndicatorRepository,
    pub actuals: InMemoryMpmActualRepository,
    pub targets: InMemoryMonthlyTargetRepository,
    pub plans: InMemoryActionPlanRepository,
    pub quarters: InMemoryQuarterlyDataRepository,
    pub approvers: InMemoryMpmApproverRepository,
}

impl InMemoryMpmStore {
    pub fn with_periods(periods: InMemoryPeriodRepository) -> Self {
        Self {
            periods,
            ..Self::default()
        }
    }
}

impl MpmStore for InMemoryMpmStore {
    type Periods = InMemoryPeriodRepository;
    type Indicators = InMemoryMpmIndicatorRepository;
    type Actuals = InMemoryMpmActualRepository;
    type Targets = InMemoryMonthlyTargetRepository;
    type Plans = InMemoryActionPlanRepository;
    type Quarters = InMemoryQuarterlyDataRepository;
    type Approvers = InMemoryMpmApproverRepository;

    fn periods(&self) -> &Self::Periods {
        &self.periods
    }

    fn indicators(&self) -> &Self::Indicators {
        &self.indicators
    }

    fn actuals(&self) -> &Self::Actuals {
        &self.actuals
    }

    fn targets(&self) -> &Self::Targets {
        &self.targets
    }

    fn plans(&self) -> &Self::Plans {
        &self.plans
    }

    fn quarters(&self) -> &Self::Quarters {
        &self.quarters
    }

    fn approvers(&self) -> &Self::Approvers {
        &self.approvers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Lifecycle;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        lifecycle: Lifecycle,
        value: &'static str,
    }

    impl Record for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn lifecycle(&self) -> Lifecycle {
            self.lifecycle
        }
    }

    fn row(id: u32, value: &'static str) -> Row {
        Row {
            id,
            lifecycle: Lifecycle::Active,
            value,
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let table = MemoryTable::default();
        table.insert(row(1, "a")).expect("first insert");
        assert_eq!(table.insert(row(1, "b")), Err(RepositoryError::Conflict));
    }

    #[test]
    fn deleted_rows_are_hidden_from_reads_and_updates() {
        let table = MemoryTable::default();
        table.insert(row(1, "a")).expect("insert");
        table.insert(row(2, "b")).expect("insert");

        let mut deleted = row(1, "a");
        deleted.lifecycle = Lifecycle::Deleted;
        table.update(deleted).expect("soft delete");

        assert_eq!(table.fetch(1).expect("fetch"), None);
        assert_eq!(table.filter(|_| true).expect("filter"), vec![row(2, "b")]);
        assert_eq!(table.update(row(1, "c")), Err(RepositoryError::NotFound));
    }

    #[test]
    fn filter_preserves_insertion_order() {
        let table = MemoryTable::default();
        for (id, value) in [(3, "c"), (1, "a"), (2, "b")] {
            table.insert(row(id, value)).expect("insert");
        }
        let values: Vec<_> = table
            .filter(|_| true)
            .expect("filter")
            .into_iter()
            .map(|row| row.value)
            .collect();
        assert_eq!(values, vec!["c", "a", "b"]);
    }
}
