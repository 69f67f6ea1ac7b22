use uuid::Uuid;

use super::domain::{
    ActionPlan, ActionPlanId, MonthlyTarget, MonthlyTargetId, MpmActual, MpmApprover,
    MpmApproverId, MpmIndicator, QuarterlyData, QuarterlyDataId,
};
use crate::periods::{PeriodId, PeriodRepository};
use crate::scorecards::common::{ActualId, IndicatorId, Perspective};
use crate::store::RepositoryError;

pub trait MpmIndicatorRepository: Send + Sync {
    fn insert(&self, indicator: MpmIndicator) -> Result<MpmIndicator, RepositoryError>;
    fn update(&self, indicator: MpmIndicator) -> Result<MpmIndicator, RepositoryError>;
    fn fetch(&self, id: IndicatorId) -> Result<Option<MpmIndicator>, RepositoryError>;
    fn by_period(&self, period_id: PeriodId) -> Result<Vec<MpmIndicator>, RepositoryError>;
    fn list(&self) -> Result<Vec<MpmIndicator>, RepositoryError>;
    fn by_kpi(&self, kpi: &str, period_id: PeriodId)
        -> Result<Option<MpmIndicator>, RepositoryError>;
    /// Highest assigned KPI number among live indicators of the perspective.
    fn max_kpi_number(
        &self,
        perspective: Perspective,
        period_id: PeriodId,
    ) -> Result<Option<u32>, RepositoryError>;
}

pub trait MpmActualRepository: Send + Sync {
    fn insert(&self, actual: MpmActual) -> Result<MpmActual, RepositoryError>;
    fn update(&self, actual: MpmActual) -> Result<MpmActual, RepositoryError>;
    fn fetch(&self, id: ActualId) -> Result<Option<MpmActual>, RepositoryError>;
    /// Newest first by creation time; equal timestamps keep insertion order.
    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<MpmActual>, RepositoryError>;

    fn latest_for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Option<MpmActual>, RepositoryError> {
        Ok(self.for_indicator(indicator_id)?.into_iter().next())
    }
}

pub trait MonthlyTargetRepository: Send + Sync {
    fn insert(&self, target: MonthlyTarget) -> Result<MonthlyTarget, RepositoryError>;
    fn update(&self, target: MonthlyTarget) -> Result<MonthlyTarget, RepositoryError>;
    fn fetch(&self, id: MonthlyTargetId) -> Result<Option<MonthlyTarget>, RepositoryError>;
    fn for_indicator(&self, indicator_id: IndicatorId)
        -> Result<Vec<MonthlyTarget>, RepositoryError>;
    fn by_month(
        &self,
        indicator_id: IndicatorId,
        month: &str,
    ) -> Result<Option<MonthlyTarget>, RepositoryError>;
}

pub trait ActionPlanRepository: Send + Sync {
    fn insert(&self, plan: ActionPlan) -> Result<ActionPlan, RepositoryError>;
    fn update(&self, plan: ActionPlan) -> Result<ActionPlan, RepositoryError>;
    fn fetch(&self, id: ActionPlanId) -> Result<Option<ActionPlan>, RepositoryError>;
    fn for_indicator(&self, indicator_id: IndicatorId) -> Result<Vec<ActionPlan>, RepositoryError>;
}

pub trait QuarterlyDataRepository: Send + Sync {
    fn insert(&self, data: QuarterlyData) -> Result<QuarterlyData, RepositoryError>;
    fn update(&self, data: QuarterlyData) -> Result<QuarterlyData, RepositoryError>;
    fn fetch(&self, id: QuarterlyDataId) -> Result<Option<QuarterlyData>, RepositoryError>;
    /// Rows of one plan in chronological quarter order.
    fn for_action_plan(
        &self,
        action_plan_id: ActionPlanId,
    ) -> Result<Vec<QuarterlyData>, RepositoryError>;
    fn list(&self) -> Result<Vec<QuarterlyData>, RepositoryError>;
}

pub trait MpmApproverRepository: Send + Sync {
    fn insert(&self, approver: MpmApprover) -> Result<MpmApprover, RepositoryError>;
    fn update(&self, approver: MpmApprover) -> Result<MpmApprover, RepositoryError>;
    fn fetch(&self, id: MpmApproverId) -> Result<Option<MpmApprover>, RepositoryError>;
    fn list(&self) -> Result<Vec<MpmApprover>, RepositoryError>;
    fn by_user(&self, user_id: Uuid) -> Result<Option<MpmApprover>, RepositoryError>;
}

/// Storage bundle behind the MPM service, one repository per MPM table.
pub trait MpmStore: Send + Sync + 'static {
    type Periods: PeriodRepository;
    type Indicators: MpmIndicatorRepository;
    type Actuals: MpmActualRepository;
    type Targets: MonthlyTargetRepository;
    type Plans: ActionPlanRepository;
    type Quarters: QuarterlyDataRepository;
    type Approvers: MpmApproverRepository;

    fn periods(&self) -> &Self::Periods;
    fn indicators(&self) -> &Self::Indicators;
    fn actuals(&self) -> &Self::Actuals;
    fn targets(&self) -> &Self::Targets;
    fn plans(&self) -> &Self::Plans;
    fn quarters(&self) -> &Self::Quarters;
    fn approvers(&self) -> &Self::Approvers;
}
