//! MPM indicators, monthly targets, actuals, and action plans.

pub mod action_plans;
pub mod approvers;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;

pub use action_plans::{ActionPlanDetail, QuarterSummary};
pub use domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, ActionPlanUpdate, MonthlyTarget,
    MonthlyTargetId, MonthlyTargetUpdate, MpmActual, MpmActualUpdate, MpmApprover,
    MpmApproverId, MpmApproverUpdate, MpmIndicator, MpmIndicatorSearch, MpmIndicatorUpdate,
    NewActionPlan, NewMonthlyTarget, NewMpmActual, NewMpmApprover, NewMpmIndicator,
    NewQuarterlyData, QuarterLabel, QuarterlyData, QuarterlyDataId, QuarterlyDataUpdate,
};
pub use repository::{
    ActionPlanRepository, MonthlyTargetRepository, MpmActualRepository, MpmApproverRepository,
    MpmIndicatorRepository, MpmStore, QuarterlyDataRepository,
};
pub use router::mpm_router;
pub use scoring::mpm_score;
pub use service::{
    ImportedMpmIndicator, MpmDashboard, MpmDashboardItem, MpmScorecardService, MpmTotals,
    OTHER_PERSPECTIVE,
};
