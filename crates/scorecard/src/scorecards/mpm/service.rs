use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    ActionPlan, MonthlyTarget, MonthlyTargetId, MonthlyTargetUpdate, MpmActual, MpmActualUpdate,
    MpmIndicator, MpmIndicatorSearch, MpmIndicatorUpdate, NewMonthlyTarget, NewMpmActual,
    NewMpmIndicator,
};
use super::repository::{
    ActionPlanRepository, MonthlyTargetRepository, MpmActualRepository, MpmIndicatorRepository,
    MpmStore,
};
use super::scoring::mpm_score;
use crate::config::ScoringConfig;
use crate::import::{import_rows, ImportError, ImportReport, MpmIndicatorRow, MPM_COLUMNS};
use crate::periods::{Period, PeriodId, PeriodRepository};
use crate::scorecards::common::{
    validate_achievement, validate_weight, ActualId, Category, IndicatorId, Perspective,
    ScorecardError,
};
use crate::scorecards::dashboard::{Dashboard, DashboardBuilder, ScoreRollup};
use crate::store::{Lifecycle, Page, PageRequest};

/// Bucket name for indicators without a perspective.
pub const OTHER_PERSPECTIVE: &str = "Other";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MpmTotals {
    pub total_weight: Decimal,
    pub total_score: Decimal,
}

impl ScoreRollup for MpmTotals {
    type Actual = MpmActual;

    fn add_weight(&mut self, weight: Decimal) {
        self.total_weight += weight;
    }

    fn add_actual(&mut self, actual: &MpmActual) {
        self.total_score += actual.score;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MpmDashboardItem {
    pub indicator: MpmIndicator,
    pub monthly_targets: Vec<MonthlyTarget>,
    pub actual: Option<MpmActual>,
    pub action_plans: Vec<ActionPlan>,
}

pub type MpmDashboard = Dashboard<MpmDashboardItem, MpmTotals>;

/// Indicator created by a bulk import together with its monthly targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedMpmIndicator {
    pub indicator: MpmIndicator,
    pub monthly_targets: Vec<MonthlyTarget>,
}

/// MPM indicator registry, actual recorder, dashboard, and action plans.
pub struct MpmScorecardService<S> {
    pub(super) store: Arc<S>,
    pub(super) scoring: ScoringConfig,
}

impl<S> MpmScorecardService<S>
where
    S: MpmStore,
{
    pub fn new(store: Arc<S>, scoring: ScoringConfig) -> Self {
        Self { store, scoring }
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Create an indicator, numbering it within its perspective when one is set.
    pub fn create_indicator(
        &self,
        new_indicator: NewMpmIndicator,
    ) -> Result<MpmIndicator, ScorecardError> {
        validate_weight(new_indicator.weight)?;
        ensure_mpm_category(new_indicator.category)?;
        self.period(new_indicator.period_id)?;
        self.ensure_kpi_free(&new_indicator.kpi, new_indicator.period_id, None)?;

        let kpi_number = match new_indicator.perspective {
            Some(perspective) => Some(
                self.store
                    .indicators()
                    .max_kpi_number(perspective, new_indicator.period_id)?
                    .unwrap_or(0)
                    + 1,
            ),
            None => None,
        };

        let now = Utc::now();
        let indicator = MpmIndicator {
            id: IndicatorId::generate(),
            period_id: new_indicator.period_id,
            perspective: new_indicator.perspective,
            kpi_number,
            kpi: new_indicator.kpi,
            kpi_definition: new_indicator.kpi_definition,
            weight: new_indicator.weight,
            uom: new_indicator.uom,
            category: new_indicator.category,
            ytd_calculation: new_indicator.ytd_calculation,
            target: new_indicator.target,
            is_active: true,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.indicators().insert(indicator)?;
        info!(kpi = %stored.kpi, kpi_number = ?stored.kpi_number, id = %stored.id, "mpm indicator created");
        Ok(stored)
    }

    pub fn update_indicator(
        &self,
        id: IndicatorId,
        update: MpmIndicatorUpdate,
    ) -> Result<MpmIndicator, ScorecardError> {
        let mut indicator = self.get_indicator(id)?;

        if let Some(weight) = update.weight {
            validate_weight(weight)?;
        }
        if let Some(category) = update.category {
            ensure_mpm_category(category)?;
        }
        if let Some(kpi) = update.kpi.as_deref() {
            if kpi != indicator.kpi {
                self.ensure_kpi_free(kpi, indicator.period_id, Some(id))?;
            }
        }

        indicator.apply(update);
        indicator.updated_at = Utc::now();
        let stored = self.store.indicators().update(indicator)?;
        info!(kpi = %stored.kpi, %id, "mpm indicator updated");
        Ok(stored)
    }

    pub fn delete_indicator(&self, id: IndicatorId) -> Result<(), ScorecardError> {
        let mut indicator = self.get_indicator(id)?;
        indicator.lifecycle = Lifecycle::Deleted;
        indicator.updated_at = Utc::now();
        self.store.indicators().update(indicator)?;
        info!(%id, "mpm indicator deleted");
        Ok(())
    }

    pub fn get_indicator(&self, id: IndicatorId) -> Result<MpmIndicator, ScorecardError> {
        self.store
            .indicators()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("mpm indicator", id))
    }

    pub fn indicators_for_period(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<MpmIndicator>, ScorecardError> {
        Ok(self.store.indicators().by_period(period_id)?)
    }

    pub fn indicators_by_perspective(
        &self,
        period_id: PeriodId,
        perspective: Perspective,
    ) -> Result<Vec<MpmIndicator>, ScorecardError> {
        let mut indicators = self.store.indicators().by_period(period_id)?;
        indicators.retain(|indicator| indicator.perspective == Some(perspective));
        Ok(indicators)
    }

    pub fn search_indicators(
        &self,
        search: MpmIndicatorSearch,
    ) -> Result<Page<MpmIndicator>, ScorecardError> {
        let request = PageRequest::new(search.page, search.page_size)?;
        let mut indicators = self.store.indicators().list()?;
        indicators.retain(|indicator| search.matches(indicator));
        Ok(Page::of(indicators, request))
    }

    /// Add a target for one month; each month may be set once per indicator.
    pub fn add_monthly_target(
        &self,
        new_target: NewMonthlyTarget,
    ) -> Result<MonthlyTarget, ScorecardError> {
        let indicator = self.get_indicator(new_target.indicator_id)?;
        let month = new_target.month.trim();
        if month.is_empty() {
            return Err(ScorecardError::Validation(
                "month must not be empty".to_string(),
            ));
        }

        if self
            .store
            .targets()
            .by_month(indicator.id, month)?
            .is_some()
        {
            return Err(ScorecardError::Conflict(format!(
                "a monthly target for {month} already exists for this indicator"
            )));
        }

        let now = Utc::now();
        let target = MonthlyTarget {
            id: MonthlyTargetId::generate(),
            indicator_id: indicator.id,
            month: month.to_string(),
            target_value: new_target.target_value,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.targets().insert(target)?)
    }

    pub fn monthly_targets(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Vec<MonthlyTarget>, ScorecardError> {
        Ok(self.store.targets().for_indicator(indicator_id)?)
    }

    /// Change a target's month or value. The month stays unique per indicator.
    pub fn update_monthly_target(
        &self,
        id: MonthlyTargetId,
        update: MonthlyTargetUpdate,
    ) -> Result<MonthlyTarget, ScorecardError> {
        let mut target = self
            .store
            .targets()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("monthly target", id))?;

        if let Some(month) = update.month {
            let month = month.trim();
            if month.is_empty() {
                return Err(ScorecardError::Validation(
                    "month must not be empty".to_string(),
                ));
            }
            let taken = self
                .store
                .targets()
                .by_month(target.indicator_id, month)?
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(ScorecardError::Conflict(format!(
                    "a monthly target for {month} already exists for this indicator"
                )));
            }
            target.month = month.to_string();
        }
        if let Some(target_value) = update.target_value {
            target.target_value = target_value;
        }
        target.updated_at = Utc::now();

        let stored = self.store.targets().update(target)?;
        info!(%id, month = %stored.month, "monthly target updated");
        Ok(stored)
    }

    pub fn record_actual(&self, new_actual: NewMpmActual) -> Result<MpmActual, ScorecardError> {
        validate_achievement(new_actual.achievement)?;
        let indicator = self.get_indicator(new_actual.indicator_id)?;

        let now = Utc::now();
        let actual = MpmActual {
            id: ActualId::generate(),
            indicator_id: indicator.id,
            actual_value: new_actual.actual_value,
            achievement: new_actual.achievement,
            score: mpm_score(indicator.weight, new_actual.achievement),
            problem_identification: new_actual.problem_identification,
            corrective_action: new_actual.corrective_action,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.actuals().insert(actual)?;
        info!(
            kpi = %indicator.kpi,
            achievement = %stored.achievement,
            score = %stored.score,
            "mpm actual recorded"
        );
        Ok(stored)
    }

    /// Update an actual; the score only moves when the achievement or the
    /// actual value changes.
    pub fn recompute_actual(
        &self,
        id: ActualId,
        update: MpmActualUpdate,
    ) -> Result<MpmActual, ScorecardError> {
        let mut actual = self
            .store
            .actuals()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("mpm actual", id))?;
        let rescore = update.achievement.is_some() || update.actual_value.is_some();

        if let Some(achievement) = update.achievement {
            validate_achievement(achievement)?;
            actual.achievement = achievement;
        }
        if let Some(actual_value) = update.actual_value {
            actual.actual_value = actual_value;
        }
        if update.problem_identification.is_some() {
            actual.problem_identification = update.problem_identification;
        }
        if update.corrective_action.is_some() {
            actual.corrective_action = update.corrective_action;
        }

        if rescore {
            let indicator = self.get_indicator(actual.indicator_id)?;
            actual.score = mpm_score(indicator.weight, actual.achievement);
        }
        actual.updated_at = Utc::now();
        let stored = self.store.actuals().update(actual)?;
        info!(%id, rescore, score = %stored.score, "mpm actual updated");
        Ok(stored)
    }

    pub fn latest_actual(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Option<MpmActual>, ScorecardError> {
        Ok(self.store.actuals().latest_for_indicator(indicator_id)?)
    }

    pub fn actuals_for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Vec<MpmActual>, ScorecardError> {
        self.get_indicator(indicator_id)?;
        Ok(self.store.actuals().for_indicator(indicator_id)?)
    }

    /// Perspective-grouped summary; indicators without a perspective land in "Other".
    pub fn dashboard(&self, period_id: PeriodId) -> Result<MpmDashboard, ScorecardError> {
        let period = self.period(period_id)?;
        let mut builder: DashboardBuilder<MpmDashboardItem, MpmTotals> =
            DashboardBuilder::new(period.id, period.name);

        for indicator in self.store.indicators().by_period(period_id)? {
            if !indicator.is_active {
                continue;
            }
            let actual = self.store.actuals().latest_for_indicator(indicator.id)?;
            let monthly_targets = self.store.targets().for_indicator(indicator.id)?;
            let action_plans = self.store.plans().for_indicator(indicator.id)?;
            let perspective = indicator
                .perspective
                .map_or(OTHER_PERSPECTIVE, |perspective| perspective.label());

            builder.push(
                perspective,
                indicator.weight,
                MpmDashboardItem {
                    indicator,
                    monthly_targets,
                    actual,
                    action_plans,
                },
                |item| item.actual.as_ref(),
            );
        }

        let dashboard = builder.finish();
        debug!(
            %period_id,
            perspectives = dashboard.perspectives.len(),
            total_weight = %dashboard.totals.total_weight,
            "mpm dashboard built"
        );
        Ok(dashboard)
    }

    /// Create indicators and their `Target_*` monthly targets from CSV rows.
    ///
    /// Month columns are checked while the row is parsed, so a row is either
    /// created with all of its targets or skipped without touching the store.
    pub fn import_indicators<R: Read>(
        &self,
        period_id: PeriodId,
        source: R,
    ) -> Result<ImportReport<ImportedMpmIndicator>, ImportError> {
        self.period(period_id)?;
        let report = import_rows(source, MPM_COLUMNS, |row: MpmIndicatorRow, cells| {
            let (new_indicator, months) = row.into_new(period_id, cells)?;
            let indicator = self.create_indicator(new_indicator)?;
            let monthly_targets = months
                .into_iter()
                .map(|(month, target_value)| {
                    self.add_monthly_target(NewMonthlyTarget {
                        indicator_id: indicator.id,
                        month,
                        target_value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ImportedMpmIndicator {
                indicator,
                monthly_targets,
            })
        })?;
        info!(
            %period_id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "mpm indicators imported"
        );
        Ok(report)
    }

    fn period(&self, id: PeriodId) -> Result<Period, ScorecardError> {
        self.store
            .periods()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("period", id))
    }

    fn ensure_kpi_free(
        &self,
        kpi: &str,
        period_id: PeriodId,
        except: Option<IndicatorId>,
    ) -> Result<(), ScorecardError> {
        match self.store.indicators().by_kpi(kpi, period_id)? {
            Some(existing) if Some(existing.id) != except => Err(ScorecardError::Conflict(format!(
                "an mpm indicator named {kpi} already exists for this period"
            ))),
            _ => Ok(()),
        }
    }
}

fn ensure_mpm_category(category: Category) -> Result<(), ScorecardError> {
    if category.allowed_for_mpm() {
        Ok(())
    } else {
        Err(ScorecardError::Validation(format!(
            "category '{}' is not available for mpm indicators",
            category.label()
        )))
    }
}
