use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::domain::{
    ActionPlan, ActionPlanId, ActionPlanStatus, ActionPlanUpdate, NewActionPlan, NewQuarterlyData, QuarterLabel,
    QuarterlyData, QuarterlyDataId, QuarterlyDataUpdate,
};
use super::repository::{ActionPlanRepository, MpmStore, QuarterlyDataRepository};
use super::service::MpmScorecardService;
use super::status::{classify, plan_status};
use crate::scorecards::common::{IndicatorId, ScorecardError};
use crate::store::Lifecycle;

/// Action plan with its quarterly rows in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlanDetail {
    #[serde(flatten)]
    pub plan: ActionPlan,
    pub quarterly_data: Vec<QuarterlyData>,
}

/// Roll-up of every action plan's row for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterSummary {
    pub quarter: QuarterLabel,
    /// Share of rows for the quarter that carry an actual, in percent.
    pub completion: Decimal,
    pub on_track_count: usize,
    pub at_risk_count: usize,
    pub off_track_count: usize,
}

impl<S> MpmScorecardService<S>
where
    S: MpmStore,
{
    /// Open an action plan against a live indicator. New plans start On Track.
    pub fn create_action_plan(&self, new_plan: NewActionPlan) -> Result<ActionPlan, ScorecardError> {
        let indicator = self.get_indicator(new_plan.indicator_id)?;
        if new_plan.description.trim().is_empty() {
            return Err(ScorecardError::Validation(
                "action plan description must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let plan = ActionPlan {
            id: ActionPlanId::generate(),
            indicator_id: indicator.id,
            description: new_plan.description,
            responsible_person: new_plan.responsible_person,
            deadline: new_plan.deadline,
            status: ActionPlanStatus::OnTrack,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.plans().insert(plan)?;
        info!(id = %stored.id, kpi = %indicator.kpi, "action plan created");
        Ok(stored)
    }

    /// Edit a plan's description, owner or deadline. Status is left to the recompute.
    pub fn update_action_plan(
        &self,
        id: ActionPlanId,
        update: ActionPlanUpdate,
    ) -> Result<ActionPlan, ScorecardError> {
        let mut plan = self.plan(id)?;
        if update
            .description
            .as_deref()
            .is_some_and(|description| description.trim().is_empty())
        {
            return Err(ScorecardError::Validation(
                "action plan description must not be empty".to_string(),
            ));
        }

        plan.apply(update);
        plan.updated_at = Utc::now();

        let stored = self.store.plans().update(plan)?;
        info!(%id, deadline = %stored.deadline, "action plan updated");
        Ok(stored)
    }

    pub fn action_plan(&self, id: ActionPlanId) -> Result<ActionPlanDetail, ScorecardError> {
        let plan = self.plan(id)?;
        let quarterly_data = self.store.quarters().for_action_plan(id)?;
        Ok(ActionPlanDetail {
            plan,
            quarterly_data,
        })
    }

    pub fn action_plans_for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Vec<ActionPlan>, ScorecardError> {
        Ok(self.store.plans().for_indicator(indicator_id)?)
    }

    /// Record a quarter's target, and its actual if already known.
    pub fn create_quarterly_data(
        &self,
        new_data: NewQuarterlyData,
    ) -> Result<QuarterlyData, ScorecardError> {
        let plan = self.plan(new_data.action_plan_id)?;
        let existing = self.store.quarters().for_action_plan(plan.id)?;
        if existing.iter().any(|row| row.quarter == new_data.quarter) {
            return Err(ScorecardError::Conflict(format!(
                "quarterly data for {} already exists for this action plan",
                new_data.quarter
            )));
        }

        let now = Utc::now();
        let data = QuarterlyData {
            id: QuarterlyDataId::generate(),
            action_plan_id: plan.id,
            quarter: new_data.quarter,
            target_value: new_data.target_value,
            actual_value: new_data.actual_value,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.quarters().insert(data)?;
        if stored.actual_value.is_some() {
            self.recompute_action_plan_status(plan.id)?;
        }
        Ok(stored)
    }

    pub fn update_quarterly_data(
        &self,
        id: QuarterlyDataId,
        update: QuarterlyDataUpdate,
    ) -> Result<QuarterlyData, ScorecardError> {
        let mut data = self
            .store
            .quarters()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("quarterly data", id))?;

        if let Some(target_value) = update.target_value {
            data.target_value = target_value;
        }
        if update.actual_value.is_some() {
            data.actual_value = update.actual_value;
        }
        data.updated_at = Utc::now();

        let stored = self.store.quarters().update(data)?;
        if stored.actual_value.is_some() {
            self.recompute_action_plan_status(stored.action_plan_id)?;
        }
        Ok(stored)
    }

    /// Reclassify a plan from its latest reported quarter and persist the result.
    pub fn recompute_action_plan_status(
        &self,
        id: ActionPlanId,
    ) -> Result<ActionPlanStatus, ScorecardError> {
        let mut plan = self.plan(id)?;
        let rows = self.store.quarters().for_action_plan(id)?;
        let status = plan_status(&rows, &self.scoring);

        if plan.status != status {
            let previous = plan.status;
            plan.status = status;
            plan.updated_at = Utc::now();
            self.store.plans().update(plan)?;
            info!(
                %id,
                from = previous.label(),
                to = status.label(),
                "action plan status changed"
            );
        }
        Ok(status)
    }

    /// Per-quarter completion and status counts across every live quarterly row.
    pub fn quarterly_summary(&self) -> Result<Vec<QuarterSummary>, ScorecardError> {
        let mut by_quarter: BTreeMap<QuarterLabel, Vec<QuarterlyData>> = BTreeMap::new();
        for row in self.store.quarters().list()? {
            by_quarter.entry(row.quarter).or_default().push(row);
        }

        let summary = by_quarter
            .into_iter()
            .map(|(quarter, rows)| {
                let mut summary = QuarterSummary {
                    quarter,
                    completion: Decimal::ZERO,
                    on_track_count: 0,
                    at_risk_count: 0,
                    off_track_count: 0,
                };
                let mut reported = 0_u32;
                for row in &rows {
                    let Some(actual) = row.actual_value else {
                        continue;
                    };
                    reported += 1;
                    match classify(actual, row.target_value, &self.scoring) {
                        ActionPlanStatus::OnTrack => summary.on_track_count += 1,
                        ActionPlanStatus::AtRisk => summary.at_risk_count += 1,
                        ActionPlanStatus::OffTrack => summary.off_track_count += 1,
                    }
                }
                let total = Decimal::from(rows.len());
                summary.completion =
                    (Decimal::from(reported) * Decimal::ONE_HUNDRED / total).round_dp(2);
                summary
            })
            .collect();
        Ok(summary)
    }

    fn plan(&self, id: ActionPlanId) -> Result<ActionPlan, ScorecardError> {
        self.store
            .plans()
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("action plan", id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ScoringConfig;
    use crate::periods::{NewPeriod, PeriodService, PeriodType};
    use crate::scorecards::common::{Calculation, Category, UnitOfMeasure};
    use crate::scorecards::mpm::NewMpmIndicator;
    use crate::store::memory::InMemoryMpmStore;
    use chrono::NaiveDate;

    struct Fixture {
        service: MpmScorecardService<InMemoryMpmStore>,
        plan: ActionPlan,
    }

    fn fixture() -> Fixture {
        let store = InMemoryMpmStore::default();
        let period = PeriodService::new(Arc::new(store.periods.clone()))
            .create(NewPeriod {
                period_type: PeriodType::Yearly,
                year: 2025,
                label: "FY".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid"),
            })
            .expect("period");
        let service = MpmScorecardService::new(Arc::new(store), ScoringConfig::default());
        let indicator = service
            .create_indicator(NewMpmIndicator {
                period_id: period.id,
                perspective: None,
                kpi: "Revenue".to_string(),
                kpi_definition: String::new(),
                weight: Decimal::new(40, 0),
                uom: UnitOfMeasure::Number,
                category: Category::Max,
                ytd_calculation: Calculation::Accumulative,
                target: Decimal::new(400, 0),
            })
            .expect("indicator");
        let plan = service
            .create_action_plan(NewActionPlan {
                indicator_id: indicator.id,
                description: "Open two new sales regions".to_string(),
                responsible_person: "Sales lead".to_string(),
                deadline: NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid"),
            })
            .expect("plan");
        Fixture { service, plan }
    }

    fn quarter(plan: ActionPlanId, label: &str, target: i64, actual: Option<i64>) -> NewQuarterlyData {
        NewQuarterlyData {
            action_plan_id: plan,
            quarter: label.parse().expect("quarter"),
            target_value: Decimal::new(target, 0),
            actual_value: actual.map(|value| Decimal::new(value, 0)),
        }
    }

    #[test]
    fn new_plans_start_on_track() {
        let fixture = fixture();
        assert_eq!(fixture.plan.status, ActionPlanStatus::OnTrack);
    }

    #[test]
    fn plan_requires_live_indicator() {
        let fixture = fixture();
        fixture
            .service
            .delete_indicator(fixture.plan.indicator_id)
            .expect("delete");
        assert!(matches!(
            fixture.service.create_action_plan(NewActionPlan {
                indicator_id: fixture.plan.indicator_id,
                description: "Another".to_string(),
                responsible_person: "Ops".to_string(),
                deadline: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid"),
            }),
            Err(ScorecardError::NotFound { .. })
        ));
    }

    #[test]
    fn plan_update_edits_fields_but_not_status() {
        let fixture = fixture();
        let plan_id = fixture.plan.id;
        fixture
            .service
            .create_quarterly_data(quarter(plan_id, "Q1", 100, Some(50)))
            .expect("q1");

        let updated = fixture
            .service
            .update_action_plan(
                plan_id,
                ActionPlanUpdate {
                    responsible_person: Some("Regional director".to_string()),
                    deadline: NaiveDate::from_ymd_opt(2026, 3, 31),
                    ..ActionPlanUpdate::default()
                },
            )
            .expect("update");
        assert_eq!(updated.description, "Open two new sales regions");
        assert_eq!(updated.responsible_person, "Regional director");
        assert_eq!(updated.status, ActionPlanStatus::OffTrack);

        assert!(matches!(
            fixture.service.update_action_plan(
                plan_id,
                ActionPlanUpdate {
                    description: Some(" ".to_string()),
                    ..ActionPlanUpdate::default()
                }
            ),
            Err(ScorecardError::Validation(_))
        ));
    }

    #[test]
    fn reported_quarters_drive_status_both_ways() {
        let fixture = fixture();
        let service = &fixture.service;
        let plan_id = fixture.plan.id;

        service
            .create_quarterly_data(quarter(plan_id, "Q1", 100, Some(79)))
            .expect("q1");
        assert_eq!(
            service.action_plan(plan_id).expect("plan").plan.status,
            ActionPlanStatus::OffTrack
        );

        let q2 = service
            .create_quarterly_data(quarter(plan_id, "Q2", 100, None))
            .expect("q2");
        assert_eq!(
            service.action_plan(plan_id).expect("plan").plan.status,
            ActionPlanStatus::OffTrack
        );

        service
            .update_quarterly_data(
                q2.id,
                QuarterlyDataUpdate {
                    actual_value: Some(Decimal::new(80, 0)),
                    ..QuarterlyDataUpdate::default()
                },
            )
            .expect("report q2");
        let detail = service.action_plan(plan_id).expect("plan");
        assert_eq!(detail.plan.status, ActionPlanStatus::AtRisk);
        let quarters: Vec<_> = detail
            .quarterly_data
            .iter()
            .map(|row| row.quarter.to_string())
            .collect();
        assert_eq!(quarters, vec!["Q1", "Q2"]);

        assert_eq!(
            service.recompute_action_plan_status(plan_id).expect("idempotent"),
            ActionPlanStatus::AtRisk
        );
    }

    #[test]
    fn duplicate_quarter_conflicts() {
        let fixture = fixture();
        fixture
            .service
            .create_quarterly_data(quarter(fixture.plan.id, "Q1 2025", 100, None))
            .expect("first");
        assert!(matches!(
            fixture
                .service
                .create_quarterly_data(quarter(fixture.plan.id, "q1-2025", 50, None)),
            Err(ScorecardError::Conflict(_))
        ));
    }

    #[test]
    fn summary_counts_reported_rows_per_quarter() {
        let fixture = fixture();
        let service = &fixture.service;
        let second = service
            .create_action_plan(NewActionPlan {
                indicator_id: fixture.plan.indicator_id,
                description: "Renegotiate supplier terms".to_string(),
                responsible_person: "Procurement".to_string(),
                deadline: NaiveDate::from_ymd_opt(2025, 9, 30).expect("valid"),
            })
            .expect("second plan");

        service
            .create_quarterly_data(quarter(fixture.plan.id, "Q1", 100, Some(120)))
            .expect("row");
        service
            .create_quarterly_data(quarter(second.id, "Q1", 100, Some(85)))
            .expect("row");
        service
            .create_quarterly_data(quarter(fixture.plan.id, "Q2", 100, Some(10)))
            .expect("row");
        service
            .create_quarterly_data(quarter(second.id, "Q2", 100, None))
            .expect("row");

        let summary = service.quarterly_summary().expect("summary");
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].quarter.to_string(), "Q1");
        assert_eq!(summary[0].completion, Decimal::new(100, 0));
        assert_eq!(summary[0].on_track_count, 1);
        assert_eq!(summary[0].at_risk_count, 1);

        assert_eq!(summary[1].quarter.to_string(), "Q2");
        assert_eq!(summary[1].completion, Decimal::new(50, 0));
        assert_eq!(summary[1].off_track_count, 1);
    }
}
