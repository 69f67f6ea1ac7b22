use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scorecard::config::ScoringConfig;
use scorecard::periods::{NewPeriod, PeriodId, PeriodService, PeriodType};
use scorecard::scorecards::bsc::{BscScorecardService, NewBscActual, NewBscIndicator};
use scorecard::scorecards::common::{Calculation, Category, Perspective, UnitOfMeasure};
use scorecard::scorecards::mpm::{
    ActionPlanStatus, MpmScorecardService, NewActionPlan, NewMpmActual, NewMpmIndicator,
    NewQuarterlyData, QuarterlyDataUpdate, OTHER_PERSPECTIVE,
};
use scorecard::store::memory::{
    InMemoryBscActualRepository, InMemoryBscIndicatorRepository, InMemoryMpmStore,
    InMemoryPeriodRepository,
};

type BscService = BscScorecardService<
    InMemoryPeriodRepository,
    InMemoryBscIndicatorRepository,
    InMemoryBscActualRepository,
>;

fn yearly_period(periods: &InMemoryPeriodRepository) -> PeriodId {
    PeriodService::new(Arc::new(periods.clone()))
        .create(NewPeriod {
            period_type: PeriodType::Yearly,
            year: 2025,
            label: "FY".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
        })
        .expect("period")
        .id
}

fn bsc_service() -> (BscService, PeriodId) {
    let periods = InMemoryPeriodRepository::default();
    let period_id = yearly_period(&periods);
    let service = BscScorecardService::new(
        Arc::new(periods),
        Arc::new(InMemoryBscIndicatorRepository::default()),
        Arc::new(InMemoryBscActualRepository::default()),
    );
    (service, period_id)
}

fn bsc_indicator(period_id: PeriodId, code: &str, weight: i64) -> NewBscIndicator {
    NewBscIndicator {
        period_id,
        perspective: Perspective::Financial,
        code: code.to_string(),
        kpi: format!("KPI {code}"),
        kpi_definition: String::new(),
        weight: Decimal::new(weight, 0),
        uom: UnitOfMeasure::Percentage,
        category: Category::Max,
        calculation: Calculation::Average,
        target: "100%".to_string(),
        related_pic: None,
    }
}

#[test]
fn bsc_dashboard_sums_weight_for_all_and_scores_for_reported() {
    let (service, period_id) = bsc_service();
    let reported = service
        .create_indicator(bsc_indicator(period_id, "F1", 20))
        .expect("reported indicator");
    service
        .create_indicator(bsc_indicator(period_id, "F2", 30))
        .expect("unreported indicator");

    let actual = service
        .record_actual(NewBscActual {
            indicator_id: reported.id,
            actual_value: "50%".to_string(),
            achievement: Decimal::new(50, 0),
            problem_identification: None,
            corrective_action: None,
        })
        .expect("actual");
    assert_eq!(actual.score, Decimal::new(10, 0));
    assert_eq!(actual.active_weight, Decimal::new(40, 0));
    assert_eq!(actual.total_score, Decimal::new(2, 0));

    let dashboard = service.dashboard(period_id).expect("dashboard");
    assert_eq!(dashboard.period_name, "FY-2025");
    assert_eq!(dashboard.totals.total_weight, Decimal::new(50, 0));
    assert_eq!(dashboard.totals.total_score, Decimal::new(10, 0));
    assert_eq!(dashboard.totals.total_active_weight, Decimal::new(40, 0));
    assert_eq!(dashboard.totals.total_score_akhir, Decimal::new(2, 0));

    let financial = dashboard.perspective("Financial").expect("bucket");
    assert_eq!(financial.items.len(), 2);
    assert!(financial.items[1].actual.is_none());

    assert_eq!(service.dashboard(period_id).expect("again"), dashboard);
}

#[test]
fn mpm_dashboard_and_action_plan_lifecycle() {
    let store = InMemoryMpmStore::default();
    let period_id = yearly_period(&store.periods);
    let service = MpmScorecardService::new(Arc::new(store), ScoringConfig::default());

    let revenue = service
        .create_indicator(NewMpmIndicator {
            period_id,
            perspective: Some(Perspective::Financial),
            kpi: "Revenue".to_string(),
            kpi_definition: "Booked revenue".to_string(),
            weight: Decimal::new(60, 0),
            uom: UnitOfMeasure::Currency,
            category: Category::Max,
            ytd_calculation: Calculation::Accumulative,
            target: Decimal::new(1_000, 0),
        })
        .expect("revenue");
    let safety = service
        .create_indicator(NewMpmIndicator {
            period_id,
            perspective: None,
            kpi: "Lost time incidents".to_string(),
            kpi_definition: String::new(),
            weight: Decimal::new(40, 0),
            uom: UnitOfMeasure::Number,
            category: Category::Min,
            ytd_calculation: Calculation::LastValue,
            target: Decimal::ZERO,
        })
        .expect("safety");
    assert_eq!(revenue.kpi_number, Some(1));
    assert_eq!(safety.kpi_number, None);

    service
        .record_actual(NewMpmActual {
            indicator_id: revenue.id,
            actual_value: Decimal::new(900, 0),
            achievement: Decimal::new(90, 0),
            problem_identification: None,
            corrective_action: None,
        })
        .expect("actual");

    let plan = service
        .create_action_plan(NewActionPlan {
            indicator_id: revenue.id,
            description: "Close the Q2 pipeline".to_string(),
            responsible_person: "Commercial director".to_string(),
            deadline: NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        })
        .expect("plan");

    let row = service
        .create_quarterly_data(NewQuarterlyData {
            action_plan_id: plan.id,
            quarter: "Q2 2025".parse().expect("quarter"),
            target_value: Decimal::new(250, 0),
            actual_value: Some(Decimal::new(150, 0)),
        })
        .expect("quarter");
    assert_eq!(
        service.action_plan(plan.id).expect("detail").plan.status,
        ActionPlanStatus::OffTrack
    );

    service
        .update_quarterly_data(
            row.id,
            QuarterlyDataUpdate {
                target_value: None,
                actual_value: Some(Decimal::new(250, 0)),
            },
        )
        .expect("update");

    let dashboard = service.dashboard(period_id).expect("dashboard");
    assert_eq!(dashboard.totals.total_weight, Decimal::new(100, 0));
    assert_eq!(dashboard.totals.total_score, Decimal::new(54, 0));

    let financial = dashboard.perspective("Financial").expect("financial");
    assert_eq!(
        financial.items[0].action_plans[0].status,
        ActionPlanStatus::OnTrack
    );
    let other = dashboard.perspective(OTHER_PERSPECTIVE).expect("other");
    assert_eq!(other.totals.total_score, Decimal::ZERO);
    assert_eq!(other.totals.total_weight, Decimal::new(40, 0));
}

#[test]
fn deleted_indicators_drop_out_of_the_dashboard() {
    let (service, period_id) = bsc_service();
    let kept = service
        .create_indicator(bsc_indicator(period_id, "C1", 25))
        .expect("kept");
    let dropped = service
        .create_indicator(bsc_indicator(period_id, "C2", 75))
        .expect("dropped");
    service.delete_indicator(dropped.id).expect("delete");

    let dashboard = service.dashboard(period_id).expect("dashboard");
    assert_eq!(dashboard.totals.total_weight, Decimal::new(25, 0));
    assert_eq!(
        dashboard.perspectives[0].items[0].indicator.id,
        kept.id
    );

    service
        .create_indicator(bsc_indicator(period_id, "C2", 10))
        .expect("code is free again after delete");
}
