use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{
    BscActual, BscActualUpdate, BscIndicator, BscIndicatorSearch, BscIndicatorUpdate,
    NewBscActual, NewBscIndicator,
};
use super::repository::{BscActualRepository, BscIndicatorRepository};
use super::scoring::BscScore;
use crate::import::{import_rows, BscIndicatorRow, ImportError, ImportReport, BSC_COLUMNS};
use crate::periods::{Period, PeriodId, PeriodRepository};
use crate::scorecards::common::{
    validate_achievement, validate_weight, ActualId, IndicatorId, Perspective, ScorecardError,
};
use crate::scorecards::dashboard::{Dashboard, DashboardBuilder, ScoreRollup};
use crate::store::{Lifecycle, Page, PageRequest};

/// Four running sums of the BSC dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BscTotals {
    pub total_weight: Decimal,
    pub total_score: Decimal,
    pub total_active_weight: Decimal,
    pub total_score_akhir: Decimal,
}

impl ScoreRollup for BscTotals {
    type Actual = BscActual;

    fn add_weight(&mut self, weight: Decimal) {
        self.total_weight += weight;
    }

    fn add_actual(&mut self, actual: &BscActual) {
        self.total_score += actual.score;
        self.total_active_weight += actual.active_weight;
        self.total_score_akhir += actual.score_akhir;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BscDashboardItem {
    pub indicator: BscIndicator,
    pub actual: Option<BscActual>,
}

pub type BscDashboard = Dashboard<BscDashboardItem, BscTotals>;

/// Indicator registry, actual recorder, and dashboard for the Balanced Scorecard.
pub struct BscScorecardService<P, I, A> {
    periods: Arc<P>,
    indicators: Arc<I>,
    actuals: Arc<A>,
}

impl<P, I, A> BscScorecardService<P, I, A>
where
    P: PeriodRepository + 'static,
    I: BscIndicatorRepository + 'static,
    A: BscActualRepository + 'static,
{
    pub fn new(periods: Arc<P>, indicators: Arc<I>, actuals: Arc<A>) -> Self {
        Self {
            periods,
            indicators,
            actuals,
        }
    }

    pub fn create_indicator(
        &self,
        new_indicator: NewBscIndicator,
    ) -> Result<BscIndicator, ScorecardError> {
        validate_weight(new_indicator.weight)?;
        self.period(new_indicator.period_id)?;
        self.ensure_code_free(&new_indicator.code, new_indicator.period_id, None)?;

        let now = Utc::now();
        let indicator = BscIndicator {
            id: IndicatorId::generate(),
            period_id: new_indicator.period_id,
            perspective: new_indicator.perspective,
            code: new_indicator.code,
            kpi: new_indicator.kpi,
            kpi_definition: new_indicator.kpi_definition,
            weight: new_indicator.weight,
            uom: new_indicator.uom,
            category: new_indicator.category,
            calculation: new_indicator.calculation,
            target: new_indicator.target,
            related_pic: new_indicator.related_pic,
            is_active: true,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.indicators.insert(indicator)?;
        info!(code = %stored.code, id = %stored.id, "bsc indicator created");
        Ok(stored)
    }

    /// Apply a partial update. A changed code or period rechecks code uniqueness.
    pub fn update_indicator(
        &self,
        id: IndicatorId,
        update: BscIndicatorUpdate,
    ) -> Result<BscIndicator, ScorecardError> {
        let mut indicator = self.get_indicator(id)?;

        if let Some(weight) = update.weight {
            validate_weight(weight)?;
        }
        if let Some(period_id) = update.period_id {
            self.period(period_id)?;
        }

        let code = update.code.as_deref().unwrap_or(&indicator.code);
        let period_id = update.period_id.unwrap_or(indicator.period_id);
        if code != indicator.code || period_id != indicator.period_id {
            self.ensure_code_free(code, period_id, Some(id))?;
        }

        indicator.apply(update);
        indicator.updated_at = Utc::now();
        let stored = self.indicators.update(indicator)?;
        info!(code = %stored.code, %id, "bsc indicator updated");
        Ok(stored)
    }

    pub fn delete_indicator(&self, id: IndicatorId) -> Result<(), ScorecardError> {
        let mut indicator = self.get_indicator(id)?;
        indicator.lifecycle = Lifecycle::Deleted;
        indicator.updated_at = Utc::now();
        self.indicators.update(indicator)?;
        info!(%id, "bsc indicator deleted");
        Ok(())
    }

    pub fn get_indicator(&self, id: IndicatorId) -> Result<BscIndicator, ScorecardError> {
        self.indicators
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("bsc indicator", id))
    }

    pub fn indicators_for_period(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<BscIndicator>, ScorecardError> {
        Ok(self.indicators.by_period(period_id)?)
    }

    pub fn indicators_by_perspective(
        &self,
        period_id: PeriodId,
        perspective: Perspective,
    ) -> Result<Vec<BscIndicator>, ScorecardError> {
        let mut indicators = self.indicators.by_period(period_id)?;
        indicators.retain(|indicator| indicator.perspective == perspective);
        Ok(indicators)
    }

    pub fn search_indicators(
        &self,
        search: BscIndicatorSearch,
    ) -> Result<Page<BscIndicator>, ScorecardError> {
        let request = PageRequest::new(search.page, search.page_size)?;
        let mut indicators = self.indicators.list()?;
        indicators.retain(|indicator| search.matches(indicator));
        Ok(Page::of(indicators, request))
    }

    /// Persist a reported actual with server-derived score fields.
    pub fn record_actual(&self, new_actual: NewBscActual) -> Result<BscActual, ScorecardError> {
        validate_achievement(new_actual.achievement)?;
        let indicator = self.get_indicator(new_actual.indicator_id)?;

        let now = Utc::now();
        let mut actual = BscActual {
            id: ActualId::generate(),
            indicator_id: indicator.id,
            actual_value: new_actual.actual_value,
            achievement: new_actual.achievement,
            score: Decimal::ZERO,
            active_weight: Decimal::ZERO,
            total_score: Decimal::ZERO,
            score_akhir: Decimal::ZERO,
            problem_identification: new_actual.problem_identification,
            corrective_action: new_actual.corrective_action,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };
        actual.set_score(BscScore::compute(indicator.weight, actual.achievement));

        let stored = self.actuals.insert(actual)?;
        info!(
            indicator = %indicator.code,
            achievement = %stored.achievement,
            score = %stored.score,
            "bsc actual recorded"
        );
        Ok(stored)
    }

    /// Update an actual. Scores are re-derived against the indicator's current
    /// weight only when the achievement or the actual value is part of the update.
    pub fn recompute_actual(
        &self,
        id: ActualId,
        update: BscActualUpdate,
    ) -> Result<BscActual, ScorecardError> {
        let mut actual = self
            .actuals
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("bsc actual", id))?;
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
            actual.set_score(BscScore::compute(indicator.weight, actual.achievement));
        }
        actual.updated_at = Utc::now();
        let stored = self.actuals.update(actual)?;
        info!(%id, rescore, score = %stored.score, "bsc actual updated");
        Ok(stored)
    }

    pub fn latest_actual(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Option<BscActual>, ScorecardError> {
        Ok(self.actuals.latest_for_indicator(indicator_id)?)
    }

    pub fn actuals_for_indicator(
        &self,
        indicator_id: IndicatorId,
    ) -> Result<Vec<BscActual>, ScorecardError> {
        self.get_indicator(indicator_id)?;
        Ok(self.actuals.for_indicator(indicator_id)?)
    }

    /// Perspective-grouped summary of the period's active indicators.
    pub fn dashboard(&self, period_id: PeriodId) -> Result<BscDashboard, ScorecardError> {
        let period = self.period(period_id)?;
        let mut builder: DashboardBuilder<BscDashboardItem, BscTotals> =
            DashboardBuilder::new(period.id, period.name);

        for indicator in self.indicators.by_period(period_id)? {
            if !indicator.is_active {
                continue;
            }
            let actual = self.actuals.latest_for_indicator(indicator.id)?;
            builder.push(
                indicator.perspective.label(),
                indicator.weight,
                BscDashboardItem { indicator, actual },
                |item| item.actual.as_ref(),
            );
        }

        let dashboard = builder.finish();
        debug!(
            %period_id,
            perspectives = dashboard.perspectives.len(),
            total_weight = %dashboard.totals.total_weight,
            "bsc dashboard built"
        );
        Ok(dashboard)
    }

    /// Create one indicator per CSV row; rejected rows are reported, not fatal.
    pub fn import_indicators<R: Read>(
        &self,
        period_id: PeriodId,
        source: R,
    ) -> Result<ImportReport<BscIndicator>, ImportError> {
        self.period(period_id)?;
        let report = import_rows(source, BSC_COLUMNS, |row: BscIndicatorRow, _| {
            self.create_indicator(row.into_new(period_id)?)
        })?;
        info!(
            %period_id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "bsc indicators imported"
        );
        Ok(report)
    }

    fn period(&self, id: PeriodId) -> Result<Period, ScorecardError> {
        self.periods
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("period", id))
    }

    fn ensure_code_free(
        &self,
        code: &str,
        period_id: PeriodId,
        except: Option<IndicatorId>,
    ) -> Result<(), ScorecardError> {
        match self.indicators.by_code(code, period_id)? {
            Some(existing) if Some(existing.id) != except => Err(ScorecardError::Conflict(format!(
                "a bsc indicator with code {code} already exists for this period"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::{NewPeriod, PeriodService, PeriodType};
    use crate::scorecards::common::{Calculation, Category, Perspective, UnitOfMeasure};
    use crate::store::memory::{
        InMemoryBscActualRepository, InMemoryBscIndicatorRepository, InMemoryPeriodRepository,
    };
    use chrono::{Duration, NaiveDate};

    type Service = BscScorecardService<
        InMemoryPeriodRepository,
        InMemoryBscIndicatorRepository,
        InMemoryBscActualRepository,
    >;

    struct Fixture {
        service: Service,
        actuals: Arc<InMemoryBscActualRepository>,
        period_id: PeriodId,
    }

    fn fixture() -> Fixture {
        let periods = Arc::new(InMemoryPeriodRepository::default());
        let period = PeriodService::new(periods.clone())
            .create(NewPeriod {
                period_type: PeriodType::Monthly,
                year: 2025,
                label: "1".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid"),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid"),
            })
            .expect("period");
        let actuals = Arc::new(InMemoryBscActualRepository::default());
        let service = BscScorecardService::new(
            periods,
            Arc::new(InMemoryBscIndicatorRepository::default()),
            actuals.clone(),
        );
        Fixture {
            service,
            actuals,
            period_id: period.id,
        }
    }

    fn indicator(period_id: PeriodId, code: &str, weight: i64) -> NewBscIndicator {
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
            target: "100".to_string(),
            related_pic: None,
        }
    }

    fn actual(indicator_id: IndicatorId, achievement: i64) -> NewBscActual {
        NewBscActual {
            indicator_id,
            actual_value: achievement.to_string(),
            achievement: Decimal::new(achievement, 0),
            problem_identification: None,
            corrective_action: None,
        }
    }

    #[test]
    fn record_actual_derives_all_four_scores() {
        let fixture = fixture();
        let created = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("indicator");

        let recorded = fixture
            .service
            .record_actual(actual(created.id, 90))
            .expect("actual");
        assert_eq!(recorded.score, Decimal::new(27, 0));
        assert_eq!(recorded.active_weight, Decimal::new(60, 0));
        assert_eq!(recorded.total_score, Decimal::new(54, 1));
        assert_eq!(recorded.score_akhir, Decimal::new(54, 1));
    }

    #[test]
    fn actual_for_deleted_indicator_is_not_found() {
        let fixture = fixture();
        let created = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("indicator");
        fixture.service.delete_indicator(created.id).expect("delete");

        assert!(matches!(
            fixture.service.record_actual(actual(created.id, 90)),
            Err(ScorecardError::NotFound { entity: "bsc indicator", .. })
        ));
    }

    #[test]
    fn duplicate_code_in_period_conflicts() {
        let fixture = fixture();
        fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("first");
        assert!(matches!(
            fixture
                .service
                .create_indicator(indicator(fixture.period_id, "F1", 10)),
            Err(ScorecardError::Conflict(_))
        ));
    }

    #[test]
    fn renaming_onto_an_existing_code_conflicts_but_self_rename_does_not() {
        let fixture = fixture();
        let first = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("first");
        fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F2", 20))
            .expect("second");

        let clash = BscIndicatorUpdate {
            code: Some("F2".to_string()),
            ..BscIndicatorUpdate::default()
        };
        assert!(matches!(
            fixture.service.update_indicator(first.id, clash),
            Err(ScorecardError::Conflict(_))
        ));

        let same = BscIndicatorUpdate {
            code: Some("F1".to_string()),
            weight: Some(Decimal::new(35, 0)),
            ..BscIndicatorUpdate::default()
        };
        let updated = fixture
            .service
            .update_indicator(first.id, same)
            .expect("self rename is fine");
        assert_eq!(updated.weight, Decimal::new(35, 0));
    }

    #[test]
    fn search_combines_filters_and_pages() {
        let fixture = fixture();
        for (code, weight) in [("F1", 10), ("F2", 10), ("F10", 10), ("X1", 10)] {
            fixture
                .service
                .create_indicator(indicator(fixture.period_id, code, weight))
                .expect("indicator");
        }
        let mut customer = indicator(fixture.period_id, "C1", 10);
        customer.perspective = Perspective::Customer;
        let customer = fixture.service.create_indicator(customer).expect("customer");

        let f2 = fixture
            .service
            .search_indicators(BscIndicatorSearch {
                code: Some("F".to_string()),
                ..BscIndicatorSearch::default()
            })
            .expect("search")
            .data[1]
            .id;
        fixture
            .service
            .update_indicator(
                f2,
                BscIndicatorUpdate {
                    is_active: Some(false),
                    ..BscIndicatorUpdate::default()
                },
            )
            .expect("deactivate");

        let page = fixture
            .service
            .search_indicators(BscIndicatorSearch {
                period_id: Some(fixture.period_id),
                perspective: Some(Perspective::Financial),
                code: Some("F".to_string()),
                is_active: Some(true),
                page: Some(1),
                page_size: Some(1),
            })
            .expect("search");
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].code, "F1");

        let by_perspective = fixture
            .service
            .indicators_by_perspective(fixture.period_id, Perspective::Customer)
            .expect("customer indicators");
        assert_eq!(by_perspective.len(), 1);
        assert_eq!(by_perspective[0].id, customer.id);
    }

    #[test]
    fn weight_out_of_range_is_rejected() {
        let fixture = fixture();
        assert!(matches!(
            fixture
                .service
                .create_indicator(indicator(fixture.period_id, "F1", 101)),
            Err(ScorecardError::Validation(_))
        ));
    }

    #[test]
    fn recompute_uses_current_indicator_weight() {
        let fixture = fixture();
        let created = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("indicator");
        let recorded = fixture
            .service
            .record_actual(actual(created.id, 90))
            .expect("actual");

        fixture
            .service
            .update_indicator(
                created.id,
                BscIndicatorUpdate {
                    weight: Some(Decimal::new(40, 0)),
                    ..BscIndicatorUpdate::default()
                },
            )
            .expect("reweight");

        let recomputed = fixture
            .service
            .recompute_actual(
                recorded.id,
                BscActualUpdate {
                    achievement: Some(Decimal::new(50, 0)),
                    ..BscActualUpdate::default()
                },
            )
            .expect("recompute");
        assert_eq!(recomputed.score, Decimal::new(20, 0));
        assert_eq!(recomputed.active_weight, Decimal::new(80, 0));
        assert_eq!(recomputed.total_score, Decimal::new(4, 0));
        assert_eq!(recomputed.created_at, recorded.created_at);
    }

    #[test]
    fn note_only_update_keeps_the_stored_score() {
        let fixture = fixture();
        let created = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("indicator");
        let recorded = fixture
            .service
            .record_actual(actual(created.id, 90))
            .expect("actual");
        assert_eq!(recorded.score, Decimal::new(27, 0));

        fixture
            .service
            .update_indicator(
                created.id,
                BscIndicatorUpdate {
                    weight: Some(Decimal::new(40, 0)),
                    ..BscIndicatorUpdate::default()
                },
            )
            .expect("reweight");

        let noted = fixture
            .service
            .recompute_actual(
                recorded.id,
                BscActualUpdate {
                    problem_identification: Some("supplier delay".to_string()),
                    ..BscActualUpdate::default()
                },
            )
            .expect("note");
        assert_eq!(noted.score, Decimal::new(27, 0));
        assert_eq!(noted.active_weight, Decimal::new(60, 0));
        assert_eq!(noted.problem_identification.as_deref(), Some("supplier delay"));

        let revalued = fixture
            .service
            .recompute_actual(
                recorded.id,
                BscActualUpdate {
                    actual_value: Some("91".to_string()),
                    ..BscActualUpdate::default()
                },
            )
            .expect("revalue");
        assert_eq!(revalued.score, Decimal::new(36, 0));
        assert_eq!(revalued.active_weight, Decimal::new(80, 0));
    }

    #[test]
    fn latest_actual_is_newest_by_creation_time() {
        let fixture = fixture();
        let created = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 30))
            .expect("indicator");
        let first = fixture
            .service
            .record_actual(actual(created.id, 40))
            .expect("first");

        let mut newer = first.clone();
        newer.id = ActualId::generate();
        newer.achievement = Decimal::new(80, 0);
        newer.created_at = first.created_at + Duration::seconds(5);
        fixture.actuals.insert(newer.clone()).expect("insert newer");

        let mut tie = newer.clone();
        tie.id = ActualId::generate();
        fixture.actuals.insert(tie).expect("insert tie");

        let latest = fixture
            .service
            .latest_actual(created.id)
            .expect("lookup")
            .expect("has actual");
        assert_eq!(latest.id, newer.id);
    }

    #[test]
    fn dashboard_skips_inactive_indicators() {
        let fixture = fixture();
        let kept = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F1", 20))
            .expect("kept");
        let paused = fixture
            .service
            .create_indicator(indicator(fixture.period_id, "F2", 30))
            .expect("paused");
        fixture
            .service
            .update_indicator(
                paused.id,
                BscIndicatorUpdate {
                    is_active: Some(false),
                    ..BscIndicatorUpdate::default()
                },
            )
            .expect("deactivate");

        let dashboard = fixture.service.dashboard(fixture.period_id).expect("dashboard");
        assert_eq!(dashboard.period_name, "Jan-25");
        assert_eq!(dashboard.totals.total_weight, Decimal::new(20, 0));
        let financial = dashboard.perspective("Financial").expect("bucket");
        assert_eq!(financial.items.len(), 1);
        assert_eq!(financial.items[0].indicator.id, kept.id);
    }

    #[test]
    fn import_skips_bad_rows_and_duplicates() {
        let fixture = fixture();
        let csv = "\
Perspective,Code,KPI,KPI Definition,Weight,UOM,Category,Calculation,Target,Related PIC
Financial,F1,Revenue,Revenue growth,30,%,Max,Average,100,
Customer,C1,NPS,Net promoter,150,%,Max,Average,70,
Customer,C2,Churn,Churned accounts,10,%,Sideways,Average,5,
Financial,F1,Revenue again,,10,%,Max,Average,100,
Learning & Growth,L1,Training,Hours trained,20,Days,Min,Last Value,12,HR
";
        let report = fixture
            .service
            .import_indicators(fixture.period_id, csv.as_bytes())
            .expect("import");

        let codes: Vec<_> = report.created.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["F1", "L1"]);
        let lines: Vec<_> = report.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(report.created[1].related_pic.as_deref(), Some("HR"));
        assert_eq!(report.created[1].perspective, Perspective::LearningGrowth);
    }

    #[test]
    fn import_into_unknown_period_aborts() {
        let fixture = fixture();
        let csv = "Perspective,Code,KPI,KPI Definition,Weight,UOM,Category,Calculation,Target,Related PIC\n";
        assert!(matches!(
            fixture
                .service
                .import_indicators(PeriodId::generate(), csv.as_bytes()),
            Err(ImportError::Scorecard(ScorecardError::NotFound { entity: "period", .. }))
        ));
    }
}
