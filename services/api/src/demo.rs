use crate::infra::Services;
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use scorecard::config::AppConfig;
use scorecard::error::AppError;
use scorecard::import::ImportReport;
use scorecard::periods::{NewPeriod, Period, PeriodStatus, PeriodType};
use scorecard::scorecards::bsc::{BscDashboard, BscIndicator, NewBscActual, NewBscIndicator};
use scorecard::scorecards::common::{
    Calculation, Category, Perspective, ScorecardError, UnitOfMeasure,
};
use scorecard::scorecards::mpm::{
    ImportedMpmIndicator, MpmDashboard, MpmIndicator, NewActionPlan, NewMpmActual,
    NewMpmIndicator, NewQuarterlyData, QuarterLabel,
};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Achievements handed out round-robin to the demo indicators.
const SAMPLE_ACHIEVEMENTS: [i64; 4] = [105, 92, 78, 64];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// BSC indicator CSV to import instead of the built-in sample indicators.
    #[arg(long)]
    pub(crate) bsc_csv: Option<PathBuf>,
    /// MPM indicator CSV to import instead of the built-in sample indicators.
    #[arg(long)]
    pub(crate) mpm_csv: Option<PathBuf>,
    /// Year of the seeded period (defaults to the current year).
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        bsc_csv,
        mpm_csv,
        year,
    } = args;

    let config = AppConfig::load()?;
    let services = Services::in_memory(config.scoring);
    let year = year.unwrap_or_else(|| Local::now().year());

    println!("Performance scorecard demo");
    let period = seed_period(&services, year)?;
    println!("Active period: {} ({} to {})", period.name, period.start_date, period.end_date);

    let bsc_indicators = match bsc_csv {
        Some(path) => {
            let report = services.bsc.import_indicators(period.id, File::open(&path)?)?;
            render_import("BSC", &path, &report);
            report.created
        }
        None => sample_bsc_indicators(&services, &period)?,
    };
    for (index, indicator) in bsc_indicators.iter().enumerate() {
        let achievement = Decimal::new(SAMPLE_ACHIEVEMENTS[index % SAMPLE_ACHIEVEMENTS.len()], 0);
        services.bsc.record_actual(NewBscActual {
            indicator_id: indicator.id,
            actual_value: format!("{achievement}%"),
            achievement,
            problem_identification: None,
            corrective_action: None,
        })?;
    }
    render_bsc_dashboard(&services.bsc.dashboard(period.id)?);

    let mpm_indicators = match mpm_csv {
        Some(path) => {
            let report = services.mpm.import_indicators(period.id, File::open(&path)?)?;
            render_import("MPM", &path, &report);
            report
                .created
                .into_iter()
                .map(|imported: ImportedMpmIndicator| imported.indicator)
                .collect()
        }
        None => sample_mpm_indicators(&services, &period)?,
    };
    for (index, indicator) in mpm_indicators.iter().enumerate() {
        let achievement = Decimal::new(SAMPLE_ACHIEVEMENTS[index % SAMPLE_ACHIEVEMENTS.len()], 0);
        services.mpm.record_actual(NewMpmActual {
            indicator_id: indicator.id,
            actual_value: indicator.target * achievement / Decimal::ONE_HUNDRED,
            achievement,
            problem_identification: None,
            corrective_action: None,
        })?;
        seed_action_plan(&services, indicator, year, achievement)?;
    }
    render_mpm_dashboard(&services.mpm.dashboard(period.id)?);

    let summary = services.mpm.quarterly_summary()?;
    if summary.is_empty() {
        println!("\nQuarterly summary: no quarterly data");
    } else {
        println!("\nQuarterly summary");
        for quarter in summary {
            println!(
                "- {}: {}% reported | {} on track | {} at risk | {} off track",
                quarter.quarter,
                quarter.completion,
                quarter.on_track_count,
                quarter.at_risk_count,
                quarter.off_track_count
            );
        }
    }

    Ok(())
}

fn seed_period(services: &Services, year: i32) -> Result<Period, AppError> {
    let start_date = NaiveDate::from_ymd_opt(year, 1, 1);
    let end_date = NaiveDate::from_ymd_opt(year, 12, 31);
    let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
        return Err(ScorecardError::Validation(format!("year {year} is out of range")).into());
    };

    let period = services.periods.create(NewPeriod {
        period_type: PeriodType::Yearly,
        year,
        label: "FY".to_string(),
        start_date,
        end_date,
    })?;
    Ok(services.periods.update_status(period.id, PeriodStatus::Active)?)
}

fn sample_bsc_indicators(
    services: &Services,
    period: &Period,
) -> Result<Vec<BscIndicator>, AppError> {
    let samples = [
        (Perspective::Financial, "F-01", "Revenue growth", 30, "10%"),
        (Perspective::Customer, "C-01", "Customer satisfaction index", 25, "85"),
        (
            Perspective::InternalBusinessProcess,
            "P-01",
            "On-time delivery",
            25,
            "95%",
        ),
        (
            Perspective::LearningGrowth,
            "L-01",
            "Training hours per employee",
            20,
            "40",
        ),
    ];

    let mut created = Vec::with_capacity(samples.len());
    for (perspective, code, kpi, weight, target) in samples {
        created.push(services.bsc.create_indicator(NewBscIndicator {
            period_id: period.id,
            perspective,
            code: code.to_string(),
            kpi: kpi.to_string(),
            kpi_definition: String::new(),
            weight: Decimal::new(weight, 0),
            uom: UnitOfMeasure::Percentage,
            category: Category::Max,
            calculation: Calculation::Average,
            target: target.to_string(),
            related_pic: None,
        })?);
    }
    Ok(created)
}

fn sample_mpm_indicators(
    services: &Services,
    period: &Period,
) -> Result<Vec<MpmIndicator>, AppError> {
    let samples = [
        (Some(Perspective::Financial), "Net sales", 40, 12_000, Category::Max),
        (Some(Perspective::Financial), "Operating cost", 20, 8_000, Category::Min),
        (None, "Safety incidents closed", 40, 24, Category::OnTarget),
    ];

    let mut created = Vec::with_capacity(samples.len());
    for (perspective, kpi, weight, target, category) in samples {
        created.push(services.mpm.create_indicator(NewMpmIndicator {
            period_id: period.id,
            perspective,
            kpi: kpi.to_string(),
            kpi_definition: String::new(),
            weight: Decimal::new(weight, 0),
            uom: UnitOfMeasure::Number,
            category,
            ytd_calculation: Calculation::Accumulative,
            target: Decimal::new(target, 0),
        })?);
    }
    Ok(created)
}

/// One plan per indicator with two quarters; the second quarter tracks the indicator's achievement.
fn seed_action_plan(
    services: &Services,
    indicator: &MpmIndicator,
    year: i32,
    achievement: Decimal,
) -> Result<(), AppError> {
    let Some(deadline) = NaiveDate::from_ymd_opt(year, 6, 30) else {
        return Ok(());
    };
    let plan = services.mpm.create_action_plan(NewActionPlan {
        indicator_id: indicator.id,
        description: format!("Recover {} run-rate", indicator.kpi),
        responsible_person: "KPI owner".to_string(),
        deadline,
    })?;

    let quarterly_target = Decimal::ONE_HUNDRED;
    for (quarter, actual) in [(1, Decimal::ONE_HUNDRED), (2, achievement)] {
        services.mpm.create_quarterly_data(NewQuarterlyData {
            action_plan_id: plan.id,
            quarter: QuarterLabel::new(quarter, Some(year))?,
            target_value: quarterly_target,
            actual_value: Some(actual),
        })?;
    }
    Ok(())
}

fn render_import<T>(family: &str, path: &Path, report: &ImportReport<T>) {
    println!(
        "\n{family} import from {}: {} created, {} skipped",
        path.display(),
        report.created.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  - line {}: {}", skipped.line, skipped.reason);
    }
}

fn render_bsc_dashboard(dashboard: &BscDashboard) {
    println!("\nBSC dashboard for {}", dashboard.period_name);
    for bucket in &dashboard.perspectives {
        println!(
            "- {}: weight {} | score {} | final score {}",
            bucket.perspective,
            bucket.totals.total_weight,
            bucket.totals.total_score,
            bucket.totals.total_score_akhir
        );
        for item in &bucket.items {
            let score = item
                .actual
                .as_ref()
                .map(|actual| actual.score.to_string())
                .unwrap_or_else(|| "not reported".to_string());
            println!("    {} {} -> {}", item.indicator.code, item.indicator.kpi, score);
        }
    }
    println!(
        "Total: weight {} | score {} | active weight {} | final score {}",
        dashboard.totals.total_weight,
        dashboard.totals.total_score,
        dashboard.totals.total_active_weight,
        dashboard.totals.total_score_akhir
    );
}

fn render_mpm_dashboard(dashboard: &MpmDashboard) {
    println!("\nMPM dashboard for {}", dashboard.period_name);
    for bucket in &dashboard.perspectives {
        println!(
            "- {}: weight {} | score {}",
            bucket.perspective, bucket.totals.total_weight, bucket.totals.total_score
        );
        for item in &bucket.items {
            let statuses: Vec<&str> = item
                .action_plans
                .iter()
                .map(|plan| plan.status.label())
                .collect();
            println!(
                "    {} -> score {} | action plans: {}",
                item.indicator.kpi,
                item.actual
                    .as_ref()
                    .map(|actual| actual.score.to_string())
                    .unwrap_or_else(|| "not reported".to_string()),
                if statuses.is_empty() {
                    "none".to_string()
                } else {
                    statuses.join(", ")
                }
            );
        }
    }
    println!(
        "Total: weight {} | score {}",
        dashboard.totals.total_weight, dashboard.totals.total_score
    );
}
