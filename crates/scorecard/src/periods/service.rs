use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::domain::{
    display_name, normalize_label, NewPeriod, Period, PeriodId, PeriodSearch, PeriodStatus,
    PeriodType, PeriodUpdate,
};
use super::repository::PeriodRepository;
use crate::scorecards::common::ScorecardError;
use crate::store::{Lifecycle, Page, PageRequest};

/// Period lifecycle management, including the single-active-period rule.
pub struct PeriodService<R> {
    repository: Arc<R>,
}

impl<R> PeriodService<R>
where
    R: PeriodRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create(&self, new_period: NewPeriod) -> Result<Period, ScorecardError> {
        let label = normalize_label(new_period.period_type, &new_period.label)?;
        check_dates(new_period.start_date, new_period.end_date)?;
        self.ensure_unique(new_period.period_type, new_period.year, &label, None)?;

        let now = Utc::now();
        let period = Period {
            id: PeriodId::generate(),
            period_type: new_period.period_type,
            year: new_period.year,
            name: display_name(new_period.period_type, &label, new_period.year),
            label,
            start_date: new_period.start_date,
            end_date: new_period.end_date,
            status: PeriodStatus::Draft,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(period)?;
        info!(period = %stored.name, id = %stored.id, "period created");
        Ok(stored)
    }

    pub fn get(&self, id: PeriodId) -> Result<Period, ScorecardError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| ScorecardError::not_found("period", id))
    }

    pub fn active(&self) -> Result<Option<Period>, ScorecardError> {
        Ok(self.repository.active()?)
    }

    pub fn list(&self) -> Result<Vec<Period>, ScorecardError> {
        let mut periods = self.repository.list()?;
        periods.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then_with(|| a.period_type.label().cmp(b.period_type.label()))
                .then_with(|| label_order(&a.label).cmp(&label_order(&b.label)))
        });
        Ok(periods)
    }

    /// Filtered, paginated view over [`PeriodService::list`].
    pub fn search(&self, search: PeriodSearch) -> Result<Page<Period>, ScorecardError> {
        let request = PageRequest::new(search.page, search.page_size)?;
        let periods = self
            .list()?
            .into_iter()
            .filter(|period| search.matches(period))
            .collect();
        Ok(Page::of(periods, request))
    }

    /// Apply a partial update. The label is re-validated against the resulting
    /// type and the display name regenerated.
    pub fn update(&self, id: PeriodId, update: PeriodUpdate) -> Result<Period, ScorecardError> {
        let mut period = self.get(id)?;

        let period_type = update.period_type.unwrap_or(period.period_type);
        let year = update.year.unwrap_or(period.year);
        let label = normalize_label(
            period_type,
            update.label.as_deref().unwrap_or(&period.label),
        )?;
        let start_date = update.start_date.unwrap_or(period.start_date);
        let end_date = update.end_date.unwrap_or(period.end_date);
        check_dates(start_date, end_date)?;
        self.ensure_unique(period_type, year, &label, Some(id))?;

        if let Some(status) = update.status {
            if status == PeriodStatus::Active {
                self.ensure_no_other_active(&period)?;
            }
            period.status = status;
        }

        period.name = display_name(period_type, &label, year);
        period.period_type = period_type;
        period.year = year;
        period.label = label;
        period.start_date = start_date;
        period.end_date = end_date;
        period.updated_at = Utc::now();

        let stored = self.repository.update(period)?;
        info!(period = %stored.name, %id, "period updated");
        Ok(stored)
    }

    /// Move a period to a new status. Only one live period may be Active.
    pub fn update_status(
        &self,
        id: PeriodId,
        status: PeriodStatus,
    ) -> Result<Period, ScorecardError> {
        let mut period = self.get(id)?;

        if status == PeriodStatus::Active {
            self.ensure_no_other_active(&period)?;
        }

        if period.status == status {
            return Ok(period);
        }

        period.status = status;
        period.updated_at = Utc::now();
        let stored = self.repository.update(period)?;
        info!(period = %stored.name, status = stored.status.label(), "period status changed");
        Ok(stored)
    }

    pub fn delete(&self, id: PeriodId) -> Result<(), ScorecardError> {
        let mut period = self.get(id)?;
        period.lifecycle = Lifecycle::Deleted;
        period.updated_at = Utc::now();
        self.repository.update(period)?;
        info!(%id, "period deleted");
        Ok(())
    }

    fn ensure_unique(
        &self,
        period_type: PeriodType,
        year: i32,
        label: &str,
        except: Option<PeriodId>,
    ) -> Result<(), ScorecardError> {
        match self.repository.find(year, label, period_type)? {
            Some(existing) if Some(existing.id) != except => Err(ScorecardError::Conflict(format!(
                "a {} period for year {year}, period {label} already exists",
                period_type.label()
            ))),
            _ => Ok(()),
        }
    }

    fn ensure_no_other_active(&self, period: &Period) -> Result<(), ScorecardError> {
        match self.repository.active()? {
            Some(active) if active.id != period.id => Err(ScorecardError::Conflict(format!(
                "period {} is already active; close it before activating {}",
                active.name, period.name
            ))),
            _ => Ok(()),
        }
    }
}

fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ScorecardError> {
    if start_date > end_date {
        return Err(ScorecardError::Validation(format!(
            "period start {start_date} is after end {end_date}"
        )));
    }
    Ok(())
}

/// Month numbers sort numerically, everything else lexically after them.
fn label_order(label: &str) -> (u8, String) {
    match label.parse::<u8>() {
        Ok(month) => (month, String::new()),
        Err(_) => (u8::MAX, label.to_string()),
    }
}
