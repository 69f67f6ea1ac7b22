//! Reporting periods. At most one live period is Active at a time.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{NewPeriod, Period, PeriodId, PeriodSearch, PeriodStatus, PeriodType, PeriodUpdate};
pub use repository::PeriodRepository;
pub use router::period_router;
pub use service::PeriodService;
