//! Balanced Scorecard indicators and actuals.

pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

pub use domain::{
    BscActual, BscActualUpdate, BscIndicator, BscIndicatorSearch, BscIndicatorUpdate,
    NewBscActual, NewBscIndicator,
};
pub use repository::{BscActualRepository, BscIndicatorRepository};
pub use router::bsc_router;
pub use scoring::BscScore;
pub use service::{BscDashboard, BscDashboardItem, BscScorecardService, BscTotals};
