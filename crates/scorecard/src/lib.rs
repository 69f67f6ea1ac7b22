pub mod config;
pub mod error;
pub mod http;
pub mod import;
pub mod periods;
pub mod scorecards;
pub mod store;
pub mod telemetry;
