pub mod bsc;
pub mod common;
pub mod dashboard;
pub mod mpm;
