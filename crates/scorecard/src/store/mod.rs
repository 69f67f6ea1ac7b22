//! Storage seam shared by every scorecard family.
//!
//! Services only ever talk to the repository traits declared next to each domain
//! module. The in-memory binding in [`memory`] backs the service binary and tests.

pub mod memory;
mod page;

pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use serde::{Deserialize, Serialize};

/// Soft-delete state carried by every stored entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted,
}

impl Lifecycle {
    pub const fn is_live(self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Row identity and lifecycle, so the memory tables can filter deleted rows.
pub trait Record: Clone + Send {
    type Id: Copy + PartialEq + Send;

    fn id(&self) -> Self::Id;
    fn lifecycle(&self) -> Lifecycle;
}
