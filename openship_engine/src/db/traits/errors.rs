use thiserror::Error;

use crate::link_matcher::FilterError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("Link #{link_id} is at version {actual}, but the update was based on version {expected}")]
    VersionConflict { link_id: i64, expected: u64, actual: u64 },
    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn shop(id: i64) -> Self {
        Self::NotFound(format!("Shop #{id}"))
    }

    pub fn channel(id: i64) -> Self {
        Self::NotFound(format!("Channel #{id}"))
    }

    pub fn link(id: i64) -> Self {
        Self::NotFound(format!("Link #{id}"))
    }

    pub fn order(id: i64) -> Self {
        Self::NotFound(format!("Order #{id}"))
    }

    pub fn matching(id: i64) -> Self {
        Self::NotFound(format!("Match #{id}"))
    }
}
