use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::osp_api::errors::PartialInventorySyncError;

/// Where a match is in an inventory sync. A match whose sync fails goes back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSyncState {
    Pending,
    Syncing,
    Synced,
}

/// Snapshot of a running sync, published after every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub syncing: Vec<i64>,
    pub synced: Vec<i64>,
}

impl SyncProgress {
    pub fn state_of(&self, match_id: i64) -> MatchSyncState {
        if self.synced.contains(&match_id) {
            MatchSyncState::Synced
        } else if self.syncing.contains(&match_id) {
            MatchSyncState::Syncing
        } else {
            MatchSyncState::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub match_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySyncReport {
    /// Matches whose shop inventory now agrees with the channel.
    pub synced: Vec<i64>,
    /// Matches that do not pair exactly one shop item with one channel item, so have no single delta.
    pub skipped: Vec<i64>,
    pub failures: Vec<SyncFailure>,
    /// Where each requested match ended up once the batch finished.
    pub states: BTreeMap<i64, MatchSyncState>,
}

impl InventorySyncReport {
    pub fn total(&self) -> usize {
        self.synced.len() + self.skipped.len() + self.failures.len()
    }

    pub fn failed_ids(&self) -> Vec<i64> {
        self.failures.iter().map(|f| f.match_id).collect()
    }

    pub fn into_result(self) -> Result<Self, PartialInventorySyncError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(PartialInventorySyncError { report: self })
        }
    }
}
