use platform_tools::AdapterError;
use thiserror::Error;

use crate::{db::traits::StoreError, link_matcher::FilterError, osp_api::sync_objects::InventorySyncReport};

#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("Link #{link_id} has an invalid filter: {source}")]
    InvalidFilter { link_id: i64, source: FilterError },
}

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Adapter(#[from] AdapterError),
    #[error("{0}")]
    Routing(#[from] RoutingError),
    #[error("Order #{order_id} has no pending items for channel #{channel_id}")]
    NothingToPurchase { order_id: i64, channel_id: i64 },
    #[error("Purchase {purchase_id} was placed but could not be recorded: {reason}. Rolled back: {compensated}")]
    PurchaseNotRecorded { purchase_id: String, compensated: bool, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Adapter(#[from] AdapterError),
}

#[derive(Debug, Error)]
pub enum WebhookSyncError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Adapter(#[from] AdapterError),
}

/// Returned by [`InventorySyncReport::into_result`] when at least one match failed to sync. The full report is kept,
/// so the matches that did sync are not lost.
#[derive(Debug, Clone, Error)]
#[error("{} of {} matches failed to sync: {:?}", .report.failures.len(), .report.total(), .report.failed_ids())]
pub struct PartialInventorySyncError {
    pub report: InventorySyncReport,
}

impl PartialInventorySyncError {
    pub fn failed_ids(&self) -> Vec<i64> {
        self.report.failed_ids()
    }
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Adapter(#[from] AdapterError),
    #[error("The callback does not say which store was installed")]
    MissingDomain,
}
