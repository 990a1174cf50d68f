use serde::{Deserialize, Serialize};

use crate::db_types::{OrderRecord, RouteDecision};

/// An order was accepted by a link and routed to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRoutedEvent {
    pub order: OrderRecord,
    pub decision: RouteDecision,
}

impl OrderRoutedEvent {
    pub fn new(order: OrderRecord, decision: RouteDecision) -> Self {
        Self { order, decision }
    }
}

/// A purchase could not be placed on a channel and was rolled back, or could not be rolled back.
///
/// When `compensated` is false, `purchase_id` names a draft or order that still exists on the channel and needs
/// manual clean-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseAbortedEvent {
    pub order_id: i64,
    pub channel_id: i64,
    pub purchase_id: Option<String>,
    pub compensated: bool,
    pub reason: String,
}
