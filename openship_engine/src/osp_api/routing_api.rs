use std::fmt::Debug;

use log::*;
use platform_tools::data_objects::Order;

use crate::{
    db::traits::{RoutingDatabase, StoreError},
    db_types::{Link, RouteDecision},
    link_matcher::select_links,
    osp_api::errors::RoutingError,
};

/// `RoutingApi` decides which channels an order from a shop should be sent to.
///
/// Each channel evaluates its own links independently, in its own [`crate::db_types::LinkMode`], so one order can be
/// routed to several channels.
pub struct RoutingApi<B> {
    db: B,
}

impl<B> Debug for RoutingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoutingApi")
    }
}

impl<B> RoutingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> RoutingApi<B>
where B: RoutingDatabase
{
    /// The links of `channel_id` that accept `order` from `shop_id`, in evaluation order.
    pub async fn evaluate_links(
        &self,
        channel_id: i64,
        shop_id: i64,
        order: &Order,
    ) -> Result<Vec<Link>, RoutingError> {
        let channel = self.db.fetch_channel(channel_id).await?.ok_or_else(|| StoreError::channel(channel_id))?;
        let links = self.db.fetch_links_for_channel(channel_id).await?;
        let selected = select_links(channel.link_mode, &links, shop_id, order).map_err(|source| {
            // The matcher stops at the first bad filter, so find out which link it belongs to
            let link_id = links
                .iter()
                .find(|l| l.filters.iter().any(|f| f.validate().is_err()))
                .map(|l| l.id)
                .unwrap_or_default();
            RoutingError::InvalidFilter { link_id, source }
        })?;
        debug!(
            "🔀️ {} of {} links on channel #{channel_id} accept order {} from shop #{shop_id}",
            selected.len(),
            links.len(),
            order.order_name
        );
        Ok(selected.into_iter().cloned().collect())
    }

    /// Evaluates every channel with at least one link from `shop_id` and returns one decision per accepting link.
    pub async fn route_order(&self, shop_id: i64, order: &Order) -> Result<Vec<RouteDecision>, RoutingError> {
        let mut decisions = Vec::new();
        for channel in self.db.fetch_channels().await? {
            let links = self.db.fetch_links_for_channel(channel.id).await?;
            if !links.iter().any(|l| l.shop_id == shop_id) {
                continue;
            }
            let accepted = self.evaluate_links(channel.id, shop_id, order).await?;
            decisions.extend(accepted.iter().map(|l| RouteDecision::new(channel.id, l.id)));
        }
        if decisions.is_empty() {
            info!("🔀️ No link accepts order {} from shop #{shop_id}", order.order_name);
        } else {
            info!("🔀️ Order {} from shop #{shop_id} routed by {} links", order.order_name, decisions.len());
        }
        Ok(decisions)
    }
}
