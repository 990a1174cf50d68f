//! Static canonical ↔ vendor webhook topic tables.
//!
//! Each table is a bijection over the events a platform supports. Anything missing from a table has no vendor topic
//! on that platform.
use crate::{data_objects::WebhookEvent, AdapterError, PlatformKind};

pub const SHOPIFY_TOPICS: &[(WebhookEvent, &str)] = &[
    (WebhookEvent::OrderCreated, "ORDERS_CREATE"),
    (WebhookEvent::OrderCancelled, "ORDERS_CANCELLED"),
    (WebhookEvent::OrderChargebacked, "DISPUTES_CREATE"),
    (WebhookEvent::TrackingCreated, "FULFILLMENTS_CREATE"),
];

pub const BIGCOMMERCE_TOPICS: &[(WebhookEvent, &str)] = &[
    (WebhookEvent::OrderCreated, "store/order/created"),
    (WebhookEvent::OrderCancelled, "store/order/statusUpdated"),
    (WebhookEvent::TrackingCreated, "store/shipment/created"),
];

pub const WOOCOMMERCE_TOPICS: &[(WebhookEvent, &str)] =
    &[(WebhookEvent::OrderCreated, "order.created"), (WebhookEvent::OrderCancelled, "order.updated")];

pub fn topic_table(platform: PlatformKind) -> &'static [(WebhookEvent, &'static str)] {
    match platform {
        PlatformKind::Shopify => SHOPIFY_TOPICS,
        PlatformKind::BigCommerce => BIGCOMMERCE_TOPICS,
        PlatformKind::WooCommerce => WOOCOMMERCE_TOPICS,
    }
}

/// Maps a canonical event to the vendor topic, failing with [`AdapterError::UnsupportedTopic`] when unmapped.
pub fn topic_for(platform: PlatformKind, event: WebhookEvent) -> Result<&'static str, AdapterError> {
    topic_table(platform)
        .iter()
        .find(|(e, _)| *e == event)
        .map(|(_, topic)| *topic)
        .ok_or(AdapterError::UnsupportedTopic { platform: platform.to_string(), event })
}

/// Reverse lookup. Vendor topics are compared case-insensitively, since Shopify's REST and GraphQL APIs disagree on
/// case.
pub fn event_for(platform: PlatformKind, topic: &str) -> Option<WebhookEvent> {
    let normalized = topic.replace('/', "_");
    topic_table(platform)
        .iter()
        .find(|(_, t)| t.eq_ignore_ascii_case(topic) || t.replace('/', "_").eq_ignore_ascii_case(&normalized))
        .map(|(e, _)| *e)
}

pub fn supported_events(platform: PlatformKind) -> Vec<WebhookEvent> {
    topic_table(platform).iter().map(|(e, _)| *e).collect()
}

/// Removes the deployment's public URL from a callback URL so that webhooks can be compared across hosts.
pub fn strip_base_url(callback_url: &str, frontend_url: &str) -> String {
    let base = frontend_url.trim_end_matches('/');
    match callback_url.strip_prefix(base) {
        Some(rest) if !base.is_empty() => {
            if rest.starts_with('/') {
                rest.to_string()
            } else {
                format!("/{rest}")
            }
        },
        _ => callback_url.to_string(),
    }
}
