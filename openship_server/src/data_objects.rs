use std::fmt::Display;

use openship_engine::link_matcher::Filter;
use platform_tools::data_objects::{OAuthCallbackParams, Order, WebhookEvent};
use serde::{Deserialize, Serialize};

/// The body of every webhook handler response. Handlers answer `200` even when the delivery could not be processed,
/// so the platforms do not keep retrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub search_entry: String,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeParams {
    pub domain: String,
}

/// Adds or replaces a filter, based on the link version the editor last saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub expected_version: u64,
    pub filter: Filter,
}

/// The REST keys a WooCommerce store posts to the OAuth callback once the merchant approves the install. `user_id`
/// carries the `state` issued with the authorize URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDelivery {
    pub key_id: Option<i64>,
    pub user_id: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub key_permissions: Option<String>,
}

impl KeyDelivery {
    /// Folds the delivered keys into the callback's query parameters, which name the store.
    pub fn merge_into(self, mut params: OAuthCallbackParams) -> OAuthCallbackParams {
        params.state = Some(self.user_id);
        params.consumer_key = Some(self.consumer_key);
        params.consumer_secret = Some(self.consumer_secret);
        params
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VersionParam {
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    pub endpoint: String,
    pub events: Vec<WebhookEvent>,
}

/// An order to try against a channel's links, as if it had come from `shop_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub shop_id: i64,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySyncParams {
    pub match_ids: Vec<i64>,
}
