use std::fmt::Display;

use chrono::{DateTime, Utc};
use platform_tools::{
    data_objects::{Order, Product},
    PlatformCredentials,
    PlatformKind,
};
use serde::{Deserialize, Serialize};

use crate::link_matcher::Filter;

//--------------------------------------        Shop         ---------------------------------------------------------
/// A storefront that sends orders to Openship.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: i64,
    pub name: String,
    pub platform: PlatformKind,
    pub credentials: PlatformCredentials,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    pub platform: PlatformKind,
    pub credentials: PlatformCredentials,
}

impl NewShop {
    pub fn new<S: Into<String>>(name: S, platform: PlatformKind, credentials: PlatformCredentials) -> Self {
        Self { name: name.into(), platform, credentials }
    }
}

//--------------------------------------       Channel       ---------------------------------------------------------
/// How the links of a channel are applied to an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    /// The first matching link, by rank, wins.
    #[default]
    Sequential,
    /// Every matching link is selected.
    AllMatching,
}

impl Display for LinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkMode::Sequential => write!(f, "sequential"),
            LinkMode::AllMatching => write!(f, "all-matching"),
        }
    }
}

/// A fulfillment platform that receives purchases for routed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub platform: PlatformKind,
    pub credentials: PlatformCredentials,
    pub link_mode: LinkMode,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChannel {
    pub name: String,
    pub platform: PlatformKind,
    pub credentials: PlatformCredentials,
    #[serde(default)]
    pub link_mode: LinkMode,
}

impl NewChannel {
    pub fn new<S: Into<String>>(name: S, platform: PlatformKind, credentials: PlatformCredentials) -> Self {
        Self { name: name.into(), platform, credentials, link_mode: LinkMode::default() }
    }

    pub fn with_link_mode(mut self, link_mode: LinkMode) -> Self {
        self.link_mode = link_mode;
        self
    }
}

//--------------------------------------        Link         ---------------------------------------------------------
/// A routing rule that sends orders from `shop_id` to `channel_id` when every filter accepts the order.
///
/// `version` increases with every change to `filters`. Filter mutations must quote the version they were based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i64,
    pub channel_id: i64,
    pub shop_id: i64,
    pub rank: i64,
    pub filters: Vec<Filter>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLink {
    pub channel_id: i64,
    pub shop_id: i64,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl NewLink {
    pub fn new(channel_id: i64, shop_id: i64, rank: i64) -> Self {
        Self { channel_id, shop_id, rank, filters: vec![] }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }
}

//--------------------------------------    OrderRecord      ---------------------------------------------------------
/// Why an order was sent to a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDecision {
    pub channel_id: i64,
    pub link_id: i64,
    pub routed_at: DateTime<Utc>,
}

impl RouteDecision {
    pub fn new(channel_id: i64, link_id: i64) -> Self {
        Self { channel_id, link_id, routed_at: Utc::now() }
    }
}

/// A canonical order as received from a shop, plus Openship's routing bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: i64,
    pub shop_id: i64,
    pub order: Order,
    pub routes: Vec<RouteDecision>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn routed_channels(&self) -> Vec<i64> {
        let mut ids = self.routes.iter().map(|r| r.channel_id).collect::<Vec<_>>();
        ids.dedup();
        ids
    }
}

//--------------------------------------       Match         ---------------------------------------------------------
/// Product details as last seen on the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDetails {
    pub title: String,
    pub image: Option<String>,
    pub price: String,
    pub inventory: Option<i64>,
    pub inventory_tracked: bool,
}

impl From<&Product> for ExternalDetails {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            image: product.image.clone(),
            price: product.price.clone(),
            inventory: product.inventory,
            inventory_tracked: product.inventory_tracked,
        }
    }
}

/// One side of a match. `platform_id` is a shop id for input items and a channel id for output items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchItem {
    pub platform_id: i64,
    pub product_id: String,
    pub variant_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub external_details: Option<ExternalDetails>,
}

impl MatchItem {
    pub fn new<S: Into<String>>(platform_id: i64, product_id: S, variant_id: S, quantity: i64) -> Self {
        Self {
            platform_id,
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            quantity,
            external_details: None,
        }
    }

    pub fn inventory(&self) -> Option<i64> {
        self.external_details.as_ref().and_then(|d| d.inventory)
    }
}

/// Pairs shop line items (input) with the channel items that fulfil them (output).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    pub input: Vec<MatchItem>,
    pub output: Vec<MatchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub input: Vec<MatchItem>,
    pub output: Vec<MatchItem>,
}

impl NewMatch {
    pub fn new(input: Vec<MatchItem>, output: Vec<MatchItem>) -> Self {
        Self { input, output }
    }
}
