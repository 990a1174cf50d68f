use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use osp_common::Secret;
use serde::{Deserialize, Serialize};

use crate::AdapterError;

//--------------------------------------     Platforms       ---------------------------------------------------------

/// The vendor integration type. This is the immutable `key` of a shop or channel platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Shopify,
    BigCommerce,
    WooCommerce,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopify => "shopify",
            Self::BigCommerce => "bigcommerce",
            Self::WooCommerce => "woocommerce",
        }
    }
}

impl Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shopify" => Ok(Self::Shopify),
            "bigcommerce" => Ok(Self::BigCommerce),
            "woocommerce" => Ok(Self::WooCommerce),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}

/// Per-install credentials for a shop or channel.
///
/// * Shopify: `domain` is the `*.myshopify.com` host and `access_token` the offline Admin API token.
/// * BigCommerce: `domain` is the store hash and `access_token` the `X-Auth-Token`.
/// * WooCommerce: `domain` is the store host, `access_token` the consumer key and `access_secret` the consumer secret.
///
/// `domain` may carry an explicit `http://` or `https://` scheme, in which case it is used as the base URL verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformCredentials {
    pub domain: String,
    pub access_token: Secret<String>,
    #[serde(default)]
    pub access_secret: Option<Secret<String>>,
}

impl PlatformCredentials {
    pub fn new<S: Into<String>>(domain: S, access_token: S) -> Self {
        Self { domain: domain.into(), access_token: Secret::new(access_token.into()), access_secret: None }
    }

    pub fn with_secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.access_secret = Some(Secret::new(secret.into()));
        self
    }

    pub fn base_url(&self) -> String {
        base_url_for(&self.domain)
    }
}

/// `https://{domain}`, unless `domain` already carries a scheme.
pub fn base_url_for(domain: &str) -> String {
    let domain = domain.trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

//--------------------------------------     Products        ---------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub image: Option<String>,
    pub title: String,
    pub product_id: String,
    pub variant_id: String,
    pub price: String,
    pub available_for_sale: bool,
    pub inventory: Option<i64>,
    pub inventory_tracked: bool,
    pub product_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    pub fn last_page() -> Self {
        Self { has_next_page: false, end_cursor: None }
    }

    /// Page info for offset-paginated REST APIs, where the cursor is the next page number.
    pub fn from_page_number(page: u32, received: usize, page_size: usize) -> Self {
        if received < page_size {
            Self::last_page()
        } else {
            Self { has_next_page: true, end_cursor: Some((page + 1).to_string()) }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub product_id: String,
    pub variant_id: String,
    /// Relative inventory adjustment. Never an absolute quantity.
    pub inventory: Option<i64>,
    /// Absolute replacement price, as a decimal string.
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    pub mutation: String,
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductResult {
    pub success: bool,
    pub results: Vec<MutationResult>,
}

impl UpdateProductResult {
    /// Combines the outcomes of independently executed sub-mutations. Every outcome is logged.
    ///
    /// If every sub-mutation failed, nothing changed upstream and the first error is returned. If only some failed,
    /// the result is [`AdapterError::PartialUpdate`], which lists the outcome of each one.
    pub fn from_outcomes(outcomes: Vec<(&str, Result<(), AdapterError>)>) -> Result<Self, AdapterError> {
        let mut results = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        for (mutation, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    debug!("📦️ {mutation} update succeeded");
                    results.push(MutationResult { mutation: mutation.to_string(), success: true, message: None });
                },
                Err(e) => {
                    warn!("📦️ {mutation} update failed. {e}");
                    results.push(MutationResult {
                        mutation: mutation.to_string(),
                        success: false,
                        message: Some(e.to_string()),
                    });
                    first_error.get_or_insert(e);
                },
            }
        }
        match first_error {
            None => Ok(Self { success: true, results }),
            Some(_) if results.iter().any(|r| r.success) => Err(AdapterError::PartialUpdate { results }),
            Some(e) => Err(e),
        }
    }
}

//--------------------------------------      Orders         ---------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProcess,
    Awaiting,
    Backordered,
    Cancelled,
    Complete,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProcess => "INPROCESS",
            Self::Awaiting => "AWAITING",
            Self::Backordered => "BACKORDERED",
            Self::Cancelled => "CANCELLED",
            Self::Complete => "COMPLETE",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CartItemStatus {
    #[default]
    Pending,
    Placed,
    Fulfilled,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub product_id: String,
    pub variant_id: String,
    pub quantity: i64,
    pub price: String,
    pub image: Option<String>,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub purchase_id: String,
    pub tracking_number: String,
    pub tracking_company: Option<String>,
    pub tracking_url: Option<String>,
}

/// An item placed (or to be placed) on a channel on behalf of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub channel_id: i64,
    pub name: String,
    pub product_id: String,
    pub variant_id: String,
    pub quantity: i64,
    pub price: String,
    pub image: Option<String>,
    pub sku: Option<String>,
    pub purchase_id: Option<String>,
    #[serde(default)]
    pub status: CartItemStatus,
    pub tracking: Option<TrackingInfo>,
}

/// The platform-agnostic order record produced by every shop adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub order_name: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street_address1: Option<String>,
    pub street_address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub currency: String,
    pub total_price: String,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            street_address1: self.street_address1.clone().unwrap_or_default(),
            street_address2: self.street_address2.clone(),
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
            zip: self.zip.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page_info: PageInfo,
}

/// Shop-side cancellation of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancellation {
    pub order_id: String,
    pub reason: Option<String>,
}

/// Channel-side cancellation of a purchase previously placed by Openship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCancellation {
    pub purchase_id: String,
    pub reason: Option<String>,
}

//--------------------------------------     Purchases       ---------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street_address1: String,
    pub street_address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub cart_items: Vec<CartItem>,
    pub shipping: Option<ShippingAddress>,
    pub notes: Option<String>,
}

/// States of the two-phase purchase flow.
///
/// `DraftCreated → Completed` is the happy path. When completion fails the draft is deleted (`Compensated`); if that
/// also fails the draft is `Orphaned` and needs manual clean-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    DraftCreated,
    Completed,
    Compensated,
    Orphaned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResult {
    pub purchase_id: String,
    pub order_number: String,
    pub total_price: String,
    pub line_items: Vec<LineItem>,
    pub status: PurchaseStatus,
}

//--------------------------------------     Webhooks        ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEvent {
    OrderCreated,
    OrderCancelled,
    OrderChargebacked,
    TrackingCreated,
}

impl WebhookEvent {
    pub const ALL: [WebhookEvent; 4] =
        [Self::OrderCreated, Self::OrderCancelled, Self::OrderChargebacked, Self::TrackingCreated];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "ORDER_CREATED",
            Self::OrderCancelled => "ORDER_CANCELLED",
            Self::OrderChargebacked => "ORDER_CHARGEBACKED",
            Self::TrackingCreated => "TRACKING_CREATED",
        }
    }
}

impl Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    /// The callback URL with the deployment's `FRONTEND_URL` prefix removed.
    pub callback_url: String,
    pub topic: WebhookEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookFailure {
    pub event: WebhookEvent,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWebhooks {
    pub webhooks: Vec<Webhook>,
    /// Id of the first webhook created, if any.
    pub webhook_id: Option<String>,
    pub failures: Vec<WebhookFailure>,
}

/// The raw inbound delivery of a webhook. Header names are stored lower-cased.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl WebhookRequest {
    pub fn new(body: Vec<u8>) -> Self {
        Self { headers: HashMap::new(), body }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

//--------------------------------------       OAuth         ---------------------------------------------------------

/// Query (or body) parameters delivered to the OAuth callback. Which of them are present depends on the platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthCallbackParams {
    pub shop: Option<String>,
    pub code: Option<String>,
    pub hmac: Option<String>,
    pub timestamp: Option<String>,
    /// WooCommerce echoes the state back as `user_id`.
    #[serde(alias = "user_id")]
    pub state: Option<String>,
    pub host: Option<String>,
    /// BigCommerce: `stores/{store_hash}`.
    pub context: Option<String>,
    pub scope: Option<String>,
    /// WooCommerce delivers the generated REST keys directly instead of a code.
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationUrl {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub domain: String,
    pub access_token: Secret<String>,
    pub access_secret: Option<Secret<String>>,
}

impl AccessGrant {
    pub fn into_credentials(self) -> PlatformCredentials {
        PlatformCredentials { domain: self.domain, access_token: self.access_token, access_secret: self.access_secret }
    }
}
