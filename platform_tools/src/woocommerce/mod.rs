//! WooCommerce REST (`wc/v3`) adapter. Authenticates with the consumer key/secret pair over HTTP Basic auth.
mod mapping;

use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};

use crate::{
    data_objects::{
        base_url_for,
        AccessGrant,
        AuthorizationUrl,
        CreatedWebhooks,
        OAuthCallbackParams,
        Order,
        OrderCancellation,
        OrderPage,
        PageInfo,
        Product,
        ProductPage,
        PurchaseCancellation,
        PurchaseRequest,
        PurchaseResult,
        PurchaseStatus,
        TrackingInfo,
        UpdateProductRequest,
        UpdateProductResult,
        Webhook,
        WebhookEvent,
        WebhookFailure,
        WebhookRequest,
    },
    helpers::{json_i64, json_id, json_opt_string, json_price},
    http::RestClient,
    signature::{issue_state, verify_body_hmac, verify_state},
    topics::{event_for, strip_base_url, topic_for},
    AdapterConfig,
    AdapterError,
    ChannelAdapter,
    PlatformAdapter,
    PlatformCredentials,
    PlatformKind,
    ShopAdapter,
};

pub const SIGNATURE_HEADER: &str = "x-wc-webhook-signature";
const API_PREFIX: &str = "/wp-json/wc/v3";
const PAGE_SIZE: usize = 15;

#[derive(Clone)]
pub struct WooCommerceClient {
    config: Arc<AdapterConfig>,
    credentials: PlatformCredentials,
    rest: RestClient,
}

impl WooCommerceClient {
    pub fn new(credentials: PlatformCredentials, config: Arc<AdapterConfig>) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let secret = credentials
            .access_secret
            .clone()
            .ok_or_else(|| AdapterError::Initialization("WooCommerce credentials need a consumer secret".into()))?;
        let base_url = format!("{}{API_PREFIX}", credentials.base_url());
        let rest = RestClient::new(base_url, headers, &config)?
            .with_basic_auth(credentials.access_token.reveal().clone(), secret);
        Ok(Self { config, credentials, rest })
    }

    async fn get<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, AdapterError>
    where T: serde::de::DeserializeOwned {
        self.rest.rest_query::<T, ()>(Method::GET, path, params, None).await
    }

    async fn send(&self, method: Method, path: &str, body: Value) -> Result<Value, AdapterError> {
        self.rest.rest_query::<Value, Value>(method, path, &[], Some(body)).await
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> Result<Value, AdapterError> {
        let secret = self.config.woocommerce.webhook_secret.reveal();
        verify_body_hmac(secret, &request.body, request.header(SIGNATURE_HEADER))?;
        serde_json::from_slice(&request.body).map_err(|e| AdapterError::JsonError(e.to_string()))
    }

    /// The REST path of a product, or of one of its variations.
    fn variant_path(product_id: &str, variant_id: &str) -> String {
        if variant_id.is_empty() || variant_id == product_id || variant_id == "0" {
            format!("/products/{product_id}")
        } else {
            format!("/products/{product_id}/variations/{variant_id}")
        }
    }

    /// Variable products are expanded into their variations; everything else maps to a single product.
    async fn expand(&self, product: &Value) -> Result<Vec<Product>, AdapterError> {
        if product["type"].as_str() != Some("variable") {
            return Ok(vec![mapping::product(product, None)]);
        }
        let path = format!("/products/{}/variations", json_id(&product["id"]));
        let per_page = PAGE_SIZE.to_string();
        let variations = self.get::<Vec<Value>>(&path, &[("per_page", per_page.as_str())]).await?;
        Ok(variations.iter().map(|v| mapping::product(product, Some(v))).collect())
    }

    /// WooCommerce only accepts absolute stock levels, so relative changes are a read-modify-write. Concurrent edits
    /// between the read and the write are lost.
    async fn adjust_inventory(&self, product_id: &str, variant_id: &str, delta: i64) -> Result<(), AdapterError> {
        let path = Self::variant_path(product_id, variant_id);
        let current = self.get::<Value>(&path, &[]).await?;
        if !current["manage_stock"].as_bool().unwrap_or(false) {
            return Err(AdapterError::Upstream(format!("Stock is not managed for {product_id}/{variant_id}")));
        }
        let quantity = json_i64(&current["stock_quantity"]).unwrap_or_default() + delta;
        debug!("📦️ Setting WooCommerce stock of {product_id}/{variant_id} to {quantity} ({delta:+})");
        self.send(Method::PUT, &path, json!({ "stock_quantity": quantity })).await?;
        Ok(())
    }

    async fn update_price(&self, product_id: &str, variant_id: &str, price: &str) -> Result<(), AdapterError> {
        let path = Self::variant_path(product_id, variant_id);
        debug!("📦️ Setting WooCommerce price of {product_id}/{variant_id} to {price}");
        self.send(Method::PUT, &path, json!({ "regular_price": price })).await?;
        Ok(())
    }

    fn cancellation_of(payload: &Value) -> Option<String> {
        (payload["status"].as_str() == Some(mapping::STATUS_CANCELLED)).then(|| json_id(&payload["id"]))
    }
}

fn webhook_from_json(hook: &Value, frontend_url: &str) -> Option<Webhook> {
    let topic = hook["topic"].as_str().unwrap_or_default();
    let event = event_for(PlatformKind::WooCommerce, topic)?;
    Some(Webhook {
        id: json_id(&hook["id"]),
        callback_url: strip_base_url(hook["delivery_url"].as_str().unwrap_or_default(), frontend_url),
        topic: event,
    })
}

fn page_from(after: Option<String>) -> u32 {
    after.and_then(|s| s.parse::<u32>().ok()).unwrap_or(1).max(1)
}

fn address_json(request: &PurchaseRequest) -> Value {
    let a = request.shipping.clone().unwrap_or_default();
    json!({
        "first_name": a.first_name,
        "last_name": a.last_name,
        "address_1": a.street_address1,
        "address_2": a.street_address2.unwrap_or_default(),
        "city": a.city,
        "state": a.state,
        "postcode": a.zip,
        "country": a.country,
        "phone": a.phone.unwrap_or_default(),
        "email": a.email.unwrap_or_default(),
    })
}

impl PlatformAdapter for WooCommerceClient {
    fn platform(&self) -> PlatformKind {
        PlatformKind::WooCommerce
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        let page = page_from(after);
        let page_str = page.to_string();
        let per_page = PAGE_SIZE.to_string();
        let mut params = vec![("per_page", per_page.as_str()), ("page", page_str.as_str())];
        if !search_entry.is_empty() {
            params.push(("search", search_entry));
        }
        let raw = self.get::<Vec<Value>>("/products", &params).await?;
        let expanded = futures::future::try_join_all(raw.iter().map(|p| self.expand(p))).await?;
        let products = expanded.into_iter().flatten().collect();
        Ok(ProductPage { products, page_info: PageInfo::from_page_number(page, raw.len(), PAGE_SIZE) })
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        let parent = self.get::<Value>(&format!("/products/{product_id}"), &[]).await?;
        let path = Self::variant_path(product_id, variant_id);
        if path.contains("/variations/") {
            let variation = self.get::<Value>(&path, &[]).await?;
            Ok(mapping::product(&parent, Some(&variation)))
        } else {
            Ok(mapping::product(&parent, None))
        }
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        let delivery_url = self.config.callback_url(endpoint);
        let mut result = CreatedWebhooks::default();
        for &event in events {
            let outcome = async {
                let topic = topic_for(PlatformKind::WooCommerce, event)?;
                let body = json!({
                    "name": format!("Openship {event}"),
                    "topic": topic,
                    "delivery_url": delivery_url,
                    "secret": self.config.woocommerce.webhook_secret.reveal(),
                    "status": "active",
                });
                let hook = self.send(Method::POST, "/webhooks", body).await?;
                webhook_from_json(&hook, &self.config.frontend_url).ok_or(AdapterError::EmptyResponse)
            }
            .await;
            match outcome {
                Ok(webhook) => {
                    info!("🪝️ Created WooCommerce webhook {} for {event}", webhook.id);
                    result.webhook_id.get_or_insert_with(|| webhook.id.clone());
                    result.webhooks.push(webhook);
                },
                Err(e) => {
                    warn!("🪝️ Could not create WooCommerce webhook for {event}. {e}");
                    result.failures.push(WebhookFailure { event, message: e.to_string() });
                },
            }
        }
        Ok(result)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        let path = format!("/webhooks/{webhook_id}");
        self.rest.rest_query::<Value, ()>(Method::DELETE, &path, &[("force", "true")], None).await?;
        info!("🪝️ Deleted WooCommerce webhook {webhook_id}");
        Ok(true)
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        let hooks = self.get::<Vec<Value>>("/webhooks", &[("per_page", "100")]).await?;
        Ok(hooks.iter().filter_map(|h| webhook_from_json(h, &self.config.frontend_url)).collect())
    }

    /// WooCommerce posts the generated keys to `callback_url` and echoes the state back as `user_id`. The store
    /// domain is carried in the callback URL's `shop` parameter since the key delivery does not include it.
    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        let state = issue_state(self.config.oauth_state_secret.reveal())?;
        let mut callback = url::Url::parse(callback_url).map_err(|e| AdapterError::Configuration(e.to_string()))?;
        callback.query_pairs_mut().append_pair("shop", domain);
        let base = format!("{}/wc-auth/v1/authorize", base_url_for(domain));
        let url = url::Url::parse_with_params(&base, &[
            ("app_name", self.config.woocommerce.app_name.as_str()),
            ("scope", "read_write"),
            ("user_id", state.as_str()),
            ("return_url", self.config.frontend_url.as_str()),
            ("callback_url", callback.as_str()),
        ])
        .map_err(|e| AdapterError::Configuration(e.to_string()))?;
        Ok(AuthorizationUrl { auth_url: url.to_string(), state })
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        _callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        verify_state(self.config.oauth_state_secret.reveal(), params.state.as_deref())?;
        let (Some(shop), Some(key), Some(secret)) =
            (params.shop.as_deref(), params.consumer_key.as_deref(), params.consumer_secret.as_deref())
        else {
            return Err(AdapterError::InvalidSignature("WooCommerce key delivery is incomplete".into()));
        };
        info!("🔑️ Received WooCommerce REST keys for {shop}");
        Ok(AccessGrant { domain: shop.to_string(), access_token: key.into(), access_secret: Some(secret.into()) })
    }
}

impl ShopAdapter for WooCommerceClient {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError> {
        let page = page_from(after);
        let page_str = page.to_string();
        let per_page = PAGE_SIZE.to_string();
        let mut params = vec![("per_page", per_page.as_str()), ("page", page_str.as_str())];
        if !search_entry.is_empty() {
            params.push(("search", search_entry));
        }
        let raw = self.get::<Vec<Value>>("/orders", &params).await?;
        let orders = raw.iter().map(mapping::order).collect();
        Ok(OrderPage { orders, page_info: PageInfo::from_page_number(page, raw.len(), PAGE_SIZE) })
    }

    async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError> {
        let inventory = async {
            match request.inventory {
                Some(delta) => Some(self.adjust_inventory(&request.product_id, &request.variant_id, delta).await),
                None => None,
            }
        };
        let price = async {
            match &request.price {
                Some(price) => Some(self.update_price(&request.product_id, &request.variant_id, price).await),
                None => None,
            }
        };
        let (inventory, price) = futures::join!(inventory, price);
        let outcomes = [("inventory", inventory), ("price", price)]
            .into_iter()
            .filter_map(|(name, outcome)| outcome.map(|o| (name, o)))
            .collect();
        UpdateProductResult::from_outcomes(outcomes)
    }

    async fn normalize_order_created(&self, request: &WebhookRequest) -> Result<Order, AdapterError> {
        let payload = self.verify_webhook(request)?;
        Ok(mapping::order(&payload))
    }

    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        Ok(Self::cancellation_of(&payload)
            .map(|order_id| OrderCancellation { order_id, reason: json_opt_string(&payload["customer_note"]) }))
    }
}

impl ChannelAdapter for WooCommerceClient {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError> {
        let address = address_json(request);
        let line_items = request
            .cart_items
            .iter()
            .map(|item| {
                let product_id = item.product_id.parse::<i64>().ok();
                let variation_id = item.variant_id.parse::<i64>().ok().filter(|v| Some(*v) != product_id);
                json!({ "product_id": product_id, "variation_id": variation_id, "quantity": item.quantity })
            })
            .collect::<Vec<_>>();
        let body = json!({
            "payment_method": "openship",
            "payment_method_title": "Openship",
            "set_paid": true,
            "status": "processing",
            "billing": address,
            "shipping": address,
            "line_items": line_items,
            "customer_note": request.notes.clone().unwrap_or_default(),
        });
        let order = self.send(Method::POST, "/orders", body).await?;
        let purchase_id = json_id(&order["id"]);
        if purchase_id.is_empty() {
            return Err(AdapterError::EmptyResponse);
        }
        let order_number = format!("#{}", json_opt_string(&order["number"]).unwrap_or_else(|| purchase_id.clone()));
        info!("🛒️ Placed WooCommerce order {order_number} on {}", self.credentials.domain);
        Ok(PurchaseResult {
            purchase_id,
            order_number,
            total_price: json_price(&order["total"]),
            line_items: order["line_items"]
                .as_array()
                .map(|a| a.iter().map(mapping::line_item).collect())
                .unwrap_or_default(),
            status: PurchaseStatus::Completed,
        })
    }

    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError> {
        let body = json!({ "status": mapping::STATUS_CANCELLED });
        self.send(Method::PUT, &format!("/orders/{purchase_id}"), body).await?;
        info!("🛒️ Cancelled WooCommerce order {purchase_id}");
        Ok(())
    }

    async fn normalize_tracking_created(&self, _request: &WebhookRequest) -> Result<TrackingInfo, AdapterError> {
        Err(AdapterError::UnsupportedTopic {
            platform: PlatformKind::WooCommerce.to_string(),
            event: WebhookEvent::TrackingCreated,
        })
    }

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        Ok(Self::cancellation_of(&payload).map(|purchase_id| PurchaseCancellation { purchase_id, reason: None }))
    }
}
