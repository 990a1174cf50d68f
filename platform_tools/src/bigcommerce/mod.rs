//! BigCommerce REST (v2 orders, v3 catalog and hooks) adapter.
//!
//! Webhook payloads only carry resource ids, so the normalizers fetch the full record before mapping it.
mod mapping;

use std::sync::Arc;

use futures::future::try_join;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    data_objects::{
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
    signature::{issue_state, verify_shared_token, verify_state},
    topics::{event_for, strip_base_url, topic_for},
    AdapterConfig,
    AdapterError,
    ChannelAdapter,
    PlatformAdapter,
    PlatformCredentials,
    PlatformKind,
    ShopAdapter,
};

pub const SIGNATURE_HEADER: &str = "x-openship-signature";
const PAGE_SIZE: usize = 15;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Clone)]
pub struct BigCommerceClient {
    config: Arc<AdapterConfig>,
    store_hash: String,
    rest: RestClient,
}

impl BigCommerceClient {
    pub fn new(credentials: PlatformCredentials, config: Arc<AdapterConfig>) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::with_capacity(3);
        let val = HeaderValue::from_str(credentials.access_token.reveal().as_str())
            .map_err(|e| AdapterError::Initialization(e.to_string()))?;
        headers.insert("X-Auth-Token", val);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let store_hash = credentials.domain.trim_start_matches("stores/").to_string();
        let base_url = format!("{}/stores/{store_hash}", config.bigcommerce.api_base.trim_end_matches('/'));
        let rest = RestClient::new(base_url, headers, &config)?;
        Ok(Self { config, store_hash, rest })
    }

    async fn get<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, AdapterError>
    where T: serde::de::DeserializeOwned {
        self.rest.rest_query::<T, ()>(Method::GET, path, params, None).await
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> Result<Value, AdapterError> {
        verify_shared_token(self.config.bigcommerce.webhook_token.reveal(), request.header(SIGNATURE_HEADER))?;
        serde_json::from_slice(&request.body).map_err(|e| AdapterError::JsonError(e.to_string()))
    }

    /// Fetches a v2 order together with its products and shipping addresses.
    async fn fetch_order(&self, order_id: &str) -> Result<Order, AdapterError> {
        let order = self.get::<Value>(&format!("/v2/orders/{order_id}"), &[]).await?;
        if order.is_null() {
            return Err(AdapterError::NotFound(format!("Order {order_id}")));
        }
        let products_path = format!("/v2/orders/{order_id}/products");
        let shipping_path = format!("/v2/orders/{order_id}/shipping_addresses");
        let (products, shipping) = try_join(
            self.get::<Option<Vec<Value>>>(&products_path, &[]),
            self.get::<Option<Vec<Value>>>(&shipping_path, &[]),
        )
        .await?;
        Ok(mapping::v2_order(&order, &products.unwrap_or_default(), &shipping.unwrap_or_default()))
    }

    async fn default_location(&self) -> Result<i64, AdapterError> {
        let locations = self.get::<Envelope<Vec<Value>>>("/v3/inventory/locations", &[]).await?;
        locations
            .data
            .iter()
            .find(|l| l["enabled"].as_bool().unwrap_or(true))
            .and_then(|l| json_i64(&l["id"]))
            .ok_or_else(|| AdapterError::Upstream("Store has no active inventory location".into()))
    }

    async fn adjust_inventory(&self, variant_id: &str, delta: i64) -> Result<(), AdapterError> {
        let location_id = self.default_location().await?;
        let variant_id =
            variant_id.parse::<i64>().map_err(|_| AdapterError::NotFound(format!("Variant {variant_id}")))?;
        let body = json!({
            "reason": "Openship inventory sync",
            "items": [{ "location_id": location_id, "variant_id": variant_id, "quantity": delta }]
        });
        debug!("📦️ Adjusting BigCommerce inventory of {variant_id} by {delta}");
        let path = "/v3/inventory/adjustments/relative";
        self.rest.rest_query::<Value, Value>(Method::POST, path, &[], Some(body)).await?;
        Ok(())
    }

    async fn update_price(&self, product_id: &str, variant_id: &str, price: &str) -> Result<(), AdapterError> {
        let price = price.parse::<f64>().map_err(|e| AdapterError::InvalidPrice(format!("{price}. {e}")))?;
        let path = format!("/v3/catalog/products/{product_id}/variants/{variant_id}");
        debug!("📦️ Setting BigCommerce price of {variant_id} to {price}");
        self.rest.rest_query::<Value, Value>(Method::PUT, &path, &[], Some(json!({ "price": price }))).await?;
        Ok(())
    }

    async fn set_status(&self, order_id: &str, status_id: i64) -> Result<(), AdapterError> {
        let path = format!("/v2/orders/{order_id}");
        self.rest.rest_query::<Value, Value>(Method::PUT, &path, &[], Some(json!({ "status_id": status_id }))).await?;
        Ok(())
    }

    fn cancellation_of(payload: &Value) -> Option<(String, Option<String>)> {
        let status = &payload["data"]["status"];
        match json_i64(&status["new_status_id"]) {
            Some(mapping::STATUS_CANCELLED) => Some((json_id(&payload["data"]["id"]), Some("Cancelled".to_string()))),
            _ => None,
        }
    }
}

fn webhook_from_hook(hook: &Value, frontend_url: &str) -> Option<Webhook> {
    let scope = hook["scope"].as_str().unwrap_or_default();
    let event = event_for(PlatformKind::BigCommerce, scope)?;
    Some(Webhook {
        id: json_id(&hook["id"]),
        callback_url: strip_base_url(hook["destination"].as_str().unwrap_or_default(), frontend_url),
        topic: event,
    })
}

fn page_from(after: Option<String>) -> u32 {
    after.and_then(|s| s.parse::<u32>().ok()).unwrap_or(1).max(1)
}

impl PlatformAdapter for BigCommerceClient {
    fn platform(&self) -> PlatformKind {
        PlatformKind::BigCommerce
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        let page = page_from(after).to_string();
        let limit = PAGE_SIZE.to_string();
        let mut params = vec![("include", "variants,images"), ("limit", limit.as_str()), ("page", page.as_str())];
        if !search_entry.is_empty() {
            params.push(("keyword", search_entry));
        }
        let response = self.get::<Value>("/v3/catalog/products", &params).await?;
        let products = response["data"]
            .as_array()
            .map(|a| a.iter().flat_map(|p| mapping::catalog_products(p, &self.store_hash)).collect())
            .unwrap_or_default();
        let pagination = &response["meta"]["pagination"];
        let current = json_i64(&pagination["current_page"]).unwrap_or(1);
        let total = json_i64(&pagination["total_pages"]).unwrap_or(1);
        let page_info = if current < total {
            PageInfo { has_next_page: true, end_cursor: Some((current + 1).to_string()) }
        } else {
            PageInfo::last_page()
        };
        Ok(ProductPage { products, page_info })
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        let path = format!("/v3/catalog/products/{product_id}");
        let response = self.get::<Envelope<Value>>(&path, &[("include", "variants,images")]).await?;
        mapping::catalog_products(&response.data, &self.store_hash)
            .into_iter()
            .find(|p| p.variant_id == variant_id)
            .ok_or_else(|| AdapterError::NotFound(format!("Product {product_id} variant {variant_id}")))
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        let destination = self.config.callback_url(endpoint);
        let token = self.config.bigcommerce.webhook_token.reveal();
        let mut result = CreatedWebhooks::default();
        for &event in events {
            let outcome = async {
                let scope = topic_for(PlatformKind::BigCommerce, event)?;
                let body = json!({
                    "scope": scope,
                    "destination": destination,
                    "is_active": true,
                    "headers": { "x-openship-signature": token },
                });
                let hook =
                    self.rest.rest_query::<Envelope<Value>, Value>(Method::POST, "/v3/hooks", &[], Some(body)).await?;
                webhook_from_hook(&hook.data, &self.config.frontend_url).ok_or(AdapterError::EmptyResponse)
            }
            .await;
            match outcome {
                Ok(webhook) => {
                    info!("🪝️ Created BigCommerce webhook {} for {event}", webhook.id);
                    result.webhook_id.get_or_insert_with(|| webhook.id.clone());
                    result.webhooks.push(webhook);
                },
                Err(e) => {
                    warn!("🪝️ Could not create BigCommerce webhook for {event}. {e}");
                    result.failures.push(WebhookFailure { event, message: e.to_string() });
                },
            }
        }
        Ok(result)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        let path = format!("/v3/hooks/{webhook_id}");
        self.rest.rest_query::<Value, ()>(Method::DELETE, &path, &[], None).await?;
        info!("🪝️ Deleted BigCommerce webhook {webhook_id}");
        Ok(true)
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        let hooks = self.get::<Envelope<Vec<Value>>>("/v3/hooks", &[]).await?;
        Ok(hooks.data.iter().filter_map(|h| webhook_from_hook(h, &self.config.frontend_url)).collect())
    }

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        let state = issue_state(self.config.oauth_state_secret.reveal())?;
        let base = format!("{}/oauth2/authorize", self.config.bigcommerce.login_base.trim_end_matches('/'));
        let context = format!("stores/{}", domain.trim_start_matches("stores/"));
        let url = url::Url::parse_with_params(&base, &[
            ("client_id", self.config.bigcommerce.app.app_key.as_str()),
            ("response_type", "code"),
            ("scope", self.config.bigcommerce.scopes.as_str()),
            ("redirect_uri", callback_url),
            ("context", context.as_str()),
            ("state", state.as_str()),
        ])
        .map_err(|e| AdapterError::Configuration(e.to_string()))?;
        Ok(AuthorizationUrl { auth_url: url.to_string(), state })
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        verify_state(self.config.oauth_state_secret.reveal(), params.state.as_deref())?;
        let (Some(code), Some(context)) = (params.code.as_deref(), params.context.as_deref()) else {
            return Err(AdapterError::InvalidSignature("BigCommerce OAuth callback is missing code or context".into()));
        };
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            context: String,
        }
        let login_base = self.config.bigcommerce.login_base.trim_end_matches('/').to_string();
        let client = RestClient::new(login_base, HeaderMap::new(), &self.config)?;
        let body = json!({
            "client_id": self.config.bigcommerce.app.app_key,
            "client_secret": self.config.bigcommerce.app.app_secret.reveal(),
            "code": code,
            "context": context,
            "scope": params.scope.clone().unwrap_or_else(|| self.config.bigcommerce.scopes.clone()),
            "grant_type": "authorization_code",
            "redirect_uri": callback_url,
        });
        let token = client.rest_query::<TokenResponse, Value>(Method::POST, "/oauth2/token", &[], Some(body)).await?;
        let store_hash = token.context.trim_start_matches("stores/").to_string();
        info!("🔑️ Obtained BigCommerce access token for store {store_hash}");
        Ok(AccessGrant { domain: store_hash, access_token: token.access_token.into(), access_secret: None })
    }
}

impl ShopAdapter for BigCommerceClient {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError> {
        let page = page_from(after);
        let page_str = page.to_string();
        let limit = PAGE_SIZE.to_string();
        let mut params =
            vec![("limit", limit.as_str()), ("page", page_str.as_str()), ("sort", "date_created:desc")];
        // The orders listing only filters on order number and customer email
        let term = search_entry.trim().trim_start_matches('#');
        if term.contains('@') {
            params.push(("email", term));
        } else if !term.is_empty() && term.chars().all(|c| c.is_ascii_digit()) {
            params.extend([("min_id", term), ("max_id", term)]);
        } else if !term.is_empty() {
            debug!("🛒️ BigCommerce orders can only be searched by number or email. No match for '{term}'");
            return Ok(OrderPage { orders: vec![], page_info: PageInfo::last_page() });
        }
        // v2 answers 204 with an empty body when nothing matches
        let raw = self.get::<Option<Vec<Value>>>("/v2/orders", &params).await?.unwrap_or_default();
        let received = raw.len();
        let ids = raw.iter().map(|o| json_id(&o["id"])).collect::<Vec<_>>();
        let orders = futures::future::try_join_all(ids.iter().map(|id| self.fetch_order(id))).await?;
        Ok(OrderPage { orders, page_info: PageInfo::from_page_number(page, received, PAGE_SIZE) })
    }

    async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError> {
        let inventory = async {
            match request.inventory {
                Some(delta) => Some(self.adjust_inventory(&request.variant_id, delta).await),
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
        let order_id = json_id(&payload["data"]["id"]);
        if order_id.is_empty() {
            return Err(AdapterError::JsonError("Webhook payload carries no order id".into()));
        }
        self.fetch_order(&order_id).await
    }

    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        Ok(Self::cancellation_of(&payload).map(|(order_id, reason)| OrderCancellation { order_id, reason }))
    }
}

impl ChannelAdapter for BigCommerceClient {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError> {
        let address = request.shipping.clone().unwrap_or_default();
        let address = json!({
            "first_name": address.first_name,
            "last_name": address.last_name,
            "street_1": address.street_address1,
            "street_2": address.street_address2.unwrap_or_default(),
            "city": address.city,
            "state": address.state,
            "zip": address.zip,
            "country_iso2": address.country,
            "phone": address.phone.unwrap_or_default(),
            "email": address.email.unwrap_or_default(),
        });
        let products = request
            .cart_items
            .iter()
            .map(|item| {
                json!({
                    "product_id": item.product_id.parse::<i64>().ok(),
                    "variant_id": item.variant_id.parse::<i64>().ok(),
                    "quantity": item.quantity,
                })
            })
            .collect::<Vec<_>>();
        let body = json!({
            "status_id": mapping::STATUS_AWAITING_FULFILLMENT,
            "customer_id": 0,
            "billing_address": address,
            "shipping_addresses": [address],
            "products": products,
            "customer_message": request.notes.clone().unwrap_or_default(),
        });
        let order = self.rest.rest_query::<Value, Value>(Method::POST, "/v2/orders", &[], Some(body)).await?;
        let order_id = json_id(&order["id"]);
        if order_id.is_empty() {
            return Err(AdapterError::EmptyResponse);
        }
        debug!("🛒️ Created BigCommerce order {order_id}");
        let products_path = format!("/v2/orders/{order_id}/products");
        let line_items = match self.get::<Option<Vec<Value>>>(&products_path, &[]).await {
            Ok(products) => products.unwrap_or_default().iter().map(mapping::order_line_item).collect(),
            Err(e) => {
                warn!("🛒️ Could not read back BigCommerce order {order_id}. {e}. Cancelling it.");
                let compensated = match self.set_status(&order_id, mapping::STATUS_CANCELLED).await {
                    Ok(()) => true,
                    Err(cancel) => {
                        error!("🛒️ BigCommerce order {order_id} was left open. Cancel it by hand. {cancel}");
                        false
                    },
                };
                return Err(AdapterError::PurchaseAborted { draft_id: order_id, compensated, reason: e.to_string() });
            },
        };
        info!("🛒️ Placed BigCommerce order {order_id}");
        Ok(PurchaseResult {
            order_number: format!("#{order_id}"),
            purchase_id: order_id,
            total_price: json_price(&order["total_inc_tax"]),
            line_items,
            status: PurchaseStatus::Completed,
        })
    }

    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError> {
        self.set_status(purchase_id, mapping::STATUS_CANCELLED).await?;
        info!("🛒️ Cancelled BigCommerce order {purchase_id}");
        Ok(())
    }

    async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError> {
        let payload = self.verify_webhook(request)?;
        let data = &payload["data"];
        let order_id = json_id(&data["orderId"]);
        let shipment_id = json_id(&data["id"]);
        let path = format!("/v2/orders/{order_id}/shipments/{shipment_id}");
        let shipment = self.get::<Value>(&path, &[]).await?;
        let tracking_number = json_opt_string(&shipment["tracking_number"])
            .ok_or_else(|| AdapterError::Upstream(format!("Shipment {shipment_id} carries no tracking number")))?;
        Ok(TrackingInfo {
            purchase_id: order_id,
            tracking_number,
            tracking_company: json_opt_string(&shipment["tracking_carrier"])
                .or_else(|| json_opt_string(&shipment["shipping_provider"])),
            tracking_url: json_opt_string(&shipment["tracking_link"]),
        })
    }

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        Ok(Self::cancellation_of(&payload).map(|(purchase_id, reason)| PurchaseCancellation { purchase_id, reason }))
    }
}

#[cfg(test)]
mod test {
    use mockito::Matcher;

    use super::*;

    fn config(server: &mockito::Server) -> Arc<AdapterConfig> {
        let mut config = AdapterConfig::default();
        config.frontend_url = "https://admin.example.com".into();
        config.max_retries = 0;
        config.oauth_state_secret = "state-secret".into();
        config.bigcommerce.api_base = server.url();
        config.bigcommerce.login_base = server.url();
        config.bigcommerce.webhook_token = "hook-token".into();
        config.bigcommerce.app.app_key = "client-id".into();
        config.bigcommerce.app.app_secret = "client-secret".into();
        Arc::new(config)
    }

    fn client(server: &mockito::Server) -> BigCommerceClient {
        BigCommerceClient::new(PlatformCredentials::new("abc123", "token"), config(server)).unwrap()
    }

    fn signed(body: Value) -> WebhookRequest {
        WebhookRequest::new(body.to_string().into_bytes()).with_header(SIGNATURE_HEADER, "hook-token")
    }

    #[tokio::test]
    async fn empty_search_is_an_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stores/abc123/v3/catalog/products")
            .match_query(Matcher::UrlEncoded("keyword".into(), "zzz".into()))
            .match_header("x-auth-token", "token")
            .with_body(r#"{"data": [], "meta": {"pagination": {"total": 0, "current_page": 1, "total_pages": 0}}}"#)
            .create_async()
            .await;
        let page = client(&server).search_products("zzz", None).await.unwrap();
        assert!(page.products.is_empty());
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn order_numbers_are_searched_upstream() {
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", "/stores/abc123/v2/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("min_id".into(), "250".into()),
                Matcher::UrlEncoded("max_id".into(), "250".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_body(r#"[{"id": 250}]"#)
            .expect(1)
            .create_async()
            .await;
        let _order = server
            .mock("GET", "/stores/abc123/v2/orders/250")
            .with_body(include_str!("./test_assets/order.json"))
            .create_async()
            .await;
        let _products = server
            .mock("GET", "/stores/abc123/v2/orders/250/products")
            .with_body(r#"[{"name": "Orbit Terrarium", "product_id": 111, "variant_id": 382, "quantity": 2, "price_inc_tax": "89.0000"}]"#)
            .create_async()
            .await;
        let _shipping = server
            .mock("GET", "/stores/abc123/v2/orders/250/shipping_addresses")
            .with_status(204)
            .create_async()
            .await;
        let page = client(&server).search_orders("#250", None).await.unwrap();
        assert_eq!(page.orders.len(), 1);
        assert_eq!(page.orders[0].order_id, "250");
        assert!(!page.page_info.has_next_page);
        listing.assert_async().await;
    }

    #[tokio::test]
    async fn emails_are_searched_and_names_are_not() {
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", "/stores/abc123/v2/orders")
            .match_query(Matcher::UrlEncoded("email".into(), "billy@example.com".into()))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let client = client(&server);
        let page = client.search_orders("billy@example.com", None).await.unwrap();
        assert!(page.orders.is_empty());
        listing.assert_async().await;

        // Any other term is answered locally without listing orders
        let page = client.search_orders("Billy", None).await.unwrap();
        assert!(page.orders.is_empty());
        assert!(!page.page_info.has_next_page);
        listing.assert_async().await;
    }

    #[tokio::test]
    async fn chargeback_topic_is_reported_per_event() {
        let mut server = mockito::Server::new_async().await;
        let hook = server
            .mock("POST", "/stores/abc123/v3/hooks")
            .match_body(Matcher::PartialJson(json!({
                "scope": "store/order/created",
                "headers": { "x-openship-signature": "hook-token" }
            })))
            .with_body(
                json!({"data": {"id": 9001, "scope": "store/order/created",
                    "destination": "https://admin.example.com/api/handlers/shop/create-order/3", "is_active": true}})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let created = client(&server)
            .create_webhook("/api/handlers/shop/create-order/3", &[
                WebhookEvent::OrderCreated,
                WebhookEvent::OrderChargebacked,
            ])
            .await
            .unwrap();
        assert_eq!(created.webhook_id.as_deref(), Some("9001"));
        assert_eq!(created.webhooks[0].callback_url, "/api/handlers/shop/create-order/3");
        assert_eq!(created.failures.len(), 1);
        assert_eq!(created.failures[0].event, WebhookEvent::OrderChargebacked);
        hook.assert_async().await;
    }

    #[tokio::test]
    async fn order_created_fetches_the_full_order() {
        let mut server = mockito::Server::new_async().await;
        let _order = server
            .mock("GET", "/stores/abc123/v2/orders/250")
            .with_body(include_str!("./test_assets/order.json"))
            .create_async()
            .await;
        let _products = server
            .mock("GET", "/stores/abc123/v2/orders/250/products")
            .with_body(r#"[{"name": "Orbit Terrarium", "product_id": 111, "variant_id": 382, "quantity": 2, "price_inc_tax": "89.0000"}]"#)
            .create_async()
            .await;
        let _shipping = server
            .mock("GET", "/stores/abc123/v2/orders/250/shipping_addresses")
            .with_status(204)
            .create_async()
            .await;
        let client = client(&server);
        let payload = json!({"scope": "store/order/created", "store_id": "1", "data": {"type": "order", "id": 250}});
        let order = client.normalize_order_created(&signed(payload.clone())).await.unwrap();
        assert_eq!(order.order_id, "250");
        assert_eq!(order.first_name.as_deref(), Some("Billy"));
        assert_eq!(order.line_items.len(), 1);
        let forged = WebhookRequest::new(payload.to_string().into_bytes()).with_header(SIGNATURE_HEADER, "nope");
        assert!(matches!(client.normalize_order_created(&forged).await, Err(AdapterError::InvalidSignature(_))));
    }

    #[tokio::test]
    async fn only_cancelled_status_updates_are_cancellations() {
        let server = mockito::Server::new_async().await;
        let client = client(&server);
        let cancelled = json!({"scope": "store/order/statusUpdated",
            "data": {"type": "order", "id": 250, "status": {"previous_status_id": 11, "new_status_id": 5}}});
        let shipped = json!({"scope": "store/order/statusUpdated",
            "data": {"type": "order", "id": 250, "status": {"previous_status_id": 11, "new_status_id": 2}}});
        let notice = client.normalize_order_cancelled(&signed(cancelled)).await.unwrap().unwrap();
        assert_eq!(notice.order_id, "250");
        assert!(client.normalize_purchase_cancelled(&signed(shipped)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relative_inventory_adjustment() {
        let mut server = mockito::Server::new_async().await;
        let _loc = server
            .mock("GET", "/stores/abc123/v3/inventory/locations")
            .with_body(r#"{"data": [{"id": 1, "enabled": true}]}"#)
            .create_async()
            .await;
        let adjust = server
            .mock("POST", "/stores/abc123/v3/inventory/adjustments/relative")
            .match_body(Matcher::PartialJson(json!({"items": [{"location_id": 1, "variant_id": 382, "quantity": 3}]})))
            .with_body(r#"{"transaction_id": "abc"}"#)
            .expect(1)
            .create_async()
            .await;
        let request = UpdateProductRequest {
            product_id: "111".into(),
            variant_id: "382".into(),
            inventory: Some(3),
            price: None,
        };
        let result = client(&server).update_product(&request).await.unwrap();
        assert_eq!(result.results.len(), 1);
        adjust.assert_async().await;
    }

    #[tokio::test]
    async fn tracking_is_read_from_the_shipment() {
        let mut server = mockito::Server::new_async().await;
        let _shipment = server
            .mock("GET", "/stores/abc123/v2/orders/250/shipments/7")
            .with_body(r#"{"id": 7, "order_id": 250, "tracking_number": "9400100", "tracking_carrier": "usps", "tracking_link": ""}"#)
            .create_async()
            .await;
        let payload = json!({"scope": "store/shipment/created", "data": {"type": "shipment", "id": 7, "orderId": 250}});
        let tracking = client(&server).normalize_tracking_created(&signed(payload)).await.unwrap();
        assert_eq!(tracking.purchase_id, "250");
        assert_eq!(tracking.tracking_number, "9400100");
        assert_eq!(tracking.tracking_company.as_deref(), Some("usps"));
        assert_eq!(tracking.tracking_url, None);
    }

    #[tokio::test]
    async fn oauth_callback_requires_valid_state() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/oauth2/token")
            .with_body(r#"{"access_token": "bc-token", "context": "stores/abc123", "scope": "store_v2_orders"}"#)
            .expect(1)
            .create_async()
            .await;
        let client = client(&server);
        let bad = OAuthCallbackParams {
            code: Some("c".into()),
            context: Some("stores/abc123".into()),
            state: Some("forged.1.00".into()),
            ..Default::default()
        };
        assert!(matches!(client.oauth_callback(&bad, "").await, Err(AdapterError::InvalidSignature(_))));
        let auth = client.oauth_url("abc123", "https://admin.example.com/cb").unwrap();
        assert!(auth.auth_url.contains("context=stores%2Fabc123"));
        let good = OAuthCallbackParams { state: Some(auth.state), ..bad };
        let grant = client.oauth_callback(&good, "https://admin.example.com/cb").await.unwrap();
        assert_eq!(grant.domain, "abc123");
        assert_eq!(grant.access_token.reveal(), "bc-token");
        token.assert_async().await;
    }
}
