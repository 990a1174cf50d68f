//! Shopify Admin GraphQL adapter.
mod mapping;
mod queries;

use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::Deserialize;
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
    helpers::{gid_to_id, json_id, json_opt_string, json_price, shopify_gid},
    http::{check_user_errors, RestClient},
    signature::{issue_state, verify_body_hmac, verify_query_hmac, verify_state},
    topics::{event_for, strip_base_url, topic_for},
    AdapterConfig,
    AdapterError,
    ChannelAdapter,
    PlatformAdapter,
    PlatformCredentials,
    PlatformKind,
    ShopAdapter,
};

pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

#[derive(Clone)]
pub struct ShopifyClient {
    config: Arc<AdapterConfig>,
    credentials: PlatformCredentials,
    rest: RestClient,
}

impl ShopifyClient {
    pub fn new(credentials: PlatformCredentials, config: Arc<AdapterConfig>) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(credentials.access_token.reveal().as_str())
            .map_err(|e| AdapterError::Initialization(e.to_string()))?;
        headers.insert("X-Shopify-Access-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let rest = RestClient::new(credentials.base_url(), headers, &config)?;
        Ok(Self { config, credentials, rest })
    }

    fn graphql_path(&self) -> String {
        format!("/admin/api/{}/graphql.json", self.config.shopify.api_version)
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, AdapterError> {
        self.rest.graphql_query::<Value>(&self.graphql_path(), query, Some(variables)).await
    }

    fn verify_webhook(&self, request: &WebhookRequest) -> Result<Value, AdapterError> {
        verify_body_hmac(self.config.shopify.app.app_secret.reveal(), &request.body, request.header(HMAC_HEADER))?;
        serde_json::from_slice(&request.body).map_err(|e| AdapterError::JsonError(e.to_string()))
    }

    async fn adjust_inventory(&self, variant_id: &str, delta: i64) -> Result<(), AdapterError> {
        let variant_gid = shopify_gid("ProductVariant", variant_id);
        let data = self.graphql(queries::INVENTORY_LOCATION, json!({ "id": variant_gid })).await?;
        let variant = &data["productVariant"];
        if variant.is_null() {
            return Err(AdapterError::NotFound(format!("Variant {variant_id}")));
        }
        let item_id = variant["inventoryItem"]["id"].as_str();
        let location_id = variant["inventoryItem"]["inventoryLevels"]["nodes"][0]["location"]["id"].as_str();
        let (Some(item_id), Some(location_id)) = (item_id, location_id) else {
            return Err(AdapterError::Upstream(format!("Variant {variant_id} has no inventory location")));
        };
        let input = json!({
            "input": {
                "reason": "correction",
                "name": "available",
                "changes": [{ "delta": delta, "inventoryItemId": item_id, "locationId": location_id }]
            }
        });
        debug!("📦️ Adjusting inventory of {variant_id} by {delta}");
        let data = self.graphql(queries::ADJUST_INVENTORY, input).await?;
        check_user_errors(&data["inventoryAdjustQuantities"]["userErrors"])
    }

    async fn update_price(&self, product_id: &str, variant_id: &str, price: &str) -> Result<(), AdapterError> {
        let vars = json!({
            "productId": shopify_gid("Product", product_id),
            "variants": [{ "id": shopify_gid("ProductVariant", variant_id), "price": price }]
        });
        debug!("📦️ Setting price of {variant_id} to {price}");
        let data = self.graphql(queries::UPDATE_PRICE, vars).await?;
        check_user_errors(&data["productVariantsBulkUpdate"]["userErrors"])
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<(), AdapterError> {
        let data = self.graphql(queries::DRAFT_ORDER_DELETE, json!({ "input": { "id": draft_id } })).await?;
        check_user_errors(&data["draftOrderDelete"]["userErrors"])
    }

    fn draft_order_input(&self, request: &PurchaseRequest) -> Value {
        let line_items = request
            .cart_items
            .iter()
            .map(|item| {
                json!({ "variantId": shopify_gid("ProductVariant", &item.variant_id), "quantity": item.quantity })
            })
            .collect::<Vec<_>>();
        let mut input = json!({
            "lineItems": line_items,
            "note": request.notes,
            "tags": ["openship"],
        });
        if let Some(addr) = &request.shipping {
            input["email"] = json!(addr.email);
            input["shippingAddress"] = json!({
                "firstName": addr.first_name,
                "lastName": addr.last_name,
                "address1": addr.street_address1,
                "address2": addr.street_address2,
                "city": addr.city,
                "provinceCode": addr.state,
                "zip": addr.zip,
                "countryCode": addr.country,
                "phone": addr.phone,
            });
        }
        json!({ "input": input })
    }
}

fn webhook_from_node(node: &Value, frontend_url: &str) -> Option<Webhook> {
    let topic = node["topic"].as_str().unwrap_or_default();
    let Some(event) = event_for(PlatformKind::Shopify, topic) else {
        trace!("Ignoring Shopify webhook with unmapped topic {topic}");
        return None;
    };
    let callback = node["endpoint"]["callbackUrl"].as_str().or(node["callbackUrl"].as_str()).unwrap_or_default();
    Some(Webhook {
        id: gid_to_id(node["id"].as_str().unwrap_or_default()),
        callback_url: strip_base_url(callback, frontend_url),
        topic: event,
    })
}

impl PlatformAdapter for ShopifyClient {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Shopify
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        let query = (!search_entry.is_empty()).then(|| search_entry.to_string());
        let data = self.graphql(&queries::search_products(), json!({ "query": query, "after": after })).await?;
        let connection = &data["productVariants"];
        let products = connection["nodes"]
            .as_array()
            .map(|nodes| nodes.iter().map(|n| mapping::variant_to_product(n, &self.credentials.domain)).collect())
            .unwrap_or_default();
        let page_info = serde_json::from_value::<PageInfo>(connection["pageInfo"].clone()).unwrap_or_default();
        Ok(ProductPage { products, page_info })
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        let id = shopify_gid("ProductVariant", variant_id);
        let data = self.graphql(&queries::get_variant(), json!({ "id": id })).await?;
        let node = &data["productVariant"];
        if node.is_null() {
            return Err(AdapterError::NotFound(format!("Product {product_id} variant {variant_id}")));
        }
        Ok(mapping::variant_to_product(node, &self.credentials.domain))
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        let callback_url = self.config.callback_url(endpoint);
        let mut result = CreatedWebhooks::default();
        for &event in events {
            let outcome = async {
                let topic = topic_for(PlatformKind::Shopify, event)?;
                let vars = json!({
                    "topic": topic,
                    "webhookSubscription": { "callbackUrl": callback_url, "format": "JSON" }
                });
                let data = self.graphql(queries::CREATE_WEBHOOK, vars).await?;
                check_user_errors(&data["webhookSubscriptionCreate"]["userErrors"])?;
                webhook_from_node(&data["webhookSubscriptionCreate"]["webhookSubscription"], &self.config.frontend_url)
                    .ok_or(AdapterError::EmptyResponse)
            }
            .await;
            match outcome {
                Ok(webhook) => {
                    info!("🪝️ Created Shopify webhook {} for {event}", webhook.id);
                    result.webhook_id.get_or_insert_with(|| webhook.id.clone());
                    result.webhooks.push(webhook);
                },
                Err(e) => {
                    warn!("🪝️ Could not create Shopify webhook for {event}. {e}");
                    result.failures.push(WebhookFailure { event, message: e.to_string() });
                },
            }
        }
        Ok(result)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        let id = shopify_gid("WebhookSubscription", webhook_id);
        let data = self.graphql(queries::DELETE_WEBHOOK, json!({ "id": id })).await?;
        check_user_errors(&data["webhookSubscriptionDelete"]["userErrors"])?;
        Ok(!data["webhookSubscriptionDelete"]["deletedWebhookSubscriptionId"].is_null())
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        let data = self.graphql(queries::GET_WEBHOOKS, json!({})).await?;
        let webhooks = data["webhookSubscriptions"]["nodes"]
            .as_array()
            .map(|nodes| nodes.iter().filter_map(|n| webhook_from_node(n, &self.config.frontend_url)).collect())
            .unwrap_or_default();
        Ok(webhooks)
    }

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        let state = issue_state(self.config.oauth_state_secret.reveal())?;
        let base = format!("{}/admin/oauth/authorize", base_url_for(domain));
        let url = url::Url::parse_with_params(&base, &[
            ("client_id", self.config.shopify.app.app_key.as_str()),
            ("scope", self.config.shopify.scopes.as_str()),
            ("redirect_uri", callback_url),
            ("state", state.as_str()),
        ])
        .map_err(|e| AdapterError::Configuration(e.to_string()))?;
        Ok(AuthorizationUrl { auth_url: url.to_string(), state })
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        _callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        let hmac = params
            .hmac
            .as_deref()
            .ok_or_else(|| AdapterError::InvalidSignature("Shopify OAuth callback is missing its hmac".into()))?;
        let signed = [
            ("code", params.code.as_deref()),
            ("host", params.host.as_deref()),
            ("shop", params.shop.as_deref()),
            ("state", params.state.as_deref()),
            ("timestamp", params.timestamp.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect::<Vec<_>>();
        verify_query_hmac(self.config.shopify.app.app_secret.reveal(), &signed, hmac)?;
        verify_state(self.config.oauth_state_secret.reveal(), params.state.as_deref())?;
        let (Some(shop), Some(code)) = (params.shop.as_deref(), params.code.as_deref()) else {
            return Err(AdapterError::InvalidSignature("Shopify OAuth callback is missing shop or code".into()));
        };
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }
        let client = RestClient::new(base_url_for(shop), HeaderMap::new(), &self.config)?;
        let body = json!({
            "client_id": self.config.shopify.app.app_key,
            "client_secret": self.config.shopify.app.app_secret.reveal(),
            "code": code,
        });
        let token = client
            .rest_query::<TokenResponse, Value>(Method::POST, "/admin/oauth/access_token", &[], Some(body))
            .await?;
        info!("🔑️ Obtained Shopify access token for {shop}");
        Ok(AccessGrant { domain: shop.to_string(), access_token: token.access_token.into(), access_secret: None })
    }
}

impl ShopAdapter for ShopifyClient {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError> {
        let query = (!search_entry.is_empty()).then(|| search_entry.to_string());
        let data = self.graphql(&queries::search_orders(), json!({ "query": query, "after": after })).await?;
        let connection = &data["orders"];
        let orders = connection["nodes"]
            .as_array()
            .map(|nodes| nodes.iter().map(mapping::graphql_order).collect())
            .unwrap_or_default();
        let page_info = serde_json::from_value::<PageInfo>(connection["pageInfo"].clone()).unwrap_or_default();
        Ok(OrderPage { orders, page_info })
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
        Ok(mapping::webhook_order(&payload))
    }

    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        if payload["cancelled_at"].is_null() {
            return Ok(None);
        }
        let reason = json_opt_string(&payload["cancel_reason"]);
        Ok(Some(OrderCancellation { order_id: json_id(&payload["id"]), reason }))
    }
}

impl ChannelAdapter for ShopifyClient {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError> {
        let data = self.graphql(queries::DRAFT_ORDER_CREATE, self.draft_order_input(request)).await?;
        check_user_errors(&data["draftOrderCreate"]["userErrors"])?;
        let draft_id = data["draftOrderCreate"]["draftOrder"]["id"]
            .as_str()
            .ok_or(AdapterError::EmptyResponse)?
            .to_string();
        debug!("🛒️ Created draft order {draft_id}");
        let completion = async {
            let data = self.graphql(queries::DRAFT_ORDER_COMPLETE, json!({ "id": draft_id })).await?;
            check_user_errors(&data["draftOrderComplete"]["userErrors"])?;
            let order = data["draftOrderComplete"]["draftOrder"]["order"].clone();
            if order.is_null() {
                return Err(AdapterError::EmptyResponse);
            }
            Ok(order)
        }
        .await;
        let order = match completion {
            Ok(order) => order,
            Err(e) => {
                warn!("🛒️ Could not complete draft order {draft_id}. {e}. Deleting the draft.");
                let compensated = match self.delete_draft(&draft_id).await {
                    Ok(()) => true,
                    Err(del) => {
                        error!("🛒️ Draft order {draft_id} could not be deleted and needs manual clean-up. {del}");
                        false
                    },
                };
                return Err(AdapterError::PurchaseAborted { draft_id, compensated, reason: e.to_string() });
            },
        };
        let line_items = order["lineItems"]["nodes"]
            .as_array()
            .map(|a| a.iter().map(mapping::graphql_line_item).collect())
            .unwrap_or_default();
        let result = PurchaseResult {
            purchase_id: gid_to_id(order["id"].as_str().unwrap_or_default()),
            order_number: order["name"].as_str().unwrap_or_default().to_string(),
            total_price: json_price(&order["totalPriceSet"]["shopMoney"]["amount"]),
            line_items,
            status: PurchaseStatus::Completed,
        };
        info!("🛒️ Placed Shopify order {} ({})", result.order_number, result.purchase_id);
        Ok(result)
    }

    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError> {
        let data = self.graphql(queries::ORDER_CANCEL, json!({ "orderId": shopify_gid("Order", purchase_id) })).await?;
        check_user_errors(&data["orderCancel"]["orderCancelUserErrors"])?;
        info!("🛒️ Cancelled Shopify order {purchase_id}");
        Ok(())
    }

    async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError> {
        let payload = self.verify_webhook(request)?;
        let tracking_number = json_opt_string(&payload["tracking_number"])
            .or_else(|| json_opt_string(&payload["tracking_numbers"][0]))
            .ok_or_else(|| AdapterError::Upstream("Fulfillment carries no tracking number".into()))?;
        Ok(TrackingInfo {
            purchase_id: json_id(&payload["order_id"]),
            tracking_number,
            tracking_company: json_opt_string(&payload["tracking_company"]),
            tracking_url: json_opt_string(&payload["tracking_url"])
                .or_else(|| json_opt_string(&payload["tracking_urls"][0])),
        })
    }

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError> {
        let payload = self.verify_webhook(request)?;
        if payload["cancelled_at"].is_null() {
            return Ok(None);
        }
        Ok(Some(PurchaseCancellation {
            purchase_id: json_id(&payload["id"]),
            reason: json_opt_string(&payload["cancel_reason"]),
        }))
    }
}
