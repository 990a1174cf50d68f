//! The contract every platform integration implements.
//!
//! A platform can act as a shop (order source), a channel (fulfillment target), or both. The shared surface lives in
//! [`PlatformAdapter`] and the two roles extend it.
use std::sync::Arc;

use crate::{
    data_objects::{
        AccessGrant,
        AuthorizationUrl,
        CreatedWebhooks,
        OAuthCallbackParams,
        Order,
        OrderCancellation,
        OrderPage,
        Product,
        ProductPage,
        PurchaseCancellation,
        PurchaseRequest,
        PurchaseResult,
        TrackingInfo,
        UpdateProductRequest,
        UpdateProductResult,
        Webhook,
        WebhookEvent,
        WebhookRequest,
    },
    AdapterError,
    PlatformKind,
};

#[allow(async_fn_in_trait)]
pub trait PlatformAdapter {
    fn platform(&self) -> PlatformKind;

    /// Searches the catalogue. `after` is the opaque cursor from a previous page. No results is an empty page, never
    /// an error.
    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError>;

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError>;

    /// Subscribes `endpoint` to each of `events`. Events the platform cannot deliver are reported as failures
    /// without preventing the others from being created.
    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError>;

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError>;

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError>;

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError>;

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        callback_url: &str,
    ) -> Result<AccessGrant, AdapterError>;
}

#[allow(async_fn_in_trait)]
pub trait ShopAdapter: PlatformAdapter {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError>;

    /// Applies a relative inventory change and/or an absolute price to a variant.
    async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError>;

    async fn normalize_order_created(&self, request: &WebhookRequest) -> Result<Order, AdapterError>;

    /// Returns `None` for deliveries on the cancellation topic that are not actually cancellations, e.g. a status
    /// change to "shipped".
    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError>;
}

#[allow(async_fn_in_trait)]
pub trait ChannelAdapter: PlatformAdapter {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError>;

    /// Cancels a purchase previously returned by [`ChannelAdapter::create_purchase`].
    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError>;

    async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError>;

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError>;
}

//--------------------------------------   Shared adapters    ---------------------------------------------------------
// Shared ownership of an adapter is itself an adapter, so one client can back several APIs.

impl<T: PlatformAdapter> PlatformAdapter for Arc<T> {
    fn platform(&self) -> PlatformKind {
        self.as_ref().platform()
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        self.as_ref().search_products(search_entry, after).await
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        self.as_ref().get_product(product_id, variant_id).await
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        self.as_ref().create_webhook(endpoint, events).await
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        self.as_ref().delete_webhook(webhook_id).await
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        self.as_ref().get_webhooks().await
    }

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        self.as_ref().oauth_url(domain, callback_url)
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        self.as_ref().oauth_callback(params, callback_url).await
    }
}

impl<T: ShopAdapter> ShopAdapter for Arc<T> {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError> {
        self.as_ref().search_orders(search_entry, after).await
    }

    async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError> {
        self.as_ref().update_product(request).await
    }

    async fn normalize_order_created(&self, request: &WebhookRequest) -> Result<Order, AdapterError> {
        self.as_ref().normalize_order_created(request).await
    }

    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError> {
        self.as_ref().normalize_order_cancelled(request).await
    }
}

impl<T: ChannelAdapter> ChannelAdapter for Arc<T> {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError> {
        self.as_ref().create_purchase(request).await
    }

    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError> {
        self.as_ref().cancel_purchase(purchase_id).await
    }

    async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError> {
        self.as_ref().normalize_tracking_created(request).await
    }

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError> {
        self.as_ref().normalize_purchase_cancelled(request).await
    }
}
