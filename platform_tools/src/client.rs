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
    AdapterConfig,
    AdapterError,
    BigCommerceClient,
    ChannelAdapter,
    PlatformAdapter,
    PlatformCredentials,
    PlatformKind,
    ShopAdapter,
    ShopifyClient,
    WooCommerceClient,
};

/// The adapter registry: one variant per supported platform, selected by [`PlatformKind`].
#[derive(Clone)]
pub enum PlatformClient {
    Shopify(ShopifyClient),
    BigCommerce(BigCommerceClient),
    WooCommerce(WooCommerceClient),
}

macro_rules! delegate {
    ($self:ident, $client:ident => $call:expr) => {
        match $self {
            PlatformClient::Shopify($client) => $call,
            PlatformClient::BigCommerce($client) => $call,
            PlatformClient::WooCommerce($client) => $call,
        }
    };
}

impl PlatformClient {
    pub fn new(
        platform: PlatformKind,
        credentials: PlatformCredentials,
        config: Arc<AdapterConfig>,
    ) -> Result<Self, AdapterError> {
        match platform {
            PlatformKind::Shopify => ShopifyClient::new(credentials, config).map(Self::Shopify),
            PlatformKind::BigCommerce => BigCommerceClient::new(credentials, config).map(Self::BigCommerce),
            PlatformKind::WooCommerce => WooCommerceClient::new(credentials, config).map(Self::WooCommerce),
        }
    }

    /// A client with empty credentials, sufficient for the OAuth handshake that obtains them.
    pub fn for_oauth(platform: PlatformKind, domain: &str, config: Arc<AdapterConfig>) -> Result<Self, AdapterError> {
        let credentials = PlatformCredentials::new(domain, "").with_secret("");
        Self::new(platform, credentials, config)
    }
}

impl PlatformAdapter for PlatformClient {
    fn platform(&self) -> PlatformKind {
        delegate!(self, c => c.platform())
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        delegate!(self, c => c.search_products(search_entry, after).await)
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        delegate!(self, c => c.get_product(product_id, variant_id).await)
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        delegate!(self, c => c.create_webhook(endpoint, events).await)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        delegate!(self, c => c.delete_webhook(webhook_id).await)
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        delegate!(self, c => c.get_webhooks().await)
    }

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        delegate!(self, c => c.oauth_url(domain, callback_url))
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        delegate!(self, c => c.oauth_callback(params, callback_url).await)
    }
}

impl ShopAdapter for PlatformClient {
    async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError> {
        delegate!(self, c => c.search_orders(search_entry, after).await)
    }

    async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError> {
        delegate!(self, c => c.update_product(request).await)
    }

    async fn normalize_order_created(&self, request: &WebhookRequest) -> Result<Order, AdapterError> {
        delegate!(self, c => c.normalize_order_created(request).await)
    }

    async fn normalize_order_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<OrderCancellation>, AdapterError> {
        delegate!(self, c => c.normalize_order_cancelled(request).await)
    }
}

impl ChannelAdapter for PlatformClient {
    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError> {
        delegate!(self, c => c.create_purchase(request).await)
    }

    async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError> {
        delegate!(self, c => c.cancel_purchase(purchase_id).await)
    }

    async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError> {
        delegate!(self, c => c.normalize_tracking_created(request).await)
    }

    async fn normalize_purchase_cancelled(
        &self,
        request: &WebhookRequest,
    ) -> Result<Option<PurchaseCancellation>, AdapterError> {
        delegate!(self, c => c.normalize_purchase_cancelled(request).await)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn registry_selects_by_platform() {
        let config = Arc::new(AdapterConfig::default());
        for platform in [PlatformKind::Shopify, PlatformKind::BigCommerce, PlatformKind::WooCommerce] {
            let client = PlatformClient::for_oauth(platform, "store.test", config.clone()).unwrap();
            assert_eq!(client.platform(), platform);
        }
    }
}
