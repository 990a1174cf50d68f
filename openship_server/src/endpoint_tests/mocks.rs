use std::sync::Arc;

use mockall::mock;
use openship_engine::{
    db_types::{Channel, Shop},
    AdapterFactory,
};
use platform_tools::{
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
    ChannelAdapter,
    PlatformAdapter,
    PlatformKind,
    ShopAdapter,
};

mock! {
    pub ShopPlatform {}
    impl PlatformAdapter for ShopPlatform {
        fn platform(&self) -> PlatformKind;
        async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError>;
        async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError>;
        async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError>;
        async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError>;
        async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError>;
        fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError>;
        async fn oauth_callback(&self, params: &OAuthCallbackParams, callback_url: &str) -> Result<AccessGrant, AdapterError>;
    }
    impl ShopAdapter for ShopPlatform {
        async fn search_orders(&self, search_entry: &str, after: Option<String>) -> Result<OrderPage, AdapterError>;
        async fn update_product(&self, request: &UpdateProductRequest) -> Result<UpdateProductResult, AdapterError>;
        async fn normalize_order_created(&self, request: &WebhookRequest) -> Result<Order, AdapterError>;
        async fn normalize_order_cancelled(&self, request: &WebhookRequest) -> Result<Option<OrderCancellation>, AdapterError>;
    }
}

mock! {
    pub ChannelPlatform {}
    impl PlatformAdapter for ChannelPlatform {
        fn platform(&self) -> PlatformKind;
        async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError>;
        async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError>;
        async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError>;
        async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError>;
        async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError>;
        fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError>;
        async fn oauth_callback(&self, params: &OAuthCallbackParams, callback_url: &str) -> Result<AccessGrant, AdapterError>;
    }
    impl ChannelAdapter for ChannelPlatform {
        async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseResult, AdapterError>;
        async fn cancel_purchase(&self, purchase_id: &str) -> Result<(), AdapterError>;
        async fn normalize_tracking_created(&self, request: &WebhookRequest) -> Result<TrackingInfo, AdapterError>;
        async fn normalize_purchase_cancelled(&self, request: &WebhookRequest) -> Result<Option<PurchaseCancellation>, AdapterError>;
    }
}

/// Hands out the same mocked shop and channel adapter for every record.
#[derive(Clone)]
pub struct MockAdapters {
    pub shop: Arc<MockShopPlatform>,
    pub channel: Arc<MockChannelPlatform>,
}

impl MockAdapters {
    pub fn new(shop: MockShopPlatform, channel: MockChannelPlatform) -> Self {
        Self { shop: Arc::new(shop), channel: Arc::new(channel) }
    }

    /// Adapters that fail the test if they are called at all.
    pub fn unused() -> Self {
        Self::new(MockShopPlatform::new(), MockChannelPlatform::new())
    }

    pub fn with_shop(shop: MockShopPlatform) -> Self {
        Self::new(shop, MockChannelPlatform::new())
    }

    pub fn with_channel(channel: MockChannelPlatform) -> Self {
        Self::new(MockShopPlatform::new(), channel)
    }
}

impl AdapterFactory for MockAdapters {
    type Channel = Arc<MockChannelPlatform>;
    type Shop = Arc<MockShopPlatform>;

    fn shop_adapter(&self, _shop: &Shop) -> Result<Self::Shop, AdapterError> {
        Ok(Arc::clone(&self.shop))
    }

    fn channel_adapter(&self, _channel: &Channel) -> Result<Self::Channel, AdapterError> {
        Ok(Arc::clone(&self.channel))
    }
}
