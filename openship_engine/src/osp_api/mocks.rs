use std::sync::Arc;

use mockall::mock;
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
    PlatformCredentials,
    PlatformKind,
    ShopAdapter,
};

use crate::{
    db::traits::{InsertOrderResult, RoutingDatabase, StoreError},
    db_types::{Channel, Link, Match, NewChannel, NewLink, NewMatch, NewShop, OrderRecord, Shop},
    link_matcher::Filter,
    osp_api::adapters::AdapterFactory,
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

mock! {
    pub Database {}
    impl Clone for Database {
        fn clone(&self) -> Self;
    }
    impl RoutingDatabase for Database {
        async fn insert_shop(&self, shop: NewShop) -> Result<Shop, StoreError>;
        async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StoreError>;
        async fn fetch_shops(&self) -> Result<Vec<Shop>, StoreError>;
        async fn update_shop_credentials(&self, id: i64, credentials: PlatformCredentials) -> Result<Shop, StoreError>;
        async fn delete_shop(&self, id: i64) -> Result<bool, StoreError>;
        async fn insert_channel(&self, channel: NewChannel) -> Result<Channel, StoreError>;
        async fn fetch_channel(&self, id: i64) -> Result<Option<Channel>, StoreError>;
        async fn fetch_channels(&self) -> Result<Vec<Channel>, StoreError>;
        async fn update_channel_credentials(&self, id: i64, credentials: PlatformCredentials) -> Result<Channel, StoreError>;
        async fn delete_channel(&self, id: i64) -> Result<bool, StoreError>;
        async fn insert_link(&self, link: NewLink) -> Result<Link, StoreError>;
        async fn fetch_link(&self, id: i64) -> Result<Option<Link>, StoreError>;
        async fn fetch_links_for_channel(&self, channel_id: i64) -> Result<Vec<Link>, StoreError>;
        async fn update_link_filters(&self, id: i64, expected_version: u64, filters: Vec<Filter>) -> Result<Link, StoreError>;
        async fn delete_link(&self, id: i64) -> Result<bool, StoreError>;
        async fn insert_order(&self, shop_id: i64, order: Order) -> Result<InsertOrderResult, StoreError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<OrderRecord>, StoreError>;
        async fn fetch_order_by_platform_id(&self, shop_id: i64, order_id: &str) -> Result<Option<OrderRecord>, StoreError>;
        async fn fetch_order_by_purchase_id(&self, channel_id: i64, purchase_id: &str) -> Result<Option<OrderRecord>, StoreError>;
        async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;
        async fn update_order(&self, record: &OrderRecord) -> Result<OrderRecord, StoreError>;
        async fn insert_match(&self, new_match: NewMatch) -> Result<Match, StoreError>;
        async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;
        async fn fetch_matches(&self) -> Result<Vec<Match>, StoreError>;
        async fn update_match(&self, updated: &Match) -> Result<(), StoreError>;
        async fn delete_match(&self, id: i64) -> Result<bool, StoreError>;
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
