use std::{fmt::Display, sync::Arc};

use platform_tools::{
    data_objects::{
        AccessGrant,
        AuthorizationUrl,
        CreatedWebhooks,
        OAuthCallbackParams,
        Product,
        ProductPage,
        Webhook,
        WebhookEvent,
    },
    AdapterConfig,
    AdapterError,
    ChannelAdapter,
    PlatformAdapter,
    PlatformClient,
    PlatformKind,
    ShopAdapter,
};
use serde::{Deserialize, Serialize};

use crate::db_types::{Channel, Shop};

/// Builds the adapter for a stored shop or channel.
pub trait AdapterFactory: Clone {
    type Shop: ShopAdapter;
    type Channel: ChannelAdapter;

    fn shop_adapter(&self, shop: &Shop) -> Result<Self::Shop, AdapterError>;

    fn channel_adapter(&self, channel: &Channel) -> Result<Self::Channel, AdapterError>;
}

/// The production factory: a [`PlatformClient`] built from the record's platform and credentials.
#[derive(Clone)]
pub struct PlatformClients {
    config: Arc<AdapterConfig>,
}

impl PlatformClients {
    pub fn new(config: Arc<AdapterConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<AdapterConfig> {
        &self.config
    }
}

impl AdapterFactory for PlatformClients {
    type Channel = PlatformClient;
    type Shop = PlatformClient;

    fn shop_adapter(&self, shop: &Shop) -> Result<PlatformClient, AdapterError> {
        PlatformClient::new(shop.platform, shop.credentials.clone(), self.config.clone())
    }

    fn channel_adapter(&self, channel: &Channel) -> Result<PlatformClient, AdapterError> {
        PlatformClient::new(channel.platform, channel.credentials.clone(), self.config.clone())
    }
}

//--------------------------------------    PlatformRef      ---------------------------------------------------------

/// Identifies a stored shop or channel, for operations both roles support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PlatformRef {
    Shop(i64),
    Channel(i64),
}

impl Display for PlatformRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformRef::Shop(id) => write!(f, "shop #{id}"),
            PlatformRef::Channel(id) => write!(f, "channel #{id}"),
        }
    }
}

/// The adapter of either role, usable wherever only [`PlatformAdapter`] is needed.
pub enum EitherAdapter<S, C> {
    Shop(S),
    Channel(C),
}

macro_rules! either {
    ($self:ident, $adapter:ident => $call:expr) => {
        match $self {
            EitherAdapter::Shop($adapter) => $call,
            EitherAdapter::Channel($adapter) => $call,
        }
    };
}

impl<S: PlatformAdapter, C: PlatformAdapter> PlatformAdapter for EitherAdapter<S, C> {
    fn platform(&self) -> PlatformKind {
        either!(self, a => a.platform())
    }

    async fn search_products(&self, search_entry: &str, after: Option<String>) -> Result<ProductPage, AdapterError> {
        either!(self, a => a.search_products(search_entry, after).await)
    }

    async fn get_product(&self, product_id: &str, variant_id: &str) -> Result<Product, AdapterError> {
        either!(self, a => a.get_product(product_id, variant_id).await)
    }

    async fn create_webhook(&self, endpoint: &str, events: &[WebhookEvent]) -> Result<CreatedWebhooks, AdapterError> {
        either!(self, a => a.create_webhook(endpoint, events).await)
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<bool, AdapterError> {
        either!(self, a => a.delete_webhook(webhook_id).await)
    }

    async fn get_webhooks(&self) -> Result<Vec<Webhook>, AdapterError> {
        either!(self, a => a.get_webhooks().await)
    }

    fn oauth_url(&self, domain: &str, callback_url: &str) -> Result<AuthorizationUrl, AdapterError> {
        either!(self, a => a.oauth_url(domain, callback_url))
    }

    async fn oauth_callback(
        &self,
        params: &OAuthCallbackParams,
        callback_url: &str,
    ) -> Result<AccessGrant, AdapterError> {
        either!(self, a => a.oauth_callback(params, callback_url).await)
    }
}
