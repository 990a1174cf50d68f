use std::fmt::Debug;

use log::*;
use platform_tools::{
    data_objects::{CreatedWebhooks, Webhook, WebhookEvent, WebhookFailure},
    PlatformAdapter,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::traits::{RoutingDatabase, StoreError},
    osp_api::{
        adapters::{AdapterFactory, EitherAdapter, PlatformRef},
        errors::WebhookSyncError,
    },
};

/// A webhook Openship expects to be subscribed to. `callback_url` is the handler path, without the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedWebhook {
    pub callback_url: String,
    pub topic: WebhookEvent,
}

impl RecommendedWebhook {
    fn new(callback_url: String, topic: WebhookEvent) -> Self {
        Self { callback_url, topic }
    }

    /// A remote webhook satisfies the recommendation when it delivers the same topic to the same handler.
    pub fn is_satisfied_by(&self, webhook: &Webhook) -> bool {
        webhook.topic == self.topic && webhook.callback_url == self.callback_url
    }
}

/// The webhooks a shop or channel needs for orders to flow through Openship.
pub fn recommended_webhooks(target: PlatformRef) -> Vec<RecommendedWebhook> {
    match target {
        PlatformRef::Shop(id) => vec![
            RecommendedWebhook::new(format!("/api/handlers/shop/create-order/{id}"), WebhookEvent::OrderCreated),
            RecommendedWebhook::new(format!("/api/handlers/shop/cancel-order/{id}"), WebhookEvent::OrderCancelled),
        ],
        PlatformRef::Channel(id) => vec![
            RecommendedWebhook::new(
                format!("/api/handlers/channel/cancel-purchase/{id}"),
                WebhookEvent::OrderCancelled,
            ),
            RecommendedWebhook::new(
                format!("/api/handlers/channel/create-tracking/{id}"),
                WebhookEvent::TrackingCreated,
            ),
        ],
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSyncReport {
    pub created: Vec<Webhook>,
    /// Remote webhooks that already satisfied a recommendation.
    pub existing: Vec<Webhook>,
    pub failures: Vec<WebhookFailure>,
}

/// `WebhookApi` manages the webhook subscriptions of shops and channels on their platforms.
pub struct WebhookApi<B, F> {
    db: B,
    adapters: F,
}

impl<B, F> Debug for WebhookApi<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, F> WebhookApi<B, F> {
    pub fn new(db: B, adapters: F) -> Self {
        Self { db, adapters }
    }
}

impl<B, F> WebhookApi<B, F>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    async fn adapter(&self, target: PlatformRef) -> Result<EitherAdapter<F::Shop, F::Channel>, WebhookSyncError> {
        let adapter = match target {
            PlatformRef::Shop(id) => {
                let shop = self.db.fetch_shop(id).await?.ok_or_else(|| StoreError::shop(id))?;
                EitherAdapter::Shop(self.adapters.shop_adapter(&shop)?)
            },
            PlatformRef::Channel(id) => {
                let channel = self.db.fetch_channel(id).await?.ok_or_else(|| StoreError::channel(id))?;
                EitherAdapter::Channel(self.adapters.channel_adapter(&channel)?)
            },
        };
        Ok(adapter)
    }

    pub async fn webhooks(&self, target: PlatformRef) -> Result<Vec<Webhook>, WebhookSyncError> {
        Ok(self.adapter(target).await?.get_webhooks().await?)
    }

    pub async fn create_webhook(
        &self,
        target: PlatformRef,
        endpoint: &str,
        events: &[WebhookEvent],
    ) -> Result<CreatedWebhooks, WebhookSyncError> {
        let created = self.adapter(target).await?.create_webhook(endpoint, events).await?;
        info!(
            "🪝️ {} of {} webhooks to {endpoint} created for {target}",
            created.webhooks.len(),
            events.len()
        );
        Ok(created)
    }

    pub async fn delete_webhook(&self, target: PlatformRef, webhook_id: &str) -> Result<bool, WebhookSyncError> {
        let deleted = self.adapter(target).await?.delete_webhook(webhook_id).await?;
        if deleted {
            info!("🪝️ Webhook {webhook_id} of {target} deleted");
        }
        Ok(deleted)
    }

    /// Creates whichever recommended webhooks `target` is missing. Existing subscriptions are left alone.
    ///
    /// Each missing webhook is created on its own, so one rejected topic does not prevent the others.
    pub async fn sync_recommended(&self, target: PlatformRef) -> Result<WebhookSyncReport, WebhookSyncError> {
        let adapter = self.adapter(target).await?;
        let remote = adapter.get_webhooks().await?;
        let mut report = WebhookSyncReport::default();
        for wanted in recommended_webhooks(target) {
            if let Some(found) = remote.iter().find(|w| wanted.is_satisfied_by(w)) {
                trace!("🪝️ {target} already has {} webhook {}", wanted.topic, found.id);
                report.existing.push(found.clone());
                continue;
            }
            match adapter.create_webhook(&wanted.callback_url, &[wanted.topic]).await {
                Ok(created) => {
                    report.created.extend(created.webhooks);
                    report.failures.extend(created.failures);
                },
                Err(e) => {
                    warn!("🪝️ Could not create {} webhook for {target}. {e}", wanted.topic);
                    report.failures.push(WebhookFailure { event: wanted.topic, message: e.to_string() });
                },
            }
        }
        info!(
            "🪝️ Webhooks for {target}: {} created, {} already present, {} failed",
            report.created.len(),
            report.existing.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use platform_tools::{AdapterError, PlatformCredentials, PlatformKind};

    use super::*;
    use crate::{
        db_types::{NewChannel, NewShop},
        osp_api::mocks::{MockAdapters, MockChannelPlatform, MockShopPlatform},
        MemoryDatabase,
    };

    async fn database() -> MemoryDatabase {
        let db = MemoryDatabase::new();
        let creds = PlatformCredentials::new("example.com", "t");
        db.insert_shop(NewShop::new("Main", PlatformKind::Shopify, creds.clone())).await.unwrap();
        db.insert_channel(NewChannel::new("Supplier", PlatformKind::BigCommerce, creds)).await.unwrap();
        db
    }

    fn webhook(id: &str, callback_url: &str, topic: WebhookEvent) -> Webhook {
        Webhook { id: id.into(), callback_url: callback_url.into(), topic }
    }

    #[test]
    fn recommendations_point_at_the_handlers() {
        let shop = recommended_webhooks(PlatformRef::Shop(3));
        assert_eq!(shop[0].callback_url, "/api/handlers/shop/create-order/3");
        assert_eq!(shop[0].topic, WebhookEvent::OrderCreated);
        assert_eq!(shop[1].topic, WebhookEvent::OrderCancelled);
        let channel = recommended_webhooks(PlatformRef::Channel(4));
        assert_eq!(channel[0].callback_url, "/api/handlers/channel/cancel-purchase/4");
        assert_eq!(channel[1].callback_url, "/api/handlers/channel/create-tracking/4");
        assert_eq!(channel[1].topic, WebhookEvent::TrackingCreated);
    }

    #[test]
    fn same_topic_elsewhere_does_not_count() {
        let wanted = &recommended_webhooks(PlatformRef::Shop(1))[0];
        let path = "/api/handlers/shop/create-order/1";
        assert!(wanted.is_satisfied_by(&webhook("1", path, WebhookEvent::OrderCreated)));
        let other_shop = "/api/handlers/shop/create-order/2";
        assert!(!wanted.is_satisfied_by(&webhook("2", other_shop, WebhookEvent::OrderCreated)));
        assert!(!wanted.is_satisfied_by(&webhook("3", path, WebhookEvent::OrderCancelled)));
    }

    #[tokio::test]
    async fn only_missing_webhooks_are_created() {
        let _ = env_logger::try_init();
        let mut shop = MockShopPlatform::new();
        shop.expect_get_webhooks().times(1).returning(|| {
            Ok(vec![webhook("77", "/api/handlers/shop/create-order/1", WebhookEvent::OrderCreated)])
        });
        shop.expect_create_webhook().times(1).returning(|endpoint, events| {
            let created = webhook("78", endpoint, events[0]);
            Ok(CreatedWebhooks { webhook_id: Some(created.id.clone()), webhooks: vec![created], failures: vec![] })
        });
        let api = WebhookApi::new(database().await, MockAdapters::with_shop(shop));
        let report = api.sync_recommended(PlatformRef::Shop(1)).await.unwrap();
        assert_eq!(report.existing[0].id, "77");
        assert_eq!(report.created[0].id, "78");
        assert_eq!(report.created[0].callback_url, "/api/handlers/shop/cancel-order/1");
        assert_eq!(report.created[0].topic, WebhookEvent::OrderCancelled);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn rejected_topics_are_reported() {
        let mut channel = MockChannelPlatform::new();
        channel.expect_get_webhooks().returning(|| Ok(vec![]));
        channel.expect_create_webhook().times(2).returning(|_, events| match events[0] {
            WebhookEvent::TrackingCreated => {
                Err(AdapterError::UnsupportedTopic { platform: "bigcommerce".into(), event: events[0] })
            },
            event => Ok(CreatedWebhooks {
                webhooks: vec![webhook("5", "/api/handlers/channel/cancel-purchase/1", event)],
                ..Default::default()
            }),
        });
        let api = WebhookApi::new(database().await, MockAdapters::with_channel(channel));
        let report = api.sync_recommended(PlatformRef::Channel(1)).await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].event, WebhookEvent::TrackingCreated);
    }

    #[tokio::test]
    async fn unknown_targets_fail() {
        let api = WebhookApi::new(database().await, MockAdapters::with_shop(MockShopPlatform::new()));
        let err = api.webhooks(PlatformRef::Channel(9)).await.unwrap_err();
        assert!(matches!(err, WebhookSyncError::Store(StoreError::NotFound(_))));
    }
}
