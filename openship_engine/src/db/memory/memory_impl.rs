use std::{fmt::Debug, path::Path, sync::Arc};

use log::*;
use platform_tools::{data_objects::Order, PlatformCredentials};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::tables::Tables;
use crate::{
    db::traits::{InsertOrderResult, RoutingDatabase, StoreError},
    db_types::{Channel, Link, Match, NewChannel, NewLink, NewMatch, NewShop, OrderRecord, Shop},
    link_matcher::Filter,
};

/// Records to preload into a [`MemoryDatabase`].
///
/// Records are inserted in the order shops, channels, links, matches, and ids are assigned from 1 in file order, so
/// links and matches can refer to shops and channels by their position in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub shops: Vec<NewShop>,
    pub channels: Vec<NewChannel>,
    pub links: Vec<NewLink>,
    pub matches: Vec<NewMatch>,
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryDatabase")
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Result<Self, StoreError> {
        let mut tables = Tables::default();
        let (shops, channels) = (seed.shops.len(), seed.channels.len());
        seed.shops.into_iter().for_each(|s| {
            tables.insert_shop(s);
        });
        seed.channels.into_iter().for_each(|c| {
            tables.insert_channel(c);
        });
        let links = seed.links.len();
        for link in seed.links {
            tables.insert_link(link)?;
        }
        let matches = seed.matches.len();
        seed.matches.into_iter().for_each(|m| {
            tables.insert_match(m);
        });
        info!("🗃️ Seeded {shops} shops, {channels} channels, {links} links and {matches} matches");
        Ok(Self { tables: Arc::new(RwLock::new(tables)) })
    }

    /// Loads a JSON [`SeedData`] file.
    pub async fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Backend(format!("Could not read seed file {}: {e}", path.display())))?;
        let seed = serde_json::from_str::<SeedData>(&contents)
            .map_err(|e| StoreError::Backend(format!("Invalid seed file {}: {e}", path.display())))?;
        Self::from_seed(seed)
    }
}

impl RoutingDatabase for MemoryDatabase {
    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, StoreError> {
        let shop = self.tables.write().await.insert_shop(shop);
        debug!("🗃️ Shop #{} ({}) saved", shop.id, shop.name);
        Ok(shop)
    }

    async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StoreError> {
        Ok(self.tables.read().await.shop(id).cloned())
    }

    async fn fetch_shops(&self) -> Result<Vec<Shop>, StoreError> {
        Ok(self.tables.read().await.shops())
    }

    async fn update_shop_credentials(&self, id: i64, credentials: PlatformCredentials) -> Result<Shop, StoreError> {
        self.tables.write().await.set_shop_credentials(id, credentials)
    }

    async fn delete_shop(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delete_shop(id))
    }

    async fn insert_channel(&self, channel: NewChannel) -> Result<Channel, StoreError> {
        let channel = self.tables.write().await.insert_channel(channel);
        debug!("🗃️ Channel #{} ({}) saved", channel.id, channel.name);
        Ok(channel)
    }

    async fn fetch_channel(&self, id: i64) -> Result<Option<Channel>, StoreError> {
        Ok(self.tables.read().await.channel(id).cloned())
    }

    async fn fetch_channels(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(self.tables.read().await.channels())
    }

    async fn update_channel_credentials(
        &self,
        id: i64,
        credentials: PlatformCredentials,
    ) -> Result<Channel, StoreError> {
        self.tables.write().await.set_channel_credentials(id, credentials)
    }

    async fn delete_channel(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delete_channel(id))
    }

    async fn insert_link(&self, link: NewLink) -> Result<Link, StoreError> {
        let link = self.tables.write().await.insert_link(link)?;
        debug!("🗃️ Link #{} saved (channel #{} ← shop #{})", link.id, link.channel_id, link.shop_id);
        Ok(link)
    }

    async fn fetch_link(&self, id: i64) -> Result<Option<Link>, StoreError> {
        Ok(self.tables.read().await.link(id).cloned())
    }

    async fn fetch_links_for_channel(&self, channel_id: i64) -> Result<Vec<Link>, StoreError> {
        Ok(self.tables.read().await.links_for_channel(channel_id))
    }

    async fn update_link_filters(
        &self,
        id: i64,
        expected_version: u64,
        filters: Vec<Filter>,
    ) -> Result<Link, StoreError> {
        self.tables.write().await.set_link_filters(id, expected_version, filters)
    }

    async fn delete_link(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delete_link(id))
    }

    async fn insert_order(&self, shop_id: i64, order: Order) -> Result<InsertOrderResult, StoreError> {
        self.tables.write().await.insert_order(shop_id, order)
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.tables.read().await.order(id).cloned())
    }

    async fn fetch_order_by_platform_id(
        &self,
        shop_id: i64,
        order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.tables.read().await.order_by_platform_id(shop_id, order_id).cloned())
    }

    async fn fetch_order_by_purchase_id(
        &self,
        channel_id: i64,
        purchase_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.tables.read().await.order_by_purchase_id(channel_id, purchase_id).cloned())
    }

    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.tables.read().await.orders())
    }

    async fn update_order(&self, record: &OrderRecord) -> Result<OrderRecord, StoreError> {
        self.tables.write().await.update_order(record)
    }

    async fn insert_match(&self, new_match: NewMatch) -> Result<Match, StoreError> {
        Ok(self.tables.write().await.insert_match(new_match))
    }

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError> {
        Ok(self.tables.read().await.matching(id).cloned())
    }

    async fn fetch_matches(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.tables.read().await.matches())
    }

    async fn update_match(&self, updated: &Match) -> Result<(), StoreError> {
        self.tables.write().await.update_match(updated)
    }

    async fn delete_match(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.delete_match(id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SEED: &str = r#"{
        "shops": [{"name": "Main", "platform": "shopify",
                   "credentials": {"domain": "main.myshopify.com", "access_token": "shpat_1"}}],
        "channels": [{"name": "Supplier", "platform": "woocommerce", "linkMode": "all-matching",
                      "credentials": {"domain": "supplier.test", "access_token": "ck_1", "access_secret": "cs_1"}}],
        "links": [{"channelId": 1, "shopId": 1, "rank": 1,
                   "filters": [{"field": "country", "type": "in", "value": ["US", "CA"]}]}],
        "matches": [{"input": [{"platformId": 1, "productId": "10", "variantId": "11", "quantity": 1}],
                     "output": [{"platformId": 1, "productId": "70", "variantId": "71", "quantity": 1}]}]
    }"#;

    #[tokio::test]
    async fn seed_data_is_loaded_in_file_order() {
        let seed = serde_json::from_str::<SeedData>(SEED).unwrap();
        let db = MemoryDatabase::from_seed(seed).unwrap();
        let channel = db.fetch_channel(1).await.unwrap().unwrap();
        assert_eq!(channel.link_mode, crate::db_types::LinkMode::AllMatching);
        assert_eq!(channel.credentials.access_secret.unwrap().reveal(), "cs_1");
        let links = db.fetch_links_for_channel(1).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].filters.len(), 1);
        assert_eq!(db.fetch_matches().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seed_links_must_be_valid() {
        let seed = SeedData { links: vec![NewLink::new(1, 1, 1)], ..Default::default() };
        let err = MemoryDatabase::from_seed(seed).unwrap_err();
        assert_eq!(err, StoreError::shop(1));
    }

    #[tokio::test]
    async fn clones_share_the_same_records() {
        let db = MemoryDatabase::new();
        let clone = db.clone();
        let creds = PlatformCredentials::new("main.myshopify.com", "t");
        let shop = db.insert_shop(NewShop::new("Main", platform_tools::PlatformKind::Shopify, creds)).await.unwrap();
        assert!(clone.fetch_shop(shop.id).await.unwrap().is_some());
        let updated = clone.update_shop_credentials(shop.id, PlatformCredentials::new("main.myshopify.com", "t2"));
        assert_eq!(updated.await.unwrap().credentials.access_token.reveal(), "t2");
        let err = db.update_shop_credentials(99, PlatformCredentials::default()).await.unwrap_err();
        assert_eq!(err, StoreError::shop(99));
    }
}
