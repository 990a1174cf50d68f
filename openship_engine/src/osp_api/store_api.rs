use std::fmt::Debug;

use log::*;
use platform_tools::{data_objects::AccessGrant, PlatformKind};
use serde::Serialize;

use crate::{
    db::traits::{RoutingDatabase, StoreError},
    db_types::{Channel, Link, Match, NewChannel, NewLink, NewMatch, NewShop, OrderRecord, Shop},
    link_matcher::Filter,
};

/// Which records an OAuth grant was applied to.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsUpdate {
    pub shops: Vec<i64>,
    pub channels: Vec<i64>,
    /// Set when no record used the granted domain, and a new shop was created for it.
    pub created_shop: Option<i64>,
}

/// `StoreApi` manages the records that drive routing: shops, channels, links and their filters, and matches.
pub struct StoreApi<B> {
    db: B,
}

impl<B> Debug for StoreApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreApi")
    }
}

impl<B> StoreApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> StoreApi<B>
where B: RoutingDatabase
{
    //----------------------------------------------   Shops   -------------------------------------------------------
    pub async fn create_shop(&self, shop: NewShop) -> Result<Shop, StoreError> {
        let shop = self.db.insert_shop(shop).await?;
        info!("🏬️ Shop #{} ({}, {}) created", shop.id, shop.name, shop.platform);
        Ok(shop)
    }

    pub async fn shop(&self, id: i64) -> Result<Shop, StoreError> {
        self.db.fetch_shop(id).await?.ok_or_else(|| StoreError::shop(id))
    }

    pub async fn shops(&self) -> Result<Vec<Shop>, StoreError> {
        self.db.fetch_shops().await
    }

    pub async fn delete_shop(&self, id: i64) -> Result<(), StoreError> {
        if !self.db.delete_shop(id).await? {
            return Err(StoreError::shop(id));
        }
        info!("🏬️ Shop #{id} deleted");
        Ok(())
    }

    //----------------------------------------------  Channels  ------------------------------------------------------
    pub async fn create_channel(&self, channel: NewChannel) -> Result<Channel, StoreError> {
        let channel = self.db.insert_channel(channel).await?;
        info!(
            "🚚️ Channel #{} ({}, {}, {}) created",
            channel.id, channel.name, channel.platform, channel.link_mode
        );
        Ok(channel)
    }

    pub async fn channel(&self, id: i64) -> Result<Channel, StoreError> {
        self.db.fetch_channel(id).await?.ok_or_else(|| StoreError::channel(id))
    }

    pub async fn channels(&self) -> Result<Vec<Channel>, StoreError> {
        self.db.fetch_channels().await
    }

    pub async fn delete_channel(&self, id: i64) -> Result<(), StoreError> {
        if !self.db.delete_channel(id).await? {
            return Err(StoreError::channel(id));
        }
        info!("🚚️ Channel #{id} deleted");
        Ok(())
    }

    /// Applies the credentials from an OAuth grant to every shop and channel on `platform` with the granted domain.
    /// If there are none, the install is new and a shop named after the domain is created for it.
    pub async fn apply_access_grant(
        &self,
        platform: PlatformKind,
        grant: AccessGrant,
    ) -> Result<CredentialsUpdate, StoreError> {
        let domain = grant.domain.clone();
        let credentials = grant.into_credentials();
        let mut update = CredentialsUpdate::default();
        for shop in self.db.fetch_shops().await? {
            if shop.platform == platform && shop.credentials.domain == domain {
                self.db.update_shop_credentials(shop.id, credentials.clone()).await?;
                update.shops.push(shop.id);
            }
        }
        for channel in self.db.fetch_channels().await? {
            if channel.platform == platform && channel.credentials.domain == domain {
                self.db.update_channel_credentials(channel.id, credentials.clone()).await?;
                update.channels.push(channel.id);
            }
        }
        if update.shops.is_empty() && update.channels.is_empty() {
            let shop = self.create_shop(NewShop::new(domain.clone(), platform, credentials)).await?;
            update.created_shop = Some(shop.id);
        }
        info!(
            "🔑️ {platform} credentials for {domain} applied to shops {:?} and channels {:?}",
            update.shops, update.channels
        );
        Ok(update)
    }

    //----------------------------------------------   Links   -------------------------------------------------------
    pub async fn create_link(&self, link: NewLink) -> Result<Link, StoreError> {
        let link = self.db.insert_link(link).await?;
        info!(
            "🔗️ Link #{} created: shop #{} → channel #{} at rank {} with {} filters",
            link.id,
            link.shop_id,
            link.channel_id,
            link.rank,
            link.filters.len()
        );
        Ok(link)
    }

    pub async fn link(&self, id: i64) -> Result<Link, StoreError> {
        self.db.fetch_link(id).await?.ok_or_else(|| StoreError::link(id))
    }

    pub async fn links_for_channel(&self, channel_id: i64) -> Result<Vec<Link>, StoreError> {
        self.channel(channel_id).await?;
        self.db.fetch_links_for_channel(channel_id).await
    }

    pub async fn delete_link(&self, id: i64) -> Result<(), StoreError> {
        if !self.db.delete_link(id).await? {
            return Err(StoreError::link(id));
        }
        info!("🔗️ Link #{id} deleted");
        Ok(())
    }

    /// Appends a filter to a link that is still at `expected_version`.
    pub async fn add_filter(&self, link_id: i64, expected_version: u64, filter: Filter) -> Result<Link, StoreError> {
        filter.validate()?;
        let mut filters = self.link(link_id).await?.filters;
        filters.push(filter);
        self.save_filters(link_id, expected_version, filters).await
    }

    /// Replaces the filter at `index` on a link that is still at `expected_version`.
    pub async fn replace_filter(
        &self,
        link_id: i64,
        expected_version: u64,
        index: usize,
        filter: Filter,
    ) -> Result<Link, StoreError> {
        filter.validate()?;
        let mut filters = self.link(link_id).await?.filters;
        let slot = filters.get_mut(index).ok_or_else(|| missing_filter(link_id, index))?;
        *slot = filter;
        self.save_filters(link_id, expected_version, filters).await
    }

    /// Removes the filter at `index` from a link that is still at `expected_version`.
    pub async fn remove_filter(&self, link_id: i64, expected_version: u64, index: usize) -> Result<Link, StoreError> {
        let mut filters = self.link(link_id).await?.filters;
        if index >= filters.len() {
            return Err(missing_filter(link_id, index));
        }
        filters.remove(index);
        self.save_filters(link_id, expected_version, filters).await
    }

    async fn save_filters(
        &self,
        link_id: i64,
        expected_version: u64,
        filters: Vec<Filter>,
    ) -> Result<Link, StoreError> {
        let result = self.db.update_link_filters(link_id, expected_version, filters).await;
        match &result {
            Ok(link) => debug!("🔗️ Link #{link_id} filters updated to version {}", link.version),
            Err(StoreError::VersionConflict { actual, .. }) => {
                warn!("🔗️ Stale filter update to link #{link_id}: v{expected_version} is now v{actual}")
            },
            Err(_) => {},
        }
        result
    }

    //----------------------------------------------  Matches  -------------------------------------------------------
    pub async fn create_match(&self, new_match: NewMatch) -> Result<Match, StoreError> {
        let m = self.db.insert_match(new_match).await?;
        info!("🧩️ Match #{} created ({} in, {} out)", m.id, m.input.len(), m.output.len());
        Ok(m)
    }

    pub async fn matches(&self) -> Result<Vec<Match>, StoreError> {
        self.db.fetch_matches().await
    }

    pub async fn delete_match(&self, id: i64) -> Result<(), StoreError> {
        if !self.db.delete_match(id).await? {
            return Err(StoreError::matching(id));
        }
        info!("🧩️ Match #{id} deleted");
        Ok(())
    }

    //----------------------------------------------   Orders  -------------------------------------------------------
    pub async fn order(&self, id: i64) -> Result<OrderRecord, StoreError> {
        self.db.fetch_order(id).await?.ok_or_else(|| StoreError::order(id))
    }

    pub async fn orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.db.fetch_orders().await
    }
}

fn missing_filter(link_id: i64, index: usize) -> StoreError {
    StoreError::NotFound(format!("Filter {index} of link #{link_id}"))
}
