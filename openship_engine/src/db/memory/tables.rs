use std::collections::BTreeMap;

use chrono::Utc;
use log::*;
use platform_tools::{data_objects::Order, PlatformCredentials};

use crate::{
    db::traits::{InsertOrderResult, StoreError},
    db_types::{Channel, Link, Match, NewChannel, NewLink, NewMatch, NewShop, OrderRecord, Shop},
    link_matcher::Filter,
};

/// The records held by [`super::MemoryDatabase`]. Ids are allocated per table, starting at 1, and never reused.
#[derive(Debug, Default)]
pub struct Tables {
    shops: BTreeMap<i64, Shop>,
    channels: BTreeMap<i64, Channel>,
    links: BTreeMap<i64, Link>,
    orders: BTreeMap<i64, OrderRecord>,
    matches: BTreeMap<i64, Match>,
    last_shop_id: i64,
    last_channel_id: i64,
    last_link_id: i64,
    last_order_id: i64,
    last_match_id: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn validate_filters(filters: &[Filter]) -> Result<(), StoreError> {
    filters.iter().try_for_each(|f| f.validate()).map_err(StoreError::from)
}

impl Tables {
    //----------------------------------------------   Shops   -------------------------------------------------------
    pub fn insert_shop(&mut self, shop: NewShop) -> Shop {
        let id = next(&mut self.last_shop_id);
        let NewShop { name, platform, credentials } = shop;
        let shop = Shop { id, name, platform, credentials, created_at: Utc::now() };
        self.shops.insert(id, shop.clone());
        shop
    }

    pub fn shop(&self, id: i64) -> Option<&Shop> {
        self.shops.get(&id)
    }

    pub fn shops(&self) -> Vec<Shop> {
        self.shops.values().cloned().collect()
    }

    pub fn set_shop_credentials(&mut self, id: i64, credentials: PlatformCredentials) -> Result<Shop, StoreError> {
        let shop = self.shops.get_mut(&id).ok_or_else(|| StoreError::shop(id))?;
        shop.credentials = credentials;
        Ok(shop.clone())
    }

    pub fn delete_shop(&mut self, id: i64) -> bool {
        if self.shops.remove(&id).is_none() {
            return false;
        }
        let before = self.links.len();
        self.links.retain(|_, l| l.shop_id != id);
        debug!("🗃️ Shop #{id} deleted along with {} links", before - self.links.len());
        true
    }

    //----------------------------------------------  Channels  ------------------------------------------------------
    pub fn insert_channel(&mut self, channel: NewChannel) -> Channel {
        let id = next(&mut self.last_channel_id);
        let channel = Channel {
            id,
            name: channel.name,
            platform: channel.platform,
            credentials: channel.credentials,
            link_mode: channel.link_mode,
            created_at: Utc::now(),
        };
        self.channels.insert(id, channel.clone());
        channel
    }

    pub fn channel(&self, id: i64) -> Option<&Channel> {
        self.channels.get(&id)
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.channels.values().cloned().collect()
    }

    pub fn set_channel_credentials(
        &mut self,
        id: i64,
        credentials: PlatformCredentials,
    ) -> Result<Channel, StoreError> {
        let channel = self.channels.get_mut(&id).ok_or_else(|| StoreError::channel(id))?;
        channel.credentials = credentials;
        Ok(channel.clone())
    }

    pub fn delete_channel(&mut self, id: i64) -> bool {
        if self.channels.remove(&id).is_none() {
            return false;
        }
        let before = self.links.len();
        self.links.retain(|_, l| l.channel_id != id);
        debug!("🗃️ Channel #{id} deleted along with {} links", before - self.links.len());
        true
    }

    //----------------------------------------------   Links   -------------------------------------------------------
    pub fn insert_link(&mut self, link: NewLink) -> Result<Link, StoreError> {
        if !self.shops.contains_key(&link.shop_id) {
            return Err(StoreError::shop(link.shop_id));
        }
        if !self.channels.contains_key(&link.channel_id) {
            return Err(StoreError::channel(link.channel_id));
        }
        validate_filters(&link.filters)?;
        let id = next(&mut self.last_link_id);
        let NewLink { channel_id, shop_id, rank, filters } = link;
        let link = Link { id, channel_id, shop_id, rank, filters, version: 0 };
        self.links.insert(id, link.clone());
        Ok(link)
    }

    pub fn link(&self, id: i64) -> Option<&Link> {
        self.links.get(&id)
    }

    pub fn links_for_channel(&self, channel_id: i64) -> Vec<Link> {
        let mut links = self.links.values().filter(|l| l.channel_id == channel_id).cloned().collect::<Vec<_>>();
        links.sort_by_key(|l| (l.rank, l.id));
        links
    }

    pub fn set_link_filters(
        &mut self,
        id: i64,
        expected_version: u64,
        filters: Vec<Filter>,
    ) -> Result<Link, StoreError> {
        validate_filters(&filters)?;
        let link = self.links.get_mut(&id).ok_or_else(|| StoreError::link(id))?;
        if link.version != expected_version {
            return Err(StoreError::VersionConflict { link_id: id, expected: expected_version, actual: link.version });
        }
        link.filters = filters;
        link.version += 1;
        Ok(link.clone())
    }

    pub fn delete_link(&mut self, id: i64) -> bool {
        self.links.remove(&id).is_some()
    }

    //----------------------------------------------   Orders  -------------------------------------------------------
    pub fn insert_order(&mut self, shop_id: i64, order: Order) -> Result<InsertOrderResult, StoreError> {
        if !self.shops.contains_key(&shop_id) {
            return Err(StoreError::shop(shop_id));
        }
        if let Some(existing) = self.order_by_platform_id(shop_id, &order.order_id) {
            return Ok(InsertOrderResult::AlreadyExists(existing.clone()));
        }
        let id = next(&mut self.last_order_id);
        let now = Utc::now();
        let record = OrderRecord { id, shop_id, order, routes: vec![], created_at: now, updated_at: now };
        self.orders.insert(id, record.clone());
        Ok(InsertOrderResult::Inserted(record))
    }

    pub fn order(&self, id: i64) -> Option<&OrderRecord> {
        self.orders.get(&id)
    }

    pub fn order_by_platform_id(&self, shop_id: i64, order_id: &str) -> Option<&OrderRecord> {
        self.orders.values().find(|r| r.shop_id == shop_id && r.order.order_id == order_id)
    }

    pub fn order_by_purchase_id(&self, channel_id: i64, purchase_id: &str) -> Option<&OrderRecord> {
        self.orders.values().find(|r| {
            r.order
                .cart_items
                .iter()
                .any(|c| c.channel_id == channel_id && c.purchase_id.as_deref() == Some(purchase_id))
        })
    }

    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders.values().cloned().collect()
    }

    pub fn update_order(&mut self, record: &OrderRecord) -> Result<OrderRecord, StoreError> {
        let stored = self.orders.get_mut(&record.id).ok_or_else(|| StoreError::order(record.id))?;
        stored.order = record.order.clone();
        stored.routes = record.routes.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    //----------------------------------------------  Matches  -------------------------------------------------------
    pub fn insert_match(&mut self, new_match: NewMatch) -> Match {
        let id = next(&mut self.last_match_id);
        let m = Match { id, input: new_match.input, output: new_match.output };
        self.matches.insert(id, m.clone());
        m
    }

    pub fn matching(&self, id: i64) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub fn matches(&self) -> Vec<Match> {
        self.matches.values().cloned().collect()
    }

    pub fn update_match(&mut self, updated: &Match) -> Result<(), StoreError> {
        let stored = self.matches.get_mut(&updated.id).ok_or_else(|| StoreError::matching(updated.id))?;
        stored.input = updated.input.clone();
        stored.output = updated.output.clone();
        Ok(())
    }

    pub fn delete_match(&mut self, id: i64) -> bool {
        self.matches.remove(&id).is_some()
    }
}
