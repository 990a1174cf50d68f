use platform_tools::{data_objects::Order, PlatformCredentials};

use super::{InsertOrderResult, StoreError};
use crate::{
    db_types::{Channel, Link, Match, NewChannel, NewLink, NewMatch, NewShop, OrderRecord, Shop},
    link_matcher::Filter,
};

/// The storage contract for everything Openship routes.
///
/// Lookups by id return `Ok(None)` for a missing record. Mutations of a missing record fail with
/// [`StoreError::NotFound`].
#[allow(async_fn_in_trait)]
pub trait RoutingDatabase: Clone {
    //----------------------------------------------   Shops   -------------------------------------------------------
    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, StoreError>;

    async fn fetch_shop(&self, id: i64) -> Result<Option<Shop>, StoreError>;

    async fn fetch_shops(&self) -> Result<Vec<Shop>, StoreError>;

    /// Replaces the install credentials of a shop. This is the only way credentials change after creation, and it is
    /// driven by the OAuth callback.
    async fn update_shop_credentials(&self, id: i64, credentials: PlatformCredentials) -> Result<Shop, StoreError>;

    /// Deletes the shop and every link that routes its orders. Returns `false` if the shop did not exist.
    async fn delete_shop(&self, id: i64) -> Result<bool, StoreError>;

    //----------------------------------------------  Channels  ------------------------------------------------------
    async fn insert_channel(&self, channel: NewChannel) -> Result<Channel, StoreError>;

    async fn fetch_channel(&self, id: i64) -> Result<Option<Channel>, StoreError>;

    async fn fetch_channels(&self) -> Result<Vec<Channel>, StoreError>;

    async fn update_channel_credentials(
        &self,
        id: i64,
        credentials: PlatformCredentials,
    ) -> Result<Channel, StoreError>;

    /// Deletes the channel and all of its links. Returns `false` if the channel did not exist.
    async fn delete_channel(&self, id: i64) -> Result<bool, StoreError>;

    //----------------------------------------------   Links   -------------------------------------------------------
    /// Stores a new link at version 0. Both ends must exist and every filter must be valid.
    async fn insert_link(&self, link: NewLink) -> Result<Link, StoreError>;

    async fn fetch_link(&self, id: i64) -> Result<Option<Link>, StoreError>;

    async fn fetch_links_for_channel(&self, channel_id: i64) -> Result<Vec<Link>, StoreError>;

    /// Replaces the filters of a link, provided the link is still at `expected_version`. The stored version is then
    /// incremented.
    async fn update_link_filters(
        &self,
        id: i64,
        expected_version: u64,
        filters: Vec<Filter>,
    ) -> Result<Link, StoreError>;

    async fn delete_link(&self, id: i64) -> Result<bool, StoreError>;

    //----------------------------------------------   Orders  -------------------------------------------------------
    /// Stores an order received from `shop_id`. If the shop already delivered an order with the same platform order
    /// id, the existing record is returned instead.
    async fn insert_order(&self, shop_id: i64, order: Order) -> Result<InsertOrderResult, StoreError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<OrderRecord>, StoreError>;

    async fn fetch_order_by_platform_id(&self, shop_id: i64, order_id: &str)
        -> Result<Option<OrderRecord>, StoreError>;

    /// Finds the order with a cart item placed on `channel_id` under `purchase_id`.
    async fn fetch_order_by_purchase_id(
        &self,
        channel_id: i64,
        purchase_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError>;

    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;

    /// Saves the canonical order and route decisions of an existing record.
    async fn update_order(&self, record: &OrderRecord) -> Result<OrderRecord, StoreError>;

    //----------------------------------------------  Matches  -------------------------------------------------------
    async fn insert_match(&self, new_match: NewMatch) -> Result<Match, StoreError>;

    async fn fetch_match(&self, id: i64) -> Result<Option<Match>, StoreError>;

    async fn fetch_matches(&self) -> Result<Vec<Match>, StoreError>;

    async fn update_match(&self, updated: &Match) -> Result<(), StoreError>;

    async fn delete_match(&self, id: i64) -> Result<bool, StoreError>;
}
