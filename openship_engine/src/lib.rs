//! Openship Engine
//!
//! Openship routes the orders of online shops to the fulfillment channels that supply them. This library contains
//! the core logic. It is platform-agnostic: the Shopify, BigCommerce and WooCommerce specifics live in
//! `platform_tools`.
//!
//! The library is divided into these main sections:
//! 1. Storage ([`mod@db`]). The [`RoutingDatabase`] trait is the storage contract; [`MemoryDatabase`] is an in-memory
//!    backend that can be seeded from a JSON file. The record types are defined in [`mod@db_types`] and are public.
//! 2. The link matcher ([`mod@link_matcher`]). Links carry filters over order fields that decide whether a shop order
//!    goes to a channel.
//! 3. The engine public API ([`mod@osp_api`]). This provides the public-facing functionality of the engine: record
//!    management, routing, the order flow and purchase saga, inventory sync and webhook reconciliation.
//!
//! The engine also emits events that can be subscribed to, e.g. when an order is routed or a purchase is aborted.
//! See [`mod@events`].
pub mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod link_matcher;
mod osp_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::{
    memory::{MemoryDatabase, SeedData},
    traits::{InsertOrderResult, RoutingDatabase, StoreError},
};
pub use osp_api::{
    adapters::{AdapterFactory, EitherAdapter, PlatformClients, PlatformRef},
    catalog_api::CatalogApi,
    errors::{
        CatalogError,
        OAuthError,
        OrderFlowError,
        PartialInventorySyncError,
        RoutingError,
        WebhookSyncError,
    },
    inventory_sync_api::InventorySyncApi,
    oauth_api::{oauth_callback_path, OAuthApi},
    order_flow_api::OrderFlowApi,
    routing_api::RoutingApi,
    store_api::{CredentialsUpdate, StoreApi},
    sync_objects,
    webhook_api::{recommended_webhooks, RecommendedWebhook, WebhookApi, WebhookSyncReport},
};
