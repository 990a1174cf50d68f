//! # Openship engine public API
//!
//! The `osp_api` module exposes the programmatic API of the Openship routing engine. It is split by concern, so that
//! callers only construct what they use.
//!
//! * [`store_api`] manages shops, channels, links (and their filters) and matches.
//! * [`routing_api`] evaluates links to decide which channels receive an order.
//! * [`order_flow_api`] is the primary API for handling orders, from the shop webhook that announces them to the
//!   purchase on each channel and the tracking and cancellation notices that follow.
//! * [`inventory_sync_api`] aligns shop inventory with matched channel inventory.
//! * [`webhook_api`] manages webhook subscriptions and installs the recommended ones.
//! * [`catalog_api`] passes product and order queries through to the platforms.
//! * [`oauth_api`] runs the platform install handshake.
//!
//! # API usage
//!
//! Every API is created from a backend that implements [`crate::RoutingDatabase`]. APIs that talk to platforms also
//! take an [`adapters::AdapterFactory`], which builds the platform client for a stored shop or channel.
//!
//! ```rust,ignore
//! use openship_engine::{MemoryDatabase, PlatformClients, InventorySyncApi};
//! let db = MemoryDatabase::from_seed_file("seed.json").await?;
//! let api = InventorySyncApi::new(db, PlatformClients::new(config));
//! let report = api.sync_matches(&[1, 2, 3], None).await;
//! ```

pub mod adapters;
pub mod catalog_api;
pub mod errors;
pub mod inventory_sync_api;
pub mod oauth_api;
pub mod order_flow_api;
pub mod routing_api;
pub mod store_api;
pub mod sync_objects;
pub mod webhook_api;

#[cfg(test)]
mod mocks;
