//! Platform adapters for Openship.
//!
//! Each supported commerce platform (Shopify, BigCommerce and WooCommerce) is wrapped in a client that implements
//! [`PlatformAdapter`] plus the [`ShopAdapter`] and [`ChannelAdapter`] roles. [`PlatformClient`] selects the right
//! client for a [`PlatformKind`].
mod bigcommerce;
mod client;
mod config;
mod error;
mod helpers;
mod shopify;
mod traits;
mod woocommerce;

pub mod data_objects;
pub mod http;
pub mod signature;
pub mod topics;

pub use bigcommerce::BigCommerceClient;
pub use client::PlatformClient;
pub use config::{AdapterConfig, AppCredentials, BigCommerceAppConfig, ShopifyAppConfig, WooCommerceAppConfig};
pub use data_objects::{PlatformCredentials, PlatformKind};
pub use error::AdapterError;
pub use shopify::ShopifyClient;
pub use traits::{ChannelAdapter, PlatformAdapter, ShopAdapter};
pub use woocommerce::WooCommerceClient;
