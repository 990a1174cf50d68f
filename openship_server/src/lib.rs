//! # Openship server
//! This module hosts the HTTP server for Openship. It is responsible for:
//! Receiving webhook deliveries from the shops (new and cancelled orders) and channels (tracking and cancelled
//! purchases) and handing them to the order flow.
//! Completing OAuth installs for Shopify, BigCommerce and WooCommerce.
//! Serving the admin JSON API for shops, channels, links, matches, orders, inventory sync and webhook management.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/handlers/...`: The webhook routes the platforms deliver to.
//! * `/api/oauth/{platform}/...`: The OAuth install handshake.
//! * `/api/...`: The admin API. See [routes](routes/index.html).

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
