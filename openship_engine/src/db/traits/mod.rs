//! #  Storage contracts.
//!
//! Openship keeps five kinds of record: shops, channels, the links between them, the orders received from shops and
//! the matches that pair shop products with channel products. [`RoutingDatabase`] is the contract a storage backend
//! implements to hold them. Every API in this crate is generic over it, so a backend can be swapped without touching
//! the routing logic.
//!
//! Backends are responsible for the record-level invariants:
//! * deleting a shop or a channel deletes its links,
//! * link filters are validated before they are stored,
//! * filter updates quote the link version they were based on and fail with [`StoreError::VersionConflict`] when it
//!   is stale,
//! * orders are unique per shop and platform order id.
mod data_objects;
mod errors;
mod routing_database;

pub use data_objects::InsertOrderResult;
pub use errors::StoreError;
pub use routing_database::RoutingDatabase;
