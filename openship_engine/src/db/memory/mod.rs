//! An in-memory [`crate::RoutingDatabase`] backend.
//!
//! All records live behind a single `tokio` read-write lock, so every operation is atomic with respect to the others.
//! Contents can be preloaded from a JSON seed file and are lost when the process exits.
mod memory_impl;
mod tables;

pub use memory_impl::{MemoryDatabase, SeedData};
