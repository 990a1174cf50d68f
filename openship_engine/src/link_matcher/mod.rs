//! Decides which links of a channel accept an order.
mod filters;
mod matcher;

pub use filters::{Condition, Filter, FilterError, FilterKind, LineItemField, LineItemFilter, OrderField};
pub use matcher::{filter_matches, link_matches, select_links};
