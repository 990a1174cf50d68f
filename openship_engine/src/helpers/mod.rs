mod cart_builder;

pub use cart_builder::{cart_items_for_channel, match_multiplier};
