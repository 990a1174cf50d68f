mod helpers;
mod price;
mod secret;

pub use helpers::parse_boolean_flag;
pub use price::{format_cents, parse_price_cents, PriceParseError};
pub use secret::Secret;
