use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid price value: {0}")]
pub struct PriceParseError(pub String);

/// Commerce platforms express prices as decimal strings ("12.5", "12.50", "12"). Converts such a string into an
/// integer number of cents. Fractions beyond two digits are rejected rather than rounded.
pub fn parse_price_cents(price: &str) -> Result<i64, PriceParseError> {
    let price = price.trim();
    let (negative, digits) = match price.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, price),
    };
    let mut parts = digits.split('.');
    let whole = parts.next().filter(|s| !s.is_empty()).ok_or_else(|| PriceParseError(price.to_string()))?;
    let whole_units = whole.parse::<i64>().map_err(|e| PriceParseError(format!("{price}. {e}")))?;
    let parse_fraction = |frac: &str| frac.parse::<i64>().map_err(|e| PriceParseError(format!("{price}. {e}")));
    let cents = match parts.next() {
        None | Some("") => 0,
        Some(frac) if frac.len() == 1 => 10 * parse_fraction(frac)?,
        Some(frac) if frac.len() == 2 => parse_fraction(frac)?,
        Some(_) => return Err(PriceParseError(format!("{price} has more than two decimal places"))),
    };
    if parts.next().is_some() {
        return Err(PriceParseError(price.to_string()));
    }
    let value = 100 * whole_units + cents;
    Ok(if negative { -value } else { value })
}

/// The inverse of [`parse_price_cents`]. Always prints two decimal places.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}
