use log::*;
use platform_tools::data_objects::{LineItem, Order};
use serde_json::{Number, Value};

use super::filters::{Condition, Filter, FilterError, LineItemField, OrderField};
use crate::db_types::{Link, LinkMode};

//--------------------------------------   Field lookups     ---------------------------------------------------------

fn text(value: &Option<String>) -> Value {
    value.as_ref().map(|s| Value::String(s.clone())).unwrap_or(Value::Null)
}

/// Prices are strings on the wire but compare as numbers.
fn number(value: &str) -> Value {
    value.trim().parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number).unwrap_or(Value::Null)
}

fn order_value(order: &Order, field: OrderField) -> Value {
    match field {
        OrderField::OrderId => Value::String(order.order_id.clone()),
        OrderField::OrderName => Value::String(order.order_name.clone()),
        OrderField::Email => text(&order.email),
        OrderField::FirstName => text(&order.first_name),
        OrderField::LastName => text(&order.last_name),
        OrderField::StreetAddress1 => text(&order.street_address1),
        OrderField::StreetAddress2 => text(&order.street_address2),
        OrderField::City => text(&order.city),
        OrderField::State => text(&order.state),
        OrderField::Zip => text(&order.zip),
        OrderField::Country => text(&order.country),
        OrderField::Phone => text(&order.phone),
        OrderField::Currency => Value::String(order.currency.clone()),
        OrderField::TotalPrice => number(&order.total_price),
        OrderField::Note => text(&order.note),
        OrderField::Status => Value::String(order.status.to_string()),
        OrderField::LineItems => Value::Null,
    }
}

fn line_item_value(item: &LineItem, field: LineItemField) -> Value {
    match field {
        LineItemField::Name => Value::String(item.name.clone()),
        LineItemField::ProductId => Value::String(item.product_id.clone()),
        LineItemField::VariantId => Value::String(item.variant_id.clone()),
        LineItemField::Quantity => Value::Number(Number::from(item.quantity)),
        LineItemField::Price => number(&item.price),
        LineItemField::Sku => text(&item.sku),
    }
}

//--------------------------------------    Comparisons      ---------------------------------------------------------

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Exact equality. When the field holds a number, the expected value is compared numerically, so `"10"` equals `10.0`.
fn equals(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), _) => match (as_f64(actual), as_f64(expected)) {
            (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
            _ => false,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::String(a), Value::Number(b)) => a == &b.to_string(),
        (a, b) => a == b,
    }
}

fn lowercase(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Condition {
    /// Evaluates a scalar condition against a field value. Quantifiers never match a scalar.
    pub fn test(&self, actual: &Value) -> bool {
        match self {
            Condition::Equals(expected) => equals(actual, expected),
            Condition::Is(expected) => equals(actual, expected),
            Condition::Not(inner) => !inner.test(actual),
            Condition::In(options) => options.iter().any(|o| equals(actual, o)),
            Condition::NotIn(options) => !options.iter().any(|o| equals(actual, o)),
            Condition::Contains(needle) => lowercase(actual).map(|s| s.contains(needle)).unwrap_or(false),
            Condition::NotContains(needle) => !lowercase(actual).map(|s| s.contains(needle)).unwrap_or(false),
            Condition::StartsWith(prefix) => lowercase(actual).map(|s| s.starts_with(prefix)).unwrap_or(false),
            Condition::EndsWith(suffix) => lowercase(actual).map(|s| s.ends_with(suffix)).unwrap_or(false),
            Condition::Matches(re) => actual.as_str().map(|s| re.is_match(s)).unwrap_or(false),
            Condition::NotMatches(re) => !actual.as_str().map(|s| re.is_match(s)).unwrap_or(false),
            Condition::Some(..) | Condition::None(..) | Condition::Every(..) => false,
        }
    }

    pub fn test_order(&self, order: &Order, field: OrderField) -> bool {
        let items = &order.line_items;
        match self {
            Condition::Some(f, inner) => items.iter().any(|i| inner.test(&line_item_value(i, *f))),
            Condition::None(f, inner) => !items.iter().any(|i| inner.test(&line_item_value(i, *f))),
            Condition::Every(f, inner) => items.iter().all(|i| inner.test(&line_item_value(i, *f))),
            scalar => scalar.test(&order_value(order, field)),
        }
    }
}

//--------------------------------------     Matching        ---------------------------------------------------------

pub fn filter_matches(filter: &Filter, order: &Order) -> Result<bool, FilterError> {
    let condition = filter.compile()?;
    Ok(condition.test_order(order, filter.field))
}

/// True when every filter of `link` accepts `order`. An empty filter list accepts every order.
///
/// The caller is responsible for checking that the order came from the link's shop.
pub fn link_matches(link: &Link, order: &Order) -> Result<bool, FilterError> {
    for filter in &link.filters {
        if !filter_matches(filter, order)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Selects the links of a channel that accept an order from `shop_id`.
///
/// Links from other shops are ignored. The remainder are evaluated in rank order (ties broken by id). In
/// [`LinkMode::Sequential`] evaluation stops at the first match, in [`LinkMode::AllMatching`] every match is returned.
pub fn select_links<'a>(
    mode: LinkMode,
    links: &'a [Link],
    shop_id: i64,
    order: &Order,
) -> Result<Vec<&'a Link>, FilterError> {
    let mut candidates = links.iter().filter(|l| l.shop_id == shop_id).collect::<Vec<_>>();
    candidates.sort_by_key(|l| (l.rank, l.id));
    let mut selected = Vec::new();
    for link in candidates {
        if link_matches(link, order)? {
            trace!("🔀️ Link #{} accepts order {}", link.id, order.order_name);
            selected.push(link);
            if mode == LinkMode::Sequential {
                break;
            }
        }
    }
    Ok(selected)
}
