//! The filter vocabulary used by links.
//!
//! A filter is stored the way operators write it, as `{ "field": .., "type": .., "value": .. }`. Before it can be
//! evaluated it is compiled into a [`Condition`], which is where every structural rule is enforced: scalar fields take
//! scalar comparisons, `lineItems` takes only the `some` / `none` / `every` quantifiers, and regular expressions must
//! compile. Links never store a filter that fails to compile.
use std::fmt::Display;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("'{kind}' expects {expected}, but got {got}")]
    InvalidValue { kind: FilterKind, expected: &'static str, got: String },
    #[error("'{kind}' can only be applied to lineItems")]
    QuantifierOnScalar { kind: FilterKind },
    #[error("lineItems only accepts the some, none and every filters, not '{kind}'")]
    ScalarOnLineItems { kind: FilterKind },
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),
}

//--------------------------------------     FilterKind      ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "notContains")]
    NotContains,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "matches")]
    Matches,
    #[serde(rename = "not_matches")]
    NotMatches,
    #[serde(rename = "some")]
    Some,
    #[serde(rename = "none")]
    None,
    #[serde(rename = "every")]
    Every,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Not => "not",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Is => "is",
            Self::Matches => "matches",
            Self::NotMatches => "not_matches",
            Self::Some => "some",
            Self::None => "none",
            Self::Every => "every",
        }
    }

    pub fn is_quantifier(&self) -> bool {
        matches!(self, Self::Some | Self::None | Self::Every)
    }
}

impl Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//--------------------------------------       Fields        ---------------------------------------------------------

/// The order fields a link may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderField {
    OrderId,
    OrderName,
    Email,
    FirstName,
    LastName,
    StreetAddress1,
    StreetAddress2,
    City,
    State,
    Zip,
    Country,
    Phone,
    Currency,
    TotalPrice,
    Note,
    Status,
    LineItems,
}

/// The line item fields reachable through the `some`, `none` and `every` quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineItemField {
    Name,
    ProductId,
    VariantId,
    Quantity,
    Price,
    Sku,
}

//--------------------------------------       Filters       ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: OrderField,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(field: OrderField, kind: FilterKind, value: Value) -> Self {
        Self { field, kind, value }
    }

    pub fn compile(&self) -> Result<Condition, FilterError> {
        match (self.field, self.kind.is_quantifier()) {
            (OrderField::LineItems, false) => Err(FilterError::ScalarOnLineItems { kind: self.kind }),
            (OrderField::LineItems, true) => Condition::compile_quantifier(self.kind, &self.value),
            (_, true) => Err(FilterError::QuantifierOnScalar { kind: self.kind }),
            (_, false) => Condition::compile(self.kind, &self.value),
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        self.compile().map(|_| ())
    }
}

/// The inner filter of a `some` / `none` / `every` quantifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemFilter {
    pub field: LineItemField,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default)]
    pub value: Value,
}

//--------------------------------------     Conditions      ---------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Condition {
    Equals(Value),
    Not(Box<Condition>),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Contains(String),
    NotContains(String),
    StartsWith(String),
    EndsWith(String),
    /// `null` tests for absence.
    Is(Value),
    Matches(Regex),
    NotMatches(Regex),
    Some(LineItemField, Box<Condition>),
    None(LineItemField, Box<Condition>),
    Every(LineItemField, Box<Condition>),
}

impl Condition {
    /// Compiles a scalar comparison. `not` wraps another scalar comparison given as `{ "type": .., "value": .. }`.
    pub fn compile(kind: FilterKind, value: &Value) -> Result<Self, FilterError> {
        let condition = match kind {
            FilterKind::Equals => Self::Equals(scalar(kind, value)?),
            FilterKind::Is => Self::Is(scalar(kind, value)?),
            FilterKind::In => Self::In(array(kind, value)?),
            FilterKind::NotIn => Self::NotIn(array(kind, value)?),
            FilterKind::Contains => Self::Contains(lowercase_text(kind, value)?),
            FilterKind::NotContains => Self::NotContains(lowercase_text(kind, value)?),
            FilterKind::StartsWith => Self::StartsWith(lowercase_text(kind, value)?),
            FilterKind::EndsWith => Self::EndsWith(lowercase_text(kind, value)?),
            FilterKind::Matches => Self::Matches(regex(kind, value)?),
            FilterKind::NotMatches => Self::NotMatches(regex(kind, value)?),
            FilterKind::Not => {
                let inner: InnerCondition = serde_json::from_value(value.clone()).map_err(|e| {
                    FilterError::InvalidValue { kind, expected: "an inner {type, value} condition", got: e.to_string() }
                })?;
                if inner.kind.is_quantifier() {
                    return Err(FilterError::QuantifierOnScalar { kind: inner.kind });
                }
                Self::Not(Box::new(Self::compile(inner.kind, &inner.value)?))
            },
            FilterKind::Some | FilterKind::None | FilterKind::Every => {
                return Err(FilterError::QuantifierOnScalar { kind });
            },
        };
        Ok(condition)
    }

    fn compile_quantifier(kind: FilterKind, value: &Value) -> Result<Self, FilterError> {
        let inner: LineItemFilter = serde_json::from_value(value.clone()).map_err(|e| FilterError::InvalidValue {
            kind,
            expected: "a line item filter {field, type, value}",
            got: e.to_string(),
        })?;
        if inner.kind.is_quantifier() {
            return Err(FilterError::QuantifierOnScalar { kind: inner.kind });
        }
        let condition = Box::new(Self::compile(inner.kind, &inner.value)?);
        match kind {
            FilterKind::Some => Ok(Self::Some(inner.field, condition)),
            FilterKind::None => Ok(Self::None(inner.field, condition)),
            FilterKind::Every => Ok(Self::Every(inner.field, condition)),
            _ => Err(FilterError::ScalarOnLineItems { kind }),
        }
    }
}

#[derive(Deserialize)]
struct InnerCondition {
    #[serde(rename = "type")]
    kind: FilterKind,
    #[serde(default)]
    value: Value,
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(n) => format!("the number {n}"),
        Value::String(s) => format!("the string '{s}'"),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

fn scalar(kind: FilterKind, value: &Value) -> Result<Value, FilterError> {
    match value {
        Value::Array(_) | Value::Object(_) => {
            Err(FilterError::InvalidValue { kind, expected: "a string, number or null", got: describe(value) })
        },
        v => Ok(v.clone()),
    }
}

fn array(kind: FilterKind, value: &Value) -> Result<Vec<Value>, FilterError> {
    let items = value
        .as_array()
        .ok_or_else(|| FilterError::InvalidValue { kind, expected: "an array", got: describe(value) })?;
    items.iter().map(|v| scalar(kind, v)).collect()
}

fn lowercase_text(kind: FilterKind, value: &Value) -> Result<String, FilterError> {
    match value {
        Value::String(s) => Ok(s.to_lowercase()),
        Value::Number(n) => Ok(n.to_string()),
        v => Err(FilterError::InvalidValue { kind, expected: "a string", got: describe(v) }),
    }
}

fn regex(kind: FilterKind, value: &Value) -> Result<Regex, FilterError> {
    let pattern = value
        .as_str()
        .ok_or_else(|| FilterError::InvalidValue { kind, expected: "a regular expression", got: describe(value) })?;
    Regex::new(pattern).map_err(|e| FilterError::InvalidRegex(e.to_string()))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn filters_use_the_wire_vocabulary() {
        let json = r#"{"field":"lineItems","type":"some","value":{"field":"sku","type":"startsWith","value":"AC-"}}"#;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.field, OrderField::LineItems);
        assert_eq!(filter.kind, FilterKind::Some);
        assert!(filter.validate().is_ok());
        let json = r#"{"field":"email","type":"not_matches","value":"@test$"}"#;
        let filter: Filter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.kind, FilterKind::NotMatches);
        assert_eq!(serde_json::to_value(&filter).unwrap()["type"], "not_matches");
        let filter: Filter = serde_json::from_str(r#"{"field":"totalPrice","type":"notIn","value":[1, 2]}"#).unwrap();
        assert_eq!(filter.kind, FilterKind::NotIn);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<Filter>(r#"{"field":"customer.name","type":"equals","value":"x"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<Filter>(r#"{"field":"email","type":"like","value":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn quantifiers_only_apply_to_line_items() {
        let inner = json!({"field": "sku", "type": "is", "value": null});
        let filter = Filter::new(OrderField::Email, FilterKind::Some, inner);
        assert_eq!(filter.validate(), Err(FilterError::QuantifierOnScalar { kind: FilterKind::Some }));
        let filter = Filter::new(OrderField::LineItems, FilterKind::Equals, json!("x"));
        assert_eq!(filter.validate(), Err(FilterError::ScalarOnLineItems { kind: FilterKind::Equals }));
        let nested = json!({"field": "sku", "type": "every", "value": {"field": "sku", "type": "is", "value": null}});
        let filter = Filter::new(OrderField::LineItems, FilterKind::Some, nested);
        assert_eq!(filter.validate(), Err(FilterError::QuantifierOnScalar { kind: FilterKind::Every }));
    }

    #[test]
    fn values_must_fit_the_filter_type() {
        let filter = Filter::new(OrderField::Country, FilterKind::In, json!("US"));
        assert!(matches!(filter.validate(), Err(FilterError::InvalidValue { kind: FilterKind::In, .. })));
        let filter = Filter::new(OrderField::Email, FilterKind::Matches, json!("(unclosed"));
        assert!(matches!(filter.validate(), Err(FilterError::InvalidRegex(_))));
        let filter = Filter::new(OrderField::Email, FilterKind::Not, json!({"type": "contains", "value": "spam"}));
        assert!(filter.validate().is_ok());
        let filter = Filter::new(OrderField::Email, FilterKind::Not, json!("spam"));
        assert!(matches!(filter.validate(), Err(FilterError::InvalidValue { kind: FilterKind::Not, .. })));
    }
}
