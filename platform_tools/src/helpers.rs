use serde_json::Value;

/// Vendor ids come as JSON numbers or strings depending on the endpoint. Returns an empty string for anything else.
pub fn json_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::default(),
    }
}

pub fn json_opt_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Prices arrive as strings (`"12.50"`, `"12.5000"`) or numbers (`12.5`). More than two decimals are rounded to cents
/// and missing prices become `"0.00"`.
pub fn json_price(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let long_fraction = s.split_once('.').map(|(_, frac)| frac.len() > 2).unwrap_or(false);
            match s.trim().parse::<f64>() {
                Ok(f) if long_fraction => format!("{f:.2}"),
                _ => s.clone(),
            }
        },
        Value::Number(n) => {
            n.as_f64().map(|f| format!("{f:.2}")).unwrap_or_else(|| n.to_string())
        },
        _ => "0.00".to_string(),
    }
}

pub fn json_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `gid://shopify/ProductVariant/123` → `123`. Plain ids are returned unchanged.
pub fn gid_to_id(gid: &str) -> String {
    gid.rsplit('/').next().unwrap_or(gid).to_string()
}

/// Builds a Shopify global id, leaving values that already are global ids untouched.
pub fn shopify_gid(kind: &str, id: &str) -> String {
    if id.starts_with("gid://") {
        id.to_string()
    } else {
        format!("gid://shopify/{kind}/{id}")
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids() {
        assert_eq!(json_id(&json!(42)), "42");
        assert_eq!(json_id(&json!("42")), "42");
        assert_eq!(json_id(&Value::Null), "");
        assert_eq!(gid_to_id("gid://shopify/Product/8"), "8");
        assert_eq!(gid_to_id("8"), "8");
        assert_eq!(shopify_gid("Order", "9"), "gid://shopify/Order/9");
        assert_eq!(shopify_gid("Order", "gid://shopify/Order/9"), "gid://shopify/Order/9");
    }

    #[test]
    fn prices() {
        assert_eq!(json_price(&json!("19.99")), "19.99");
        assert_eq!(json_price(&json!(12.5)), "12.50");
        assert_eq!(json_price(&json!("225.0000")), "225.00");
        assert_eq!(json_price(&Value::Null), "0.00");
        assert_eq!(json_i64(&json!("7")), Some(7));
    }
}
