//! HMAC helpers shared by the adapters.
//!
//! * Webhook bodies are signed with base64-encoded HMAC-SHA256 (Shopify `X-Shopify-Hmac-SHA256`, WooCommerce
//!   `X-WC-Webhook-Signature`).
//! * Shopify OAuth callbacks carry a hex HMAC-SHA256 over the sorted query string, minus `hmac` itself.
//! * The OAuth `state` parameter is `{nonce}.{timestamp}.{hex hmac}` signed with `OSP_OAUTH_STATE_SECRET`.
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use log::*;
use rand::RngCore;
use sha2::Sha256;

use crate::AdapterError;

type HmacSha256 = Hmac<Sha256>;

/// OAuth flows that take longer than this are rejected.
pub const STATE_MAX_AGE_SECS: u64 = 3600;

fn mac_bytes(secret: &str, data: &[u8]) -> Result<Vec<u8>, AdapterError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AdapterError::Configuration(format!("Invalid HMAC key. {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn verify_mac(secret: &str, data: &[u8], expected: &[u8]) -> bool {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(data);
            mac.verify_slice(expected).is_ok()
        },
        Err(_) => false,
    }
}

pub fn calculate_body_hmac(secret: &str, body: &[u8]) -> Result<String, AdapterError> {
    mac_bytes(secret, body).map(base64::encode)
}

/// Checks a base64 body signature. An empty secret never validates.
pub fn verify_body_hmac(secret: &str, body: &[u8], signature: Option<&str>) -> Result<(), AdapterError> {
    let signature = signature.ok_or_else(|| AdapterError::InvalidSignature("Missing webhook signature header".into()))?;
    if secret.is_empty() {
        warn!("🔐️ No webhook secret is configured. Rejecting the delivery.");
        return Err(AdapterError::InvalidSignature("No webhook secret configured".into()));
    }
    let expected = base64::decode(signature.trim())
        .map_err(|_| AdapterError::InvalidSignature("Webhook signature is not valid base64".into()))?;
    if verify_mac(secret, body, &expected) {
        trace!("🔐️ Webhook signature ✅️");
        Ok(())
    } else {
        warn!("🔐️ Invalid webhook signature. Denying the delivery.");
        Err(AdapterError::InvalidSignature("Webhook signature does not match".into()))
    }
}

/// Compares a shared token echoed back by the platform. An empty expected token never validates.
pub fn verify_shared_token(expected: &str, provided: Option<&str>) -> Result<(), AdapterError> {
    let provided = provided.ok_or_else(|| AdapterError::InvalidSignature("Missing webhook signature header".into()))?;
    if expected.is_empty() {
        warn!("🔐️ No webhook token is configured. Rejecting the delivery.");
        return Err(AdapterError::InvalidSignature("No webhook token configured".into()));
    }
    // constant-time comparison
    if verify_mac(expected, provided.as_bytes(), &mac_bytes(expected, expected.as_bytes())?) {
        Ok(())
    } else {
        warn!("🔐️ Invalid webhook token. Denying the delivery.");
        Err(AdapterError::InvalidSignature("Webhook token does not match".into()))
    }
}

/// Builds the message Shopify signs for OAuth redirects: `key=value` pairs sorted by key and joined with `&`.
pub fn oauth_query_message(params: &[(&str, &str)]) -> String {
    let mut pairs = params.iter().filter(|(k, _)| *k != "hmac" && *k != "signature").collect::<Vec<_>>();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

pub fn calculate_query_hmac(secret: &str, params: &[(&str, &str)]) -> Result<String, AdapterError> {
    mac_bytes(secret, oauth_query_message(params).as_bytes()).map(hex::encode)
}

pub fn verify_query_hmac(secret: &str, params: &[(&str, &str)], hmac: &str) -> Result<(), AdapterError> {
    let expected =
        hex::decode(hmac).map_err(|_| AdapterError::InvalidSignature("OAuth hmac is not valid hex".into()))?;
    if !secret.is_empty() && verify_mac(secret, oauth_query_message(params).as_bytes(), &expected) {
        Ok(())
    } else {
        warn!("🔐️ OAuth callback hmac does not match. Refusing to exchange the code.");
        Err(AdapterError::InvalidSignature("OAuth hmac does not match".into()))
    }
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}

/// Issues a fresh signed `state` value for an OAuth authorize redirect.
pub fn issue_state(secret: &str) -> Result<String, AdapterError> {
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);
    let payload = format!("{}.{}", hex::encode(nonce), now_secs());
    let sig = hex::encode(mac_bytes(secret, payload.as_bytes())?);
    Ok(format!("{payload}.{sig}"))
}

/// Validates a `state` value previously returned by [`issue_state`].
pub fn verify_state(secret: &str, state: Option<&str>) -> Result<(), AdapterError> {
    let state = state.ok_or_else(|| AdapterError::InvalidSignature("Missing OAuth state".into()))?;
    let (payload, sig) =
        state.rsplit_once('.').ok_or_else(|| AdapterError::InvalidSignature("Malformed OAuth state".into()))?;
    let expected = hex::decode(sig).map_err(|_| AdapterError::InvalidSignature("Malformed OAuth state".into()))?;
    if secret.is_empty() || !verify_mac(secret, payload.as_bytes(), &expected) {
        warn!("🔐️ OAuth state signature is invalid");
        return Err(AdapterError::InvalidSignature("OAuth state signature does not match".into()));
    }
    let issued = payload
        .rsplit_once('.')
        .and_then(|(_, ts)| ts.parse::<u64>().ok())
        .ok_or_else(|| AdapterError::InvalidSignature("Malformed OAuth state".into()))?;
    if now_secs().saturating_sub(issued) > STATE_MAX_AGE_SECS {
        return Err(AdapterError::InvalidSignature("OAuth state has expired".into()));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn body_hmac() {
        let sig = calculate_body_hmac("secret", br#"{"id":1}"#).unwrap();
        assert!(verify_body_hmac("secret", br#"{"id":1}"#, Some(&sig)).is_ok());
        assert!(verify_body_hmac("secret", br#"{"id":2}"#, Some(&sig)).is_err());
        assert!(verify_body_hmac("other", br#"{"id":1}"#, Some(&sig)).is_err());
        assert!(matches!(verify_body_hmac("secret", b"", None), Err(AdapterError::InvalidSignature(_))));
        assert!(verify_body_hmac("", br#"{"id":1}"#, Some(&sig)).is_err());
    }

    #[test]
    fn shared_tokens() {
        assert!(verify_shared_token("tok", Some("tok")).is_ok());
        assert!(verify_shared_token("tok", Some("tok2")).is_err());
        assert!(verify_shared_token("tok", None).is_err());
        assert!(verify_shared_token("", Some("")).is_err());
    }

    #[test]
    fn query_message_is_sorted_and_skips_hmac() {
        let params = [("timestamp", "1337178173"), ("shop", "a.myshopify.com"), ("hmac", "xx"), ("code", "0907a61c")];
        assert_eq!(oauth_query_message(&params), "code=0907a61c&shop=a.myshopify.com&timestamp=1337178173");
    }

    #[test]
    fn query_hmac() {
        let params = [("code", "abc"), ("shop", "a.myshopify.com"), ("timestamp", "1")];
        let hmac = calculate_query_hmac("hush", &params).unwrap();
        assert!(verify_query_hmac("hush", &params, &hmac).is_ok());
        assert!(verify_query_hmac("hush", &params[..2], &hmac).is_err());
        assert!(verify_query_hmac("hush", &params, "not-hex").is_err());
    }

    #[test]
    fn state_round_trip() {
        let state = issue_state("s3cret").unwrap();
        assert!(verify_state("s3cret", Some(&state)).is_ok());
        assert!(verify_state("different", Some(&state)).is_err());
        assert!(verify_state("s3cret", None).is_err());
        assert!(verify_state("s3cret", Some("garbage")).is_err());
        let old = format!("abcd.{}", now_secs() - STATE_MAX_AGE_SECS - 10);
        let sig = hex::encode(mac_bytes("s3cret", old.as_bytes()).unwrap());
        let expired = format!("{old}.{sig}");
        let err = verify_state("s3cret", Some(&expired)).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidSignature(m) if m.contains("expired")));
    }
}
