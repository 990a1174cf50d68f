use std::{env, time::Duration};

use log::*;
use osp_common::Secret;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_SHOPIFY_API_VERSION: &str = "2024-04";
const DEFAULT_SHOPIFY_SCOPES: &str =
    "read_products,write_products,read_orders,write_orders,write_draft_orders,read_inventory,write_inventory,\
     read_fulfillments,read_assigned_fulfillment_orders";
const DEFAULT_BIGCOMMERCE_API_BASE: &str = "https://api.bigcommerce.com";
const DEFAULT_BIGCOMMERCE_LOGIN_BASE: &str = "https://login.bigcommerce.com";
const DEFAULT_BIGCOMMERCE_SCOPES: &str = "store_v2_orders store_v2_products store_v2_information";
const DEFAULT_WOOCOMMERCE_APP_NAME: &str = "Openship";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_HTTP_MAX_RETRIES: u32 = 2;

/// The client id / secret pair of the Openship app registered with a platform.
#[derive(Debug, Clone, Default)]
pub struct AppCredentials {
    pub app_key: String,
    pub app_secret: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct ShopifyAppConfig {
    pub app: AppCredentials,
    pub api_version: String,
    pub scopes: String,
}

#[derive(Debug, Clone)]
pub struct BigCommerceAppConfig {
    pub app: AppCredentials,
    /// Shared token that BigCommerce echoes back in the `x-openship-signature` header of every webhook delivery.
    pub webhook_token: Secret<String>,
    pub api_base: String,
    pub login_base: String,
    pub scopes: String,
}

#[derive(Debug, Clone)]
pub struct WooCommerceAppConfig {
    pub app_name: String,
    /// Secret used by WooCommerce to sign webhook deliveries (`x-wc-webhook-signature`).
    pub webhook_secret: Secret<String>,
}

/// Everything an adapter needs besides the per-install [`crate::PlatformCredentials`].
///
/// Adapters never read the environment themselves. Build this once at start-up and pass it in.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Public base URL of this deployment. Webhook callback URLs are built from, and stripped of, this prefix.
    pub frontend_url: String,
    pub request_timeout: Duration,
    /// Retries for idempotent GET requests. Mutations are never retried.
    pub max_retries: u32,
    /// Key used to sign the OAuth `state` parameter.
    pub oauth_state_secret: Secret<String>,
    pub shopify: ShopifyAppConfig,
    pub bigcommerce: BigCommerceAppConfig,
    pub woocommerce: WooCommerceAppConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            request_timeout: DEFAULT_HTTP_TIMEOUT,
            max_retries: DEFAULT_HTTP_MAX_RETRIES,
            oauth_state_secret: Secret::default(),
            shopify: ShopifyAppConfig {
                app: AppCredentials::default(),
                api_version: DEFAULT_SHOPIFY_API_VERSION.to_string(),
                scopes: DEFAULT_SHOPIFY_SCOPES.to_string(),
            },
            bigcommerce: BigCommerceAppConfig {
                app: AppCredentials::default(),
                webhook_token: Secret::default(),
                api_base: DEFAULT_BIGCOMMERCE_API_BASE.to_string(),
                login_base: DEFAULT_BIGCOMMERCE_LOGIN_BASE.to_string(),
                scopes: DEFAULT_BIGCOMMERCE_SCOPES.to_string(),
            },
            woocommerce: WooCommerceAppConfig {
                app_name: DEFAULT_WOOCOMMERCE_APP_NAME.to_string(),
                webhook_secret: Secret::default(),
            },
        }
    }
}

impl AdapterConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| {
            warn!("🪛️ FRONTEND_URL not set, using {DEFAULT_FRONTEND_URL}. Webhook callbacks will not reach this host.");
            DEFAULT_FRONTEND_URL.to_string()
        });
        let frontend_url = frontend_url.trim_end_matches('/').to_string();
        let request_timeout = env::var("OSP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for OSP_HTTP_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let max_retries = env::var("OSP_HTTP_MAX_RETRIES")
            .ok()
            .and_then(|s| {
                s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid value for OSP_HTTP_MAX_RETRIES ({s}). {e}")).ok()
            })
            .unwrap_or(DEFAULT_HTTP_MAX_RETRIES);
        let oauth_state_secret = Secret::new(secret_var("OSP_OAUTH_STATE_SECRET"));
        let shopify = ShopifyAppConfig {
            app: AppCredentials {
                app_key: plain_var("SHOPIFY_APP_KEY", ""),
                app_secret: Secret::new(secret_var("SHOPIFY_APP_SECRET")),
            },
            api_version: plain_var("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            scopes: env::var("SHOPIFY_SCOPES").unwrap_or(defaults.shopify.scopes),
        };
        let bigcommerce = BigCommerceAppConfig {
            app: AppCredentials {
                app_key: plain_var("BIGCOMMERCE_CLIENT_ID", ""),
                app_secret: Secret::new(secret_var("BIGCOMMERCE_CLIENT_SECRET")),
            },
            webhook_token: Secret::new(secret_var("BIGCOMMERCE_WEBHOOK_TOKEN")),
            ..defaults.bigcommerce
        };
        let woocommerce = WooCommerceAppConfig {
            app_name: plain_var("WOOCOMMERCE_APP_NAME", DEFAULT_WOOCOMMERCE_APP_NAME),
            webhook_secret: Secret::new(secret_var("WOOCOMMERCE_WEBHOOK_SECRET")),
        };
        Self { frontend_url, request_timeout, max_retries, oauth_state_secret, shopify, bigcommerce, woocommerce }
    }

    /// Builds the absolute callback URL for a webhook handler path such as `/api/handlers/shop/create-order/1`.
    /// Absolute URLs are returned unchanged.
    pub fn callback_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.frontend_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

fn plain_var(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("🪛️ {name} not set, using '{default}' as default");
        default.to_string()
    })
}

fn secret_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("🪛️ {name} not set. Signature checks that depend on it will fail.");
        String::default()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn callback_urls_join_cleanly() {
        let config = AdapterConfig { frontend_url: "https://admin.example.com/".into(), ..Default::default() };
        assert_eq!(
            config.callback_url("/api/handlers/shop/create-order/4"),
            "https://admin.example.com/api/handlers/shop/create-order/4"
        );
        assert_eq!(config.callback_url("http://localhost:8080/hook"), "http://localhost:8080/hook");
    }
}
