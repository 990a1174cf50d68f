use std::{env, path::PathBuf, sync::Arc};

use log::*;
use platform_tools::AdapterConfig;

const DEFAULT_OSP_HOST: &str = "127.0.0.1";
const DEFAULT_OSP_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// A JSON file of shops, channels, links and matches to load into the in-memory store at start-up.
    pub seed_file: Option<PathBuf>,
    /// App credentials and HTTP settings shared by every platform adapter.
    pub adapters: Arc<AdapterConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OSP_HOST.to_string(),
            port: DEFAULT_OSP_PORT,
            seed_file: None,
            adapters: Arc::new(AdapterConfig::default()),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OSP_HOST").ok().unwrap_or_else(|| DEFAULT_OSP_HOST.into());
        let port = env::var("OSP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for OSP_PORT. {e} Using the default, {DEFAULT_OSP_PORT}, instead."
                    );
                    DEFAULT_OSP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_OSP_PORT);
        let seed_file = env::var("OSP_SEED_FILE").ok().filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        if seed_file.is_none() {
            info!("🪛️ OSP_SEED_FILE is not set. The server will start with an empty store.");
        }
        let adapters = Arc::new(AdapterConfig::new_from_env_or_default());
        Self { host, port, seed_file, adapters }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new("0.0.0.0", 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.seed_file.is_none());
        assert_eq!(config.adapters.frontend_url, "http://localhost:3000");
    }
}
