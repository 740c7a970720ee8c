//! API configuration

use std::time::Duration;

use serde::Deserialize;

use domain_point::EngineConfig;
use infra_store::StoreConfig;

/// API configuration
///
/// Every field has a default, so an empty environment yields a working
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Upper bound on waiting for a user's serialization scope;
    /// unset waits indefinitely
    pub lock_timeout_ms: Option<u64>,
    /// Simulated latency of every store access
    pub store_latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            lock_timeout_ms: None,
            store_latency_ms: 0,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `POINT_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("POINT").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            lock_timeout: self.lock_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig::new().latency(Duration::from_millis(self.store_latency_ms))
    }
}
