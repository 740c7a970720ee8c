//! Store configuration and construction

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::balance_table::MemoryBalanceStore;
use crate::history_table::MemoryHistoryStore;

/// Configuration options for the in-memory tables
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infra_store::StoreConfig;
///
/// let config = StoreConfig::new().latency(Duration::from_millis(5));
/// assert_eq!(config.latency, Duration::from_millis(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Fixed delay applied before every table access, simulating a slow
    /// backing store
    pub latency: Duration,
}

impl StoreConfig {
    /// Creates a configuration with no simulated latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simulated access latency
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// The pair of tables an engine needs
#[derive(Debug, Clone)]
pub struct MemoryStores {
    pub balances: Arc<MemoryBalanceStore>,
    pub history: Arc<MemoryHistoryStore>,
}

/// Creates an empty balance table and history table sharing one configuration
pub fn create_stores(config: StoreConfig) -> MemoryStores {
    info!(latency_ms = config.latency.as_millis() as u64, "Creating in-memory point tables");

    MemoryStores {
        balances: Arc::new(MemoryBalanceStore::with_config(config.clone())),
        history: Arc::new(MemoryHistoryStore::with_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new().latency(Duration::from_millis(200));
        assert_eq!(config.latency, Duration::from_millis(200));
        assert_eq!(StoreConfig::default().latency, Duration::ZERO);
    }
}
