//! In-memory balance table
//!
//! Holds the latest `BalanceRecord` per user. Writes replace the previous
//! record wholesale and stamp it with the write time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, Points, PortError, UserId};
use domain_point::{BalanceRecord, BalanceStore};

use crate::config::StoreConfig;
use crate::table::TableGate;

/// In-memory implementation of the `BalanceStore` port
#[derive(Debug)]
pub struct MemoryBalanceStore {
    gate: TableGate,
    records: RwLock<HashMap<UserId, BalanceRecord>>,
}

impl Default for MemoryBalanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            gate: TableGate::new("user_point", config),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Takes the table offline or brings it back
    ///
    /// While offline every operation fails with `PortError::ServiceUnavailable`.
    pub fn set_online(&self, online: bool) {
        self.gate.set_online(online);
    }

    /// Number of users with a stored record
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl DomainPort for MemoryBalanceStore {}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    #[instrument(skip(self), fields(table = self.gate.name()))]
    async fn read(&self, user_id: UserId) -> Result<BalanceRecord, PortError> {
        self.gate.enter().await?;
        debug!("Reading balance");

        let records = self.records.read().await;
        Ok(records
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| BalanceRecord::empty(user_id)))
    }

    #[instrument(skip(self), fields(table = self.gate.name()))]
    async fn write(&self, user_id: UserId, balance: Points) -> Result<BalanceRecord, PortError> {
        self.gate.enter().await?;
        debug!("Writing balance");

        let record = BalanceRecord::new(user_id, balance, Utc::now());
        self.records.write().await.insert(user_id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl HealthCheckable for MemoryBalanceStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.gate.health().await
    }
}
