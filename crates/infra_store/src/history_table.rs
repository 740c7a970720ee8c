//! In-memory append-only history table
//!
//! Sequence ids are assigned under the table's write lock, so they are
//! unique across all users and increase in append order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, Points, PortError, SequenceId, UserId};
use domain_point::{HistoryEntry, HistoryStore, TransactionKind};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::table::TableGate;

#[derive(Debug)]
struct HistoryLog {
    entries: Vec<HistoryEntry>,
    next_sequence: SequenceId,
}

/// In-memory implementation of the `HistoryStore` port
#[derive(Debug)]
pub struct MemoryHistoryStore {
    gate: TableGate,
    log: RwLock<HistoryLog>,
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            gate: TableGate::new("point_history", config),
            log: RwLock::new(HistoryLog {
                entries: Vec::new(),
                next_sequence: SequenceId::FIRST,
            }),
        }
    }

    /// Takes the table offline or brings it back
    pub fn set_online(&self, online: bool) {
        self.gate.set_online(online);
    }

    /// Total number of entries across all users
    pub async fn len(&self) -> usize {
        self.log.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.log.read().await.entries.is_empty()
    }
}

impl DomainPort for MemoryHistoryStore {}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    #[instrument(skip(self), fields(table = self.gate.name()))]
    async fn append(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, PortError> {
        self.gate.enter().await?;

        let mut log = self.log.write().await;
        let sequence_id = log.next_sequence;
        if sequence_id.value() == u64::MAX {
            return Err(StoreError::SequenceExhausted(self.gate.name()).into());
        }

        let entry = HistoryEntry::new(sequence_id, user_id, amount, kind, occurred_at);
        log.entries.push(entry.clone());
        log.next_sequence = sequence_id.next();

        debug!(sequence_id = %sequence_id, "Appended history entry");
        Ok(entry)
    }

    #[instrument(skip(self), fields(table = self.gate.name()))]
    async fn read_all(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, PortError> {
        self.gate.enter().await?;

        let log = self.log.read().await;
        Ok(log
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthCheckable for MemoryHistoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.gate.health().await
    }
}
