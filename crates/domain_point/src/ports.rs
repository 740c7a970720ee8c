//! Point Domain Ports
//!
//! The engine consumes balance and history storage through these two
//! traits. Adapters live outside the domain (`infra_store` for the
//! in-memory tables, `test_utils` for fault-injecting doubles).
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_point::ports::{BalanceStore, HistoryStore};
//! use std::sync::Arc;
//!
//! let balances: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
//! let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new());
//! let engine = LedgerEngine::new(balances, history, EngineConfig::default());
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, Points, PortError, UserId};

use crate::balance::BalanceRecord;
use crate::history::{HistoryEntry, TransactionKind};

/// Key-value store mapping a user to their latest balance record
#[async_trait]
pub trait BalanceStore: DomainPort {
    /// Reads the latest record for `user_id`
    ///
    /// A user with no stored entry yields a zero-balance record stamped
    /// with the current time. A missing key is never an error.
    async fn read(&self, user_id: UserId) -> Result<BalanceRecord, PortError>;

    /// Replaces the stored record for `user_id`
    ///
    /// Returns the written record. Its timestamp is assigned by the store
    /// and is authoritative.
    async fn write(&self, user_id: UserId, balance: Points) -> Result<BalanceRecord, PortError>;
}

/// Append-only store of committed charges and debits
#[async_trait]
pub trait HistoryStore: DomainPort {
    /// Appends an entry, assigning the next global sequence id
    async fn append(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, PortError>;

    /// Returns every entry for `user_id` ordered by sequence id ascending
    async fn read_all(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, PortError>;
}
