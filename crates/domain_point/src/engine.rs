//! Ledger engine
//!
//! The engine is the only writer of the balance and history stores. Charge
//! and debit run a read-validate-write-append sequence inside the user's
//! serialization scope, so operations on one user are strictly serializable
//! while operations on different users proceed concurrently.
//!
//! The locked section runs as its own task. A caller that stops waiting
//! (a dropped HTTP request, an outer timeout) does not cut it short, so a
//! balance write is never left without its history entry.
//!
//! Reads go straight to the stores without taking the user's scope. An
//! observer reading both stores concurrently may briefly see a new balance
//! before its history entry, since the balance is written first.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn, Instrument, Span};

use core_kernel::{Points, PortError, UserId};

use crate::balance::BalanceRecord;
use crate::error::PointError;
use crate::history::{replay, HistoryEntry, TransactionKind};
use crate::lock::{UserGuard, UserLockTable};
use crate::ports::{BalanceStore, HistoryStore};

/// Engine tuning
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Upper bound on waiting for a user's serialization scope.
    /// `None` waits until the scope is acquired.
    pub lock_timeout: Option<Duration>,
}

impl EngineConfig {
    /// Sets a bounded wait for acquiring a user's scope
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

/// Outcome of replaying a user's history against their stored balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub user_id: UserId,
    /// Balance held in the balance store
    pub recorded: Points,
    /// Balance obtained by replaying history from zero
    pub replayed: Points,
    /// Number of history entries replayed
    pub entries: usize,
}

impl Reconciliation {
    pub fn is_consistent(&self) -> bool {
        self.recorded == self.replayed
    }
}

/// Serializes charges and debits per user against the two stores
///
/// # Invariants
///
/// - Two calls for the same user never run their read-modify-write
///   sequences concurrently
/// - A failed call leaves both stores as they were before it
/// - Every committed call appears exactly once in both stores, even when
///   its caller gave up before it finished
pub struct LedgerEngine {
    core: Arc<EngineCore>,
}

struct EngineCore {
    balances: Arc<dyn BalanceStore>,
    history: Arc<dyn HistoryStore>,
    locks: UserLockTable,
    config: EngineConfig,
}

impl LedgerEngine {
    /// Creates an engine over the given stores
    ///
    /// # Arguments
    ///
    /// * `balances` - Store of latest balance per user
    /// * `history` - Append-only transaction log
    /// * `config` - Engine tuning
    pub fn new(
        balances: Arc<dyn BalanceStore>,
        history: Arc<dyn HistoryStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            core: Arc::new(EngineCore {
                balances,
                history,
                locks: UserLockTable::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.core.config
    }

    /// Adds `amount` to the user's balance
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `LimitExceeded` if the balance would exceed `MAX_BALANCE`
    /// - `Busy` if a lock timeout is configured and expires
    /// - `StoreUnavailable` if a store call fails
    pub async fn charge(&self, user_id: UserId, amount: Points) -> Result<BalanceRecord, PointError> {
        self.commit(user_id, amount, TransactionKind::Charge).await
    }

    /// Subtracts `amount` from the user's balance
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientBalance` if `amount` exceeds the balance
    /// - `Busy` if a lock timeout is configured and expires
    /// - `StoreUnavailable` if a store call fails
    pub async fn debit(&self, user_id: UserId, amount: Points) -> Result<BalanceRecord, PointError> {
        self.commit(user_id, amount, TransactionKind::Debit).await
    }

    /// Current balance; zero for unknown users
    pub async fn get_balance(&self, user_id: UserId) -> Result<BalanceRecord, PointError> {
        Ok(self.core.balances.read(user_id).await?)
    }

    /// Committed history in sequence order; a fresh snapshot on every call
    pub async fn get_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, PointError> {
        Ok(self.core.history.read_all(user_id).await?)
    }

    /// Replays the user's history and compares it with the stored balance
    ///
    /// Runs inside the user's serialization scope so the two reads describe
    /// the same committed state.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn reconcile(&self, user_id: UserId) -> Result<Reconciliation, PointError> {
        let core = &self.core;
        let _guard = core.acquire(user_id).await?;

        let record = core.balances.read(user_id).await?;
        let entries = core.history.read_all(user_id).await?;
        let replayed = replay(&entries)
            .map_err(|e| PortError::internal(format!("history replay failed: {}", e)))?;

        let reconciliation = Reconciliation {
            user_id,
            recorded: record.balance(),
            replayed,
            entries: entries.len(),
        };

        if !reconciliation.is_consistent() {
            warn!(
                recorded = %reconciliation.recorded,
                replayed = %reconciliation.replayed,
                "Balance does not match history"
            );
        }

        Ok(reconciliation)
    }

    /// Number of users with a serialization lock allocated
    pub fn tracked_users(&self) -> usize {
        self.core.locks.len()
    }

    #[instrument(skip_all, fields(user_id = %user_id, amount = %amount, kind = ?kind))]
    async fn commit(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
    ) -> Result<BalanceRecord, PointError> {
        let core = Arc::clone(&self.core);
        let task = tokio::spawn(
            async move {
                let outcome = core.commit_serialized(user_id, amount, kind).await;

                match &outcome {
                    Ok(record) => info!(balance = %record.balance(), "Committed {:?}", kind),
                    Err(e) if e.is_rejection() => warn!(error = %e, "Rejected {:?}", kind),
                    Err(e) => error!(error = %e, "Failed {:?}", kind),
                }

                outcome
            }
            .instrument(Span::current()),
        );

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Commit task did not finish");
                Err(PortError::internal(format!("commit task failed: {}", e)).into())
            }
        }
    }
}

impl EngineCore {
    async fn commit_serialized(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
    ) -> Result<BalanceRecord, PointError> {
        let _guard = self.acquire(user_id).await?;

        let current = self.balances.read(user_id).await?;
        let next = match kind {
            TransactionKind::Charge => current.charge(amount)?,
            TransactionKind::Debit => current.debit(amount)?,
        };

        let written = self.balances.write(user_id, next.balance()).await?;

        if let Err(e) = self
            .history
            .append(user_id, amount, kind, written.updated_at())
            .await
        {
            self.restore(&current).await;
            return Err(e.into());
        }

        Ok(written)
    }

    // Puts back the balance read at the start of a commit whose history
    // append failed. Still runs under the caller's guard.
    async fn restore(&self, previous: &BalanceRecord) {
        if let Err(e) = self
            .balances
            .write(previous.user_id(), previous.balance())
            .await
        {
            error!(
                user_id = %previous.user_id(),
                balance = %previous.balance(),
                error = %e,
                "Could not restore balance after failed history append"
            );
        }
    }

    async fn acquire(&self, user_id: UserId) -> Result<UserGuard, PointError> {
        match self.config.lock_timeout {
            Some(timeout) => self.locks.acquire_within(user_id, timeout).await,
            None => Ok(self.locks.acquire(user_id).await),
        }
    }
}
