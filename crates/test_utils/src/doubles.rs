//! Store Doubles
//!
//! Wrappers around real store adapters that count calls and inject
//! failures on demand, for exercising the engine's failure paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_kernel::{DomainPort, Points, PortError, UserId};
use domain_point::{BalanceRecord, BalanceStore, HistoryEntry, HistoryStore, TransactionKind};

/// Balance store wrapper with call counting and failure injection
pub struct FaultyBalanceStore {
    inner: Arc<dyn BalanceStore>,
    fail_reads: AtomicBool,
    /// Number of writes still allowed before writes start failing;
    /// `usize::MAX` means unlimited
    writes_allowed: AtomicUsize,
    writes: AtomicUsize,
}

impl FaultyBalanceStore {
    pub fn new(inner: Arc<dyn BalanceStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            writes_allowed: AtomicUsize::new(usize::MAX),
            writes: AtomicUsize::new(0),
        }
    }

    /// Makes every read fail until switched off
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Allows `n` more successful writes, after which writes fail
    pub fn fail_writes_after(&self, n: usize) {
        self.writes_allowed.store(n, Ordering::SeqCst);
    }

    /// Number of successful writes forwarded to the inner store
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn take_write_permit(&self) -> bool {
        self.writes_allowed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                usize::MAX => Some(usize::MAX),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok()
    }
}

impl DomainPort for FaultyBalanceStore {}

#[async_trait]
impl BalanceStore for FaultyBalanceStore {
    async fn read(&self, user_id: UserId) -> Result<BalanceRecord, PortError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::connection("injected balance read failure"));
        }
        self.inner.read(user_id).await
    }

    async fn write(&self, user_id: UserId, balance: Points) -> Result<BalanceRecord, PortError> {
        if !self.take_write_permit() {
            return Err(PortError::connection("injected balance write failure"));
        }
        let record = self.inner.write(user_id, balance).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }
}

/// History store wrapper with call counting and failure injection
pub struct FaultyHistoryStore {
    inner: Arc<dyn HistoryStore>,
    fail_appends: AtomicBool,
    fail_reads: AtomicBool,
    appends: AtomicUsize,
}

impl FaultyHistoryStore {
    pub fn new(inner: Arc<dyn HistoryStore>) -> Self {
        Self {
            inner,
            fail_appends: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            appends: AtomicUsize::new(0),
        }
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful appends forwarded to the inner store
    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

impl DomainPort for FaultyHistoryStore {}

#[async_trait]
impl HistoryStore for FaultyHistoryStore {
    async fn append(
        &self,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<HistoryEntry, PortError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(PortError::unavailable("injected history append failure"));
        }
        let entry = self.inner.append(user_id, amount, kind, occurred_at).await?;
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(entry)
    }

    async fn read_all(&self, user_id: UserId) -> Result<Vec<HistoryEntry>, PortError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::unavailable("injected history read failure"));
        }
        self.inner.read_all(user_id).await
    }
}
