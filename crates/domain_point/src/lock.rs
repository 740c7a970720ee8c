//! Per-user serialization
//!
//! Each user id maps to its own async mutex, created on first use and kept
//! for the lifetime of the table. Holding a [`UserGuard`] grants exclusive
//! access to that user's read-modify-write sequence; guards for different
//! users never contend with each other.
//!
//! `tokio::sync::Mutex` queues waiters in FIFO order, so an operation that
//! starts waiting first is also the first to be admitted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use core_kernel::UserId;
use crate::error::PointError;

/// Table of lazily-created per-user locks
#[derive(Debug, Default)]
pub struct UserLockTable {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Exclusive serialization scope for one user
///
/// Released when dropped, on every exit path.
#[derive(Debug)]
pub struct UserGuard {
    user_id: UserId,
    _guard: OwnedMutexGuard<()>,
}

impl UserGuard {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl UserLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the scope for `user_id` is free and takes it
    pub async fn acquire(&self, user_id: UserId) -> UserGuard {
        let slot = self.slot(user_id);
        UserGuard {
            user_id,
            _guard: slot.lock_owned().await,
        }
    }

    /// Like [`acquire`](Self::acquire), but gives up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `PointError::Busy` if the scope was not free in time.
    pub async fn acquire_within(
        &self,
        user_id: UserId,
        timeout: Duration,
    ) -> Result<UserGuard, PointError> {
        let slot = self.slot(user_id);
        let started = Instant::now();

        match tokio::time::timeout(timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(UserGuard {
                user_id,
                _guard: guard,
            }),
            Err(_) => {
                let waited_ms = started.elapsed().as_millis() as u64;
                debug!(%user_id, waited_ms, "Gave up waiting for user lock");
                Err(PointError::Busy { user_id, waited_ms })
            }
        }
    }

    /// Number of users that have a lock allocated
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    // The map shard guard is dropped at the end of this call, before any await.
    fn slot(&self, user_id: UserId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }
}
