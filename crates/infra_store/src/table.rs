//! Shared access gate for the in-memory tables
//!
//! Every table operation passes through a [`TableGate`], which applies the
//! configured latency and refuses access while the table is offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use core_kernel::{AdapterHealth, HealthCheckResult};

use crate::config::StoreConfig;
use crate::error::StoreError;

#[derive(Debug)]
pub struct TableGate {
    name: &'static str,
    config: StoreConfig,
    online: AtomicBool,
}

impl TableGate {
    pub fn new(name: &'static str, config: StoreConfig) -> Self {
        Self {
            name,
            config,
            online: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Waits out the configured latency, then checks availability
    pub async fn enter(&self) -> Result<(), StoreError> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if self.is_online() {
            Ok(())
        } else {
            Err(StoreError::Offline(self.name))
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    pub async fn health(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.enter().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let adapter_id = format!("memory-{}", self.name);
        match result {
            Ok(()) => HealthCheckResult::healthy(adapter_id, latency_ms),
            Err(e) => HealthCheckResult {
                adapter_id,
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(e.to_string()),
                checked_at: Utc::now(),
            },
        }
    }
}
