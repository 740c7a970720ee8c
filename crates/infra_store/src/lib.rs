//! Infrastructure Storage Layer
//!
//! This crate provides the storage adapters consumed by the point ledger
//! engine: an in-memory balance table and an in-memory append-only history
//! table, both implementing the `domain_point` store ports.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{create_stores, StoreConfig};
//!
//! let stores = create_stores(StoreConfig::default());
//! let engine = LedgerEngine::new(stores.balances, stores.history, EngineConfig::default());
//! ```

pub mod config;
pub mod error;
pub mod table;
pub mod balance_table;
pub mod history_table;

pub use config::{StoreConfig, MemoryStores, create_stores};
pub use error::StoreError;
pub use balance_table::MemoryBalanceStore;
pub use history_table::MemoryHistoryStore;
