//! Point Domain - Per-User Balances and Append-Only History
//!
//! This crate implements the concurrency-safe balance-update engine for a
//! per-user point ledger.
//!
//! # Components
//!
//! - **BalanceRecord**: immutable snapshot of a user's balance, with the
//!   charge/debit transition rules
//! - **HistoryEntry**: immutable record of one committed charge or debit
//! - **BalanceStore / HistoryStore**: store ports implemented by adapters
//! - **LedgerEngine**: serializes charge/debit per user and keeps both
//!   stores in step
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_point::{LedgerEngine, EngineConfig};
//!
//! let engine = LedgerEngine::new(balances, history, EngineConfig::default());
//!
//! let record = engine.charge(UserId::new(1), Points::new(1_000)).await?;
//! assert_eq!(record.balance(), Points::new(1_000));
//! ```

pub mod balance;
pub mod history;
pub mod ports;
pub mod lock;
pub mod engine;
pub mod error;

pub use balance::{BalanceRecord, MAX_BALANCE};
pub use history::{HistoryEntry, TransactionKind, replay};
pub use ports::{BalanceStore, HistoryStore};
pub use lock::{UserLockTable, UserGuard};
pub use engine::{LedgerEngine, EngineConfig, Reconciliation};
pub use error::PointError;
