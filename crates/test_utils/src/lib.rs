//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! point ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built ids, amounts and timestamps
//! - `builders`: Builder for history entries
//! - `doubles`: Fault-injecting wrappers around the store ports
//! - `assertions`: Ledger invariant assertions
//! - `generators`: Property-based operation generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
