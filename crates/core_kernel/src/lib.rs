//! Core Kernel - Foundational types for the point ledger
//!
//! This crate provides the building blocks shared by every layer:
//! - Strongly-typed user and sequence identifiers
//! - The `Points` value type with checked arithmetic
//! - Port error and health-check contracts for store adapters

pub mod identifiers;
pub mod points;
pub mod ports;

pub use identifiers::{UserId, SequenceId, IdParseError};
pub use points::{Points, PointsError};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
