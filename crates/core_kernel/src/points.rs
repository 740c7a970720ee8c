//! Point amounts with checked integer arithmetic
//!
//! Balances and transaction amounts are whole points. All arithmetic is
//! checked so that an overflow surfaces as an error instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during point arithmetic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointsError {
    #[error("Overflow during calculation")]
    Overflow,
}

/// A whole number of points
///
/// The wrapper is signed so that caller contract violations (negative
/// amounts) can be represented and rejected instead of being unrepresentable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(i64);

impl Points {
    /// Zero points
    pub const ZERO: Points = Points(0);

    /// Creates a new point amount
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, failing on overflow
    pub fn checked_add(&self, other: Points) -> Result<Points, PointsError> {
        self.0
            .checked_add(other.0)
            .map(Points)
            .ok_or(PointsError::Overflow)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
