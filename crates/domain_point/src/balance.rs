//! Balance records and the charge/debit transition rules
//!
//! A `BalanceRecord` is never mutated. Every successful transition produces
//! a new record that replaces the previous one in the balance store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Points, UserId};
use crate::error::PointError;

/// Ceiling for any user's balance
pub const MAX_BALANCE: Points = Points::new(100_000);

/// Snapshot of a user's point balance at a point in time
///
/// # Invariants
///
/// - `0 <= balance <= MAX_BALANCE` for every record produced by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    user_id: UserId,
    balance: Points,
    updated_at: DateTime<Utc>,
}

impl BalanceRecord {
    /// Creates a record from stored values
    pub fn new(user_id: UserId, balance: Points, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            balance,
            updated_at,
        }
    }

    /// Creates the zero-balance record used for users with no stored entry
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, Points::ZERO, Utc::now())
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn balance(&self) -> Points {
        self.balance
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Computes the record that results from charging `amount`
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `LimitExceeded` if the result would exceed `MAX_BALANCE`
    pub fn charge(&self, amount: Points) -> Result<BalanceRecord, PointError> {
        if !amount.is_positive() {
            return Err(PointError::InvalidAmount { amount });
        }

        let limit_exceeded = || PointError::LimitExceeded {
            balance: self.balance,
            amount,
            limit: MAX_BALANCE,
        };

        let next = self.balance.checked_add(amount).map_err(|_| limit_exceeded())?;
        if next > MAX_BALANCE {
            return Err(limit_exceeded());
        }

        Ok(self.transition(next))
    }

    /// Computes the record that results from debiting `amount`
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientBalance` if `amount` exceeds the current balance
    pub fn debit(&self, amount: Points) -> Result<BalanceRecord, PointError> {
        if !amount.is_positive() {
            return Err(PointError::InvalidAmount { amount });
        }

        if amount > self.balance {
            return Err(PointError::InsufficientBalance {
                balance: self.balance,
                amount,
            });
        }

        // 0 < amount <= balance
        Ok(self.transition(Points::new(self.balance.value() - amount.value())))
    }

    fn transition(&self, balance: Points) -> BalanceRecord {
        BalanceRecord::new(self.user_id, balance, Utc::now())
    }
}
