//! Point domain errors

use core_kernel::{Points, PortError, UserId};
use thiserror::Error;

/// Errors that can occur in the point domain
///
/// Every variant leaves the ledger exactly as it was before the call.
#[derive(Debug, Error)]
pub enum PointError {
    /// Amount is zero or negative for the requested operation
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        amount: Points,
    },

    /// Charge would push the balance above the ceiling
    #[error("Balance limit exceeded: balance={balance}, amount={amount}, limit={limit}")]
    LimitExceeded {
        balance: Points,
        amount: Points,
        limit: Points,
    },

    /// Debit amount exceeds the current balance
    #[error("Insufficient balance: balance={balance}, amount={amount}")]
    InsufficientBalance {
        balance: Points,
        amount: Points,
    },

    /// The user's serialization scope could not be acquired in time
    #[error("User {user_id} is busy: gave up after {waited_ms}ms")]
    Busy {
        user_id: UserId,
        waited_ms: u64,
    },

    /// The underlying store failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] PortError),
}

impl PointError {
    /// Returns true if the caller can fix the request and try again
    ///
    /// Store failures and lock timeouts are not the caller's fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PointError::InvalidAmount { .. }
                | PointError::LimitExceeded { .. }
                | PointError::InsufficientBalance { .. }
        )
    }
}
