//! Transaction history entries
//!
//! History is append-only. Replaying a user's entries in sequence order
//! from zero reproduces that user's current balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Points, PointsError, SequenceId, UserId};

/// Kind of a committed balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Balance increased
    #[serde(rename = "CHARGE")]
    Charge,
    /// Balance decreased
    #[serde(rename = "USE")]
    Debit,
}

impl TransactionKind {
    /// Returns the signed effect of `amount` on a balance
    pub fn signed(&self, amount: Points) -> Points {
        match self {
            TransactionKind::Charge => amount,
            TransactionKind::Debit => Points::new(-amount.value()),
        }
    }
}

/// One committed charge or debit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Globally unique, increasing sequence number
    pub sequence_id: SequenceId,
    pub user_id: UserId,
    /// Always positive
    pub amount: Points,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        sequence_id: SequenceId,
        user_id: UserId,
        amount: Points,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence_id,
            user_id,
            amount,
            kind,
            occurred_at,
        }
    }
}

/// Replays entries in the given order starting from a zero balance
///
/// # Errors
///
/// Returns `PointsError::Overflow` if the running total leaves the `i64` range.
pub fn replay<'a, I>(entries: I) -> Result<Points, PointsError>
where
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    entries
        .into_iter()
        .try_fold(Points::ZERO, |balance, entry| {
            balance.checked_add(entry.kind.signed(entry.amount))
        })
}
