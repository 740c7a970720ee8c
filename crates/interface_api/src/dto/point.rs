//! Point DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Points, SequenceId, UserId};
use domain_point::{BalanceRecord, HistoryEntry, TransactionKind};

/// Body of a charge or use request
///
/// Negative amounts are refused here; zero passes through so the ledger
/// reports it as an invalid amount.
#[derive(Debug, Deserialize, Validate)]
pub struct PointAmountRequest {
    #[validate(range(min = 0))]
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointResponse {
    pub id: UserId,
    pub point: Points,
    pub updated_at: DateTime<Utc>,
}

impl From<BalanceRecord> for PointResponse {
    fn from(record: BalanceRecord) -> Self {
        Self {
            id: record.user_id(),
            point: record.balance(),
            updated_at: record.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub id: SequenceId,
    pub user_id: UserId,
    pub amount: Points,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.sequence_id,
            user_id: entry.user_id,
            amount: entry.amount,
            kind: entry.kind,
            occurred_at: entry.occurred_at,
        }
    }
}
