//! Test Data Builders
//!
//! Builders let tests specify only the fields they care about.

use chrono::{DateTime, Utc};
use core_kernel::{Points, SequenceId, UserId};
use domain_point::{HistoryEntry, TransactionKind};

use crate::fixtures::{PointFixtures, TemporalFixtures, UserFixtures};

/// Builder for history entries, with sequence ids assigned in build order
pub struct HistoryEntryBuilder {
    user_id: UserId,
    next_sequence: SequenceId,
    occurred_at: DateTime<Utc>,
    entries: Vec<HistoryEntry>,
}

impl Default for HistoryEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryEntryBuilder {
    pub fn new() -> Self {
        Self {
            user_id: UserFixtures::primary(),
            next_sequence: SequenceId::FIRST,
            occurred_at: TemporalFixtures::epoch(),
            entries: Vec::new(),
        }
    }

    /// Sets the user for subsequent entries
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn charge(self, amount: i64) -> Self {
        self.push(Points::new(amount), TransactionKind::Charge)
    }

    pub fn debit(self, amount: i64) -> Self {
        self.push(Points::new(amount), TransactionKind::Debit)
    }

    /// Adds a charge of the standard fixture amount
    pub fn standard_charge(self) -> Self {
        self.push(PointFixtures::standard_charge(), TransactionKind::Charge)
    }

    pub fn build(self) -> Vec<HistoryEntry> {
        self.entries
    }

    fn push(mut self, amount: Points, kind: TransactionKind) -> Self {
        self.entries.push(HistoryEntry::new(
            self.next_sequence,
            self.user_id,
            amount,
            kind,
            self.occurred_at,
        ));
        self.next_sequence = self.next_sequence.next();
        self
    }
}
