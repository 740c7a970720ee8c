//! Custom Test Assertions
//!
//! Assertion helpers for ledger invariants with messages that name the
//! offending user and values.

use core_kernel::Points;
use domain_point::{replay, BalanceRecord, HistoryEntry, TransactionKind, MAX_BALANCE};

/// Asserts that a record satisfies `0 <= balance <= MAX_BALANCE`
pub fn assert_within_bounds(record: &BalanceRecord) {
    assert!(
        !record.balance().is_negative() && record.balance() <= MAX_BALANCE,
        "Balance of {} out of bounds: {}",
        record.user_id(),
        record.balance()
    );
}

/// Asserts that replaying `entries` from zero yields the record's balance
///
/// # Panics
///
/// Panics if the replayed total differs or the replay overflows
pub fn assert_replay_matches(record: &BalanceRecord, entries: &[HistoryEntry]) {
    let replayed = replay(entries).expect("history replay overflowed");
    assert_eq!(
        replayed,
        record.balance(),
        "Replaying {} entries for {} gives {}, stored balance is {}",
        entries.len(),
        record.user_id(),
        replayed,
        record.balance()
    );
}

/// Asserts that entries are in strictly increasing sequence order
pub fn assert_sequence_ordered(entries: &[HistoryEntry]) {
    for pair in entries.windows(2) {
        assert!(
            pair[0].sequence_id < pair[1].sequence_id,
            "History out of order: {} followed by {}",
            pair[0].sequence_id,
            pair[1].sequence_id
        );
    }
}

/// Asserts the number of entries of a given kind
pub fn assert_kind_count(entries: &[HistoryEntry], kind: TransactionKind, expected: usize) {
    let actual = entries.iter().filter(|e| e.kind == kind).count();
    assert_eq!(
        actual, expected,
        "Expected {} {:?} entries, found {}",
        expected, kind, actual
    );
}

/// Asserts every entry carries a positive amount
pub fn assert_amounts_positive(entries: &[HistoryEntry]) {
    for entry in entries {
        assert!(
            entry.amount > Points::ZERO,
            "Entry {} has non-positive amount {}",
            entry.sequence_id,
            entry.amount
        );
    }
}
