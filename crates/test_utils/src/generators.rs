//! Property-Based Test Generators
//!
//! Proptest strategies for generating ledger operations.

use core_kernel::Points;
use domain_point::{TransactionKind, MAX_BALANCE};
use proptest::prelude::*;

/// A single charge or debit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerOp {
    pub kind: TransactionKind,
    pub amount: Points,
}

/// Strategy for transaction kinds
pub fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![Just(TransactionKind::Charge), Just(TransactionKind::Debit)]
}

/// Strategy for amounts that include zero, negatives and values past the limit
pub fn amount_strategy() -> impl Strategy<Value = Points> {
    prop_oneof![
        Just(Points::ZERO),
        (-1_000i64..0).prop_map(Points::new),
        (1i64..=MAX_BALANCE.value()).prop_map(Points::new),
        (MAX_BALANCE.value() + 1..MAX_BALANCE.value() * 2).prop_map(Points::new),
    ]
}

/// Strategy for valid-looking positive amounts
pub fn positive_amount_strategy() -> impl Strategy<Value = Points> {
    (1i64..=20_000).prop_map(Points::new)
}

/// Strategy for a single operation
pub fn op_strategy() -> impl Strategy<Value = LedgerOp> {
    (kind_strategy(), amount_strategy()).prop_map(|(kind, amount)| LedgerOp { kind, amount })
}

/// Strategy for a sequence of up to `max_len` operations
pub fn op_sequence_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(op_strategy(), 0..max_len)
}
