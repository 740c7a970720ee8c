//! Ledger engine tests against the in-memory tables
//!
//! These cover the concurrency guarantees of the engine: per-user
//! serialization, cross-user independence, and state preservation on
//! every failure path.

use std::sync::Arc;
use std::time::Duration;

use core_kernel::{Points, UserId};
use domain_point::{BalanceStore, EngineConfig, HistoryStore, LedgerEngine, PointError, TransactionKind};
use infra_store::{create_stores, MemoryStores, StoreConfig};
use test_utils::{
    assert_amounts_positive, assert_kind_count, assert_replay_matches, assert_sequence_ordered,
    assert_within_bounds, FaultyBalanceStore, FaultyHistoryStore, PointFixtures, UserFixtures,
};
use tokio::task::JoinHandle;

fn engine_over(stores: &MemoryStores, config: EngineConfig) -> Arc<LedgerEngine> {
    let balances: Arc<dyn BalanceStore> = stores.balances.clone();
    let history: Arc<dyn HistoryStore> = stores.history.clone();
    Arc::new(LedgerEngine::new(balances, history, config))
}

fn setup(latency: Duration) -> (Arc<LedgerEngine>, MemoryStores) {
    let stores = create_stores(StoreConfig::new().latency(latency));
    (engine_over(&stores, EngineConfig::default()), stores)
}

fn spawn_op(
    engine: &Arc<LedgerEngine>,
    user: UserId,
    kind: TransactionKind,
    amount: Points,
) -> JoinHandle<Result<domain_point::BalanceRecord, PointError>> {
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        match kind {
            TransactionKind::Charge => engine.charge(user, amount).await,
            TransactionKind::Debit => engine.debit(user, amount).await,
        }
    })
}

// ============================================================================
// Single-User Serialization
// ============================================================================

mod serialization_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_charges_all_land() {
        let (engine, _stores) = setup(Duration::from_millis(1));
        let user = UserFixtures::primary();
        let amount = PointFixtures::standard_charge();

        let handles: Vec<_> = (0..10)
            .map(|_| spawn_op(&engine, user, TransactionKind::Charge, amount))
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), Points::new(30_000));

        let history = engine.get_history(user).await.unwrap();
        assert_eq!(history.len(), 10);
        assert_kind_count(&history, TransactionKind::Charge, 10);
        assert_sequence_ordered(&history);
        assert_replay_matches(&record, &history);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_debits_all_land() {
        let (engine, _stores) = setup(Duration::from_millis(1));
        let user = UserFixtures::primary();
        engine.charge(user, PointFixtures::limit()).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| spawn_op(&engine, user, TransactionKind::Debit, Points::new(1_000)))
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), Points::new(90_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_mixed_charges_and_debits_net_to_zero() {
        let (engine, _stores) = setup(Duration::from_millis(1));
        let user = UserFixtures::primary();
        engine.charge(user, PointFixtures::starting_balance()).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    TransactionKind::Debit
                } else {
                    TransactionKind::Charge
                };
                spawn_op(&engine, user, kind, PointFixtures::small())
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), PointFixtures::starting_balance());

        let history = engine.get_history(user).await.unwrap();
        // the initial charge plus ten new entries
        assert_eq!(history.len(), 11);
        assert_kind_count(&history, TransactionKind::Debit, 5);
        assert_replay_matches(&record, &history);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_oversubscribed_debits_never_overdraw() {
        let (engine, _stores) = setup(Duration::from_millis(1));
        let user = UserFixtures::primary();
        engine.charge(user, PointFixtures::starting_balance()).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| spawn_op(&engine, user, TransactionKind::Debit, Points::new(3_000)))
            .collect();

        let mut accepted = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(record) => {
                    assert_within_bounds(&record);
                    accepted += 1;
                }
                Err(PointError::InsufficientBalance { .. }) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(refused, 7);

        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), Points::new(1_000));
        let history = engine.get_history(user).await.unwrap();
        assert_replay_matches(&record, &history);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_oversubscribed_charges_stop_at_limit() {
        let (engine, _stores) = setup(Duration::from_millis(1));
        let user = UserFixtures::primary();

        let handles: Vec<_> = (0..12)
            .map(|_| spawn_op(&engine, user, TransactionKind::Charge, Points::new(10_000)))
            .collect();

        let mut refused = 0;
        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                assert!(matches!(e, PointError::LimitExceeded { .. }));
                refused += 1;
            }
        }

        assert_eq!(refused, 2);
        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), PointFixtures::limit());
    }
}

// ============================================================================
// Validation Failures
// ============================================================================

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_amounts_change_nothing() {
        let (engine, stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();
        engine.charge(user, Points::new(500)).await.unwrap();

        let balance_before = engine.get_balance(user).await.unwrap();
        let history_before = engine.get_history(user).await.unwrap();

        let charge = engine.charge(user, Points::ZERO).await;
        let debit = engine.debit(user, Points::ZERO).await;
        assert!(matches!(charge, Err(PointError::InvalidAmount { .. })));
        assert!(matches!(debit, Err(PointError::InvalidAmount { .. })));

        assert_eq!(engine.get_balance(user).await.unwrap(), balance_before);
        assert_eq!(engine.get_history(user).await.unwrap(), history_before);
        assert_eq!(stores.history.len().await, 1);
    }

    #[tokio::test]
    async fn test_limit_boundary() {
        let (engine, _stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();

        engine.charge(user, Points::new(99_000)).await.unwrap();
        let full = engine.charge(user, Points::new(1_000)).await.unwrap();
        assert_eq!(full.balance(), PointFixtures::limit());

        let over = engine.charge(user, Points::new(1)).await;
        assert!(matches!(over, Err(PointError::LimitExceeded { .. })));
        assert_eq!(engine.get_balance(user).await.unwrap().balance(), PointFixtures::limit());
        assert_eq!(engine.get_history(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_limit_exceeded_from_below() {
        let (engine, _stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();

        engine.charge(user, Points::new(99_000)).await.unwrap();
        let result = engine.charge(user, Points::new(1_001)).await;
        assert!(matches!(result, Err(PointError::LimitExceeded { .. })));
        assert_eq!(engine.get_balance(user).await.unwrap().balance(), Points::new(99_000));
    }

    #[tokio::test]
    async fn test_insufficient_balance_changes_nothing() {
        let (engine, _stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();
        engine.charge(user, Points::new(100)).await.unwrap();

        let result = engine.debit(user, Points::new(101)).await;
        assert!(matches!(result, Err(PointError::InsufficientBalance { .. })));
        assert_eq!(engine.get_balance(user).await.unwrap().balance(), Points::new(100));
        assert_eq!(engine.get_history(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_writes() {
        let stores = create_stores(StoreConfig::new());
        let balances = Arc::new(FaultyBalanceStore::new(stores.balances.clone()));
        let history = Arc::new(FaultyHistoryStore::new(stores.history.clone()));
        let engine = LedgerEngine::new(balances.clone(), history.clone(), EngineConfig::default());

        let _ = engine.debit(UserFixtures::primary(), Points::new(1)).await;
        let _ = engine.charge(UserFixtures::primary(), Points::new(-5)).await;

        assert_eq!(balances.writes(), 0);
        assert_eq!(history.appends(), 0);
    }
}

// ============================================================================
// Reads
// ============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_reads_empty() {
        let (engine, _stores) = setup(Duration::ZERO);

        let record = engine.get_balance(UserFixtures::unknown()).await.unwrap();
        assert!(record.balance().is_zero());
        assert!(engine.get_history(UserFixtures::unknown()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_a_fresh_snapshot() {
        let (engine, _stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();

        engine.charge(user, Points::new(10)).await.unwrap();
        let first = engine.get_history(user).await.unwrap();

        engine.debit(user, Points::new(4)).await.unwrap();
        let second = engine.get_history(user).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], first[0]);
        assert_eq!(second[1].kind, TransactionKind::Debit);
        assert_amounts_positive(&second);
    }

    #[tokio::test]
    async fn test_history_timestamp_matches_balance_write() {
        let (engine, _stores) = setup(Duration::ZERO);
        let user = UserFixtures::primary();

        let record = engine.charge(user, Points::new(10)).await.unwrap();
        let history = engine.get_history(user).await.unwrap();
        assert_eq!(history[0].occurred_at, record.updated_at());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_do_not_wait_for_writers() {
        let (engine, _stores) = setup(Duration::from_millis(20));
        let user = UserFixtures::primary();

        let writers: Vec<_> = (0..5)
            .map(|_| spawn_op(&engine, user, TransactionKind::Charge, Points::new(1)))
            .collect();
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Five serialized writes take ~300ms; a read takes one store latency.
        let read = tokio::time::timeout(Duration::from_millis(150), engine.get_balance(user)).await;
        assert!(read.is_ok());

        for handle in writers {
            handle.await.unwrap().unwrap();
        }
    }
}

// ============================================================================
// Cross-User Independence
// ============================================================================

mod independence_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_uncontended_user_finishes_before_busy_queue() {
        let (engine, stores) = setup(Duration::from_millis(5));
        let busy = UserFixtures::primary();
        let idle = UserFixtures::secondary();

        let queue: Vec<_> = (0..20)
            .map(|_| spawn_op(&engine, busy, TransactionKind::Charge, Points::new(1)))
            .collect();
        tokio::time::sleep(Duration::from_millis(10)).await;

        engine.charge(idle, Points::new(1)).await.unwrap();

        let busy_done = stores.history.len().await - 1;
        assert!(busy_done < 20, "busy user's queue drained before the idle user's charge");

        for handle in queue {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(engine.get_balance(busy).await.unwrap().balance(), Points::new(20));
        assert_eq!(engine.tracked_users(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_many_users_keep_separate_totals() {
        let (engine, _stores) = setup(Duration::from_millis(1));

        let handles: Vec<_> = (0..40)
            .map(|i| spawn_op(&engine, UserId::new(i % 4), TransactionKind::Charge, Points::new(100)))
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut all_sequences = Vec::new();
        for user in 0..4 {
            let user = UserId::new(user);
            let record = engine.get_balance(user).await.unwrap();
            assert_eq!(record.balance(), Points::new(1_000));

            let history = engine.get_history(user).await.unwrap();
            assert_sequence_ordered(&history);
            all_sequences.extend(history.iter().map(|e| e.sequence_id));

            let reconciliation = engine.reconcile(user).await.unwrap();
            assert!(reconciliation.is_consistent());
            assert_eq!(reconciliation.entries, 10);
        }

        all_sequences.sort();
        all_sequences.dedup();
        assert_eq!(all_sequences.len(), 40);
    }
}

// ============================================================================
// Store Failures
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_balance_table_surfaces_and_releases() {
        let stores = create_stores(StoreConfig::new());
        let engine = engine_over(
            &stores,
            EngineConfig::default().with_lock_timeout(Duration::from_millis(100)),
        );
        let user = UserFixtures::primary();

        stores.balances.set_online(false);
        let result = engine.charge(user, Points::new(10)).await;
        assert!(matches!(result, Err(PointError::StoreUnavailable(_))));

        // The user's scope was released on the error path.
        stores.balances.set_online(true);
        let record = engine.charge(user, Points::new(10)).await.unwrap();
        assert_eq!(record.balance(), Points::new(10));
    }

    #[tokio::test]
    async fn test_failed_append_restores_balance() {
        let stores = create_stores(StoreConfig::new());
        let balances: Arc<dyn BalanceStore> = stores.balances.clone();
        let history = Arc::new(FaultyHistoryStore::new(stores.history.clone()));
        let engine = LedgerEngine::new(balances, history.clone(), EngineConfig::default());
        let user = UserFixtures::primary();

        engine.charge(user, Points::new(700)).await.unwrap();

        history.fail_appends(true);
        let result = engine.charge(user, Points::new(300)).await;
        assert!(matches!(result, Err(PointError::StoreUnavailable(_))));

        let record = engine.get_balance(user).await.unwrap();
        assert_eq!(record.balance(), Points::new(700));
        assert_eq!(stores.history.len().await, 1);

        history.fail_appends(false);
        let reconciliation = engine.reconcile(user).await.unwrap();
        assert!(reconciliation.is_consistent());
    }

    #[tokio::test]
    async fn test_failed_restore_is_still_reported() {
        let stores = create_stores(StoreConfig::new());
        let balances = Arc::new(FaultyBalanceStore::new(stores.balances.clone()));
        let history = Arc::new(FaultyHistoryStore::new(stores.history.clone()));
        let engine = LedgerEngine::new(balances.clone(), history.clone(), EngineConfig::default());
        let user = UserFixtures::primary();

        history.fail_appends(true);
        balances.fail_writes_after(1);

        let result = engine.charge(user, Points::new(300)).await;
        assert!(matches!(result, Err(PointError::StoreUnavailable(_))));
        assert_eq!(balances.writes(), 1);

        let reconciliation = engine.reconcile(user).await.unwrap();
        assert!(!reconciliation.is_consistent());
        assert_eq!(reconciliation.recorded, Points::new(300));
        assert_eq!(reconciliation.replayed, Points::ZERO);
    }

    #[tokio::test]
    async fn test_failed_read_leaves_state() {
        let stores = create_stores(StoreConfig::new());
        let balances = Arc::new(FaultyBalanceStore::new(stores.balances.clone()));
        let history: Arc<dyn HistoryStore> = stores.history.clone();
        let engine = LedgerEngine::new(balances.clone(), history, EngineConfig::default());
        let user = UserFixtures::primary();

        balances.fail_reads(true);
        assert!(matches!(
            engine.debit(user, Points::new(1)).await,
            Err(PointError::StoreUnavailable(_))
        ));
        assert!(matches!(
            engine.get_balance(user).await,
            Err(PointError::StoreUnavailable(_))
        ));

        balances.fail_reads(false);
        assert_eq!(balances.writes(), 0);
        assert!(stores.history.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_history_read_is_reported() {
        let stores = create_stores(StoreConfig::new());
        let balances: Arc<dyn BalanceStore> = stores.balances.clone();
        let history = Arc::new(FaultyHistoryStore::new(stores.history.clone()));
        let engine = LedgerEngine::new(balances, history.clone(), EngineConfig::default());

        history.fail_reads(true);
        assert!(matches!(
            engine.get_history(UserFixtures::primary()).await,
            Err(PointError::StoreUnavailable(_))
        ));
    }
}

// ============================================================================
// Bounded Waiting
// ============================================================================

mod lock_timeout_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiter_gives_up_when_scope_is_held() {
        let stores = create_stores(StoreConfig::new().latency(Duration::from_millis(100)));
        let engine = engine_over(
            &stores,
            EngineConfig::default().with_lock_timeout(Duration::from_millis(30)),
        );
        let user = UserFixtures::primary();

        let first = spawn_op(&engine, user, TransactionKind::Charge, Points::new(10));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = engine.charge(user, Points::new(20)).await;
        assert!(matches!(second, Err(PointError::Busy { user_id, .. }) if user_id == user));

        let record = first.await.unwrap().unwrap();
        assert_eq!(record.balance(), Points::new(10));
        assert_eq!(engine.get_history(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_uncontended_acquire_within_timeout() {
        let stores = create_stores(StoreConfig::new());
        let engine = engine_over(
            &stores,
            EngineConfig::default().with_lock_timeout(Duration::from_millis(30)),
        );

        assert!(engine.charge(UserFixtures::primary(), Points::new(1)).await.is_ok());
        assert_eq!(engine.config().lock_timeout, Some(Duration::from_millis(30)));
    }
}

// ============================================================================
// Abandoned Callers
// ============================================================================

mod abandoned_caller_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_commit_finishes_after_caller_gives_up() {
        // read, write and append each take 20ms; the caller leaves mid-commit
        let (engine, stores) = setup(Duration::from_millis(20));
        let user = UserFixtures::primary();

        let outcome =
            tokio::time::timeout(Duration::from_millis(50), engine.charge(user, Points::new(500))).await;
        assert!(outcome.is_err());

        let reconciliation = engine.reconcile(user).await.unwrap();
        assert!(reconciliation.is_consistent());
        assert_eq!(reconciliation.recorded, Points::new(500));
        assert_eq!(reconciliation.entries, 1);
        assert_eq!(stores.history.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queued_commit_runs_after_caller_gives_up() {
        let (engine, _stores) = setup(Duration::from_millis(20));
        let user = UserFixtures::primary();

        let first = spawn_op(&engine, user, TransactionKind::Charge, Points::new(100));
        tokio::time::sleep(Duration::from_millis(5)).await;

        let second =
            tokio::time::timeout(Duration::from_millis(10), engine.charge(user, Points::new(40))).await;
        assert!(second.is_err());
        tokio::time::sleep(Duration::from_millis(5)).await;

        first.await.unwrap().unwrap();
        let reconciliation = engine.reconcile(user).await.unwrap();
        assert!(reconciliation.is_consistent());
        assert_eq!(reconciliation.recorded, Points::new(140));
        assert_eq!(reconciliation.entries, 2);
    }
}
