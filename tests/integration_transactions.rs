//! Transaction processor integration tests
//!
//! Run against the in-memory store; no database required.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cbank::domain::{AmountError, Transfer, CREDIT_FEE_DETAILS};
use cbank::handlers::{TransactionError, TransactionProcessor, TransferCommand};
use cbank::services::{LedgerBalance, NoTariff, StandardTariff, TariffService};
use cbank::store::{AccountRegistry, InMemoryStore, StoreError};

mod common;

use common::{ALICE, BANK, BOB, CAROL};

fn processor<T: TariffService>(
    store: &InMemoryStore,
    tariff: T,
) -> TransactionProcessor<InMemoryStore, LedgerBalance, T> {
    TransactionProcessor::new(store.clone(), LedgerBalance, tariff, common::bank())
}

fn flat_fee(fee: Decimal) -> StandardTariff {
    StandardTariff::new(fee, Decimal::ZERO, Decimal::ZERO)
        .with_exempt_recipient(common::num(BANK))
}

// =========================================================================
// Rejections
// =========================================================================

#[tokio::test]
async fn test_non_positive_amount_persists_nothing() {
    let store = common::setup_store(dec!(100)).await;
    let processor = processor(&store, NoTariff);

    for amount in [Decimal::ZERO, dec!(-5)] {
        let result = processor
            .create(TransferCommand::new(ALICE, BOB, amount))
            .await;
        assert!(
            matches!(result, Err(TransactionError::InvalidAmount(_))),
            "amount {} should be rejected",
            amount
        );
    }

    assert_eq!(store.transaction_count(), 1);
}

#[tokio::test]
async fn test_insufficient_funds_persists_nothing() {
    let store = common::setup_store(dec!(100)).await;
    let processor = processor(&store, NoTariff);

    let result = processor
        .create(TransferCommand::new(ALICE, BOB, dec!(150)))
        .await;

    match result {
        Err(TransactionError::InsufficientFunds {
            required,
            available,
        }) => {
            assert_eq!(required, dec!(150));
            assert_eq!(available, dec!(100));
        }
        other => panic!("Expected InsufficientFunds, got: {:?}", other),
    }
    assert_eq!(store.transaction_count(), 1);
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(100));
}

#[tokio::test]
async fn test_fee_counts_towards_required_funds() {
    let store = common::setup_store(dec!(100)).await;
    let processor = processor(&store, flat_fee(dec!(5)));

    let result = processor
        .create(TransferCommand::new(ALICE, BOB, dec!(96)))
        .await;

    assert!(matches!(
        result,
        Err(TransactionError::InsufficientFunds { required, .. }) if required == dec!(101)
    ));
    assert_eq!(store.transaction_count(), 1);
}

#[tokio::test]
async fn test_huge_tariff_rate_rejected_without_panic() {
    let store = common::setup_store(dec!(100)).await;
    let rate = Decimal::from_i128_with_scale(10i128.pow(20), 0);
    let tariff = StandardTariff::new(Decimal::ZERO, rate, Decimal::ZERO)
        .with_exempt_recipient(common::num(BANK));

    let result = processor(&store, tariff)
        .create(TransferCommand::new(ALICE, BOB, dec!(1000000000000)))
        .await;

    assert!(matches!(
        result,
        Err(TransactionError::InvalidAmount(AmountError::Overflow))
    ));
    assert_eq!(store.transaction_count(), 1);
}

#[tokio::test]
async fn test_unknown_payer_rejected() {
    let store = common::setup_store(dec!(100)).await;
    let result = processor(&store, NoTariff)
        .create(TransferCommand::new("4081999999999999", BOB, dec!(10)))
        .await;

    assert!(matches!(result, Err(TransactionError::InvalidAccount(_))));
}

// =========================================================================
// Records written
// =========================================================================

#[tokio::test]
async fn test_zero_fee_writes_one_record() {
    let store = common::setup_store(dec!(100)).await;
    let tx = processor(&store, NoTariff)
        .create(TransferCommand::new(ALICE, BOB, dec!(40)))
        .await
        .unwrap();

    assert_eq!(store.transaction_count(), 2);
    assert_eq!(tx.payer, common::num(ALICE));
    assert_eq!(tx.recipient, common::num(BOB));
    assert_eq!(tx.amount, dec!(40));
}

#[tokio::test]
async fn test_transfer_with_commission() {
    let store = common::setup_store(dec!(500)).await;
    let processor = processor(&store, flat_fee(dec!(5)));

    let tx = processor
        .create(TransferCommand::new(ALICE, BOB, dec!(100)))
        .await
        .unwrap();

    assert_eq!(tx.amount, dec!(100));

    let ledger = store.transactions();
    assert_eq!(ledger.len(), 3);

    let primary = &ledger[1];
    let commission = &ledger[2];
    assert_eq!(primary.id, tx.id);
    assert_eq!(commission.payer, common::num(ALICE));
    assert_eq!(commission.recipient, common::num(BANK));
    assert_eq!(commission.amount, dec!(5));
    assert!(commission.created_at >= primary.created_at);
    assert_eq!(
        commission.details,
        format!("Commission for transaction {}", primary.id)
    );

    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(395));
    assert_eq!(processor.balance(BOB).await.unwrap(), dec!(100));
}

#[tokio::test]
async fn test_transfer_to_bank_is_exempt() {
    let store = common::setup_store(dec!(100)).await;
    processor(&store, flat_fee(dec!(5)))
        .create(TransferCommand::new(ALICE, BANK, dec!(100)))
        .await
        .unwrap();

    assert_eq!(store.transaction_count(), 2);
}

#[tokio::test]
async fn test_percentage_tariff() {
    let store = common::setup_store(dec!(1000)).await;
    let tariff = StandardTariff::new(Decimal::ZERO, dec!(0.015), dec!(1))
        .with_exempt_recipient(common::num(BANK));
    let processor = processor(&store, tariff);

    processor
        .create(TransferCommand::new(ALICE, BOB, dec!(200)))
        .await
        .unwrap();

    // 1.5% of 200
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(797));
}

#[tokio::test]
async fn test_failed_commission_rolls_back_primary() {
    let inner = common::setup_store(dec!(500)).await;
    // save #1 is the primary transfer, save #2 the commission
    let store = common::FailingStore::new(inner.clone(), 2);
    let processor = TransactionProcessor::new(
        store,
        LedgerBalance,
        flat_fee(dec!(5)),
        common::bank(),
    );

    let result = processor
        .create(TransferCommand::new(ALICE, BOB, dec!(100)))
        .await;

    assert!(matches!(
        result,
        Err(TransactionError::Persistence(StoreError::Unavailable(_)))
    ));
    assert_eq!(inner.transaction_count(), 1);
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(500));
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_never_overdraw() {
    let store = common::setup_store(dec!(100)).await;
    let processor = Arc::new(processor(&store, NoTariff));

    let first = {
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            processor
                .create(TransferCommand::new(ALICE, BOB, dec!(80)))
                .await
        })
    };
    let second = {
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            processor
                .create(TransferCommand::new(ALICE, CAROL, dec!(80)))
                .await
        })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let rejections = results
        .iter()
        .filter(|r| matches!(r, Err(TransactionError::InsufficientFunds { .. })))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(rejections, 1);
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(20));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_transfers_with_fee() {
    let store = common::setup_store(dec!(1000)).await;
    let processor = Arc::new(processor(&store, flat_fee(dec!(1))));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let processor = Arc::clone(&processor);
            tokio::spawn(async move {
                processor
                    .create(TransferCommand::new(ALICE, BOB, dec!(32)))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // 1000 / (32 + 1) rounds down to 30
    assert_eq!(successes, 30);
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(10));
    assert_eq!(store.transaction_count(), 1 + 2 * 30);
}

// =========================================================================
// History
// =========================================================================

#[tokio::test]
async fn test_by_account_projects_roles() {
    let store = common::setup_store(dec!(100)).await;
    let processor = processor(&store, NoTariff);

    processor
        .create(TransferCommand::new(ALICE, BOB, dec!(30)).with_details("rent"))
        .await
        .unwrap();
    processor
        .create(TransferCommand::new(BOB, ALICE, dec!(10)))
        .await
        .unwrap();

    let history = processor.by_account(ALICE).await.unwrap();
    assert_eq!(history.len(), 3);

    // opening balance, outgoing, incoming; ascending id
    assert_eq!(history[0].amount, dec!(100));
    assert_eq!(history[0].counterparty, common::num(BANK));
    assert_eq!(history[1].amount, dec!(-30));
    assert_eq!(history[1].counterparty, common::num(BOB));
    assert_eq!(history[1].details, "rent");
    assert_eq!(history[2].amount, dec!(10));
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));

    let bob = processor.by_account(BOB).await.unwrap();
    assert_eq!(bob.len(), 2);
    assert_eq!(bob[0].amount, dec!(30));
    assert_eq!(bob[1].amount, dec!(-10));
}

#[tokio::test]
async fn test_by_account_without_history() {
    let store = common::setup_store(Decimal::ZERO).await;
    let processor = processor(&store, NoTariff);

    assert!(processor.by_account(CAROL).await.unwrap().is_empty());
    assert!(processor.by_account("").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_self_transfer_reads_as_payment() {
    let store = common::setup_store(dec!(100)).await;
    let processor = processor(&store, NoTariff);

    processor
        .create(TransferCommand::new(ALICE, ALICE, dec!(25)))
        .await
        .unwrap();

    let history = processor.by_account(ALICE).await.unwrap();
    assert_eq!(history[1].amount, dec!(-25));
    assert_eq!(history[1].counterparty, common::num(ALICE));
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(100));
}

// =========================================================================
// Credit withdrawal
// =========================================================================

#[tokio::test]
async fn test_credit_withdraw_ignores_tariff_and_balance() {
    let store = common::setup_store(dec!(10)).await;
    let processor = processor(&store, |_: &Transfer| dec!(50));
    let account = store
        .find_account(&common::num(ALICE))
        .await
        .unwrap()
        .unwrap();

    let tx = processor.credit_withdraw(&account, dec!(30)).await.unwrap();

    assert_eq!(tx.recipient, common::num(BANK));
    assert_eq!(tx.details, CREDIT_FEE_DETAILS);
    assert_eq!(store.transaction_count(), 2);
    assert_eq!(processor.balance(ALICE).await.unwrap(), dec!(-20));
    assert_eq!(processor.balance(BANK).await.unwrap(), dec!(20));
}
