mod common;

use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use settlement_backend::entities::prelude::*;
use settlement_backend::services::{settlement, verifier};

use crate::common::TxnSpec;

#[tokio::test]
async fn single_entry_settles_and_debits_wallet() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(100), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let txn_id = common::unique_id("T");

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id: txn_id.clone(),
            amount: dec!(10.5),
            wallet_id: Some(seeded.wallet_id.clone()),
        }],
    );

    let report = verifier::verify_ledger(&ledger);
    assert!(report.valid, "unexpected errors: {:?}", report.errors);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(outcome.settled);
    assert_eq!(outcome.settled_transactions, vec![txn_id.clone()]);
    assert_eq!(outcome.audit_log_ids.len(), 1);

    let wallet = Wallets::find_by_id(seeded.wallet_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.current_balance, dec!(89.5));
    assert_eq!(wallet.used_amount, dec!(10.5));
    assert!(settlement::escrow_invariant_holds(&wallet));

    let settled = SettledTransactions::find_by_id(txn_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.amount, dec!(10.5));
    assert_eq!(settled.receiver_id, "R1");
    assert_eq!(settled.wallet_id, seeded.wallet_id);

    let log = AuditLogs::find_by_id(outcome.audit_log_ids[0])
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.action, "settle");
    assert_eq!(log.status, "success");
    assert_eq!(log.txn_id.as_deref(), Some(txn_id.as_str()));
}

#[tokio::test]
async fn resubmission_is_a_pure_read() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(100), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let txn_id = common::unique_id("T");

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id: txn_id.clone(),
            amount: dec!(10.5),
            wallet_id: Some(seeded.wallet_id.clone()),
        }],
    );
    let report = verifier::verify_ledger(&ledger);

    let first = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(first.settled);

    let second = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(second.settled);
    assert!(second.settled_transactions.is_empty());
    assert!(second.errors.is_empty());
    assert_eq!(second.already_settled, 1);

    let wallet = Wallets::find_by_id(seeded.wallet_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.current_balance, dec!(89.5));
    assert!(settlement::escrow_invariant_holds(&wallet));
}

#[tokio::test]
async fn insufficient_balance_rolls_back_everything() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(5), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let txn_id = common::unique_id("T");

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id: txn_id.clone(),
            amount: dec!(10),
            wallet_id: Some(seeded.wallet_id.clone()),
        }],
    );
    let report = verifier::verify_ledger(&ledger);
    assert!(report.valid);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(!outcome.settled);
    assert!(outcome.settled_transactions.is_empty());
    assert!(outcome.audit_log_ids.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(
        outcome.errors[0].reason,
        "wallet_invalid: insufficient_balance"
    );

    let wallet = Wallets::find_by_id(seeded.wallet_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.current_balance, dec!(5));

    assert!(SettledTransactions::find_by_id(txn_id.clone())
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn partial_failure_commits_nothing() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(100), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let t1 = common::unique_id("T");
    let t2 = common::unique_id("T");

    // First entry drains the wallet; the second would overdraw.
    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[
            TxnSpec {
                txn_id: t1.clone(),
                amount: dec!(100),
                wallet_id: Some(seeded.wallet_id.clone()),
            },
            TxnSpec {
                txn_id: t2.clone(),
                amount: dec!(0.01),
                wallet_id: Some(seeded.wallet_id.clone()),
            },
        ],
    );
    let report = verifier::verify_ledger(&ledger);
    assert!(report.valid, "unexpected errors: {:?}", report.errors);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(!outcome.settled);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].ledger_index, Some(1));

    // All-or-none: the first entry's debit rolled back with the rest.
    let wallet = Wallets::find_by_id(seeded.wallet_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.current_balance, dec!(100));
    assert!(SettledTransactions::find_by_id(t1.clone())
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn exact_balance_settles_to_zero() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(50), dec!(12.34), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let txn_id = common::unique_id("T");

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id,
            amount: dec!(12.34),
            wallet_id: Some(seeded.wallet_id.clone()),
        }],
    );
    let report = verifier::verify_ledger(&ledger);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(outcome.settled);

    let wallet = Wallets::find_by_id(seeded.wallet_id.clone())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.current_balance, dec!(0));
    assert_eq!(wallet.used_amount, dec!(50));
    assert!(settlement::escrow_invariant_holds(&wallet));
}

#[tokio::test]
async fn unapproved_wallet_is_rejected() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(100), "suspended").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id: common::unique_id("T"),
            amount: dec!(1),
            wallet_id: Some(seeded.wallet_id.clone()),
        }],
    );
    let report = verifier::verify_ledger(&ledger);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(!outcome.settled);
    assert_eq!(outcome.errors[0].reason, "wallet_invalid: not_approved");
}

#[tokio::test]
async fn wallet_resolves_through_sender_bank_id() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let seeded = common::seed_wallet(&db, dec!(100), dec!(100), "approved").await;
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let txn_id = common::unique_id("T");

    // No wallet_id on the transaction: the engine falls back to from_id.
    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &seeded.bank_id,
        "R1",
        &[TxnSpec {
            txn_id: txn_id.clone(),
            amount: dec!(2.5),
            wallet_id: None,
        }],
    );
    let report = verifier::verify_ledger(&ledger);
    assert!(report.valid);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(outcome.settled);

    let settled = SettledTransactions::find_by_id(txn_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.wallet_id, seeded.wallet_id);
    assert_eq!(settled.from_user_id, seeded.user_id);
}

#[tokio::test]
async fn unknown_sender_is_wallet_not_found() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let customer = common::customer_key();
    let merchant = common::merchant_key();

    let ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        &common::unique_id("nobody"),
        "R1",
        &[TxnSpec {
            txn_id: common::unique_id("T"),
            amount: dec!(1),
            wallet_id: None,
        }],
    );
    let report = verifier::verify_ledger(&ledger);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(!outcome.settled);
    assert_eq!(outcome.errors[0].reason, "wallet_invalid: not_found");
}

#[tokio::test]
async fn invalid_ledger_is_refused_by_the_engine() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let mut ledger = common::build_signed_ledger(
        &customer,
        &merchant,
        "whoever",
        "R1",
        &[TxnSpec {
            txn_id: common::unique_id("T"),
            amount: dec!(1),
            wallet_id: None,
        }],
    );
    ledger.entries[0].transaction.amount = dec!(2);

    let report = verifier::verify_ledger(&ledger);
    assert!(!report.valid);

    let result = settlement::settle_ledger(&db, &ledger, &report).await;
    assert!(matches!(
        result,
        Err(settlement::SettlementError::LedgerInvalid)
    ));
}

#[tokio::test]
async fn empty_ledger_settles_trivially() {
    let Some(db) = common::setup_test_db().await else {
        return;
    };
    let customer = common::customer_key();
    let merchant = common::merchant_key();
    let ledger = common::build_signed_ledger(&customer, &merchant, "whoever", "R1", &[]);

    let report = verifier::verify_ledger(&ledger);
    assert!(report.valid);

    let outcome = settlement::settle_ledger(&db, &ledger, &report)
        .await
        .unwrap();
    assert!(outcome.settled);
    assert!(outcome.settled_transactions.is_empty());
    assert!(outcome.errors.is_empty());
}
