//! Settlement engine.
//!
//! Takes a ledger that passed verification and settles it all-or-nothing
//! inside one Serializable database transaction. Per-entry idempotency
//! rides on the settled_transactions primary key: an entry seen before is
//! skipped, and a concurrent race on the same txn_id resolves through the
//! uniqueness violation, folded back into the idempotent skip via a
//! savepoint. Any wallet failure rolls the whole submission back.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IsolationLevel, QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::{prelude::*, settled_transactions, users, wallets};
use crate::models::ledger::SignedLedger;
use crate::models::settlement::EntryError;
use crate::models::transaction::Transaction;
use crate::services::audit;
use crate::services::verifier::VerifyReport;

/// Wallet lifecycle states, as provisioned by the admin console.
pub mod wallet_status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
    pub const SUSPENDED: &str = "suspended";
}

const ROLE_SENDER: &str = "sender";

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("ledger failed verification and cannot settle")]
    LedgerInvalid,

    #[error("settlement deadline exceeded")]
    DeadlineExceeded,

    /// The outer commit was rejected (e.g. a serialization conflict).
    /// Nothing was persisted; the submission is safe to retry.
    #[error("database rejected the settlement commit: {0}")]
    CommitRejected(DbErr),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Outcome of one settlement pass.
#[derive(Debug, Default)]
pub struct SettlementOutcome {
    pub settled: bool,
    pub settled_transactions: Vec<String>,
    pub errors: Vec<EntryError>,
    pub audit_log_ids: Vec<i32>,
    /// Entries skipped as idempotent resubmissions
    pub already_settled: usize,
}

/// Settle a verified ledger.
///
/// Returns `settled == false` with the collected per-entry errors (and no
/// state change) when any entry fails wallet validation; commits when
/// every entry either settles or was already settled.
pub async fn settle_ledger(
    db: &DatabaseConnection,
    ledger: &SignedLedger,
    report: &VerifyReport,
) -> Result<SettlementOutcome, SettlementError> {
    if !report.valid {
        return Err(SettlementError::LedgerInvalid);
    }

    let txn = db
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let mut outcome = SettlementOutcome::default();
    // Failure audits must survive the rollback, so they are deferred and
    // written on the plain connection afterwards.
    let mut failure_audits: Vec<(String, serde_json::Value)> = Vec::new();

    for entry in &ledger.entries {
        let t = &entry.transaction;

        if SettledTransactions::find_by_id(t.txn_id.clone())
            .one(&txn)
            .await?
            .is_some()
        {
            debug!(txn_id = %t.txn_id, "Already settled, skipping");
            outcome.already_settled += 1;
            continue;
        }

        let wallet = match resolve_wallet(&txn, t).await? {
            Some(wallet) => wallet,
            None => {
                outcome
                    .errors
                    .push(EntryError::at(entry.ledger_index, "wallet_invalid: not_found"));
                failure_audits.push((
                    t.txn_id.clone(),
                    reject_details(t, entry.ledger_index, &ledger.receiver_id, "not_found"),
                ));
                continue;
            }
        };

        if wallet.status != wallet_status::APPROVED {
            outcome.errors.push(EntryError::at(
                entry.ledger_index,
                "wallet_invalid: not_approved",
            ));
            failure_audits.push((
                t.txn_id.clone(),
                reject_details(t, entry.ledger_index, &ledger.receiver_id, "not_approved"),
            ));
            continue;
        }

        if wallet.current_balance < t.amount {
            outcome.errors.push(EntryError::at(
                entry.ledger_index,
                "wallet_invalid: insufficient_balance",
            ));
            failure_audits.push((
                t.txn_id.clone(),
                reject_details(
                    t,
                    entry.ledger_index,
                    &ledger.receiver_id,
                    "insufficient_balance",
                ),
            ));
            continue;
        }

        match settle_entry(&txn, ledger, entry.ledger_index, t, wallet).await? {
            EntryResult::Settled(audit_id) => {
                outcome.settled_transactions.push(t.txn_id.clone());
                outcome.audit_log_ids.push(audit_id);
            }
            EntryResult::LostRace => {
                debug!(txn_id = %t.txn_id, "Concurrent settlement won, folding to already_settled");
                outcome.already_settled += 1;
            }
        }
    }

    if outcome.errors.is_empty() {
        txn.commit()
            .await
            .map_err(SettlementError::CommitRejected)?;
        outcome.settled = true;
    } else {
        txn.rollback().await?;
        outcome.settled = false;
        outcome.settled_transactions.clear();
        outcome.audit_log_ids.clear();

        for (txn_id, details) in failure_audits {
            if let Err(err) = audit::append(
                db,
                audit::actors::BANK,
                audit::actions::REJECT,
                Some(&txn_id),
                audit::statuses::ERROR,
                details,
            )
            .await
            {
                warn!(%txn_id, error = %err, "Failed to write reject audit entry");
            }
        }
    }

    Ok(outcome)
}

enum EntryResult {
    Settled(i32),
    LostRace,
}

/// Perform the mutations for one entry under a savepoint, so a concurrent
/// txn_id race unwinds just this entry instead of poisoning the outer
/// transaction.
async fn settle_entry(
    txn: &sea_orm::DatabaseTransaction,
    ledger: &SignedLedger,
    ledger_index: i64,
    t: &Transaction,
    wallet: wallets::Model,
) -> Result<EntryResult, SettlementError> {
    let savepoint = txn.begin().await?;

    let wallet_id = wallet.wallet_id.clone();
    let from_user_id = wallet.user_id.clone();
    let balance_after = wallet.current_balance - t.amount;
    let used_after = wallet.used_amount + t.amount;

    let row = settled_transactions::ActiveModel {
        txn_id: Set(t.txn_id.clone()),
        wallet_id: Set(wallet_id.clone()),
        from_user_id: Set(from_user_id),
        to_user_id: Set(t.to_id.clone()),
        amount: Set(t.amount),
        ledger_index: Set(ledger_index),
        receiver_id: Set(ledger.receiver_id.clone()),
        ..Default::default()
    };
    if let Err(err) = row.insert(&savepoint).await {
        if is_unique_violation(&err) {
            savepoint.rollback().await?;
            return Ok(EntryResult::LostRace);
        }
        return Err(err.into());
    }

    let mut active: wallets::ActiveModel = wallet.into();
    active.current_balance = Set(balance_after);
    active.used_amount = Set(used_after);
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(&savepoint).await?;

    let audit_id = audit::append(
        &savepoint,
        audit::actors::BANK,
        audit::actions::SETTLE,
        Some(&t.txn_id),
        audit::statuses::SUCCESS,
        json!({
            "txn_id": t.txn_id,
            "from_id": t.from_id,
            "to_id": t.to_id,
            "amount": t.amount,
            "wallet_id": wallet_id,
            "receiver_id": ledger.receiver_id,
            "ledger_index": ledger_index,
            "balance_after": balance_after,
            "used_after": used_after,
        }),
    )
    .await?;

    savepoint.commit().await?;
    Ok(EntryResult::Settled(audit_id))
}

/// Resolve the customer wallet for a transaction: by wallet_id when it
/// carries one, otherwise through the sending user's bank identifier.
async fn resolve_wallet<C: ConnectionTrait>(
    conn: &C,
    t: &Transaction,
) -> Result<Option<wallets::Model>, DbErr> {
    if let Some(wallet_id) = t.wallet_id.as_deref().filter(|w| !w.is_empty()) {
        return Wallets::find_by_id(wallet_id.to_string()).one(conn).await;
    }

    let Some(user) = Users::find()
        .filter(users::Column::BankId.eq(&t.from_id))
        .filter(users::Column::Role.eq(ROLE_SENDER))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    Wallets::find()
        .filter(wallets::Column::UserId.eq(user.user_id))
        .one(conn)
        .await
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn reject_details(
    t: &Transaction,
    ledger_index: i64,
    receiver_id: &str,
    reason: &str,
) -> serde_json::Value {
    json!({
        "txn_id": t.txn_id,
        "from_id": t.from_id,
        "to_id": t.to_id,
        "amount": t.amount,
        "receiver_id": receiver_id,
        "ledger_index": ledger_index,
        "reason": reason,
    })
}

/// Escrow invariant, checked by tests and debug assertions:
/// used + balance must always equal the approved limit.
pub fn escrow_invariant_holds(wallet: &wallets::Model) -> bool {
    wallet.used_amount + wallet.current_balance == wallet.approved_limit
        && wallet.current_balance >= Decimal::ZERO
}
