//! Ledger verification and settlement endpoints.
//!
//! Both accept the same tagged submission body: an encrypted envelope or
//! an already-decrypted signed ledger. Verification never mutates
//! persistent state; settlement runs the engine under the configured
//! wall-clock deadline.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tokio::time::timeout;
use tracing::{error, warn};

use crate::crypto::envelope;
use crate::models::ledger::{SignedLedger, SubmissionInput};
use crate::models::settlement::{EntryError, ErrorResponse, SettleResponse, VerifyResponse};
use crate::services::settlement::{self, SettlementError};
use crate::services::{audit, verifier};
use crate::AppState;

/// Write an audit entry without letting audit storage failures take the
/// request down with them.
async fn audit_best_effort(
    state: &AppState,
    action: &str,
    txn_id: Option<&str>,
    status: &str,
    details: serde_json::Value,
) {
    if let Err(err) = audit::append(
        &state.db,
        audit::actors::BANK,
        action,
        txn_id,
        status,
        details,
    )
    .await
    {
        warn!(action, error = %err, "Failed to write audit entry");
    }
}

/// Resolve a submission to its decrypted ledger, auditing the envelope
/// verdict either way.
async fn open_submission(
    state: &AppState,
    input: SubmissionInput,
) -> Result<SignedLedger, (StatusCode, Json<ErrorResponse>)> {
    let envelope = match input {
        SubmissionInput::Plain(ledger) => return Ok(ledger),
        SubmissionInput::Envelope(envelope) => envelope,
    };

    let plaintext = match envelope::open_envelope(&envelope, state.keys.secret_key()) {
        Ok(plaintext) => plaintext,
        Err(err) => {
            audit_best_effort(
                state,
                audit::actions::DECRYPT_ENVELOPE,
                None,
                audit::statuses::ERROR,
                json!({ "error": err.to_string() }),
            )
            .await;
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ));
        }
    };

    match serde_json::from_str::<SignedLedger>(&plaintext) {
        Ok(ledger) => {
            audit_best_effort(
                state,
                audit::actions::DECRYPT_ENVELOPE,
                None,
                audit::statuses::SUCCESS,
                json!({
                    "receiver_id": ledger.receiver_id,
                    "entry_count": ledger.entries.len(),
                }),
            )
            .await;
            Ok(ledger)
        }
        Err(err) => {
            audit_best_effort(
                state,
                audit::actions::DECRYPT_ENVELOPE,
                None,
                audit::statuses::ERROR,
                json!({ "error": format!("decrypted payload is not a ledger: {err}") }),
            )
            .await;
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("decrypted payload is not a ledger: {err}"),
                }),
            ))
        }
    }
}

/// POST /verify-ledger
pub async fn verify_ledger(
    State(state): State<AppState>,
    Json(input): Json<SubmissionInput>,
) -> Result<Json<VerifyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let ledger = open_submission(&state, input).await?;
    let report = verifier::verify_ledger(&ledger);

    audit_best_effort(
        &state,
        audit::actions::VERIFY_LEDGER,
        None,
        if report.valid {
            audit::statuses::SUCCESS
        } else {
            audit::statuses::ERROR
        },
        json!({
            "receiver_id": ledger.receiver_id,
            "entry_count": ledger.entries.len(),
            "verified_count": report.verified.len(),
            "errors": &report.errors,
        }),
    )
    .await;

    Ok(Json(VerifyResponse {
        valid: report.valid,
        verified_transactions: report.verified,
        errors: report.errors,
    }))
}

/// POST /settle-ledger
pub async fn settle_ledger(
    State(state): State<AppState>,
    Json(input): Json<SubmissionInput>,
) -> Result<Json<SettleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let ledger = open_submission(&state, input).await?;
    let report = verifier::verify_ledger(&ledger);

    if !report.valid {
        audit_best_effort(
            &state,
            audit::actions::SETTLE_LEDGER,
            None,
            audit::statuses::ERROR,
            json!({
                "receiver_id": ledger.receiver_id,
                "entry_count": ledger.entries.len(),
                "errors": &report.errors,
            }),
        )
        .await;

        let mut errors = report.errors;
        errors.push(EntryError::submission(
            "ledger verification failed, cannot settle",
        ));
        return Ok(Json(SettleResponse {
            settled: false,
            settled_transactions: Vec::new(),
            errors,
            audit_log_ids: Vec::new(),
        }));
    }

    let outcome = match timeout(
        state.settlement_deadline,
        settlement::settle_ledger(&state.db, &ledger, &report),
    )
    .await
    {
        Err(_) => {
            let err = SettlementError::DeadlineExceeded;
            error!(receiver_id = %ledger.receiver_id, "Settlement aborted: deadline exceeded");
            audit_best_effort(
                &state,
                audit::actions::SETTLE_LEDGER,
                None,
                audit::statuses::ERROR,
                json!({
                    "receiver_id": ledger.receiver_id,
                    "error": err.to_string(),
                }),
            )
            .await;
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ));
        }
        // A rejected outer commit (e.g. a serialization conflict) left no
        // partial state; the caller retries idempotently, so it is a
        // settled=false verdict rather than a server error.
        Ok(Err(SettlementError::CommitRejected(err))) => {
            warn!(receiver_id = %ledger.receiver_id, error = %err, "Database rejected settlement commit");
            audit_best_effort(
                &state,
                audit::actions::SETTLE_LEDGER,
                None,
                audit::statuses::ERROR,
                json!({
                    "receiver_id": ledger.receiver_id,
                    "entry_count": ledger.entries.len(),
                    "error": format!("commit rejected: {err}"),
                }),
            )
            .await;
            return Ok(Json(SettleResponse {
                settled: false,
                settled_transactions: Vec::new(),
                errors: vec![EntryError::submission(format!(
                    "database rejected the commit, resubmit the ledger: {err}"
                ))],
                audit_log_ids: Vec::new(),
            }));
        }
        Ok(Err(err)) => {
            error!(receiver_id = %ledger.receiver_id, error = %err, "Settlement failed");
            audit_best_effort(
                &state,
                audit::actions::SETTLE_LEDGER,
                None,
                audit::statuses::ERROR,
                json!({
                    "receiver_id": ledger.receiver_id,
                    "error": err.to_string(),
                }),
            )
            .await;
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("settlement failed: {err}"),
                }),
            ));
        }
        Ok(Ok(outcome)) => outcome,
    };

    audit_best_effort(
        &state,
        audit::actions::SETTLE_LEDGER,
        None,
        if outcome.settled {
            audit::statuses::SUCCESS
        } else {
            audit::statuses::ERROR
        },
        json!({
            "receiver_id": ledger.receiver_id,
            "entry_count": ledger.entries.len(),
            "settled_count": outcome.settled_transactions.len(),
            "already_settled": outcome.already_settled,
            "errors": &outcome.errors,
        }),
    )
    .await;

    Ok(Json(SettleResponse {
        settled: outcome.settled,
        settled_transactions: outcome.settled_transactions,
        errors: outcome.errors,
        audit_log_ids: outcome.audit_log_ids,
    }))
}
