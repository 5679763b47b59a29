//! Verification and settlement response models.

use serde::{Deserialize, Serialize};

use crate::crypto::jwk::EcJwk;

/// One fault in a submission. `ledger_index` is None for submission-level
/// faults (ledger signature, chain tail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryError {
    pub ledger_index: Option<i64>,
    pub reason: String,
}

impl EntryError {
    pub fn at(ledger_index: i64, reason: impl Into<String>) -> Self {
        Self {
            ledger_index: Some(ledger_index),
            reason: reason.into(),
        }
    }

    pub fn submission(reason: impl Into<String>) -> Self {
        Self {
            ledger_index: None,
            reason: reason.into(),
        }
    }
}

/// Response from POST /verify-ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub verified_transactions: Vec<String>,
    pub errors: Vec<EntryError>,
}

/// Response from POST /settle-ledger.
///
/// `settled == true` means every listed transaction is durable. A txn_id
/// absent from both lists was a resubmission that had already settled.
/// `settled == false` means no state changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleResponse {
    pub settled: bool,
    pub settled_transactions: Vec<String>,
    pub errors: Vec<EntryError>,
    pub audit_log_ids: Vec<i32>,
}

/// Response from GET /bank-key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankKeyResponse {
    pub public_key: EcJwk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
