//! Ledger verification.
//!
//! Walks a decrypted ledger, checks the merchant's outer signature, each
//! transaction's hash and signature, the hash chain, index monotonicity
//! and in-submission duplicates. One bad entry never short-circuits the
//! walk: every fault is collected so the merchant can repair its ledger
//! in a single round trip.

use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::crypto::{canonical, primitives, CryptoError};
use crate::models::ledger::SignedLedger;
use crate::models::settlement::EntryError;

/// Stand-in predecessor hash for the first chain link.
pub const GENESIS: &str = "GENESIS";

/// Verdict over one submitted ledger.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub valid: bool,
    /// txn_ids cleared for settlement; empty unless the whole ledger is valid
    pub verified: Vec<String>,
    pub errors: Vec<EntryError>,
}

/// Verify a submitted ledger end to end.
pub fn verify_ledger(ledger: &SignedLedger) -> VerifyReport {
    // The outer signature gates everything: a merchant that cannot prove
    // the chain tail gets no per-entry diagnostics.
    if let Err(err) = verify_ledger_signature(ledger) {
        let reason = match err {
            CryptoError::SignatureInvalid => "ledger signature invalid".to_string(),
            other => other.to_string(),
        };
        debug!(receiver_id = %ledger.receiver_id, %reason, "Ledger rejected before chain walk");
        return VerifyReport {
            valid: false,
            verified: Vec::new(),
            errors: vec![EntryError::submission(reason)],
        };
    }

    let mut errors = Vec::new();
    let mut seen_txn_ids: HashSet<&str> = HashSet::new();
    let mut prev_hash = GENESIS.to_string();
    let mut expected_index = 0i64;

    for entry in &ledger.entries {
        let txn = &entry.transaction;

        let txn_hash_ok = match canonical::verify_transaction_hash(txn) {
            Ok(true) => true,
            Ok(false) => {
                errors.push(EntryError::at(entry.ledger_index, "transaction hash mismatch"));
                false
            }
            Err(err) => {
                errors.push(EntryError::at(entry.ledger_index, err.to_string()));
                false
            }
        };

        // Chain law: each link covers the recomputed predecessor, so a
        // tampered field cascades as chain mismatches through every later
        // entry, while a single corrupted stored hash breaks exactly once.
        let effective_txn_hash = if txn_hash_ok {
            txn.hash.clone()
        } else {
            canonical::transaction_hash(txn, canonical::preferred_variant(txn))
                .unwrap_or_else(|_| txn.hash.clone())
        };
        let expected_hash = primitives::sha256_hex(&format!("{prev_hash}{effective_txn_hash}"));
        if expected_hash != entry.hash {
            errors.push(EntryError::at(entry.ledger_index, "ledger hash mismatch"));
        }

        if verify_transaction_signature_inner(txn).is_err() {
            errors.push(EntryError::at(entry.ledger_index, "signature invalid"));
        }

        if entry.ledger_index != expected_index {
            errors.push(EntryError::at(entry.ledger_index, "index gap"));
        }
        expected_index = entry.ledger_index + 1;

        if !seen_txn_ids.insert(txn.txn_id.as_str()) {
            errors.push(EntryError::at(
                entry.ledger_index,
                "duplicate txn in submission",
            ));
        }

        prev_hash = expected_hash;
    }

    // The signed tail must be the tail we actually walked to.
    if ledger.hash != prev_hash {
        errors.push(EntryError::submission("ledger hash mismatch"));
    }

    let valid = errors.is_empty();
    let verified = if valid {
        ledger
            .entries
            .iter()
            .map(|entry| entry.transaction.txn_id.clone())
            .collect()
    } else {
        Vec::new()
    };

    VerifyReport {
        valid,
        verified,
        errors,
    }
}

/// Verify the merchant's signature over the claimed chain tail.
fn verify_ledger_signature(ledger: &SignedLedger) -> Result<(), CryptoError> {
    let message = hash_message_bytes(&ledger.hash);
    let signature = STANDARD
        .decode(&ledger.signature)
        .map_err(|_| CryptoError::SignatureInvalid)?;
    primitives::ecdsa_verify(&ledger.receiver_public_key, &signature, &message)
}

/// Verify the customer's signature over the transaction hash.
fn verify_transaction_signature_inner(
    txn: &crate::models::transaction::Transaction,
) -> Result<(), CryptoError> {
    let message = hex::decode(&txn.hash).map_err(|_| CryptoError::SignatureInvalid)?;
    let signature = STANDARD
        .decode(&txn.signature)
        .map_err(|_| CryptoError::SignatureInvalid)?;
    primitives::ecdsa_verify(&txn.sender_public_key, &signature, &message)
}

/// Signing message for a ledger hash: the raw digest bytes when the tail
/// is a hex digest, the UTF-8 bytes otherwise (the GENESIS tail of an
/// empty ledger).
fn hash_message_bytes(hash: &str) -> Vec<u8> {
    if hash.len() == 64 {
        if let Ok(bytes) = hex::decode(hash) {
            return bytes;
        }
    }
    hash.as_bytes().to_vec()
}
