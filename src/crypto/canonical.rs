//! Canonical transaction encoding.
//!
//! The customer signs the SHA-256 of a JSON-object-like string built from
//! the transaction's core fields in a fixed insertion order with no
//! whitespace. The server must reproduce that string byte for byte or
//! every signature check fails. Two conventions exist in the wild: the
//! compact form ends at `prev_hash`; the extended form appends
//! `wallet_id` (empty string when absent).

use rust_decimal::Decimal;

use super::{primitives, CryptoError};
use crate::models::transaction::Transaction;

/// Which canonicalization convention a transaction was signed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalVariant {
    /// txn_id, from_id, to_id, amount, timestamp, prev_hash
    Compact,
    /// Compact plus a trailing wallet_id
    Extended,
}

impl CanonicalVariant {
    pub fn other(self) -> Self {
        match self {
            CanonicalVariant::Compact => CanonicalVariant::Extended,
            CanonicalVariant::Extended => CanonicalVariant::Compact,
        }
    }
}

/// Serialize an amount the way a JavaScript runtime serializes a `Number`:
/// integer form when integral, otherwise the shortest decimal with no
/// trailing zeros (`10` not `10.0`, `10.5` not `10.50`).
pub fn js_number(amount: &Decimal) -> String {
    amount.normalize().to_string()
}

/// Build the canonical string for one transaction.
///
/// `prev_hash` and `wallet_id` substitute the empty string when absent;
/// every other field is required and non-empty.
pub fn canonical_transaction_string(
    txn: &Transaction,
    variant: CanonicalVariant,
) -> Result<String, CryptoError> {
    for (name, value) in [
        ("txn_id", &txn.txn_id),
        ("from_id", &txn.from_id),
        ("to_id", &txn.to_id),
        ("timestamp", &txn.timestamp),
    ] {
        if value.is_empty() {
            return Err(CryptoError::CanonicalForm(format!(
                "{name} is missing or empty"
            )));
        }
    }

    let prev_hash = txn.prev_hash.as_deref().unwrap_or("");

    let mut out = String::with_capacity(192);
    out.push('{');
    out.push_str("\"txn_id\":");
    out.push_str(&json_string(&txn.txn_id));
    out.push_str(",\"from_id\":");
    out.push_str(&json_string(&txn.from_id));
    out.push_str(",\"to_id\":");
    out.push_str(&json_string(&txn.to_id));
    out.push_str(",\"amount\":");
    out.push_str(&js_number(&txn.amount));
    out.push_str(",\"timestamp\":");
    out.push_str(&json_string(&txn.timestamp));
    out.push_str(",\"prev_hash\":");
    out.push_str(&json_string(prev_hash));
    if variant == CanonicalVariant::Extended {
        out.push_str(",\"wallet_id\":");
        out.push_str(&json_string(txn.wallet_id.as_deref().unwrap_or("")));
    }
    out.push('}');
    Ok(out)
}

/// Hex SHA-256 of the canonical string.
pub fn transaction_hash(
    txn: &Transaction,
    variant: CanonicalVariant,
) -> Result<String, CryptoError> {
    Ok(primitives::sha256_hex(&canonical_transaction_string(
        txn, variant,
    )?))
}

/// The convention the customer is expected to have signed under:
/// extended iff the transaction carries a non-empty wallet_id.
pub fn preferred_variant(txn: &Transaction) -> CanonicalVariant {
    match txn.wallet_id.as_deref() {
        Some(wallet_id) if !wallet_id.is_empty() => CanonicalVariant::Extended,
        _ => CanonicalVariant::Compact,
    }
}

/// Check the embedded hash against the recomputed one.
///
/// Ledgers signed under either convention must interoperate, so the
/// alternate variant is tried before declaring a mismatch.
pub fn verify_transaction_hash(txn: &Transaction) -> Result<bool, CryptoError> {
    let primary = preferred_variant(txn);
    if transaction_hash(txn, primary)? == txn.hash {
        return Ok(true);
    }
    Ok(transaction_hash(txn, primary.other())? == txn.hash)
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).expect("string serialization is infallible")
}
