//! Transaction and ledger-entry wire models.
//!
//! Unknown fields are rejected at parse time: the two canonicalization
//! conventions differ only by a field, so a silently ignored field would
//! turn a hash mismatch into a mystery.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::crypto::jwk::EcJwk;

/// A signed payment intent created by the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub txn_id: String,
    /// Sender's bank identifier
    pub from_id: String,
    /// Receiver's bank identifier
    pub to_id: String,
    /// Fixed-point amount; arrives as a JSON number because the customer
    /// runtime signs the JavaScript-number serialization of it
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// ISO-8601 UTC string, hashed verbatim
    pub timestamp: String,
    #[serde(default)]
    pub prev_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    /// Hex SHA-256 of the canonical encoding
    pub hash: String,
    /// Base64 ECDSA-P256-SHA256 over the raw hash bytes, P1363 form
    pub signature: String,
    /// Customer's ECDSA verifying key
    pub sender_public_key: EcJwk,
}

/// Merchant-side verdict tag carried on a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Verified,
    Rejected,
}

fn default_entry_status() -> EntryStatus {
    EntryStatus::Pending
}

/// One link of the merchant's offline hash chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerEntry {
    /// 0-based, strictly monotonic within one ledger
    pub ledger_index: i64,
    pub transaction: Transaction,
    /// Hex SHA-256 of (previous entry hash || transaction hash), with the
    /// literal "GENESIS" standing in for index 0's predecessor
    pub hash: String,
    #[serde(default = "default_entry_status")]
    pub status: EntryStatus,
}
