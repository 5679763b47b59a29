//! Ledger submission wire models.
//!
//! A submission arrives either as an encrypted envelope or as an
//! already-decrypted signed ledger. The two are told apart at parse time
//! by the presence of `encrypted_payload`, so handlers never sniff
//! content themselves.

use serde::{Deserialize, Serialize};

use super::transaction::LedgerEntry;
use crate::crypto::{jwk::EcJwk, CryptoError};

/// A merchant-exported ledger with its outer signature.
///
/// `hash` is the chain tail (the final entry's hash, or the literal
/// "GENESIS" for an empty ledger); `signature` is ECDSA-P256-SHA256 over
/// its raw bytes under `receiver_public_key`. Because every entry hash
/// covers its predecessor, the tail commits to the entire ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedLedger {
    pub receiver_id: String,
    pub entries: Vec<LedgerEntry>,
    pub hash: String,
    pub signature: String,
    pub receiver_public_key: EcJwk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

/// Encrypted wire form of a transaction or ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Base64 AES-GCM ciphertext of the payload
    pub encrypted_payload: String,
    /// Base64 of wrap IV (12 bytes) || GCM-wrapped 32-byte inner key
    pub encrypted_aes_key: String,
    /// Base64 12-byte IV for the payload cipher
    pub iv: String,
    /// ECDSA verifier for a transaction envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_public_key: Option<EcJwk>,
    /// Ephemeral ECDH peer for a transaction envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_ecdh_public_key: Option<EcJwk>,
    /// Ephemeral ECDH peer for a ledger envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_public_key: Option<EcJwk>,
}

impl Envelope {
    /// The ephemeral public key to run ECDH against.
    pub fn ecdh_peer(&self) -> Result<&EcJwk, CryptoError> {
        self.sender_ecdh_public_key
            .as_ref()
            .or(self.receiver_public_key.as_ref())
            .ok_or_else(|| {
                CryptoError::EnvelopeMalformed("envelope carries no ECDH peer key".to_string())
            })
    }
}

/// One submission body, resolved at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubmissionInput {
    Envelope(Envelope),
    Plain(SignedLedger),
}
