//! Cryptographic core of the settlement service.
//!
//! Everything the bank needs to open merchant envelopes and verify
//! customer-signed ledgers: SHA-256 hashing, the canonical transaction
//! encoding the hashes are computed over, ECDSA-P256 verification, the
//! ECDH + HKDF + AES-GCM envelope unwrap, and the bank's long-lived
//! keypair. Public-key material crosses these module boundaries only in
//! JWK form; concrete curve types stay internal.

use thiserror::Error;

pub mod canonical;
pub mod envelope;
pub mod jwk;
pub mod keys;
pub mod primitives;

/// Errors raised by the crypto layer.
///
/// A signature failure and a GCM tag failure are deliberately distinct:
/// the first means a party signed something else, the second means the
/// ciphertext or key is wrong. Within decryption we do not distinguish
/// key mismatch from corruption.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("envelope malformed: {0}")]
    EnvelopeMalformed(String),

    #[error("decryption failed: wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("encryption failed")]
    EncryptFailed,

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("canonical form error: {0}")]
    CanonicalForm(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("key store io: {0}")]
    KeyStore(#[from] std::io::Error),
}
