//! Encrypted envelope open/seal.
//!
//! Wire format, fixed by the Web Crypto clients:
//!
//! - `encrypted_aes_key`: base64 of `wrap_iv (12) || GCM(wrapped 32-byte
//!   inner key + tag)`, wrapped under HKDF-SHA256(ECDH shared secret).
//! - `encrypted_payload`: base64 GCM ciphertext of the JSON payload under
//!   the inner key and the envelope's separate `iv`.
//!
//! Key mismatch and ciphertext corruption are indistinguishable by design;
//! both surface as `DecryptFailed`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use p256::SecretKey;
use rand::{rngs::OsRng, RngCore};

use super::{
    jwk::EcJwk,
    primitives::{self, AES_KEY_LEN, GCM_IV_LEN},
    CryptoError,
};
use crate::models::ledger::Envelope;

/// Open an envelope addressed to `private_key`, returning the UTF-8
/// plaintext. The caller parses it into its structured form.
pub fn open_envelope(envelope: &Envelope, private_key: &SecretKey) -> Result<String, CryptoError> {
    let peer = envelope.ecdh_peer()?;

    let wrapped = STANDARD.decode(&envelope.encrypted_aes_key).map_err(|_| {
        CryptoError::EnvelopeMalformed("encrypted_aes_key is not base64".to_string())
    })?;
    if wrapped.len() < GCM_IV_LEN {
        return Err(CryptoError::EnvelopeMalformed(
            "encrypted_aes_key too short to carry an IV".to_string(),
        ));
    }
    let (wrap_iv, wrapped_key) = wrapped.split_at(GCM_IV_LEN);

    let shared = primitives::ecdh_shared_secret(private_key, peer)?;
    let wrapping_key = primitives::derive_wrapping_key(&shared);
    let inner_key = primitives::aes_gcm_decrypt(&wrapping_key, wrap_iv, wrapped_key)?;
    let inner_key: [u8; AES_KEY_LEN] = inner_key
        .try_into()
        .map_err(|_| CryptoError::DecryptFailed)?;

    let payload = STANDARD.decode(&envelope.encrypted_payload).map_err(|_| {
        CryptoError::EnvelopeMalformed("encrypted_payload is not base64".to_string())
    })?;
    let iv = STANDARD
        .decode(&envelope.iv)
        .map_err(|_| CryptoError::EnvelopeMalformed("iv is not base64".to_string()))?;
    if iv.len() != GCM_IV_LEN {
        return Err(CryptoError::EnvelopeMalformed(format!(
            "iv must be {GCM_IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let plaintext = primitives::aes_gcm_decrypt(&inner_key, &iv, &payload)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::EnvelopeMalformed("payload is not UTF-8".to_string()))
}

/// Sealing sibling of [`open_envelope`]: encrypt `plaintext` to a
/// recipient's ECDH public key under a fresh ephemeral keypair.
pub fn seal_envelope(plaintext: &str, recipient: &EcJwk) -> Result<Envelope, CryptoError> {
    let ephemeral = SecretKey::random(&mut OsRng);
    let shared = primitives::ecdh_shared_secret(&ephemeral, recipient)?;
    let wrapping_key = primitives::derive_wrapping_key(&shared);

    let mut inner_key = [0u8; AES_KEY_LEN];
    let mut wrap_iv = [0u8; GCM_IV_LEN];
    let mut payload_iv = [0u8; GCM_IV_LEN];
    OsRng.fill_bytes(&mut inner_key);
    OsRng.fill_bytes(&mut wrap_iv);
    OsRng.fill_bytes(&mut payload_iv);

    let wrapped_key = primitives::aes_gcm_encrypt(&wrapping_key, &wrap_iv, &inner_key)?;
    let mut wrapped = Vec::with_capacity(GCM_IV_LEN + wrapped_key.len());
    wrapped.extend_from_slice(&wrap_iv);
    wrapped.extend_from_slice(&wrapped_key);

    let ciphertext = primitives::aes_gcm_encrypt(&inner_key, &payload_iv, plaintext.as_bytes())?;

    Ok(Envelope {
        encrypted_payload: STANDARD.encode(ciphertext),
        encrypted_aes_key: STANDARD.encode(wrapped),
        iv: STANDARD.encode(payload_iv),
        sender_public_key: None,
        sender_ecdh_public_key: None,
        receiver_public_key: Some(EcJwk::from_public_key(&ephemeral.public_key())),
    })
}
