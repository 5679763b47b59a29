//! Hashing, signature verification, key agreement and AEAD.
//!
//! Interop constraints drive every choice here: the clients are Web Crypto,
//! so signatures arrive as fixed-width P1363 `r || s` (never DER), ECDH
//! yields the raw X coordinate, and the wrapping key is HKDF-SHA256 with an
//! empty salt and the literal info string `aes-key-wrapping`.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use p256::{
    ecdh::diffie_hellman,
    ecdsa::{signature::Verifier, Signature},
    SecretKey,
};
use sha2::{Digest, Sha256};

use super::{jwk::EcJwk, CryptoError};

pub const AES_KEY_LEN: usize = 32;
pub const GCM_IV_LEN: usize = 12;
pub const P1363_SIG_LEN: usize = 64;

const WRAP_INFO: &[u8] = b"aes-key-wrapping";

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of a UTF-8 string, hex encoded. This is the form hashes take
/// everywhere on the wire.
pub fn sha256_hex(data: &str) -> String {
    hex::encode(sha256(data.as_bytes()))
}

/// Verify an ECDSA-P256-SHA256 signature in P1363 form.
///
/// `message` is hashed internally, matching Web Crypto's `ECDSA` verify:
/// the clients sign the raw transaction-hash bytes as the message. DER
/// signatures are rejected outright; accepting them would silently fork
/// the signature format between client and server.
pub fn ecdsa_verify(key: &EcJwk, signature: &[u8], message: &[u8]) -> Result<(), CryptoError> {
    if signature.len() != P1363_SIG_LEN {
        return Err(CryptoError::SignatureInvalid);
    }
    let verifying = key.to_verifying_key()?;
    let signature = Signature::from_slice(signature).map_err(|_| CryptoError::SignatureInvalid)?;
    verifying
        .verify(message, &signature)
        .map_err(|_| CryptoError::SignatureInvalid)
}

/// ECDH over P-256, returning the raw X coordinate of the shared point.
pub fn ecdh_shared_secret(
    private: &SecretKey,
    peer: &EcJwk,
) -> Result<[u8; AES_KEY_LEN], CryptoError> {
    let peer = peer.to_public_key()?;
    let shared = diffie_hellman(private.to_nonzero_scalar(), peer.as_affine());
    let mut out = [0u8; AES_KEY_LEN];
    out.copy_from_slice(shared.raw_secret_bytes());
    Ok(out)
}

/// Derive the 32-byte AES wrapping key from an ECDH shared secret.
pub fn derive_wrapping_key(shared_secret: &[u8]) -> [u8; AES_KEY_LEN] {
    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut okm = [0u8; AES_KEY_LEN];
    hk.expand(WRAP_INFO, &mut okm)
        .expect("32 bytes is a valid hkdf-sha256 output length");
    okm
}

/// AES-256-GCM decrypt. The ciphertext carries the 16-byte tag at the end.
pub fn aes_gcm_decrypt(
    key: &[u8; AES_KEY_LEN],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != GCM_IV_LEN {
        return Err(CryptoError::DecryptFailed);
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::DecryptFailed)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::DecryptFailed)
}

/// Encrypting sibling of [`aes_gcm_decrypt`].
pub fn aes_gcm_encrypt(
    key: &[u8; AES_KEY_LEN],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != GCM_IV_LEN {
        return Err(CryptoError::EncryptFailed);
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::EncryptFailed)?;
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| CryptoError::EncryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::{signature::Signer, SigningKey};
    use rand::{rngs::OsRng, RngCore};

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ecdsa_sign_verify_round_trip() {
        let signing = SigningKey::random(&mut OsRng);
        let jwk = EcJwk::from_public_key(&signing.verifying_key().into());
        let message = sha256(b"a transaction hash");

        let signature: Signature = signing.sign(&message);
        let raw = signature.to_bytes();
        assert_eq!(raw.len(), P1363_SIG_LEN);

        assert!(ecdsa_verify(&jwk, &raw, &message).is_ok());
    }

    #[test]
    fn ecdsa_rejects_wrong_message() {
        let signing = SigningKey::random(&mut OsRng);
        let jwk = EcJwk::from_public_key(&signing.verifying_key().into());
        let signature: Signature = signing.sign(b"original");
        assert!(matches!(
            ecdsa_verify(&jwk, &signature.to_bytes(), b"tampered"),
            Err(CryptoError::SignatureInvalid)
        ));
    }

    #[test]
    fn ecdsa_rejects_der_encoding() {
        let signing = SigningKey::random(&mut OsRng);
        let jwk = EcJwk::from_public_key(&signing.verifying_key().into());
        let message = b"message";
        let signature: Signature = signing.sign(message);

        let der = signature.to_der();
        assert!(matches!(
            ecdsa_verify(&jwk, der.as_bytes(), message),
            Err(CryptoError::SignatureInvalid)
        ));
    }

    #[test]
    fn ecdsa_rejects_wrong_key() {
        let signing = SigningKey::random(&mut OsRng);
        let other = SigningKey::random(&mut OsRng);
        let jwk = EcJwk::from_public_key(&other.verifying_key().into());
        let signature: Signature = signing.sign(b"message");
        assert!(ecdsa_verify(&jwk, &signature.to_bytes(), b"message").is_err());
    }

    #[test]
    fn ecdh_is_symmetric() {
        let a = SecretKey::random(&mut OsRng);
        let b = SecretKey::random(&mut OsRng);
        let a_jwk = EcJwk::from_public_key(&a.public_key());
        let b_jwk = EcJwk::from_public_key(&b.public_key());

        let ab = ecdh_shared_secret(&a, &b_jwk).unwrap();
        let ba = ecdh_shared_secret(&b, &a_jwk).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn wrapping_key_is_deterministic() {
        let secret = [7u8; 32];
        assert_eq!(derive_wrapping_key(&secret), derive_wrapping_key(&secret));
        assert_ne!(derive_wrapping_key(&secret), derive_wrapping_key(&[8u8; 32]));
    }

    #[test]
    fn gcm_round_trip() {
        let mut key = [0u8; AES_KEY_LEN];
        let mut iv = [0u8; GCM_IV_LEN];
        OsRng.fill_bytes(&mut key);
        OsRng.fill_bytes(&mut iv);

        let sealed = aes_gcm_encrypt(&key, &iv, b"ledger payload").unwrap();
        assert_eq!(sealed.len(), b"ledger payload".len() + 16);
        let opened = aes_gcm_decrypt(&key, &iv, &sealed).unwrap();
        assert_eq!(opened, b"ledger payload");
    }

    #[test]
    fn gcm_rejects_tampered_ciphertext() {
        let key = [1u8; AES_KEY_LEN];
        let iv = [2u8; GCM_IV_LEN];
        let mut sealed = aes_gcm_encrypt(&key, &iv, b"payload").unwrap();
        sealed[0] ^= 0xff;
        assert!(matches!(
            aes_gcm_decrypt(&key, &iv, &sealed),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn gcm_rejects_wrong_key() {
        let key = [1u8; AES_KEY_LEN];
        let iv = [2u8; GCM_IV_LEN];
        let sealed = aes_gcm_encrypt(&key, &iv, b"payload").unwrap();
        let wrong = [9u8; AES_KEY_LEN];
        assert!(aes_gcm_decrypt(&wrong, &iv, &sealed).is_err());
    }

    #[test]
    fn gcm_rejects_bad_iv_length() {
        let key = [1u8; AES_KEY_LEN];
        assert!(aes_gcm_decrypt(&key, &[0u8; 8], b"too short").is_err());
    }
}
