//! JWK representation of P-256 keys.
//!
//! The merchant and customer front-ends run on Web Crypto, which exports
//! keys as JWKs with base64url-no-pad coordinates. This module is the
//! only place those coordinates are packed and unpacked.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use p256::{
    ecdsa::VerifyingKey,
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
    EncodedPoint, FieldBytes, PublicKey, SecretKey,
};
use serde::{Deserialize, Serialize};

use super::CryptoError;

/// An elliptic-curve key in JWK form.
///
/// `d` is present only for private keys (the bank's own keypair on disk);
/// wire-facing keys are public halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,
}

impl EcJwk {
    pub fn from_public_key(key: &PublicKey) -> Self {
        let point = key.to_encoded_point(false);
        Self {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: URL_SAFE_NO_PAD.encode(point.x().expect("uncompressed point has x")),
            y: URL_SAFE_NO_PAD.encode(point.y().expect("uncompressed point has y")),
            d: None,
            ext: Some(true),
        }
    }

    pub fn from_secret_key(key: &SecretKey) -> Self {
        let mut jwk = Self::from_public_key(&key.public_key());
        jwk.d = Some(URL_SAFE_NO_PAD.encode(key.to_bytes()));
        jwk
    }

    /// The same key with the private scalar stripped.
    pub fn public_only(&self) -> Self {
        Self {
            d: None,
            ..self.clone()
        }
    }

    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        self.check_curve()?;
        let x = self.coordinate(&self.x, "x")?;
        let y = self.coordinate(&self.y, "y")?;
        let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
        let key: Option<PublicKey> = PublicKey::from_encoded_point(&point).into();
        key.ok_or_else(|| CryptoError::InvalidKey("coordinates are not a P-256 point".to_string()))
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        Ok(VerifyingKey::from(&self.to_public_key()?))
    }

    pub fn to_secret_key(&self) -> Result<SecretKey, CryptoError> {
        self.check_curve()?;
        let d = self
            .d
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidKey("jwk carries no private scalar".to_string()))?;
        let d = self.coordinate(d, "d")?;
        SecretKey::from_bytes(&d)
            .map_err(|_| CryptoError::InvalidKey("private scalar out of range".to_string()))
    }

    fn check_curve(&self) -> Result<(), CryptoError> {
        if self.kty != "EC" || self.crv != "P-256" {
            return Err(CryptoError::InvalidKey(format!(
                "expected EC P-256 key, got {}/{}",
                self.kty, self.crv
            )));
        }
        Ok(())
    }

    fn coordinate(&self, value: &str, name: &str) -> Result<FieldBytes, CryptoError> {
        // Some exporters pad base64url; Web Crypto does not. Accept both.
        let bytes = URL_SAFE_NO_PAD
            .decode(value.trim_end_matches('='))
            .map_err(|_| CryptoError::InvalidKey(format!("jwk {name} is not base64url")))?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "jwk {name} must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(FieldBytes::clone_from_slice(&bytes))
    }
}
