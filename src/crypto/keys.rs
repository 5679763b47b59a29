//! Bank keypair management.
//!
//! Exactly one long-lived ECDH-P256 keypair, persisted as a JSON file with
//! both halves in JWK form. Loaded once at startup and read-only for the
//! process lifetime; rotation is manual (delete the file, restart).

use std::fs;
use std::path::{Path, PathBuf};

use p256::SecretKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{jwk::EcJwk, CryptoError};

#[derive(Serialize, Deserialize)]
struct KeyFile {
    private_key_jwk: EcJwk,
    public_key_jwk: EcJwk,
}

/// Holder of the bank's ECDH keypair.
pub struct KeyManager {
    secret: SecretKey,
    public_jwk: EcJwk,
    path: PathBuf,
}

impl KeyManager {
    /// Load the keypair from `path`, or generate and persist a new one.
    pub fn load_or_generate(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let path = path.as_ref();

        if path.exists() {
            let raw = fs::read_to_string(path)?;
            let file: KeyFile = serde_json::from_str(&raw)
                .map_err(|e| CryptoError::InvalidKey(format!("unreadable key file: {e}")))?;
            let secret = file.private_key_jwk.to_secret_key()?;
            info!(path = %path.display(), "Loaded bank ECDH keypair");
            return Ok(Self {
                secret,
                public_jwk: file.public_key_jwk,
                path: path.to_path_buf(),
            });
        }

        let secret = SecretKey::random(&mut OsRng);
        let private_key_jwk = EcJwk::from_secret_key(&secret);
        let public_key_jwk = private_key_jwk.public_only();

        let file = KeyFile {
            private_key_jwk,
            public_key_jwk: public_key_jwk.clone(),
        };
        let serialized = serde_json::to_string_pretty(&file)
            .map_err(|e| CryptoError::InvalidKey(format!("key serialization: {e}")))?;
        fs::write(path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %path.display(), "Generated new bank ECDH keypair");
        Ok(Self {
            secret,
            public_jwk: public_key_jwk,
            path: path.to_path_buf(),
        })
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// The bank's public key, ready to hand to merchants.
    pub fn public_jwk(&self) -> &EcJwk {
        &self.public_jwk
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
