use std::num::NonZeroU32;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::{Algorithm, Argon2, Params, Version};
use hmac::Hmac;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tokio::task::spawn_blocking;

use crate::settings::HasherSettings;
use crate::types::{AuthError, PasswordCredential};

/// Bytes of random salt generated per credential.
pub const SALT_LEN: usize = 16;
/// Length of the derived key stored for every account.
pub const KEY_LEN: usize = 32;
/// PBKDF2 rounds used when nothing else is configured.
pub const DEFAULT_ITERATIONS: u32 = 310_000;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KdfAlgorithm {
    Pbkdf2Sha256,
    Argon2id,
}

#[derive(Clone, Debug)]
enum Kdf {
    Pbkdf2 { rounds: u32 },
    Argon2id { params: Params },
}

/// Derives and checks salted password keys.
///
/// Derivation is deliberately slow. The async methods run it on tokio's
/// blocking pool and it always runs to completion once started.
#[derive(Clone, Debug)]
pub struct CredentialHasher {
    kdf: Kdf,
}

impl CredentialHasher {
    pub fn new(settings: &HasherSettings) -> Result<Self, AuthError> {
        let iterations = NonZeroU32::new(settings.iterations).ok_or_else(|| {
            AuthError::HashingFailure("Iteration count must be non-zero".to_string())
        })?;

        let kdf = match settings.algorithm {
            KdfAlgorithm::Pbkdf2Sha256 => Kdf::Pbkdf2 {
                rounds: iterations.get(),
            },
            KdfAlgorithm::Argon2id => Kdf::Argon2id {
                params: Params::new(
                    settings.memory_kib,
                    iterations.get(),
                    Params::DEFAULT_P_COST,
                    Some(KEY_LEN),
                )
                .map_err(|e| AuthError::HashingFailure(e.to_string()))?,
            },
        };

        Ok(Self { kdf })
    }

    /// Fresh random salt from the OS generator.
    pub fn new_salt() -> Vec<u8> {
        let mut salt = vec![0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    /// Runs the KDF on the calling thread.
    pub fn derive(&self, secret: &[u8], salt: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut key = vec![0_u8; KEY_LEN];
        match &self.kdf {
            Kdf::Pbkdf2 { rounds } => {
                pbkdf2::pbkdf2::<Hmac<Sha256>>(secret, salt, *rounds, &mut key)
                    .map_err(|e| AuthError::HashingFailure(e.to_string()))?
            }
            Kdf::Argon2id { params } => {
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
                    .hash_password_into(secret, salt, &mut key)
                    .map_err(|e| AuthError::HashingFailure(e.to_string()))?
            }
        }
        Ok(key)
    }

    #[tracing::instrument(name = "Deriving credential hash", skip_all)]
    pub async fn hash(&self, secret: &[u8], salt: &[u8]) -> Result<Vec<u8>, AuthError> {
        let hasher = self.clone();
        let secret = secret.to_vec();
        let salt = salt.to_vec();
        spawn_blocking(move || hasher.derive(&secret, &salt))
            .await
            .map_err(|e| {
                tracing::event!(target: "backend", tracing::Level::ERROR, "Hashing task failed: {}", e);
                AuthError::HashingFailure(format!("Hashing task failed: {e}"))
            })?
    }

    /// New salt and its derived key, ready to store on an account.
    pub async fn hash_new(&self, secret: &[u8]) -> Result<PasswordCredential, AuthError> {
        let salt = Self::new_salt();
        let hash = self.hash(secret, &salt).await?;
        Ok(PasswordCredential::new(hash, salt))
    }

    /// `Ok(false)` is a mismatch; `Err` means the key could not be derived at all.
    pub async fn verify(
        &self,
        secret: &[u8],
        salt: &[u8],
        expected: &[u8],
    ) -> Result<bool, AuthError> {
        let derived = self.hash(secret, salt).await?;
        Ok(constant_time_eq(&derived, expected))
    }
}

/// Equality whose running time does not depend on where the inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
