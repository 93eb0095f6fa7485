//! Key derivation from passwords.
//!
//! Two schemes are supported and recorded in every envelope header, so a file
//! always decrypts with the scheme it was sealed with:
//!
//! - **Argon2id** (default): memory-hard, with a fresh random salt per envelope.
//! - **SHA-256** (legacy): a single unsalted hash of the password. Two backups
//!   made with the same password share a key, and the scheme offers no
//!   resistance to offline guessing. Kept for compatibility with older backups
//!   and for callers that explicitly ask for it.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CofferError, Result};

/// Length of a derived key in bytes (256 bits, the XChaCha20-Poly1305 key size).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-envelope Argon2id salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// Upper bound on Argon2id memory accepted from an envelope (1 GiB).
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Upper bound on Argon2id passes accepted from an envelope.
pub const MAX_ITERATIONS: u32 = 64;

/// Upper bound on Argon2id lanes accepted from an envelope.
pub const MAX_PARALLELISM: u32 = 16;

/// A cryptographic key derived from a password.
///
/// Zeroized when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// Avoid storing or logging this value.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Number of lanes
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Check the parameters against the bounds accepted by [`derive_argon2id`].
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(CofferError::Crypto(format!(
                "Argon2 parallelism must be between 1 and {} (got {})",
                MAX_PARALLELISM, self.parallelism
            )));
        }
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(CofferError::Crypto(format!(
                "Argon2 iterations must be between 1 and {} (got {})",
                MAX_ITERATIONS, self.iterations
            )));
        }
        let min_memory = 8 * self.parallelism;
        if self.memory_kib < min_memory || self.memory_kib > MAX_MEMORY_KIB {
            return Err(CofferError::Crypto(format!(
                "Argon2 memory must be between {} and {} KiB (got {})",
                min_memory, MAX_MEMORY_KIB, self.memory_kib
            )));
        }
        Ok(())
    }
}

/// Key derivation scheme used when sealing new envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    /// Unsalted SHA-256 of the password
    Sha256,
    /// Argon2id with a random per-envelope salt
    Argon2id(KdfParams),
}

impl Default for Kdf {
    fn default() -> Self {
        Kdf::Argon2id(KdfParams::default())
    }
}

impl Kdf {
    /// Short name used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Sha256 => "sha256",
            Kdf::Argon2id(_) => "argon2id",
        }
    }
}

/// Everything needed to re-derive the key of one envelope.
///
/// This is what the envelope header carries: the scheme, and for Argon2id
/// the cost parameters and salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KdfSpec {
    Sha256,
    Argon2id {
        params: KdfParams,
        salt: [u8; SALT_LENGTH],
    },
}

impl KdfSpec {
    /// Prepare the derivation inputs for a new envelope, drawing a fresh salt if needed.
    pub fn fresh(kdf: Kdf) -> Result<Self> {
        match kdf {
            Kdf::Sha256 => Ok(KdfSpec::Sha256),
            Kdf::Argon2id(params) => {
                params.validate()?;
                let mut salt = [0u8; SALT_LENGTH];
                getrandom::getrandom(&mut salt)
                    .map_err(|e| CofferError::Crypto(format!("Failed to generate salt: {}", e)))?;
                Ok(KdfSpec::Argon2id { params, salt })
            }
        }
    }

    /// Derive the key for this envelope from `password`.
    pub fn derive(&self, password: &str) -> Result<DerivedKey> {
        match self {
            KdfSpec::Sha256 => Ok(derive_sha256(password)),
            KdfSpec::Argon2id { params, salt } => derive_argon2id(password, salt, params),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KdfSpec::Sha256 => "sha256",
            KdfSpec::Argon2id { .. } => "argon2id",
        }
    }
}

/// Derive a key as the SHA-256 digest of the password bytes.
///
/// Total on every input, the empty string included.
pub fn derive_sha256(password: &str) -> DerivedKey {
    let mut key: [u8; KEY_LENGTH] = Sha256::digest(password.as_bytes()).into();
    let derived = DerivedKey::from_bytes(key);
    key.zeroize();
    derived
}

/// Derive a key with Argon2id.
///
/// Same password, salt and parameters always produce the same key. The empty
/// password is accepted; rejecting it is the caller's policy.
pub fn derive_argon2id(
    password: &str,
    salt: &[u8; SALT_LENGTH],
    params: &KdfParams,
) -> Result<DerivedKey> {
    params.validate()?;

    let argon2_params = argon2::Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| CofferError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key_bytes)
        .map_err(|e| CofferError::Crypto(format!("Key derivation failed: {}", e)))?;

    let derived = DerivedKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    Ok(derived)
}
