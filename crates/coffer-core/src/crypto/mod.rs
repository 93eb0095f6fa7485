//! Cryptographic operations for Coffer.
//!
//! - **Key derivation**: Argon2id (default, salted) or SHA-256 (legacy, unsalted)
//! - **Cipher**: XChaCha20-Poly1305 authenticated encryption
//! - **Envelope**: header + sealed body, decryptable with the password alone
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft or tampering of an encrypted backup
//! - Offline brute-force attacks on the password (Argon2id scheme only)
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to process memory while an operation runs

pub mod cipher;
pub mod envelope;
pub mod key;
pub mod password;

pub use cipher::AuthenticatedCipher;
pub use envelope::{open, seal, EnvelopeHeader};
pub use key::{derive_argon2id, derive_sha256, DerivedKey, Kdf, KdfParams, KdfSpec};
pub use password::{validate_password, DEFAULT_MIN_PASSWORD_LENGTH};
