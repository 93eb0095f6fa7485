//! # Coffer Core
//!
//! Core library for Coffer - directory backups as zip archives, optionally
//! sealed with password-based authenticated encryption.
//!
//! This crate holds the domain logic independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, XChaCha20-Poly1305 cipher, envelope format
//! - **codec**: encrypting and decrypting files on disk with durable writes
//! - **archive**: zip creation, inspection and extraction
//! - **backup**: backup and restore workflows
//! - **fs**: atomic rename and synced writes

pub mod archive;
pub mod backup;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod fs;

pub use backup::{BackupConfig, RestoreReport};
pub use codec::SecureFileCodec;
pub use error::{CofferError, Result};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
