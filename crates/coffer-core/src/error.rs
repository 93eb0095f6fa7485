//! Error types for Coffer core operations.
//!
//! Errors are typed at the core level so callers can tell an unreadable file
//! apart from a wrong password without matching on message text. The CLI layer
//! maps these to exit codes and user-facing hints.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Coffer operations.
pub type Result<T> = std::result::Result<T, CofferError>;

/// Core error type for Coffer operations.
#[derive(Debug, Error)]
pub enum CofferError {
    /// Wrong password, or the envelope was corrupted, truncated or tampered with.
    ///
    /// The two causes are deliberately reported the same way.
    #[error("Integrity check failed: wrong password or corrupted file")]
    Integrity,

    /// A path did not exist or was not the expected kind of filesystem object
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key derivation could not be configured
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// The archive could not be written or read
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CofferError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CofferError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the password was wrong or the data was damaged.
    pub fn is_integrity(&self) -> bool {
        matches!(self, CofferError::Integrity)
    }
}

impl From<zip::result::ZipError> for CofferError {
    fn from(err: zip::result::ZipError) -> Self {
        CofferError::Archive(err.to_string())
    }
}
