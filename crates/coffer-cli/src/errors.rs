//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes so scripts can tell a wrong
//! password from a missing file.

use std::fmt;

use coffer_core::CofferError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, source directory, backup file)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Pick the exit code for an error bubbling out of a command handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    match err.downcast_ref::<CofferError>() {
        Some(CofferError::Integrity) => exit_codes::AUTH_FAILED,
        Some(CofferError::Validation(_)) | Some(CofferError::InvalidInput(_)) => {
            exit_codes::INVALID_INPUT
        }
        Some(CofferError::Io { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            exit_codes::NOT_FOUND
        }
        Some(CofferError::Io { .. }) => exit_codes::IO_FAILED,
        _ => exit_codes::GENERAL,
    }
}

/// Split an error into its message and an optional hint.
///
/// Hints embedded as a trailing "Hint:" line win; otherwise one is picked from
/// the error's type.
pub fn describe_error(err: &anyhow::Error) -> (String, Option<String>) {
    let message = err.to_string();
    if let Some(idx) = message.find("\nHint:") {
        let (head, tail) = message.split_at(idx);
        let hint = tail.trim().trim_start_matches("Hint:").trim();
        return (head.trim_end().to_string(), Some(hint.to_string()));
    }
    (message, contextual_hint(err))
}

fn contextual_hint(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<CofferError>()? {
        CofferError::Integrity => Some(
            "Check the password. If it is right, the file was damaged or is not a coffer backup."
                .to_string(),
        ),
        CofferError::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => {
            Some("Check the permissions of the file and its folder.".to_string())
        }
        CofferError::Crypto(_) => {
            Some("Review the [crypto] section with `coffer config show`.".to_string())
        }
        _ => None,
    }
}
