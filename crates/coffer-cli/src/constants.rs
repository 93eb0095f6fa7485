//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, clap usage errors)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const GENERAL: i32 = 1;

    /// Resource not found (config, source directory, backup file).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Wrong password or damaged backup.
    pub const AUTH_FAILED: i32 = 5;

    /// Reading or writing a file failed.
    pub const IO_FAILED: i32 = 6;
}

/// Environment variable holding the backup password for non-interactive use.
pub const PASSWORD_ENV: &str = "COFFER_PASSWORD";

/// Reminder shown after an encrypted backup.
pub const PASSWORD_REMINDER: &str =
    "Keep your password somewhere safe. Without it the backup cannot be recovered.";
