//! Password policy for choosing new backup passwords.
//!
//! The cipher layer accepts any password. This policy is applied by callers
//! when a user picks a password to encrypt with, never when decrypting.

use crate::error::{CofferError, Result};

/// Default minimum password length in characters.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 4;

/// Validate a newly chosen password.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At least `min_length` characters long
///
/// # Examples
///
/// ```
/// use coffer_core::crypto::validate_password;
///
/// assert!(validate_password("test1234", 4).is_ok());
/// assert!(validate_password("abc", 4).is_err());
/// ```
pub fn validate_password(password: &str, min_length: usize) -> Result<()> {
    if password.trim().is_empty() {
        return Err(CofferError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < min_length {
        return Err(CofferError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            min_length, length
        )));
    }

    Ok(())
}
