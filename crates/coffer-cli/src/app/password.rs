//! Reading passwords from the environment or the terminal.

use dialoguer::Password;
use secrecy::{ExposeSecret, SecretString};

use coffer_core::crypto::validate_password;

use crate::constants::PASSWORD_ENV;
use crate::errors::CliError;

fn password_from_env() -> Option<SecretString> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn no_password_error() -> anyhow::Error {
    CliError::invalid_input(format!(
        "No password provided and no TTY available. Set {}.",
        PASSWORD_ENV
    ))
    .into()
}

/// Read the password of an existing backup. Any value is accepted.
pub fn read_password(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(password) = password_from_env() {
        return Ok(password);
    }
    if !interactive {
        return Err(no_password_error());
    }
    let password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(SecretString::from(password))
}

/// Read a password for a new encrypted backup.
///
/// Enforces `min_length` and, at the terminal, asks for it twice.
pub fn read_new_password(interactive: bool, min_length: usize) -> anyhow::Result<SecretString> {
    if let Some(password) = password_from_env() {
        validate_password(password.expose_secret(), min_length)?;
        return Ok(password);
    }
    if !interactive {
        return Err(no_password_error());
    }
    let password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .validate_with(move |input: &String| -> Result<(), String> {
            validate_password(input, min_length).map_err(|e| e.to_string())
        })
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(SecretString::from(password))
}
