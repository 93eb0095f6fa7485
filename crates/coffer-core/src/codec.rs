//! Encrypting and decrypting files on disk.
//!
//! Encryption replaces `name` with `name.encrypted`. The plaintext is removed
//! only once the encrypted copy is durably on disk, so an interruption at any
//! point leaves at least one complete copy of the data.
//!
//! Decryption writes `name` (for `name.encrypted`) or `name.decrypted` and
//! never touches the encrypted source.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, Kdf};
use crate::error::{CofferError, Result};
use crate::fs::{sync_parent_dir, write_durable};

/// Suffix appended to encrypted files.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// Suffix appended when a decrypted file has no `.encrypted` suffix to strip.
pub const DECRYPTED_SUFFIX: &str = ".decrypted";

/// Outcome of [`SecureFileCodec::encrypt_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedFile {
    pub path: PathBuf,
    pub plaintext_len: u64,
    pub envelope_len: u64,
}

/// Outcome of [`SecureFileCodec::decrypt_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptedFile {
    pub path: PathBuf,
    pub plaintext_len: u64,
    /// Size of the written file as reported by the filesystem
    pub written_len: u64,
    /// Whether `written_len` matched `plaintext_len`
    pub length_verified: bool,
}

/// Encrypts and decrypts whole files with a password.
///
/// Holds only the key derivation scheme used for new envelopes; decryption
/// always follows the scheme recorded in the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureFileCodec {
    kdf: Kdf,
}

impl SecureFileCodec {
    pub fn new(kdf: Kdf) -> Self {
        Self { kdf }
    }

    pub fn kdf(&self) -> Kdf {
        self.kdf
    }

    /// Encrypt `path` into `path.encrypted` and remove `path`.
    ///
    /// If anything fails before the encrypted file is durable, `path` is left
    /// untouched and no `.encrypted` file is created.
    pub fn encrypt_file(&self, path: &Path, password: &str) -> Result<EncryptedFile> {
        let plaintext = Zeroizing::new(fs::read(path).map_err(|e| CofferError::io(path, e))?);
        debug!(path = %path.display(), bytes = plaintext.len(), "read plaintext");

        let envelope = crypto::seal(password, &plaintext, self.kdf)?;

        let target = encrypted_path_for(path);
        let envelope_len = write_durable(&target, &envelope)?;

        // The encrypted copy is on disk; only now may the source go.
        fs::remove_file(path).map_err(|e| {
            warn!(
                source = %path.display(),
                encrypted = %target.display(),
                "encrypted copy written but plaintext could not be removed"
            );
            CofferError::io(path, e)
        })?;
        if let Err(e) = sync_parent_dir(path) {
            // Source is already unlinked and the encrypted copy is durable.
            warn!(
                source = %path.display(),
                error = %e,
                "plaintext removed but directory sync failed"
            );
        }

        info!(
            source = %path.display(),
            target = %target.display(),
            kdf = self.kdf.name(),
            "encrypted file"
        );
        Ok(EncryptedFile {
            path: target,
            plaintext_len: plaintext.len() as u64,
            envelope_len,
        })
    }

    /// Decrypt `path` next to itself, leaving `path` in place.
    ///
    /// A wrong password and a damaged file both surface as
    /// [`CofferError::Integrity`], and in either case nothing is written.
    pub fn decrypt_file(&self, path: &Path, password: &str) -> Result<DecryptedFile> {
        let envelope = fs::read(path).map_err(|e| CofferError::io(path, e))?;
        debug!(path = %path.display(), bytes = envelope.len(), "read envelope");

        let plaintext = Zeroizing::new(crypto::open(password, &envelope)?);

        let target = decrypted_path_for(path);
        write_durable(&target, &plaintext)?;

        let plaintext_len = plaintext.len() as u64;
        let written_len = match fs::metadata(&target) {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!(path = %target.display(), error = %e, "could not stat decrypted file");
                0
            }
        };
        let length_verified = written_len == plaintext_len;
        if !length_verified {
            warn!(
                path = %target.display(),
                expected = plaintext_len,
                actual = written_len,
                "decrypted file size differs from decrypted length"
            );
        }

        info!(source = %path.display(), target = %target.display(), "decrypted file");
        Ok(DecryptedFile {
            path: target,
            plaintext_len,
            written_len,
            length_verified,
        })
    }
}

/// `archive.zip` -> `archive.zip.encrypted`
pub fn encrypted_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// `archive.zip.encrypted` -> `archive.zip`, anything else -> `name.decrypted`
pub fn decrypted_path_for(path: &Path) -> PathBuf {
    if let Some(stem) = path.file_name().and_then(strip_encrypted_suffix) {
        return path.with_file_name(stem);
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(DECRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// File name without `.encrypted`, or `None` if nothing would remain.
#[cfg(unix)]
fn strip_encrypted_suffix(name: &OsStr) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    name.as_bytes()
        .strip_suffix(ENCRYPTED_SUFFIX.as_bytes())
        .filter(|stem| !stem.is_empty())
        .map(|stem| OsStr::from_bytes(stem).to_os_string())
}

#[cfg(not(unix))]
fn strip_encrypted_suffix(name: &OsStr) -> Option<OsString> {
    name.to_str()?
        .strip_suffix(ENCRYPTED_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(OsString::from)
}
