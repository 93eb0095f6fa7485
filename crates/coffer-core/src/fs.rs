//! Filesystem utilities for durable, atomic writes.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::{CofferError, Result};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On Windows, `fs::rename` can fail with `PermissionDenied` or `AlreadyExists`
/// when the destination is present. Only in that case is the destination
/// removed and the rename retried once. Every other failure leaves the
/// destination untouched.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        if !replace_needs_removal(&initial_err, destination) {
            let _ = fs::remove_file(temp_path);
            return Err(initial_err);
        }
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

#[cfg(windows)]
fn replace_needs_removal(err: &io::Error, destination: &Path) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::AlreadyExists
    ) && destination.is_file()
}

#[cfg(not(windows))]
fn replace_needs_removal(_err: &io::Error, _destination: &Path) -> bool {
    false
}

/// Write `data` to `path` so that it survives a crash once this returns.
///
/// The bytes go to a temp file in the destination directory, which is flushed
/// and synced before being renamed over `path`. The directory entry is synced
/// afterwards on unix. Readers never observe a half-written `path`: it either
/// holds its previous contents (or does not exist) or the complete new bytes.
///
/// Returns the number of bytes written.
pub fn write_durable(path: &Path, data: &[u8]) -> Result<u64> {
    let temp_path = temp_path_for(path)?;

    let result = write_and_sync(&temp_path, data)
        .and_then(|()| rename_with_fallback(&temp_path, path))
        .map_err(|e| CofferError::io(path, e));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result?;

    sync_parent_dir(path)?;
    debug!(path = %path.display(), bytes = data.len(), "durable write complete");
    Ok(data.len() as u64)
}

/// Sync the directory containing `path` so a rename or unlink inside it is durable.
pub fn sync_parent_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let parent = parent_dir(path);
        let dir = fs::File::open(&parent).map_err(|e| CofferError::io(&parent, e))?;
        dir.sync_all().map_err(|e| CofferError::io(&parent, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn write_and_sync(temp_path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let filename = path
        .file_name()
        .ok_or_else(|| CofferError::Validation(format!("Invalid file name: {}", path.display())))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut temp_name = OsString::from(".");
    temp_name.push(filename);
    temp_name.push(format!(".{}.tmp", nanos));
    Ok(parent_dir(path).join(temp_name))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
