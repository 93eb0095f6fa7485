//! Backup workflows built from the archive and codec layers.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::archive::{create_archive, inspect_archive, ArchiveReport, ARCHIVE_EXTENSION};
use crate::codec::{DecryptedFile, EncryptedFile, SecureFileCodec};
use crate::error::{CofferError, Result};

/// Where backups are written.
///
/// Passed explicitly to every workflow; there is no process-wide default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub backup_dir: PathBuf,
}

impl BackupConfig {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }
}

/// Outcome of [`encrypted_backup`].
#[derive(Debug, Clone, Serialize)]
pub struct EncryptedBackup {
    pub archive: ArchiveReport,
    pub encrypted: EncryptedFile,
}

/// What the decrypted payload turned out to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveCheck {
    /// The payload is a readable zip archive
    Valid { entries: usize, files: usize },
    /// The payload has a `.zip` name but could not be read as one
    Corrupted { reason: String },
    /// The payload is not named like an archive and was not inspected
    NotAnArchive,
}

/// Outcome of [`restore_backup`].
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub decrypted: DecryptedFile,
    pub archive: ArchiveCheck,
}

/// Archive `source` into the backup directory.
pub fn simple_backup<F>(config: &BackupConfig, source: &Path, on_entry: F) -> Result<ArchiveReport>
where
    F: FnMut(&str),
{
    create_archive(source, &config.backup_dir, Local::now().naive_local(), on_entry)
}

/// Archive `source`, then encrypt the archive in place.
///
/// If encryption fails the plaintext archive is left where it was written,
/// and the error is returned.
pub fn encrypted_backup<F>(
    config: &BackupConfig,
    codec: &SecureFileCodec,
    source: &Path,
    password: &str,
    on_entry: F,
) -> Result<EncryptedBackup>
where
    F: FnMut(&str),
{
    let archive = simple_backup(config, source, on_entry)?;
    let encrypted = codec.encrypt_file(&archive.path, password).map_err(|err| {
        if archive.path.exists() {
            warn!(
                archive = %archive.path.display(),
                "encryption failed; plaintext archive left in place"
            );
        } else {
            warn!(
                archive = %archive.path.display(),
                "encryption failed after the plaintext archive was removed"
            );
        }
        err
    })?;
    info!(path = %encrypted.path.display(), "encrypted backup complete");
    Ok(EncryptedBackup { archive, encrypted })
}

/// Decrypt an encrypted backup and check the recovered archive.
pub fn restore_backup(
    codec: &SecureFileCodec,
    path: &Path,
    password: &str,
) -> Result<RestoreReport> {
    if !path.exists() {
        return Err(CofferError::Validation(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(CofferError::Validation(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }

    let decrypted = codec.decrypt_file(path, password)?;
    let archive = check_archive(&decrypted.path);
    Ok(RestoreReport { decrypted, archive })
}

fn check_archive(path: &Path) -> ArchiveCheck {
    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false);
    if !is_zip {
        return ArchiveCheck::NotAnArchive;
    }
    match inspect_archive(path) {
        Ok(summary) => ArchiveCheck::Valid {
            entries: summary.entries,
            files: summary.files,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "recovered archive is unreadable");
            ArchiveCheck::Corrupted {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Kdf, KdfParams};
    use std::fs;
    use tempfile::tempdir;

    fn codec() -> SecureFileCodec {
        SecureFileCodec::new(Kdf::Argon2id(KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }))
    }

    fn sample_source(root: &Path) -> PathBuf {
        let source = root.join("documents");
        fs::create_dir_all(source.join("taxes")).unwrap();
        fs::write(source.join("taxes/2025.pdf"), b"%PDF-1.7 not really").unwrap();
        fs::write(source.join("notes.md"), b"# notes").unwrap();
        source
    }

    #[test]
    fn test_simple_backup_creates_backup_dir() {
        let dir = tempdir().unwrap();
        let source = sample_source(dir.path());
        let config = BackupConfig::new(dir.path().join("Desktop").join("backup"));

        let report = simple_backup(&config, &source, |_| {}).unwrap();

        assert!(config.backup_dir.is_dir());
        assert!(report.path.exists());
        let name = report.path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("documents_backup_"));
        assert!(name.ends_with(".zip"));
    }

    #[test]
    fn test_failed_encryption_keeps_plaintext_archive() {
        let dir = tempdir().unwrap();
        let source = sample_source(dir.path());
        let config = BackupConfig::new(dir.path().join("backup"));
        let broken = SecureFileCodec::new(Kdf::Argon2id(KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 0,
        }));

        assert!(encrypted_backup(&config, &broken, &source, "test1234", |_| {}).is_err());

        let names: Vec<String> = fs::read_dir(&config.backup_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".zip"));
    }

    #[test]
    fn test_simple_backup_rejects_file_source() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.txt");
        fs::write(&file, b"x").unwrap();
        let config = BackupConfig::new(dir.path().join("backup"));

        let err = simple_backup(&config, &file, |_| {}).unwrap_err();

        assert!(matches!(err, CofferError::Validation(_)));
        assert!(!config.backup_dir.exists());
    }

    #[test]
    fn test_encrypted_backup_then_restore() {
        let dir = tempdir().unwrap();
        let source = sample_source(dir.path());
        let config = BackupConfig::new(dir.path().join("backup"));

        let backup = encrypted_backup(&config, &codec(), &source, "test1234", |_| {}).unwrap();
        assert!(!backup.archive.path.exists());
        assert!(backup.encrypted.path.exists());

        let restored = restore_backup(&codec(), &backup.encrypted.path, "test1234").unwrap();
        assert_eq!(restored.decrypted.path, backup.archive.path);
        assert_eq!(
            restored.archive,
            ArchiveCheck::Valid {
                entries: 2,
                files: 2
            }
        );
        assert!(backup.encrypted.path.exists());
    }

    #[test]
    fn test_restore_wrong_password_is_integrity_error() {
        let dir = tempdir().unwrap();
        let source = sample_source(dir.path());
        let config = BackupConfig::new(dir.path().join("backup"));
        let backup = encrypted_backup(&config, &codec(), &source, "test1234", |_| {}).unwrap();

        let err = restore_backup(&codec(), &backup.encrypted.path, "wrong1234").unwrap_err();

        assert!(err.is_integrity());
        assert!(!backup.archive.path.exists());
    }

    #[test]
    fn test_restore_flags_corrupted_zip_payload() {
        let dir = tempdir().unwrap();
        let payload = dir.path().join("fake.zip");
        fs::write(&payload, b"not a zip at all").unwrap();
        let encrypted = codec().encrypt_file(&payload, "test1234").unwrap();

        let restored = restore_backup(&codec(), &encrypted.path, "test1234").unwrap();

        assert!(matches!(restored.archive, ArchiveCheck::Corrupted { .. }));
    }

    #[test]
    fn test_restore_non_zip_payload_is_not_inspected() {
        let dir = tempdir().unwrap();
        let payload = dir.path().join("notes.txt");
        fs::write(&payload, b"plain notes").unwrap();
        let encrypted = codec().encrypt_file(&payload, "test1234").unwrap();

        let restored = restore_backup(&codec(), &encrypted.path, "test1234").unwrap();

        assert_eq!(restored.archive, ArchiveCheck::NotAnArchive);
        assert_eq!(fs::read(&payload).unwrap(), b"plain notes");
    }

    #[test]
    fn test_restore_missing_or_directory_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.zip.encrypted");
        assert!(matches!(
            restore_backup(&codec(), &missing, "pw"),
            Err(CofferError::Validation(_))
        ));
        assert!(matches!(
            restore_backup(&codec(), dir.path(), "pw"),
            Err(CofferError::Validation(_))
        ));
    }
}
