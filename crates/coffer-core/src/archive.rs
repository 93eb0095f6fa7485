//! Zip archives of directory trees.
//!
//! Archives are named `<dir>_backup_<YYYYmmdd_HHMMSS>.zip` and store entries
//! relative to the source directory's parent, so every entry starts with the
//! directory's own name.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CofferError, Result};
use crate::fs::sync_parent_dir;

/// Extension of archives produced by [`create_archive`].
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Outcome of [`create_archive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    /// Number of files stored
    pub files: usize,
    /// Size of the archive on disk
    pub bytes: u64,
    /// Symlinks and other non-regular entries that were left out
    pub skipped: usize,
}

/// Outcome of [`inspect_archive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    /// Number of entries, directories included
    pub entries: usize,
    /// Number of file entries
    pub files: usize,
}

/// Check that `path` exists and is a directory.
pub fn validate_source_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(CofferError::Validation(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(CofferError::Validation(format!(
            "Path is not a directory: {}",
            path.display()
        )));
    }
    fs::canonicalize(path).map_err(|e| CofferError::io(path, e))
}

/// Build the archive file name for `dir_name` at `timestamp`.
pub fn archive_file_name(dir_name: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_backup_{}.{}",
        dir_name,
        timestamp.format("%Y%m%d_%H%M%S"),
        ARCHIVE_EXTENSION
    )
}

/// Compress the tree under `source` into a new archive inside `backup_dir`.
///
/// `on_entry` is called with each stored entry name. The archive is synced to
/// disk before returning. Symlinks and other non-regular entries are skipped
/// with a warning, but a file that cannot be read fails the whole archive and
/// the partial archive is removed.
pub fn create_archive<F>(
    source: &Path,
    backup_dir: &Path,
    timestamp: NaiveDateTime,
    mut on_entry: F,
) -> Result<ArchiveReport>
where
    F: FnMut(&str),
{
    let source = validate_source_dir(source)?;
    fs::create_dir_all(backup_dir).map_err(|e| CofferError::io(backup_dir, e))?;
    let backup_dir = fs::canonicalize(backup_dir).map_err(|e| CofferError::io(backup_dir, e))?;

    let dir_name = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "root".to_string());
    let archive_path = backup_dir.join(archive_file_name(&dir_name, timestamp));

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&archive_path)
        .map_err(|e| CofferError::io(&archive_path, e))?;

    info!(source = %source.display(), archive = %archive_path.display(), "creating archive");
    match write_tree(file, &source, &backup_dir, &mut on_entry) {
        Ok((files, skipped)) => {
            sync_parent_dir(&archive_path)?;
            let bytes = fs::metadata(&archive_path)
                .map_err(|e| CofferError::io(&archive_path, e))?
                .len();
            info!(files, bytes, "archive complete");
            Ok(ArchiveReport {
                path: archive_path,
                files,
                bytes,
                skipped,
            })
        }
        Err(err) => {
            let _ = fs::remove_file(&archive_path);
            Err(err)
        }
    }
}

fn write_tree<F>(
    file: File,
    source: &Path,
    backup_dir: &Path,
    on_entry: &mut F,
) -> Result<(usize, usize)>
where
    F: FnMut(&str),
{
    let base = source.parent().unwrap_or(source);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(file);
    let mut files = 0;
    let mut skipped = 0;

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(backup_dir));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            CofferError::io(path, io::Error::from(e))
        })?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            warn!(path = %entry.path().display(), "skipping non-regular file");
            skipped += 1;
            continue;
        }

        let name = entry_name(base, entry.path())?;
        writer.start_file(name.as_str(), options)?;
        let mut input = File::open(entry.path()).map_err(|e| CofferError::io(entry.path(), e))?;
        io::copy(&mut input, &mut writer).map_err(|e| CofferError::io(entry.path(), e))?;
        debug!(entry = %name, "added");
        on_entry(&name);
        files += 1;
    }

    let file = writer.finish()?;
    file.sync_all()
        .map_err(|e| CofferError::Archive(format!("Archive sync failed: {}", e)))?;
    Ok((files, skipped))
}

/// Zip entry name of `path` relative to `base`, with `/` separators.
fn entry_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|_| {
        CofferError::Archive(format!("Entry outside archive root: {}", path.display()))
    })?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// Open `path` as a zip archive and count its entries.
pub fn inspect_archive(path: &Path) -> Result<ArchiveSummary> {
    let file = File::open(path).map_err(|e| CofferError::io(path, e))?;
    let mut archive = ZipArchive::new(file)?;

    let entries = archive.len();
    let mut files = 0;
    for index in 0..entries {
        if !archive.by_index(index)?.is_dir() {
            files += 1;
        }
    }

    Ok(ArchiveSummary {
        path: path.to_path_buf(),
        entries,
        files,
    })
}

/// Extract `archive_path` under `destination`, returning the number of files written.
///
/// Entries whose names would escape `destination` are skipped.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| CofferError::io(archive_path, e))?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(destination).map_err(|e| CofferError::io(destination, e))?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "skipping entry with unsafe path");
            continue;
        };
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| CofferError::io(&out_path, e))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CofferError::io(parent, e))?;
        }
        let mut output = File::create(&out_path).map_err(|e| CofferError::io(&out_path, e))?;
        io::copy(&mut entry, &mut output).map_err(|e| CofferError::io(&out_path, e))?;
        written += 1;
    }

    info!(archive = %archive_path.display(), files = written, "extracted archive");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 5)
            .unwrap()
            .and_hms_opt(14, 30, 7)
            .unwrap()
    }

    fn sample_tree(root: &Path) -> PathBuf {
        let source = root.join("photos");
        fs::create_dir_all(source.join("2025/summer")).unwrap();
        fs::write(source.join("index.txt"), b"list of albums").unwrap();
        fs::write(source.join("2025/summer/beach.raw"), vec![7u8; 4096]).unwrap();
        source
    }

    #[test]
    fn test_archive_file_name_format() {
        assert_eq!(
            archive_file_name("photos", timestamp()),
            "photos_backup_20260205_143007.zip"
        );
    }

    #[test]
    fn test_validate_source_dir_rejects_missing_and_files() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            validate_source_dir(&missing),
            Err(CofferError::Validation(_))
        ));

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        let err = validate_source_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_create_archive_stores_paths_under_dir_name() {
        let dir = tempdir().unwrap();
        let source = sample_tree(dir.path());
        let backup_dir = dir.path().join("backup");

        let mut seen = Vec::new();
        let report =
            create_archive(&source, &backup_dir, timestamp(), |name| seen.push(name.to_string()))
                .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.bytes > 0);
        assert!(report.path.ends_with("photos_backup_20260205_143007.zip"));
        assert_eq!(
            seen,
            vec!["photos/2025/summer/beach.raw", "photos/index.txt"]
        );

        let summary = inspect_archive(&report.path).unwrap();
        assert_eq!(summary.files, 2);
    }

    #[test]
    fn test_backup_dir_inside_source_is_not_archived() {
        let dir = tempdir().unwrap();
        let source = sample_tree(dir.path());
        let backup_dir = source.join("backup");

        let report = create_archive(&source, &backup_dir, timestamp(), |_| {}).unwrap();

        assert_eq!(report.files, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_fails_archive() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let source = sample_tree(dir.path());
        let locked = source.join("index.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let backup_dir = dir.path().join("backup");

        let result = create_archive(&source, &backup_dir, timestamp(), |_| {});

        // Privileged users can still read the file.
        if File::open(&locked).is_ok() {
            assert_eq!(result.unwrap().files, 2);
        } else {
            assert!(matches!(result.unwrap_err(), CofferError::Io { .. }));
            assert_eq!(fs::read_dir(&backup_dir).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_inspect_rejects_non_zip() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, b"definitely not a zip").unwrap();

        assert!(matches!(
            inspect_archive(&bogus),
            Err(CofferError::Archive(_))
        ));
    }

    #[test]
    fn test_extract_restores_tree() {
        let dir = tempdir().unwrap();
        let source = sample_tree(dir.path());
        let report = create_archive(&source, &dir.path().join("backup"), timestamp(), |_| {})
            .unwrap();

        let restore = dir.path().join("restore");
        let files = extract_archive(&report.path, &restore).unwrap();

        assert_eq!(files, 2);
        assert_eq!(
            fs::read(restore.join("photos/index.txt")).unwrap(),
            b"list of albums"
        );
        assert_eq!(
            fs::read(restore.join("photos/2025/summer/beach.raw")).unwrap(),
            vec![7u8; 4096]
        );
    }
}
