use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use coffer_core::codec::{encrypted_path_for, SecureFileCodec};
use coffer_core::crypto::{Kdf, KdfParams};
use coffer_core::CofferError;

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let dirname = format!("{}_{}_{}", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(dirname);
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn fast_codec() -> SecureFileCodec {
    SecureFileCodec::new(Kdf::Argon2id(KdfParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }))
}

#[test]
fn test_hello_world_end_to_end() {
    let temp = TempDir::new("coffer_hello");
    let archive = temp.path.join("archive.zip");

    for codec in [fast_codec(), SecureFileCodec::new(Kdf::Sha256)] {
        fs::write(&archive, b"hello world").expect("write should succeed");

        let encrypted = codec
            .encrypt_file(&archive, "test1234")
            .expect("encryption should succeed");
        assert_eq!(encrypted.path, temp.path.join("archive.zip.encrypted"));
        assert!(!archive.exists());

        let wrong = codec.decrypt_file(&encrypted.path, "wrong1234");
        assert!(matches!(wrong, Err(CofferError::Integrity)));
        assert!(!archive.exists());

        let decrypted = codec
            .decrypt_file(&encrypted.path, "test1234")
            .expect("decryption should succeed");
        assert_eq!(decrypted.path, archive);
        assert_eq!(fs::read(&archive).expect("read should succeed"), b"hello world");

        fs::remove_file(&encrypted.path).expect("cleanup should succeed");
    }
}

#[test]
fn test_encrypted_file_does_not_contain_plaintext() {
    let temp = TempDir::new("coffer_no_plaintext");
    let archive = temp.path.join("archive.zip");
    fs::write(&archive, b"secret entry with marker: PLAINTEXT_MARKER_123")
        .expect("write should succeed");

    let encrypted = fast_codec()
        .encrypt_file(&archive, "test1234")
        .expect("encryption should succeed");

    let on_disk = fs::read(&encrypted.path).expect("read should succeed");
    let haystack = String::from_utf8_lossy(&on_disk);
    assert!(!haystack.contains("PLAINTEXT_MARKER_123"));
}

#[test]
fn test_decrypt_is_non_destructive() {
    let temp = TempDir::new("coffer_non_destructive");
    let archive = temp.path.join("archive.zip");
    fs::write(&archive, b"payload").expect("write should succeed");
    let encrypted = fast_codec()
        .encrypt_file(&archive, "test1234")
        .expect("encryption should succeed");
    let before = fs::read(&encrypted.path).expect("read should succeed");

    let _ = fast_codec().decrypt_file(&encrypted.path, "wrong1234");
    assert_eq!(fs::read(&encrypted.path).expect("still present"), before);

    fast_codec()
        .decrypt_file(&encrypted.path, "test1234")
        .expect("decryption should succeed");
    assert_eq!(fs::read(&encrypted.path).expect("still present"), before);
}

#[test]
fn test_decrypt_without_suffix_appends_decrypted() {
    let temp = TempDir::new("coffer_suffix");
    let archive = temp.path.join("archive.zip");
    fs::write(&archive, b"payload").expect("write should succeed");
    let encrypted = fast_codec()
        .encrypt_file(&archive, "test1234")
        .expect("encryption should succeed");
    let renamed = temp.path.join("renamed.bin");
    fs::rename(&encrypted.path, &renamed).expect("rename should succeed");

    let decrypted = fast_codec()
        .decrypt_file(&renamed, "test1234")
        .expect("decryption should succeed");

    assert_eq!(decrypted.path, temp.path.join("renamed.bin.decrypted"));
    assert!(renamed.exists());
}

#[test]
fn test_failed_encrypt_keeps_source() {
    let temp = TempDir::new("coffer_blocked_target");
    let archive = temp.path.join("archive.zip");
    fs::write(&archive, b"only copy").expect("write should succeed");

    // A non-empty directory where the encrypted copy would go.
    let blocker = encrypted_path_for(&archive);
    fs::create_dir_all(blocker.join("inner")).expect("blocker should be created");

    let err = fast_codec()
        .encrypt_file(&archive, "test1234")
        .expect_err("encryption should fail");

    assert!(matches!(err, CofferError::Io { .. }));
    assert_eq!(fs::read(&archive).expect("source kept"), b"only copy");
    assert!(blocker.join("inner").is_dir());
    let leftovers: Vec<_> = fs::read_dir(&temp.path)
        .expect("read_dir should succeed")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
