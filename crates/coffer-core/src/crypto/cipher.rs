//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Sealed format (binary):
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! The caller supplies associated data that is authenticated but not
//! encrypted; the envelope uses its header for this.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};

use crate::crypto::key::DerivedKey;
use crate::error::{CofferError, Result};

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Bytes added by [`AuthenticatedCipher::encrypt`] on top of the plaintext.
pub const SEAL_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// A key bound to the AEAD construction.
pub struct AuthenticatedCipher {
    cipher: XChaCha20Poly1305,
}

impl AuthenticatedCipher {
    pub fn new(key: &DerivedKey) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    ///
    /// Returns `[nonce][ciphertext][tag]`, exactly [`SEAL_OVERHEAD`] bytes
    /// longer than the plaintext.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| CofferError::Crypto(format!("Failed to generate nonce: {}", e)))?;
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| CofferError::Crypto(format!("Encryption failed: {}", e)))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Verify and decrypt `[nonce][ciphertext][tag]`.
    ///
    /// Nothing is returned unless the tag verifies. A wrong key, altered
    /// bytes, altered `aad` or truncation all yield [`CofferError::Integrity`].
    pub fn decrypt(&self, sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < SEAL_OVERHEAD {
            return Err(CofferError::Integrity);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = XNonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CofferError::Integrity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::derive_sha256;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = AuthenticatedCipher::new(&derive_sha256("test1234"));
        let sealed = cipher.encrypt(b"hello world", b"header").unwrap();
        assert_eq!(sealed.len(), b"hello world".len() + SEAL_OVERHEAD);

        let opened = cipher.decrypt(&sealed, b"header").unwrap();
        assert_eq!(opened, b"hello world");
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let cipher = AuthenticatedCipher::new(&derive_sha256("test1234"));
        let sealed = cipher.encrypt(b"", b"").unwrap();
        assert_eq!(sealed.len(), SEAL_OVERHEAD);
        assert!(cipher.decrypt(&sealed, b"").unwrap().is_empty());
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let cipher = AuthenticatedCipher::new(&derive_sha256("test1234"));
        let a = cipher.encrypt(b"same", b"").unwrap();
        let b = cipher.encrypt(b"same", b"").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let sealed = AuthenticatedCipher::new(&derive_sha256("test1234"))
            .encrypt(b"secret", b"")
            .unwrap();
        let result = AuthenticatedCipher::new(&derive_sha256("wrong1234")).decrypt(&sealed, b"");
        assert!(matches!(result, Err(CofferError::Integrity)));
    }

    #[test]
    fn test_decrypt_wrong_aad() {
        let cipher = AuthenticatedCipher::new(&derive_sha256("test1234"));
        let sealed = cipher.encrypt(b"secret", b"header-a").unwrap();
        assert!(matches!(
            cipher.decrypt(&sealed, b"header-b"),
            Err(CofferError::Integrity)
        ));
    }

    #[test]
    fn test_decrypt_truncated() {
        let cipher = AuthenticatedCipher::new(&derive_sha256("test1234"));
        let sealed = cipher.encrypt(b"secret", b"").unwrap();

        assert!(matches!(
            cipher.decrypt(&sealed[..sealed.len() - 1], b""),
            Err(CofferError::Integrity)
        ));
        assert!(matches!(
            cipher.decrypt(&sealed[..NONCE_SIZE], b""),
            Err(CofferError::Integrity)
        ));
    }
}
