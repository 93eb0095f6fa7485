//! Self-describing ciphertext envelope.
//!
//! Layout (integers big-endian):
//! ```text
//! magic    "COFR"              4 bytes
//! version  0x01                1 byte
//! kdf      0x01 sha256         1 byte
//!          0x02 argon2id
//! [argon2id only]
//!   memory_kib u32, iterations u32, parallelism u32, salt [16]
//! sealed   nonce || ciphertext || tag
//! ```
//!
//! The header bytes are the associated data of the seal, so changing the
//! scheme, the cost parameters or the salt breaks authentication just like
//! changing the ciphertext does. Decrypting needs only the envelope and the
//! password.

use tracing::debug;

use crate::crypto::cipher::{AuthenticatedCipher, SEAL_OVERHEAD};
use crate::crypto::key::{Kdf, KdfParams, KdfSpec, SALT_LENGTH};
use crate::error::{CofferError, Result};

/// Leading bytes of every envelope.
pub const MAGIC: &[u8; 4] = b"COFR";

/// Current envelope format version.
pub const FORMAT_VERSION: u8 = 1;

const KDF_SHA256: u8 = 0x01;
const KDF_ARGON2ID: u8 = 0x02;

const PREFIX_LEN: usize = MAGIC.len() + 2;
const ARGON2_FIELDS_LEN: usize = 12 + SALT_LENGTH;

/// Largest header any supported scheme produces.
pub const MAX_HEADER_LEN: usize = PREFIX_LEN + ARGON2_FIELDS_LEN;

/// Upper bound on the size difference between an envelope and its plaintext.
pub const MAX_OVERHEAD: usize = MAX_HEADER_LEN + SEAL_OVERHEAD;

/// Parsed envelope header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub kdf: KdfSpec,
}

impl EnvelopeHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAX_HEADER_LEN);
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        match &self.kdf {
            KdfSpec::Sha256 => out.push(KDF_SHA256),
            KdfSpec::Argon2id { params, salt } => {
                out.push(KDF_ARGON2ID);
                out.extend_from_slice(&params.memory_kib.to_be_bytes());
                out.extend_from_slice(&params.iterations.to_be_bytes());
                out.extend_from_slice(&params.parallelism.to_be_bytes());
                out.extend_from_slice(salt);
            }
        }
        out
    }

    /// Parse a header from the front of `bytes`, returning it with its length.
    ///
    /// Anything unrecognised is reported as [`CofferError::Integrity`]: a
    /// damaged header is just another form of damaged envelope.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < PREFIX_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(CofferError::Integrity);
        }
        if bytes[MAGIC.len()] != FORMAT_VERSION {
            debug!(version = bytes[MAGIC.len()], "unsupported envelope version");
            return Err(CofferError::Integrity);
        }

        match bytes[MAGIC.len() + 1] {
            KDF_SHA256 => Ok((
                Self {
                    kdf: KdfSpec::Sha256,
                },
                PREFIX_LEN,
            )),
            KDF_ARGON2ID => {
                let fields = bytes
                    .get(PREFIX_LEN..PREFIX_LEN + ARGON2_FIELDS_LEN)
                    .ok_or(CofferError::Integrity)?;
                let params = KdfParams {
                    memory_kib: read_u32(&fields[0..4]),
                    iterations: read_u32(&fields[4..8]),
                    parallelism: read_u32(&fields[8..12]),
                };
                // Refuse to spend unbounded memory on a hostile header.
                params.validate().map_err(|_| CofferError::Integrity)?;
                let mut salt = [0u8; SALT_LENGTH];
                salt.copy_from_slice(&fields[12..]);
                Ok((
                    Self {
                        kdf: KdfSpec::Argon2id { params, salt },
                    },
                    PREFIX_LEN + ARGON2_FIELDS_LEN,
                ))
            }
            other => {
                debug!(kdf = other, "unknown key derivation id");
                Err(CofferError::Integrity)
            }
        }
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

/// Encrypt `plaintext` into a self-contained envelope keyed by `password`.
pub fn seal(password: &str, plaintext: &[u8], kdf: Kdf) -> Result<Vec<u8>> {
    let header = EnvelopeHeader {
        kdf: KdfSpec::fresh(kdf)?,
    };
    let key = header.kdf.derive(password)?;
    let header_bytes = header.to_bytes();

    let sealed = AuthenticatedCipher::new(&key).encrypt(plaintext, &header_bytes)?;

    let mut envelope = Vec::with_capacity(header_bytes.len() + sealed.len());
    envelope.extend_from_slice(&header_bytes);
    envelope.extend_from_slice(&sealed);
    debug!(
        kdf = header.kdf.name(),
        plaintext_len = plaintext.len(),
        envelope_len = envelope.len(),
        "sealed envelope"
    );
    Ok(envelope)
}

/// Verify and decrypt an envelope produced by [`seal`].
pub fn open(password: &str, envelope: &[u8]) -> Result<Vec<u8>> {
    let (header, header_len) = EnvelopeHeader::parse(envelope)?;
    let key = header.kdf.derive(password)?;
    let (header_bytes, sealed) = envelope.split_at(header_len);
    AuthenticatedCipher::new(&key).decrypt(sealed, header_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_kdf() -> Kdf {
        Kdf::Argon2id(KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hello_world_round_trip() {
        for kdf in [Kdf::Sha256, fast_kdf()] {
            let envelope = seal("test1234", b"hello world", kdf).unwrap();
            assert_eq!(open("test1234", &envelope).unwrap(), b"hello world");
            assert!(matches!(
                open("wrong1234", &envelope),
                Err(CofferError::Integrity)
            ));
        }
    }

    #[test]
    fn test_overhead_is_bounded() {
        let sha = seal("pw", b"payload", Kdf::Sha256).unwrap();
        assert_eq!(sha.len(), b"payload".len() + PREFIX_LEN + SEAL_OVERHEAD);

        let argon = seal("pw", b"payload", fast_kdf()).unwrap();
        assert_eq!(argon.len(), b"payload".len() + MAX_OVERHEAD);
    }

    #[test]
    fn test_header_round_trip() {
        let header = EnvelopeHeader {
            kdf: KdfSpec::Argon2id {
                params: KdfParams::default(),
                salt: [9u8; SALT_LENGTH],
            },
        };
        let bytes = header.to_bytes();
        let (parsed, len) = EnvelopeHeader::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(len, MAX_HEADER_LEN);
    }

    #[test]
    fn test_bad_magic_is_integrity_error() {
        let mut envelope = seal("pw", b"data", Kdf::Sha256).unwrap();
        envelope[0] = b'X';
        assert!(matches!(open("pw", &envelope), Err(CofferError::Integrity)));
    }

    #[test]
    fn test_unknown_version_and_kdf_rejected() {
        let mut envelope = seal("pw", b"data", Kdf::Sha256).unwrap();
        envelope[4] = 9;
        assert!(matches!(open("pw", &envelope), Err(CofferError::Integrity)));

        let mut envelope = seal("pw", b"data", Kdf::Sha256).unwrap();
        envelope[5] = 0x7f;
        assert!(matches!(open("pw", &envelope), Err(CofferError::Integrity)));
    }

    #[test]
    fn test_hostile_memory_cost_rejected_before_derivation() {
        let mut envelope = seal("pw", b"data", fast_kdf()).unwrap();
        envelope[PREFIX_LEN..PREFIX_LEN + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(open("pw", &envelope), Err(CofferError::Integrity)));
    }

    #[test]
    fn test_changed_scheme_fails_authentication() {
        // Same password, but the header now claims a different salt.
        let mut envelope = seal("pw", b"data", fast_kdf()).unwrap();
        envelope[PREFIX_LEN + 12] ^= 0x01;
        assert!(matches!(open("pw", &envelope), Err(CofferError::Integrity)));
    }

    #[test]
    fn test_truncated_envelopes_rejected() {
        let envelope = seal("pw", b"data", fast_kdf()).unwrap();
        for len in [0, 3, PREFIX_LEN, PREFIX_LEN + 5, MAX_HEADER_LEN + 10] {
            assert!(matches!(
                open("pw", &envelope[..len]),
                Err(CofferError::Integrity)
            ));
        }
    }
}
