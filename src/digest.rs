//! File and buffer checksums.
//!
//! Files are hashed in [`HASH_CHUNK_LEN`] pieces, so memory use does not
//! grow with file size.

use crate::error::{CryptError, Result};
use md5::Md5;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Read buffer size used when hashing files.
pub const HASH_CHUNK_LEN: usize = 64 * 1024;

/// Supported digest algorithms. Outputs are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// 128-bit MD5, for legacy checksums only.
    Md5,
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Length of the hex rendering.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(format!(
                "unknown hash algorithm '{s}' (expected md5, sha256 or sha512)"
            )),
        }
    }
}

/// What to hash.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    File(&'a Path),
    Bytes(&'a [u8]),
}

/// Digest of `source` as lowercase hex.
///
/// `None` means the file could not be opened or read, which callers should
/// treat differently from a mismatch.
pub fn digest(source: Source<'_>, algorithm: HashAlgorithm) -> Option<String> {
    match source {
        Source::Bytes(data) => Some(digest_bytes(data, algorithm)),
        Source::File(path) => match digest_file(path, algorithm) {
            Ok(hex) => Some(hex),
            Err(e) => {
                log::warn!("could not hash '{}': {e}", path.display());
                None
            }
        },
    }
}

/// Digest of an in-memory buffer.
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}

/// Streamed digest of a file.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let file = File::open(path)?;
    let hex = match algorithm {
        HashAlgorithm::Md5 => hash_reader::<Md5, _>(file)?,
        HashAlgorithm::Sha256 => hash_reader::<Sha256, _>(file)?,
        HashAlgorithm::Sha512 => hash_reader::<Sha512, _>(file)?,
    };
    Ok(hex)
}

/// Returns `true` if the digest of `source` equals `expected_hex`,
/// ignoring case. Returns `false` when the source cannot be hashed.
pub fn verify(source: Source<'_>, algorithm: HashAlgorithm, expected_hex: &str) -> bool {
    digest(source, algorithm).is_some_and(|actual| hex_eq(&actual, expected_hex))
}

/// Like [`verify`], but reports why verification failed.
///
/// # Errors
///
/// - [`CryptError::Io`] if a file source cannot be read
/// - [`CryptError::VerificationMismatch`] if the digests differ
pub fn check(source: Source<'_>, algorithm: HashAlgorithm, expected_hex: &str) -> Result<()> {
    let actual = match source {
        Source::Bytes(data) => digest_bytes(data, algorithm),
        Source::File(path) => digest_file(path, algorithm)?,
    };

    if hex_eq(&actual, expected_hex) {
        Ok(())
    } else {
        Err(CryptError::VerificationMismatch {
            expected: expected_hex.trim().to_ascii_lowercase(),
            actual,
        })
    }
}

fn hex_eq(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected.trim())
}

fn hash_reader<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; HASH_CHUNK_LEN];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn md5_of_abc() {
        assert_eq!(
            digest_bytes(b"abc", HashAlgorithm::Md5),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn sha256_of_empty_and_abc() {
        assert_eq!(digest_bytes(b"", HashAlgorithm::Sha256), EMPTY_SHA256);
        assert_eq!(
            digest_bytes(b"abc", HashAlgorithm::Sha256),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_lengths_match_algorithm() {
        for algo in [HashAlgorithm::Md5, HashAlgorithm::Sha256, HashAlgorithm::Sha512] {
            assert_eq!(digest_bytes(b"x", algo).len(), algo.hex_len());
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let a = digest(Source::Bytes(b"same input"), HashAlgorithm::Sha256);
        let b = digest(Source::Bytes(b"same input"), HashAlgorithm::Sha256);
        assert_eq!(a, b);
    }

    #[test]
    fn file_digest_matches_buffer_digest_across_chunks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data: Vec<u8> = (0..HASH_CHUNK_LEN * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        for algo in [HashAlgorithm::Md5, HashAlgorithm::Sha256, HashAlgorithm::Sha512] {
            assert_eq!(
                digest(Source::File(&path), algo),
                Some(digest_bytes(&data, algo))
            );
        }
    }

    #[test]
    fn missing_file_yields_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        assert_eq!(digest(Source::File(&path), HashAlgorithm::Sha256), None);
        assert!(!verify(Source::File(&path), HashAlgorithm::Sha256, EMPTY_SHA256));
        assert!(matches!(
            check(Source::File(&path), HashAlgorithm::Sha256, EMPTY_SHA256),
            Err(CryptError::Io(_))
        ));
    }

    #[test]
    fn verify_ignores_case() {
        let expected = digest_bytes(b"abc", HashAlgorithm::Sha256).to_uppercase();
        assert!(verify(Source::Bytes(b"abc"), HashAlgorithm::Sha256, &expected));
    }

    #[test]
    fn verify_file_against_uppercase_hex() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        assert!(verify(
            Source::File(&path),
            HashAlgorithm::Sha256,
            &EMPTY_SHA256.to_uppercase()
        ));
    }

    #[test]
    fn check_reports_mismatch() {
        let err = check(Source::Bytes(b"abc"), HashAlgorithm::Md5, "00").unwrap_err();
        match err {
            CryptError::VerificationMismatch { expected, actual } => {
                assert_eq!(expected, "00");
                assert_eq!(actual, "900150983cd24fb0d6963f7d28e17f72");
            }
            other => panic!("expected mismatch, got: {other}"),
        }
    }

    #[test]
    fn algorithms_parse_case_insensitively() {
        assert_eq!("MD5".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Md5));
        assert_eq!("sha-256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!("Sha512".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha512));
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }
}
