//! Container file format.
//!
//! ```text
//! MAGIC (6) | SALT (32) | IV (16) | CIPHERTEXT
//! ```
//!
//! Fixed-width fields, no length prefixes; the ciphertext runs to the end
//! of the buffer. The format has no version byte, so any incompatible
//! change must use a new magic tag.

use crate::crypto::{IV_LEN, SALT_LEN};
use crate::error::{CryptError, Result};

/// Magic bytes identifying a container ("PWSEAL").
pub const MAGIC: &[u8; MAGIC_LEN] = b"PWSEAL";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 6;
/// Bytes preceding the ciphertext; also the minimum container length.
pub const HEADER_LEN: usize = MAGIC_LEN + SALT_LEN + IV_LEN;

/// A parsed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    salt: [u8; SALT_LEN],
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl Container {
    pub fn new(salt: [u8; SALT_LEN], iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            salt,
            iv,
            ciphertext,
        }
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Total serialized length.
    pub fn len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

/// Returns `true` if `data` starts with the container magic.
pub fn is_container(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Parses a container.
///
/// # Errors
///
/// Returns [`CryptError::Format`] if:
/// - The buffer is shorter than [`HEADER_LEN`]
/// - The magic bytes are invalid
pub fn parse(data: &[u8]) -> Result<Container> {
    if data.len() < HEADER_LEN {
        return Err(CryptError::Format(format!(
            "too short: {} bytes, need at least {HEADER_LEN}",
            data.len()
        )));
    }

    if !is_container(data) {
        return Err(CryptError::Format("invalid magic".into()));
    }

    let mut offset = MAGIC_LEN;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[offset..offset + SALT_LEN]);
    offset += SALT_LEN;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&data[offset..offset + IV_LEN]);
    offset += IV_LEN;

    Ok(Container::new(salt, iv, data[offset..].to_vec()))
}

/// Serializes a container to bytes.
pub fn serialize(container: &Container) -> Vec<u8> {
    let mut buf = Vec::with_capacity(container.len());

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&container.salt);
    buf.extend_from_slice(&container.iv);
    buf.extend_from_slice(&container.ciphertext);

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_lays_out_fields_in_order() {
        let container = Container::new([1u8; SALT_LEN], [2u8; IV_LEN], vec![3u8; 5]);
        let bytes = serialize(&container);

        assert_eq!(bytes.len(), 54 + 5);
        assert_eq!(&bytes[..6], MAGIC);
        assert!(bytes[6..38].iter().all(|&b| b == 1));
        assert!(bytes[38..54].iter().all(|&b| b == 2));
        assert_eq!(&bytes[54..], &[3u8; 5]);
    }

    #[test]
    fn parse_recovers_fields() {
        let container = Container::new([9u8; SALT_LEN], [8u8; IV_LEN], b"ciphertext".to_vec());
        let parsed = parse(&serialize(&container)).unwrap();

        assert_eq!(parsed.salt(), &[9u8; SALT_LEN]);
        assert_eq!(parsed.iv(), &[8u8; IV_LEN]);
        assert_eq!(parsed.ciphertext(), b"ciphertext");
    }

    #[test]
    fn header_only_container_has_empty_ciphertext() {
        let mut data = vec![0u8; HEADER_LEN];
        data[..MAGIC_LEN].copy_from_slice(MAGIC);

        let parsed = parse(&data).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn invalid_magic_fails() {
        let mut data = vec![0u8; 100];
        data[..6].copy_from_slice(b"FAILED");

        assert!(matches!(parse(&data), Err(CryptError::Format(_))));
    }

    #[test]
    fn magic_differing_in_last_byte_fails() {
        let mut data = vec![0u8; 100];
        data[..6].copy_from_slice(b"PWSEAM");

        assert!(matches!(parse(&data), Err(CryptError::Format(_))));
    }

    #[test]
    fn too_short_fails() {
        let mut data = vec![0u8; HEADER_LEN - 1];
        data[..MAGIC_LEN].copy_from_slice(MAGIC);

        assert!(matches!(parse(&data), Err(CryptError::Format(_))));
        assert!(matches!(parse(&[]), Err(CryptError::Format(_))));
    }

    #[test]
    fn is_container_sniffs_magic() {
        assert!(is_container(b"PWSEAL and more"));
        assert!(!is_container(b"PWSEA"));
        assert!(!is_container(b"hello world"));
    }
}
