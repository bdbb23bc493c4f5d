use super::{KDF_ITERATIONS, KEY_LEN, SALT_LEN};
use crate::error::{CryptError, Result};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Derive the container key from password and salt.
///
/// PBKDF2-HMAC-SHA256, [`KDF_ITERATIONS`] rounds, [`KEY_LEN`] bytes of output.
/// Same inputs always produce the same key.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    pbkdf2_sha256(password.as_bytes(), salt, KDF_ITERATIONS)
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if rounds == 0 {
        return Err(CryptError::Crypto("PBKDF2 iterations must be >= 1".into()));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::<Hmac<Sha256>>(password, salt, rounds, &mut key[..])
        .map_err(|e| CryptError::Crypto(format!("PBKDF2 failed: {e}")))?;

    Ok(key)
}
