//! AES-256-CBC with PKCS#7 padding.
//!
//! CBC gives no integrity: a wrong key usually trips the padding check,
//! but may also yield garbage that happens to unpad cleanly.

use super::{IV_LEN, KEY_LEN};
use crate::error::{CryptError, Result};
use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size; every ciphertext is a positive multiple of it.
pub const BLOCK_LEN: usize = 16;

/// Encrypt plaintext
pub fn encrypt_block(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;

    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| CryptError::Crypto(format!("cipher init failed: {e}")))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt ciphertext
pub fn decrypt_block(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    check_lengths(key, iv)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptError::Padding);
    }

    let cipher = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|e| CryptError::Crypto(format!("cipher init failed: {e}")))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptError::Padding)?;
    Ok(Zeroizing::new(plaintext))
}

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != KEY_LEN {
        return Err(CryptError::Crypto(format!(
            "key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    if iv.len() != IV_LEN {
        return Err(CryptError::Crypto(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}
