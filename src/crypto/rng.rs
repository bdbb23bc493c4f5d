use super::{IV_LEN, SALT_LEN};
use crate::error::{CryptError, Result};
use getrandom::fill;

/// Fill buffer with cryptographically secure random bytes
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|e| CryptError::Crypto(format!("OS random generator unavailable: {e}")))
}

/// Return `n` fresh random bytes
pub fn random_bytes(n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Generate IV
pub fn generate_iv() -> Result<[u8; IV_LEN]> {
    let mut iv = [0u8; IV_LEN];
    fill_random(&mut iv)?;
    Ok(iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_has_requested_length() {
        assert_eq!(random_bytes(0).unwrap().len(), 0);
        assert_eq!(random_bytes(7).unwrap().len(), 7);
        assert_eq!(random_bytes(4096).unwrap().len(), 4096);
    }

    #[test]
    fn salts_and_ivs_are_fresh() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
        assert_ne!(generate_iv().unwrap(), generate_iv().unwrap());
    }

    #[test]
    fn concurrent_callers_get_distinct_values() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| generate_salt().unwrap()))
            .collect();
        let salts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for (i, a) in salts.iter().enumerate() {
            for b in &salts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
