//! Password-based file encryption and checksum verification.
//!
//! Files are sealed into a small container (`PWSEAL | salt | IV | ciphertext`)
//! using PBKDF2-HMAC-SHA256 and AES-256-CBC. The container carries no
//! authentication tag: decrypting with a wrong password can produce garbage
//! instead of an error, so pair decryption with a digest check
//! ([`decrypt_file_checked`]) when correctness matters.

pub mod crypto;
pub mod digest;
mod error;
pub mod format;
pub mod notify;
pub mod storage;

pub use crate::digest::{HashAlgorithm, Source};
pub use crate::error::{CryptError, Result};
pub use crate::notify::{Event, LogNotifier, Notifier, Operation, Stage};

use crate::format::Container;
use crate::notify::emit;
use std::fmt;
use std::path::Path;
use zeroize::Zeroizing;

/// Result of an orchestrator call: a success flag and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    success: bool,
    message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Expected digest of the recovered plaintext.
#[derive(Debug, Clone)]
pub struct DigestCheck {
    pub algorithm: HashAlgorithm,
    pub expected: String,
}

impl DigestCheck {
    pub fn new(algorithm: HashAlgorithm, expected: impl Into<String>) -> Self {
        Self {
            algorithm,
            expected: expected.into(),
        }
    }
}

/// Encrypt plaintext into a serialized container with fresh salt and IV.
pub fn encrypt_to_vec(plaintext: &[u8], password: Zeroizing<String>) -> Result<Vec<u8>> {
    encrypt_with_notifier(plaintext, password, None)
}

/// Parse a container and decrypt it.
///
/// A wrong password yields [`CryptError::Padding`] or, rarely, garbage bytes.
pub fn decrypt_to_vec(data: &[u8], password: Zeroizing<String>) -> Result<Zeroizing<Vec<u8>>> {
    decrypt_with_notifier(data, password, None)
}

/// Encrypt `input` into a container at `output`.
///
/// Returns the number of plaintext bytes sealed.
pub fn try_encrypt_file(
    input: &Path,
    output: &Path,
    password: Zeroizing<String>,
    notifier: Option<&dyn Notifier>,
) -> Result<u64> {
    let op = Operation::Encrypt;

    stage(notifier, op, Stage::Reading);
    let plaintext = storage::read_all(input)?;

    let container = encrypt_with_notifier(&plaintext, password, notifier)?;

    stage(notifier, op, Stage::Writing);
    storage::write_atomic(output, &container)?;

    Ok(plaintext.len() as u64)
}

/// Decrypt the container at `input` into `output`.
///
/// Returns the number of plaintext bytes recovered.
pub fn try_decrypt_file(
    input: &Path,
    output: &Path,
    password: Zeroizing<String>,
    check: Option<&DigestCheck>,
    notifier: Option<&dyn Notifier>,
) -> Result<u64> {
    let op = Operation::Decrypt;

    stage(notifier, op, Stage::Reading);
    let data = storage::read_all(input)?;

    let plaintext = decrypt_with_notifier(&data, password, notifier)?;

    if let Some(check) = check {
        stage(notifier, op, Stage::Verifying);
        digest::check(Source::Bytes(&plaintext), check.algorithm, &check.expected)?;
    }

    stage(notifier, op, Stage::Writing);
    storage::write_atomic(output, &plaintext)?;

    Ok(plaintext.len() as u64)
}

/// Encrypt a file, reporting the result as an [`Outcome`].
///
/// On failure `output` is not created, or left untouched if it exists.
pub fn encrypt_file(
    input: &Path,
    output: &Path,
    password: Zeroizing<String>,
    notifier: Option<&dyn Notifier>,
) -> Outcome {
    let result = try_encrypt_file(input, output, password, notifier);
    finish(Operation::Encrypt, input, output, result, notifier)
}

/// Decrypt a file, reporting the result as an [`Outcome`].
///
/// Success only means the padding was valid, not that the password was right.
pub fn decrypt_file(
    input: &Path,
    output: &Path,
    password: Zeroizing<String>,
    notifier: Option<&dyn Notifier>,
) -> Outcome {
    decrypt_file_checked(input, output, password, None, notifier)
}

/// Decrypt a file and, if `check` is given, require the plaintext digest to
/// match before anything is written.
pub fn decrypt_file_checked(
    input: &Path,
    output: &Path,
    password: Zeroizing<String>,
    check: Option<&DigestCheck>,
    notifier: Option<&dyn Notifier>,
) -> Outcome {
    let result = try_decrypt_file(input, output, password, check, notifier);
    finish(Operation::Decrypt, input, output, result, notifier)
}

fn encrypt_with_notifier(
    plaintext: &[u8],
    password: Zeroizing<String>,
    notifier: Option<&dyn Notifier>,
) -> Result<Vec<u8>> {
    let op = Operation::Encrypt;

    let salt = crypto::generate_salt()?;
    let iv = crypto::generate_iv()?;

    stage(notifier, op, Stage::DerivingKey);
    let key = crypto::derive_key(&password, &salt)?;
    drop(password);

    stage(notifier, op, Stage::Transforming);
    let ciphertext = crypto::encrypt_block(plaintext, key.as_slice(), &iv)?;

    Ok(format::serialize(&Container::new(salt, iv, ciphertext)))
}

fn decrypt_with_notifier(
    data: &[u8],
    password: Zeroizing<String>,
    notifier: Option<&dyn Notifier>,
) -> Result<Zeroizing<Vec<u8>>> {
    let op = Operation::Decrypt;

    let container = format::parse(data)?;

    stage(notifier, op, Stage::DerivingKey);
    let key = crypto::derive_key(&password, container.salt())?;
    drop(password);

    stage(notifier, op, Stage::Transforming);
    crypto::decrypt_block(container.ciphertext(), key.as_slice(), container.iv())
}

fn stage(notifier: Option<&dyn Notifier>, operation: Operation, stage: Stage) {
    emit(notifier, Event::Stage { operation, stage });
}

fn finish(
    operation: Operation,
    input: &Path,
    output: &Path,
    result: Result<u64>,
    notifier: Option<&dyn Notifier>,
) -> Outcome {
    let outcome = match result {
        Ok(bytes) => Outcome::ok(format!(
            "{operation}ed '{}' -> '{}' ({bytes} bytes)",
            input.display(),
            output.display()
        )),
        Err(e) => Outcome::failed(format!(
            "failed to {operation} '{}': {e}",
            input.display()
        )),
    };

    emit(
        notifier,
        Event::Finished {
            operation,
            outcome: &outcome,
        },
    );
    outcome
}
