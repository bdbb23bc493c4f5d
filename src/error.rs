use std::{fmt, io};

/// Every failure the core can produce.
///
/// Orchestrator calls convert these into an [`Outcome`](crate::Outcome);
/// the lower-level `try_*` and in-memory functions return them directly.
#[derive(Debug)]
pub enum CryptError {
    /// Input unreadable or output unwritable.
    Io(io::Error),
    /// Buffer is not a well-formed container.
    Format(String),
    /// Key derivation, RNG or cipher setup failed inside the crypto library.
    Crypto(String),
    /// Padding check failed after decryption: wrong password or corrupted data.
    Padding,
    /// A digest comparison did not match.
    VerificationMismatch { expected: String, actual: String },
}

impl fmt::Display for CryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptError::Io(e) => write!(f, "I/O error: {e}"),
            CryptError::Format(msg) => write!(f, "invalid container: {msg}"),
            CryptError::Crypto(msg) => write!(f, "crypto error: {msg}"),
            CryptError::Padding => write!(f, "Invalid password or corrupted data"),
            CryptError::VerificationMismatch { expected, actual } => {
                write!(f, "digest mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for CryptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CryptError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CryptError {
    fn from(err: io::Error) -> Self {
        CryptError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, CryptError>;
