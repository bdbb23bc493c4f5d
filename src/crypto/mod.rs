//! Cryptographic primitives for the container format.
//!
//! Provides OS randomness, password-based key derivation and the
//! AES-256-CBC cipher engine.

pub mod cipher;
pub mod kdf;
pub mod rng;

pub use cipher::{decrypt_block, encrypt_block};
pub use kdf::derive_key;
pub use rng::{generate_iv, generate_salt, random_bytes};

/// Length of the salt (32 bytes).
pub const SALT_LEN: usize = 32;
/// Length of the initialization vector (16 bytes, one AES block).
pub const IV_LEN: usize = 16;
/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count. Changing it breaks every existing container.
pub const KDF_ITERATIONS: u32 = 10_000;
