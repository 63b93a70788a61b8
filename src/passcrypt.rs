//! Password-based sealing using PBKDF2 + AES-256-GCM
//!
//! This module implements the v1 cryptographic primitive layer:
//! - PBKDF2-HMAC-SHA256 for key derivation from a password
//! - AES-256-GCM for authenticated encryption
//!
//! The parameters below are part of the v1 wire format and must stay
//! identical on the seal and open sides. Changing any of them requires a
//! new envelope version token.

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

/// Length of salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Derive a 32-byte key from a password and salt using PBKDF2-HMAC-SHA256
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypt plaintext with a password using the provided salt and nonce
///
/// Returns the ciphertext with the 16-byte GCM authentication tag appended.
/// Salt and nonce generation is the caller's responsibility; they must be
/// fresh, uniform random draws for every seal operation.
pub fn seal(
    password: &[u8],
    plaintext: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new(&key.into());

    let sealed = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| {
            CryptextError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                "encryption failed",
            )
        })?;

    Ok(sealed)
}

/// Decrypt sealed data with a password using the provided salt and nonce
///
/// Tag verification failure is reported as a single unified condition; the
/// caller cannot tell a wrong password apart from tampered or corrupted
/// data.
pub fn open(
    password: &[u8],
    sealed: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt);
    let cipher = Aes256Gcm::new(&key.into());

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            CryptextError::with_kind(
                ErrorCategory::User,
                ErrorKind::AuthenticationFailed,
                "corrupt input, tampered-with data, or bad password",
            )
        })?;

    Ok(plaintext)
}
