//! Versioned password envelope for wrapped ciphertext
//!
//! Serializes the output of the password-based sealing layer as a single
//! line of text:
//!
//! ```text
//! ENC-PASS:v1|base64(salt:16B)|base64(nonce:12B)|base64(ciphertext+tag)
//! ```
//!
//! The marker prefix both signals "this string is wrapped" and selects the
//! parsing path; any string not beginning with the marker is plain
//! (unwrapped) text. The format is byte-for-byte stable across
//! implementations; changing fields or parameters requires a new version
//! token in the marker.

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use crate::passcrypt::{self, NONCE_LEN, SALT_LEN};
use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use base64::{Engine, engine::general_purpose::STANDARD};

/// Version 1 marker, including the delimiter that ends it
pub const MARKER: &str = "ENC-PASS:v1|";

/// Delimiter between the three base64 fields
const FIELD_DELIMITER: char = '|';

/// Returns true iff `s` begins with the exact envelope marker
///
/// Callers use this to decide whether a password is needed before handing
/// text to an encoding method. It is a format check, not a validity check;
/// a wrapped-looking string may still fail to unwrap.
pub fn is_wrapped(s: &str) -> bool {
    s.starts_with(MARKER)
}

/// Wrap plaintext under a password, returning the serialized envelope
///
/// Salt and nonce are fresh, independent draws from the OS CSPRNG on every
/// call, so wrapping identical inputs twice yields different envelopes.
/// Both unwrap to the same plaintext under the same password.
pub fn wrap(plaintext: &str, password: &[u8]) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    wrap_deterministic(plaintext, password, &salt, &nonce)
}

/// Wrap plaintext under a password using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `wrap()` which
/// generates random salt/nonce.
pub fn wrap_deterministic(
    plaintext: &str,
    password: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<String> {
    let sealed = passcrypt::seal(password, plaintext.as_bytes(), salt, nonce)?;

    Ok(format!(
        "{}{}{}{}{}{}",
        MARKER,
        STANDARD.encode(salt),
        FIELD_DELIMITER,
        STANDARD.encode(nonce),
        FIELD_DELIMITER,
        STANDARD.encode(&sealed)
    ))
}

/// Unwrap a serialized envelope, returning the original plaintext
pub fn unwrap(envelope: &str, password: &[u8]) -> Result<String> {
    let Some(body) = envelope.strip_prefix(MARKER) else {
        return Err(CryptextError::with_kind(
            ErrorCategory::User,
            ErrorKind::NotWrapped,
            "input does not begin with the envelope marker",
        ));
    };

    let fields: Vec<&str> = body.split(FIELD_DELIMITER).collect();
    if fields.len() != 3 {
        return Err(malformed(format!(
            "expected exactly three envelope fields, found {}",
            fields.len()
        )));
    }

    let salt_bytes = decode_field(fields[0], "salt")?;
    let salt: [u8; SALT_LEN] = salt_bytes.try_into().map_err(|v: Vec<u8>| {
        malformed(format!("salt must be {} bytes, got {}", SALT_LEN, v.len()))
    })?;

    let nonce_bytes = decode_field(fields[1], "nonce")?;
    let nonce: [u8; NONCE_LEN] = nonce_bytes.try_into().map_err(|v: Vec<u8>| {
        malformed(format!("nonce must be {} bytes, got {}", NONCE_LEN, v.len()))
    })?;

    let sealed = decode_field(fields[2], "ciphertext")?;

    let plaintext = passcrypt::open(password, &sealed, &salt, &nonce)?;

    String::from_utf8(plaintext).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "authenticated payload is not valid UTF-8",
            e,
        )
    })
}

fn decode_field(field: &str, name: &str) -> Result<Vec<u8>> {
    STANDARD.decode(field).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            format!("base64 decoding of {} failed: {}", name, e),
            e,
        )
    })
}

fn malformed(msg: String) -> CryptextError {
    CryptextError::with_kind(ErrorCategory::User, ErrorKind::MalformedEnvelope, msg)
}
