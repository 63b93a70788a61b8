//! Encode/decode orchestration over the codec and envelope layers
//!
//! The decode side is modeled as an explicit state machine: inspecting the
//! input either yields the inner ciphertext directly or a [`PendingUnwrap`]
//! value the caller holds while a password is acquired. The pending value
//! survives failed attempts, so retrying with a different password needs no
//! state outside of it, and dropping it abandons the flow with nothing to
//! clean up.

use crate::codec::{self, Direction, Method};
use crate::envelope;
use crate::error::Result;
use crate::password::PasswordReader;

/// Encode text with a method, optionally wrapping the result under a password
pub fn encode(method: Method, text: &str, password: Option<&[u8]>) -> Result<String> {
    let ciphertext = codec::transform(method, Direction::Encode, text)?;
    match password {
        Some(password) => envelope::wrap(&ciphertext, password),
        None => Ok(ciphertext),
    }
}

/// Wrapped input held while a password is awaited
pub struct PendingUnwrap {
    envelope: String,
}

impl PendingUnwrap {
    /// The envelope text awaiting a password
    pub fn envelope(&self) -> &str {
        &self.envelope
    }

    /// Attempt to unwrap with a candidate password, returning the inner
    /// ciphertext. A failed attempt leaves `self` usable for another try.
    pub fn try_password(&self, password: &[u8]) -> Result<String> {
        envelope::unwrap(&self.envelope, password)
    }
}

/// Decode-side state after inspecting input
pub enum DecodeFlow {
    /// Input was not wrapped; the inner ciphertext is ready for decoding
    Plain(String),
    /// Input is wrapped; a password is required before decoding can continue
    AwaitingPassword(PendingUnwrap),
}

impl DecodeFlow {
    /// Inspect input for the envelope marker and return the matching state
    pub fn inspect(input: &str) -> DecodeFlow {
        if envelope::is_wrapped(input) {
            DecodeFlow::AwaitingPassword(PendingUnwrap {
                envelope: input.to_string(),
            })
        } else {
            DecodeFlow::Plain(input.to_string())
        }
    }
}

/// Decode input with a method, unwrapping first when the input is wrapped
///
/// The password reader is only consulted for wrapped input. A wrong
/// password surfaces as `AuthenticationFailed`; retrying is a caller-level
/// decision, never performed here.
pub fn decode(
    method: Method,
    input: &str,
    password_reader: &mut dyn PasswordReader,
) -> Result<String> {
    let ciphertext = match DecodeFlow::inspect(input) {
        DecodeFlow::Plain(ciphertext) => ciphertext,
        DecodeFlow::AwaitingPassword(pending) => {
            let password = password_reader.read_password()?;
            pending.try_password(&password)?
        }
    };

    codec::transform(method, Direction::Decode, &ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::password::ConstantPasswordReader;

    #[test]
    fn test_encode_plain() {
        assert_eq!(encode(Method::Caesar, "Hello", None).unwrap(), "Khoor");
    }

    #[test]
    fn test_encode_wrapped() {
        let wrapped = encode(Method::Caesar, "Hello", Some(b"pw")).unwrap();
        assert!(envelope::is_wrapped(&wrapped));
        assert_eq!(envelope::unwrap(&wrapped, b"pw").unwrap(), "Khoor");
    }

    #[test]
    fn test_decode_plain_path() {
        let mut reader = ConstantPasswordReader::new(b"unused".to_vec());
        assert_eq!(
            decode(Method::Caesar, "Khoor", &mut reader).unwrap(),
            "Hello"
        );
    }

    #[test]
    fn test_decode_wrapped_path() {
        let wrapped = encode(Method::Morse, "SOS", Some(b"pw")).unwrap();

        let mut reader = ConstantPasswordReader::new(b"pw".to_vec());
        assert_eq!(decode(Method::Morse, &wrapped, &mut reader).unwrap(), "SOS");
    }

    #[test]
    fn test_decode_wrong_password() {
        let wrapped = encode(Method::Base64, "text", Some(b"right")).unwrap();

        let mut reader = ConstantPasswordReader::new(b"wrong".to_vec());
        let err = decode(Method::Base64, &wrapped, &mut reader)
            .expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }

    #[test]
    fn test_inspect_states() {
        assert!(matches!(DecodeFlow::inspect("plain"), DecodeFlow::Plain(_)));

        let wrapped = envelope::wrap("x", b"pw").unwrap();
        assert!(matches!(
            DecodeFlow::inspect(&wrapped),
            DecodeFlow::AwaitingPassword(_)
        ));
    }

    #[test]
    fn test_pending_unwrap_survives_failed_attempt() {
        let wrapped = envelope::wrap("inner", b"right").unwrap();

        let DecodeFlow::AwaitingPassword(pending) = DecodeFlow::inspect(&wrapped) else {
            panic!("expected wrapped input to await a password");
        };

        let err = pending
            .try_password(b"wrong")
            .expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));

        // The pending value is intact; a corrected password succeeds
        assert_eq!(pending.try_password(b"right").unwrap(), "inner");
        assert_eq!(pending.envelope(), wrapped);
    }

    #[test]
    fn test_decode_invalid_inner_ciphertext() {
        let mut reader = ConstantPasswordReader::new(b"unused".to_vec());
        let err = decode(Method::Hex, "zzz", &mut reader).expect_err("expected decode failure");
        assert_eq!(err.kind, Some(ErrorKind::EncodingInvalid));
    }
}
