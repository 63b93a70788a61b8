//! Classical text-encoding methods
//!
//! Each method is a pure, stateless transform over text. Encoding always
//! succeeds; decoding fails with `EncodingInvalid` when the input is not a
//! valid encoding of the expected scheme. The envelope layer never depends
//! on anything in this module.

use std::fmt;
use std::str::FromStr;

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Caesar shift distance. Fixed; not a user-facing parameter.
const CAESAR_SHIFT: u8 = 3;

/// Identifier of an encoding method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Caesar,
    Atbash,
    Rot13,
    Reverse,
    Base64,
    Hex,
    Binary,
    Morse,
}

impl Method {
    /// All supported methods, in display order
    pub const ALL: [Method; 8] = [
        Method::Caesar,
        Method::Atbash,
        Method::Rot13,
        Method::Reverse,
        Method::Base64,
        Method::Hex,
        Method::Binary,
        Method::Morse,
    ];

    /// The lowercase name the method parses from and displays as
    pub fn name(self) -> &'static str {
        match self {
            Method::Caesar => "caesar",
            Method::Atbash => "atbash",
            Method::Rot13 => "rot13",
            Method::Reverse => "reverse",
            Method::Base64 => "base64",
            Method::Hex => "hex",
            Method::Binary => "binary",
            Method::Morse => "morse",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = CryptextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "caesar" => Ok(Method::Caesar),
            "atbash" => Ok(Method::Atbash),
            "rot13" => Ok(Method::Rot13),
            "reverse" => Ok(Method::Reverse),
            "base64" => Ok(Method::Base64),
            "hex" => Ok(Method::Hex),
            "binary" => Ok(Method::Binary),
            "morse" => Ok(Method::Morse),
            _ => Err(CryptextError::with_kind(
                ErrorCategory::User,
                ErrorKind::UnknownMethod,
                format!("unknown encoding method '{}'", s),
            )),
        }
    }
}

/// Direction of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Apply a method to text in the given direction
pub fn transform(method: Method, direction: Direction, text: &str) -> Result<String> {
    match (method, direction) {
        (Method::Caesar, Direction::Encode) => Ok(shift_letters(text, CAESAR_SHIFT)),
        (Method::Caesar, Direction::Decode) => Ok(shift_letters(text, 26 - CAESAR_SHIFT)),
        (Method::Atbash, _) => Ok(atbash(text)),
        (Method::Rot13, _) => Ok(shift_letters(text, 13)),
        (Method::Reverse, _) => Ok(text.chars().rev().collect()),
        (Method::Base64, Direction::Encode) => Ok(STANDARD.encode(text.as_bytes())),
        (Method::Base64, Direction::Decode) => base64_decode(text),
        (Method::Hex, Direction::Encode) => Ok(hex_encode(text)),
        (Method::Hex, Direction::Decode) => hex_decode(text),
        (Method::Binary, Direction::Encode) => Ok(binary_encode(text)),
        (Method::Binary, Direction::Decode) => binary_decode(text),
        (Method::Morse, Direction::Encode) => Ok(morse_encode(text)),
        (Method::Morse, Direction::Decode) => morse_decode(text),
    }
}

/// Shift ASCII letters forward by `shift` positions, wrapping within the
/// alphabet and preserving case. Non-letters pass through unchanged.
fn shift_letters(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a' + shift) % 26) + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A' + shift) % 26) + b'A') as char,
            _ => c,
        })
        .collect()
}

/// Mirror ASCII letters across the alphabet (A↔Z, B↔Y, ...). Self-inverse.
fn atbash(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (b'z' - (c as u8 - b'a')) as char,
            'A'..='Z' => (b'Z' - (c as u8 - b'A')) as char,
            _ => c,
        })
        .collect()
}

fn base64_decode(text: &str) -> Result<String> {
    let bytes = STANDARD.decode(text).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::EncodingInvalid,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })?;
    utf8_text(bytes, "base64")
}

fn hex_encode(text: &str) -> String {
    text.bytes().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode(text: &str) -> Result<String> {
    if text.len() % 2 != 0 {
        return Err(invalid("hex input has odd length"));
    }

    let mut bytes = Vec::with_capacity(text.len() / 2);
    let mut digits = text.chars();
    while let Some(hi) = digits.next() {
        // Even length was checked above, so a low digit always follows
        let lo = digits.next().ok_or_else(|| {
            CryptextError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                "hex digit pairing broke despite even input length",
            )
        })?;
        let hi = hi
            .to_digit(16)
            .ok_or_else(|| invalid(format!("'{}' is not a hex digit", hi)))?;
        let lo = lo
            .to_digit(16)
            .ok_or_else(|| invalid(format!("'{}' is not a hex digit", lo)))?;
        bytes.push((hi * 16 + lo) as u8);
    }

    utf8_text(bytes, "hex")
}

fn binary_encode(text: &str) -> String {
    text.bytes()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn binary_decode(text: &str) -> Result<String> {
    let mut bytes = Vec::new();
    for group in text.split_whitespace() {
        if group.len() != 8 || !group.chars().all(|c| c == '0' || c == '1') {
            return Err(invalid(format!(
                "'{}' is not an 8-bit binary group",
                group
            )));
        }
        let byte = u8::from_str_radix(group, 2)
            .map_err(|e| invalid(format!("binary group '{}' failed to parse: {}", group, e)))?;
        bytes.push(byte);
    }
    utf8_text(bytes, "binary")
}

/// ITU morse code for letters and digits
const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
];

/// Encode text as morse. Letters are separated by single spaces, words by
/// `/`. Characters with no morse representation are dropped, keeping
/// encoding total over arbitrary input.
fn morse_encode(text: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for c in text.chars() {
        if c == ' ' {
            tokens.push("/");
            continue;
        }
        let upper = c.to_ascii_uppercase();
        if let Some(&(_, code)) = MORSE_TABLE.iter().find(|(ch, _)| *ch == upper) {
            tokens.push(code);
        }
    }
    tokens.join(" ")
}

fn morse_decode(text: &str) -> Result<String> {
    let mut out = String::new();
    for token in text.split_whitespace() {
        if token == "/" {
            out.push(' ');
            continue;
        }
        let c = MORSE_TABLE
            .iter()
            .find(|(_, code)| *code == token)
            .map(|(c, _)| *c)
            .ok_or_else(|| invalid(format!("'{}' is not a morse token", token)))?;
        out.push(c);
    }
    Ok(out)
}

fn utf8_text(bytes: Vec<u8>, scheme: &str) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::EncodingInvalid,
            format!("decoded {} is not valid UTF-8 text", scheme),
            e,
        )
    })
}

fn invalid(msg: impl Into<String>) -> CryptextError {
    CryptextError::with_kind(ErrorCategory::User, ErrorKind::EncodingInvalid, msg)
}
