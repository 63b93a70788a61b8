//! File encoding/decoding operations
//!
//! This module provides high-level file operations for encoding and
//! decoding files, composing the orchestration flow with the filesystem.

use crate::codec::Method;
use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use crate::flow;
use crate::password::PasswordReader;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encode a file with a method, optionally wrapping under a password
///
/// Reads text from `input_path`, encodes it with `method`, and writes the
/// result to `output_path`. When `password_reader` is provided, the encoded
/// text is additionally wrapped in a password envelope.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encode_file(
    input_path: &Path,
    output_path: &Path,
    method: Method,
    password_reader: Option<&mut dyn PasswordReader>,
) -> Result<()> {
    let text = read_text_file(input_path)?;

    let password = match password_reader {
        Some(reader) => Some(reader.read_password()?),
        None => None,
    };

    let encoded = flow::encode(method, &text, password.as_ref().map(|p| p.as_slice()))
        .map_err(|e| e.with_context("encoding failed"))?;

    write_file_secure(output_path, encoded.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decode a file with a method, unwrapping first when the input is wrapped
///
/// Reads text from `input_path`, unwraps it using a password from
/// `password_reader` if it carries the envelope marker, decodes it with
/// `method`, and writes the result to `output_path`. The reader is never
/// consulted for unwrapped input.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    method: Method,
    password_reader: &mut dyn PasswordReader,
) -> Result<()> {
    let text = read_text_file(input_path)?;

    let decoded = flow::decode(method, &text, password_reader)
        .map_err(|e| e.with_context("decoding failed"))?;

    write_file_secure(output_path, decoded.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        CryptextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("{} is not valid UTF-8 text", path.display()),
            e,
        )
    })
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                CryptextError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> CryptextError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    CryptextError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
