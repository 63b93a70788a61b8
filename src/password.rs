//! Password reading functionality

use crate::error::{CryptextError, ErrorCategory, ErrorKind, Result};
use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading passwords from various sources
pub trait PasswordReader {
    /// Read a password as arbitrary bytes (not necessarily UTF-8)
    ///
    /// Returns the password wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Returns a fixed password (for testing)
pub struct ConstantPasswordReader {
    password: Zeroizing<Vec<u8>>,
}

impl ConstantPasswordReader {
    pub fn new(password: Vec<u8>) -> Self {
        Self {
            password: Zeroizing::new(password),
        }
    }
}

impl PasswordReader for ConstantPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new((*self.password).clone()))
    }
}

/// Reads password from any io::Read source
pub struct ReaderPasswordReader {
    reader: Box<dyn Read>,
}

impl ReaderPasswordReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl PasswordReader for ReaderPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading password: {}", e),
                e,
            )
        })?;
        Ok(data)
    }
}

/// Reads password from terminal with no echo
pub struct TerminalPasswordReader;

impl TerminalPasswordReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalPasswordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordReader for TerminalPasswordReader {
    /// Read password from terminal.
    ///
    /// Note: Terminal input is limited to UTF-8 due to rpassword library constraints.
    /// For non-UTF-8 passwords, use --password-stdin instead.
    fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(CryptextError::with_kind(
                ErrorCategory::User,
                ErrorKind::PasswordUnavailable,
                "cannot read password from terminal - stdin is not a terminal",
            ));
        }

        io::stderr()
            .write_all(b"Password (cryptext): ")
            .map_err(|e| {
                CryptextError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;
        io::stderr().flush().map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to flush prompt: {}", e),
                e,
            )
        })?;

        // Read password *without echo*
        // Note: rpassword returns String (UTF-8 only), not zeroized
        let password = rpassword::read_password().map_err(|e| {
            CryptextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PasswordUnavailable,
                format!("failure reading password: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(password.into_bytes()))
    }
}

/// Wraps another PasswordReader and caches the result
///
/// Provides "at most once" semantics - the upstream reader is called
/// only on the first invocation, and subsequent calls return the cached value.
/// The cached password is wrapped in `Zeroizing` and will be securely wiped
/// when this reader is dropped.
pub struct CachingPasswordReader {
    upstream: Box<dyn PasswordReader>,
    cached: Option<Zeroizing<Vec<u8>>>,
}

impl CachingPasswordReader {
    pub fn new(upstream: Box<dyn PasswordReader>) -> Self {
        Self {
            upstream,
            cached: None,
        }
    }
}

impl PasswordReader for CachingPasswordReader {
    fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if self.cached.is_none() {
            let password = self.upstream.read_password()?;
            self.cached = Some(password);
        }
        let inner: &Vec<u8> = self.cached.as_ref().unwrap();
        Ok(Zeroizing::new(inner.clone()))
    }
}

/// Generate a fresh random password backed by `bytes` bytes of OS CSPRNG
/// entropy, encoded as base64url without padding (shell- and URL-safe).
pub fn generate_password(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, ErrorKind, CryptextError};

    #[test]
    fn test_constant_reader() {
        let mut reader = ConstantPasswordReader::new(b"test123".to_vec());
        assert_eq!(&*reader.read_password().unwrap(), b"test123");
        assert_eq!(&*reader.read_password().unwrap(), b"test123");
    }

    /// Tests the terminal reader. This is ignored by default and must be run
    /// explicitly and with human input:
    ///
    /// cargo test test_terminal_reader_interactive -- --ignored --nocapture
    #[test]
    #[ignore]
    fn test_terminal_reader_interactive() {
        let mut reader = TerminalPasswordReader::new();
        println!("\nPlease enter a test password:");
        let password = reader.read_password().unwrap();
        println!("You entered: {}", String::from_utf8_lossy(&password));
        assert!(!password.is_empty(), "Expected non-empty password");
    }

    #[test]
    fn test_reader_password_reader() {
        let data = b"mypassword";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), b"mypassword");
    }

    #[test]
    fn test_reader_password_reader_empty() {
        let data = b"";
        let mut reader = ReaderPasswordReader::new(Box::new(&data[..]));
        assert_eq!(&*reader.read_password().unwrap(), b"");
    }

    /// Verifies that ReaderPasswordReader accepts arbitrary byte sequences,
    /// not just valid UTF-8. This enables --password-stdin to work with
    /// passwords containing non-UTF-8 bytes.
    #[test]
    fn test_reader_password_reader_non_utf8() {
        let data: &[u8] = &[0xff, 0xfe, 0x00, 0x01];
        let mut reader = ReaderPasswordReader::new(Box::new(data));
        assert_eq!(&*reader.read_password().unwrap(), data);
    }

    #[test]
    fn test_caching_reader() {
        // Track how many times upstream is called
        use std::cell::RefCell;
        use std::rc::Rc;

        struct CountingReader {
            password: Vec<u8>,
            call_count: Rc<RefCell<usize>>,
        }

        impl PasswordReader for CountingReader {
            fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
                *self.call_count.borrow_mut() += 1;
                Ok(Zeroizing::new(self.password.clone()))
            }
        }

        let call_count = Rc::new(RefCell::new(0));
        let upstream = CountingReader {
            password: b"cached_pass".to_vec(),
            call_count: call_count.clone(),
        };

        let mut caching = CachingPasswordReader::new(Box::new(upstream));

        // First call should invoke upstream
        assert_eq!(&*caching.read_password().unwrap(), b"cached_pass");
        assert_eq!(*call_count.borrow(), 1);

        // Second call should return cached value without calling upstream
        assert_eq!(&*caching.read_password().unwrap(), b"cached_pass");
        assert_eq!(*call_count.borrow(), 1);

        // Third call should also use cache
        assert_eq!(&*caching.read_password().unwrap(), b"cached_pass");
        assert_eq!(*call_count.borrow(), 1);
    }

    #[test]
    fn test_caching_reader_with_error() {
        // Reader that always fails
        struct FailingReader;

        impl PasswordReader for FailingReader {
            fn read_password(&mut self) -> Result<Zeroizing<Vec<u8>>> {
                Err(CryptextError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::PasswordUnavailable,
                    "simulated error",
                ))
            }
        }

        let mut caching = CachingPasswordReader::new(Box::new(FailingReader));

        // First call should propagate error
        assert!(caching.read_password().is_err());

        // Error should not be cached - subsequent call should try again
        assert!(caching.read_password().is_err());
    }

    #[test]
    fn test_generate_password() {
        let password = generate_password(32);
        assert!(!password.is_empty());

        // base64url without padding: shell- and URL-safe
        assert!(!password.contains('='));
        assert!(!password.contains('+'));
        assert!(!password.contains('/'));

        // Fresh entropy per call
        assert_ne!(generate_password(32), generate_password(32));
    }

    #[test]
    fn test_generate_password_length() {
        // 32 random bytes encode to 43 base64 characters without padding
        assert_eq!(generate_password(32).len(), 43);
        assert_eq!(generate_password(0), "");
    }
}
