//! Secure types for holding credential material.
//!
//! Credential files are arbitrary bytes (certificates, keys, passwords), so the
//! in-memory representation is a byte buffer that never prints its contents
//! and is wiped when dropped.

use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Credentials keyed by secret name (the file name in the secrets directory).
pub type CredentialMap = HashMap<String, SecretBytes>;

/// A byte buffer that redacts its contents in Debug and Display.
///
/// - Debug output shows `SecretBytes([REDACTED; n bytes])`
/// - Display output shows `[REDACTED]`
/// - **Memory is securely zeroed when dropped** (via `zeroize` crate)
///
/// # Example
///
/// ```rust
/// use mqtrigger::secrets::SecretBytes;
///
/// let secret = SecretBytes::from("s3cr3t");
/// assert_eq!(format!("{}", secret), "[REDACTED]");
/// assert_eq!(secret.expose_secret(), b"s3cr3t");
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    /// Creates a new SecretBytes from raw bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret bytes.
    ///
    /// Only call this where the value is actually consumed (TLS setup,
    /// authentication handshakes). Never log the result.
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }

    /// Exposes the secret as UTF-8 text, if it is valid UTF-8.
    pub fn expose_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {} bytes])", self.0.len())
    }
}

impl fmt::Display for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretBytes {}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for SecretBytes {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}
