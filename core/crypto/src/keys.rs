//! Key material and public per-operation parameters.
//!
//! Derived keys zeroize their memory on drop so that no key outlives the
//! operation that created it, including on error paths.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::random::random_array;
use strongbox_common::{Error, Result};

/// Length of derived keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key-derivation salts in bytes.
pub const SALT_LENGTH: usize = 16;

/// Length of CBC initialization vectors in bytes.
pub const IV_LENGTH: usize = 16;

/// Length of HMAC-SHA-256 authentication tags in bytes.
pub const TAG_LENGTH: usize = 32;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Key derived from a passphrase and salt.
///
/// Not `Clone`: each key has exactly one owner and is wiped when that
/// owner goes out of scope.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a derived key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Salt for key derivation. Public; travels with the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a fresh random salt.
    pub fn generate() -> Result<Self> {
        Ok(Self(random_array()?))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let salt = bytes.try_into().map_err(|_| {
            Error::Decode(format!(
                "Invalid salt length: expected {}, got {}",
                SALT_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(salt))
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

/// CBC initialization vector. Public; never reused for a second encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LENGTH]);

impl Iv {
    /// Generate a fresh random IV.
    pub fn generate() -> Result<Self> {
        Ok(Self(random_array()?))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; IV_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let iv = bytes.try_into().map_err(|_| {
            Error::Decode(format!(
                "Invalid IV length: expected {}, got {}",
                IV_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(iv))
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LENGTH] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_generate() {
        let salt1 = Salt::generate().unwrap();
        let salt2 = Salt::generate().unwrap();

        // Random salts should be different
        assert_ne!(salt1.as_bytes(), salt2.as_bytes());
    }

    #[test]
    fn test_iv_generate() {
        let iv1 = Iv::generate().unwrap();
        let iv2 = Iv::generate().unwrap();

        assert_ne!(iv1.as_bytes(), iv2.as_bytes());
    }

    #[test]
    fn test_salt_from_slice_checks_length() {
        assert!(Salt::from_slice(&[7u8; SALT_LENGTH]).is_ok());

        let err = Salt::from_slice(&[7u8; 15]).unwrap_err();
        assert_eq!(err.kind(), strongbox_common::ErrorKind::Decode);
    }

    #[test]
    fn test_iv_from_slice_checks_length() {
        assert!(Iv::from_slice(&[1u8; IV_LENGTH]).is_ok());
        assert!(Iv::from_slice(&[1u8; 17]).is_err());
    }

    #[test]
    fn test_derived_key_debug_is_redacted() {
        let key = DerivedKey::from_bytes([0xAB; KEY_LENGTH]);
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "DerivedKey([REDACTED])");
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn test_derived_key_zeroize() {
        let mut key = DerivedKey::from_bytes([0xAB; KEY_LENGTH]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LENGTH]);
    }
}
