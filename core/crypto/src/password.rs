//! Password hashing for credential storage.
//!
//! Stored format, base-64 encoded: `SALT(16) | HASH(32)`.
//!
//! Verification is total: any stored value that cannot be decoded or has
//! the wrong length is reported as "no match", the same answer as a wrong
//! password.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::compare::fixed_time_eq;
use crate::kdf::{derive_key, KdfParams};
use crate::keys::{Salt, KEY_LENGTH, SALT_LENGTH};
use strongbox_common::{Error, Result};

/// Length of the stored hash in bytes.
pub const HASH_LENGTH: usize = KEY_LENGTH;

/// Exact length of a decoded password package.
pub const PASSWORD_PACKAGE_LENGTH: usize = SALT_LENGTH + HASH_LENGTH;

/// Decoded password hash record.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PasswordHashPackage {
    salt: Salt,
    hash: [u8; HASH_LENGTH],
}

impl PasswordHashPackage {
    /// Create a record from its parts.
    pub fn new(salt: Salt, hash: [u8; HASH_LENGTH]) -> Self {
        Self { salt, hash }
    }

    /// Split a decoded record into salt and hash.
    ///
    /// # Errors
    /// - Returns `Error::Decode` unless `bytes` is exactly
    ///   [`PASSWORD_PACKAGE_LENGTH`] long
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PASSWORD_PACKAGE_LENGTH {
            return Err(Error::Decode(format!(
                "Invalid password hash length: expected {}, got {}",
                PASSWORD_PACKAGE_LENGTH,
                bytes.len()
            )));
        }

        let (salt, hash) = bytes.split_at(SALT_LENGTH);
        let mut hash_bytes = [0u8; HASH_LENGTH];
        hash_bytes.copy_from_slice(hash);

        Ok(Self {
            salt: Salt::from_slice(salt)?,
            hash: hash_bytes,
        })
    }

    /// Decode a base-64 record.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let mut bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Decode(format!("Invalid base64: {}", e)))?;
        let parsed = Self::parse(&bytes);
        bytes.zeroize();
        parsed
    }

    /// Salt the hash was derived with.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// Stored hash bytes.
    pub fn hash(&self) -> &[u8; HASH_LENGTH] {
        &self.hash
    }

    /// Concatenate salt and hash in wire order.
    pub fn to_bytes(&self) -> [u8; PASSWORD_PACKAGE_LENGTH] {
        let mut out = [0u8; PASSWORD_PACKAGE_LENGTH];
        out[..SALT_LENGTH].copy_from_slice(self.salt.as_bytes());
        out[SALT_LENGTH..].copy_from_slice(&self.hash);
        out
    }

    /// Base-64 encoding of [`PasswordHashPackage::to_bytes`].
    pub fn to_base64(&self) -> String {
        let mut bytes = self.to_bytes();
        let encoded = STANDARD.encode(bytes);
        bytes.zeroize();
        encoded
    }
}

/// Hash `password` with the default password cost.
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_params(password, &KdfParams::password())
}

/// Check `password` against a stored record with the default password cost.
///
/// Never fails: malformed records simply do not match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    verify_password_with_params(password, stored, &KdfParams::password())
}

/// Hash `password` with explicit KDF parameters.
///
/// # Errors
/// - `Error::Internal` if the entropy source is unavailable
/// - `Error::InvalidInput` if `params` is unusable
pub fn hash_password_with_params(password: &str, params: &KdfParams) -> Result<String> {
    let salt = Salt::generate()?;
    let hash = derive_key(password.as_bytes(), &salt, params)?;

    debug!(iterations = params.iterations, "Hashed password");

    Ok(PasswordHashPackage::new(salt, *hash.as_bytes()).to_base64())
}

/// Check `password` against a stored record with explicit KDF parameters.
pub fn verify_password_with_params(password: &str, stored: &str, params: &KdfParams) -> bool {
    let package = match PasswordHashPackage::from_base64(stored) {
        Ok(package) => package,
        Err(e) => {
            debug!(kind = %e.kind(), "Stored password hash rejected");
            return false;
        }
    };

    match derive_key(password.as_bytes(), package.salt(), params) {
        Ok(candidate) => fixed_time_eq(package.hash(), candidate.as_bytes()),
        Err(e) => {
            debug!(kind = %e.kind(), "Password verification failed");
            false
        }
    }
}
