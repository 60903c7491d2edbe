//! Key derivation using PBKDF2-HMAC-SHA-256.
//!
//! PBKDF2 is deliberately slow: every guess an attacker makes costs the
//! configured number of HMAC iterations. It must never be swapped for a
//! plain hash.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::keys::{DerivedKey, Salt, KEY_LENGTH};
use strongbox_common::{Error, Result};

/// Iteration count for encryption keys.
pub const ENCRYPTION_ITERATIONS: u32 = 100_000;

/// Iteration count for password hashes.
///
/// Higher than [`ENCRYPTION_ITERATIONS`]: stored password hashes are the
/// primary offline brute-force target.
pub const PASSWORD_ITERATIONS: u32 = 150_000;

/// Lowest iteration count accepted from configuration.
pub const MIN_ITERATIONS: u32 = 10_000;

/// Parameters for PBKDF2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations.
    pub iterations: u32,
}

impl KdfParams {
    /// Parameters for deriving envelope encryption keys.
    pub fn encryption() -> Self {
        Self {
            iterations: ENCRYPTION_ITERATIONS,
        }
    }

    /// Parameters for hashing passwords.
    pub fn password() -> Self {
        Self {
            iterations: PASSWORD_ITERATIONS,
        }
    }

    /// Check that the iteration count meets [`MIN_ITERATIONS`].
    ///
    /// # Errors
    /// - Returns `Error::InvalidInput` if the count is below the floor
    pub fn validate(&self) -> Result<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(Error::InvalidInput(format!(
                "PBKDF2 iteration count {} is below the minimum of {}",
                self.iterations, MIN_ITERATIONS
            )));
        }
        Ok(())
    }
}

/// Fill `output` with PBKDF2-HMAC-SHA-256 output for `secret` and `salt`.
///
/// # Preconditions
/// - `iterations` must be non-zero
///
/// # Postconditions
/// - Deterministic: identical inputs always produce identical output
///
/// # Errors
/// - Returns `Error::InvalidInput` if `iterations` is zero
pub fn derive_bytes(secret: &[u8], salt: &[u8], iterations: u32, output: &mut [u8]) -> Result<()> {
    if iterations == 0 {
        return Err(Error::InvalidInput(
            "PBKDF2 iterations must be non-zero".to_string(),
        ));
    }

    pbkdf2_hmac::<Sha256>(secret, salt, iterations, output);
    Ok(())
}

/// Derive a 32-byte key from a secret and salt.
///
/// # Errors
/// - Returns `Error::InvalidInput` if `params.iterations` is zero
///
/// # Security
/// - The secret is not stored or logged
/// - The intermediate buffer is zeroized after the key is built
pub fn derive_key(secret: &[u8], salt: &Salt, params: &KdfParams) -> Result<DerivedKey> {
    let mut key_bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    derive_bytes(secret, salt.as_bytes(), params.iterations, &mut key_bytes[..])?;

    Ok(DerivedKey::from_bytes(*key_bytes))
}
