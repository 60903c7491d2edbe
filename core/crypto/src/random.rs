//! Secure random byte generation.

use rand::rngs::OsRng;
use rand::TryRngCore;

use strongbox_common::{Error, Result};

/// Fill `buf` with bytes from the operating system CSPRNG.
///
/// # Errors
/// - Returns `Error::Internal` if the entropy source is unavailable
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| Error::Internal(format!("Entropy source unavailable: {}", e)))
}

/// Generate `N` random bytes.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    fill_random(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_array_differs() {
        let a: [u8; 32] = random_array().unwrap();
        let b: [u8; 32] = random_array().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fill_random_empty_buffer() {
        let mut buf = [0u8; 0];
        assert!(fill_random(&mut buf).is_ok());
    }
}
