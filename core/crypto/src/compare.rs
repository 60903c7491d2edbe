//! Constant-time comparison.

use subtle::ConstantTimeEq;

/// Compare two byte sequences without leaking, through timing, the
/// position of the first differing byte.
///
/// Lengths are public in every package format this crate handles, so a
/// length mismatch is rejected up front; equal-length inputs are always
/// compared in full.
pub fn fixed_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal() {
        assert!(fixed_time_eq(b"same bytes", b"same bytes"));
        assert!(fixed_time_eq(b"", b""));
    }

    #[test]
    fn test_differs_at_any_position() {
        let base = [0x5Au8; 32];
        for i in 0..base.len() {
            let mut other = base;
            other[i] ^= 0x01;
            assert!(!fixed_time_eq(&base, &other), "difference at {} missed", i);
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!fixed_time_eq(b"abc", b"abcd"));
        assert!(!fixed_time_eq(b"", b"a"));
    }
}
