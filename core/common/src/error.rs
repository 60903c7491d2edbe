//! Common error types for Strongbox.

use std::fmt;

use thiserror::Error;

/// Top-level error type for Strongbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input is not valid base-64, or its decoded length does not fit the
    /// fixed-field layout.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Authentication tag mismatch.
    ///
    /// Deliberately carries no detail: a wrong passphrase and a tampered
    /// package are indistinguishable to the caller.
    #[error("Integrity check failed: wrong key or tampered data")]
    Integrity,

    /// Padding, block alignment or plaintext encoding failure after the
    /// integrity check passed.
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Unexpected failure in an underlying primitive.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Invalid parameter or configuration value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Category of this error, without its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(_) => ErrorKind::Decode,
            Error::Integrity => ErrorKind::Integrity,
            Error::Cipher(_) => ErrorKind::Cipher,
            Error::Internal(_) => ErrorKind::Internal,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Io(_) => ErrorKind::Io,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Error category exposed to adapters.
///
/// The numeric codes are part of the foreign-function contract and must
/// not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decode,
    Integrity,
    Cipher,
    Internal,
    InvalidInput,
    Io,
    Serialization,
}

impl ErrorKind {
    /// Stable name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Decode => "DecodeError",
            ErrorKind::Integrity => "IntegrityError",
            ErrorKind::Cipher => "CipherError",
            ErrorKind::Internal => "InternalError",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Io => "IoError",
            ErrorKind::Serialization => "SerializationError",
        }
    }

    /// Stable numeric code of the category. Zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Decode => 1,
            ErrorKind::Integrity => 2,
            ErrorKind::Cipher => 3,
            ErrorKind::Internal => 4,
            ErrorKind::InvalidInput => 5,
            ErrorKind::Io => 6,
            ErrorKind::Serialization => 7,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::Decode("x".into()).kind(), ErrorKind::Decode);
        assert_eq!(Error::Integrity.kind(), ErrorKind::Integrity);
        assert_eq!(Error::Cipher("x".into()).kind(), ErrorKind::Cipher);
        assert_eq!(Error::Internal("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_integrity_message_is_generic() {
        let msg = Error::Integrity.to_string();
        assert!(msg.contains("wrong key or tampered data"));
    }

    #[test]
    fn test_codes_are_distinct_and_nonzero() {
        let kinds = [
            ErrorKind::Decode,
            ErrorKind::Integrity,
            ErrorKind::Cipher,
            ErrorKind::Internal,
            ErrorKind::InvalidInput,
            ErrorKind::Io,
            ErrorKind::Serialization,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.kind().as_str(), "IoError");
    }
}
