//! FFI error handling
//!
//! Thread-local error storage for FFI functions.

use std::cell::RefCell;
use std::fmt;

use strongbox_common::{Error, ErrorKind};

/// Code reported when no error is pending.
pub const CODE_OK: i32 = 0;

/// Codes for adapter-level failures, above the core [`ErrorKind`] range.
pub const CODE_NULL_POINTER: i32 = 100;
pub const CODE_INVALID_UTF8: i32 = 101;
pub const CODE_STRING_CONVERSION: i32 = 102;

/// FFI-specific errors
#[derive(Debug)]
pub enum FFIError {
    /// Null pointer passed to FFI function
    NullPointer(String),
    /// Invalid UTF-8 in string parameter
    InvalidUtf8(String),
    /// Result could not be returned as a C string
    StringConversionError,
    /// Failure reported by the crypto core
    Core(Error),
}

impl FFIError {
    /// Numeric code surfaced through `strongbox_last_error_code`.
    pub fn code(&self) -> i32 {
        match self {
            FFIError::NullPointer(_) => CODE_NULL_POINTER,
            FFIError::InvalidUtf8(_) => CODE_INVALID_UTF8,
            FFIError::StringConversionError => CODE_STRING_CONVERSION,
            FFIError::Core(e) => e.kind().code(),
        }
    }

    /// Core error category, if this error came from the crypto core.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FFIError::Core(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FFIError::NullPointer(msg) => write!(f, "Null pointer: {}", msg),
            FFIError::InvalidUtf8(param) => write!(f, "Invalid UTF-8 in parameter: {}", param),
            FFIError::StringConversionError => write!(f, "String conversion error"),
            FFIError::Core(e) => write!(f, "{}: {}", e.kind(), e),
        }
    }
}

impl std::error::Error for FFIError {}

impl From<Error> for FFIError {
    fn from(e: Error) -> Self {
        FFIError::Core(e)
    }
}

/// Result type for FFI operations
pub type FFIResult<T> = Result<T, FFIError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<FFIError>> = const { RefCell::new(None) };
}

/// Set the last error for the current thread.
pub fn set_last_error(error: FFIError) {
    tracing::debug!(code = error.code(), "FFI call failed");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(error);
    });
}

/// Take the last error from the current thread.
pub fn take_last_error() -> Option<FFIError> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Code of the pending error for the current thread, without clearing it.
pub fn last_error_code() -> i32 {
    LAST_ERROR.with(|e| e.borrow().as_ref().map_or(CODE_OK, FFIError::code))
}

/// Clear the last error for the current thread.
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}
