//! FFI bindings for Strongbox
//!
//! C-ABI functions exposing the four crypto operations to foreign hosts.
//! This layer only marshals strings and errors; all cryptography lives in
//! `strongbox-crypto`.
//!
//! Conventions:
//! - Strings in and out are null-terminated UTF-8
//! - Returned strings must be released with `strongbox_string_free`
//! - On failure a null pointer is returned and the reason is retrievable
//!   via `strongbox_last_error` / `strongbox_last_error_code`

#![allow(clippy::missing_safety_doc)]

pub mod error;
pub mod service;

use std::ffi::{c_char, c_int, CStr, CString};
use std::ptr;

use zeroize::Zeroize;

use crate::error::{FFIError, FFIResult};

/// Initialize logging for the FFI layer. Safe to call more than once.
#[no_mangle]
pub extern "C" fn strongbox_init() -> c_int {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("Strongbox FFI initialized");
    0
}

/// Get the version of the Strongbox library.
///
/// # Safety
/// Returns a pointer to a static string. Do not free.
#[no_mangle]
pub extern "C" fn strongbox_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}

/// Borrow a C string parameter as `&str`.
unsafe fn read_str<'a>(ptr: *const c_char, name: &str) -> FFIResult<&'a str> {
    if ptr.is_null() {
        return Err(FFIError::NullPointer(format!("{} is null", name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| FFIError::InvalidUtf8(name.to_string()))
}

/// Hand a Rust string to the caller, wiping it if it cannot be converted.
fn into_c_string(value: String) -> FFIResult<*mut c_char> {
    match CString::new(value) {
        Ok(cstr) => Ok(cstr.into_raw()),
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.zeroize();
            Err(FFIError::StringConversionError)
        }
    }
}

/// Convert an operation result into a returned string or a null pointer.
fn return_string(result: FFIResult<String>) -> *mut c_char {
    match result.and_then(into_c_string) {
        Ok(ptr) => ptr,
        Err(e) => {
            error::set_last_error(e);
            ptr::null_mut()
        }
    }
}

/// Replace the iteration-count configuration.
///
/// # Safety
/// - `json` must be a valid null-terminated UTF-8 string holding a
///   configuration document, e.g. `{"encryption":{"iterations":100000}}`
/// - Returns 0 on success, -1 on failure (configuration left unchanged)
#[no_mangle]
pub unsafe extern "C" fn strongbox_configure(json: *const c_char) -> c_int {
    error::clear_last_error();

    match read_str(json, "json").and_then(service::configure) {
        Ok(()) => 0,
        Err(e) => {
            error::set_last_error(e);
            -1
        }
    }
}

/// Encrypt `plaintext` under `secret`, returning a base-64 envelope.
///
/// # Safety
/// - `plaintext` and `secret` must be valid null-terminated UTF-8 strings
/// - Returned string must be freed with `strongbox_string_free`
/// - On error, returns null and sets the last error
#[no_mangle]
pub unsafe extern "C" fn strongbox_encrypt(
    plaintext: *const c_char,
    secret: *const c_char,
) -> *mut c_char {
    error::clear_last_error();

    let result = read_str(plaintext, "plaintext").and_then(|plaintext| {
        let secret = read_str(secret, "secret")?;
        Ok(service::service().encrypt(plaintext, secret)?)
    });
    return_string(result)
}

/// Decrypt a base-64 envelope under `secret`.
///
/// # Safety
/// - `package` and `secret` must be valid null-terminated UTF-8 strings
/// - Returned string must be freed with `strongbox_string_free`
/// - On error, returns null and sets the last error; a plaintext holding
///   an interior NUL byte cannot be returned and fails with a conversion
///   error
#[no_mangle]
pub unsafe extern "C" fn strongbox_decrypt(
    package: *const c_char,
    secret: *const c_char,
) -> *mut c_char {
    error::clear_last_error();

    let result = read_str(package, "package").and_then(|package| {
        let secret = read_str(secret, "secret")?;
        Ok(service::service().decrypt(package, secret)?)
    });
    return_string(result)
}

/// Hash `password`, returning a base-64 record.
///
/// # Safety
/// - `password` must be a valid null-terminated UTF-8 string
/// - Returned string must be freed with `strongbox_string_free`
#[no_mangle]
pub unsafe extern "C" fn strongbox_hash_password(password: *const c_char) -> *mut c_char {
    error::clear_last_error();

    let result = read_str(password, "password")
        .and_then(|password| Ok(service::service().hash_password(password)?));
    return_string(result)
}

/// Check `password` against a stored record.
///
/// Returns 1 on match and 0 otherwise. Null or non-UTF-8 arguments are a
/// mismatch. Clears any pending error and never sets a new one.
///
/// # Safety
/// - Non-null arguments must be valid null-terminated strings
#[no_mangle]
pub unsafe extern "C" fn strongbox_verify_password(
    password: *const c_char,
    stored: *const c_char,
) -> c_int {
    error::clear_last_error();

    let (Ok(password), Ok(stored)) = (read_str(password, "password"), read_str(stored, "stored"))
    else {
        return 0;
    };

    c_int::from(service::service().verify_password(password, stored))
}

/// Get the last error message.
///
/// # Safety
/// - Returned string must be freed with `strongbox_string_free`
/// - Returns null if no error occurred
#[no_mangle]
pub extern "C" fn strongbox_last_error() -> *mut c_char {
    error::take_last_error()
        .and_then(|e| CString::new(e.to_string()).ok())
        .map_or(ptr::null_mut(), CString::into_raw)
}

/// Get the code of the pending error without consuming it; 0 if none.
#[no_mangle]
pub extern "C" fn strongbox_last_error_code() -> c_int {
    error::last_error_code()
}

/// Free a string returned by a Strongbox FFI function, wiping its bytes.
///
/// # Safety
/// - `s` must be a pointer returned by a strongbox FFI function, or null
/// - After this call, the pointer is invalid
#[no_mangle]
pub unsafe extern "C" fn strongbox_string_free(s: *mut c_char) {
    if !s.is_null() {
        let mut bytes = CString::from_raw(s).into_bytes();
        bytes.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_common::ErrorKind;

    const TEST_CONFIG: &str =
        r#"{"encryption":{"iterations":10000},"password":{"iterations":10001}}"#;

    fn configure_for_tests() {
        let json = CString::new(TEST_CONFIG).unwrap();
        assert_eq!(unsafe { strongbox_configure(json.as_ptr()) }, 0);
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let value = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        strongbox_string_free(ptr);
        value
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        configure_for_tests();
        let plaintext = CString::new("hello").unwrap();
        let secret = CString::new("s3cret").unwrap();
        let wrong = CString::new("wrong").unwrap();

        unsafe {
            let package = take_string(strongbox_encrypt(plaintext.as_ptr(), secret.as_ptr()));
            let package = CString::new(package).unwrap();

            let opened = take_string(strongbox_decrypt(package.as_ptr(), secret.as_ptr()));
            assert_eq!(opened, "hello");
            assert_eq!(strongbox_last_error_code(), 0);

            let failed = strongbox_decrypt(package.as_ptr(), wrong.as_ptr());
            assert!(failed.is_null());
            assert_eq!(strongbox_last_error_code(), ErrorKind::Integrity.code());

            let message = take_string(strongbox_last_error());
            assert!(message.starts_with("IntegrityError"));
            assert!(strongbox_last_error().is_null());
        }
    }

    #[test]
    fn test_decrypt_malformed_sets_decode_error() {
        configure_for_tests();
        let package = CString::new("not-base64").unwrap();
        let secret = CString::new("s3cret").unwrap();

        unsafe {
            assert!(strongbox_decrypt(package.as_ptr(), secret.as_ptr()).is_null());
            assert_eq!(strongbox_last_error_code(), ErrorKind::Decode.code());
        }
    }

    #[test]
    fn test_null_arguments() {
        let secret = CString::new("s3cret").unwrap();

        unsafe {
            assert!(strongbox_encrypt(ptr::null(), secret.as_ptr()).is_null());
            assert_eq!(strongbox_last_error_code(), error::CODE_NULL_POINTER);

            assert!(strongbox_hash_password(ptr::null()).is_null());
            assert_eq!(strongbox_verify_password(ptr::null(), ptr::null()), 0);
            strongbox_string_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_password_roundtrip() {
        configure_for_tests();
        let password = CString::new("hunter2").unwrap();
        let other = CString::new("hunter3").unwrap();
        let garbage = CString::new("").unwrap();

        unsafe {
            let stored = take_string(strongbox_hash_password(password.as_ptr()));
            let stored = CString::new(stored).unwrap();

            assert_eq!(strongbox_verify_password(password.as_ptr(), stored.as_ptr()), 1);
            assert_eq!(strongbox_verify_password(other.as_ptr(), stored.as_ptr()), 0);
            assert_eq!(strongbox_verify_password(password.as_ptr(), garbage.as_ptr()), 0);
        }
    }

    #[test]
    fn test_verify_clears_pending_error() {
        configure_for_tests();
        let password = CString::new("hunter2").unwrap();
        let secret = CString::new("s3cret").unwrap();

        unsafe {
            let stored = take_string(strongbox_hash_password(password.as_ptr()));
            let stored = CString::new(stored).unwrap();

            assert!(strongbox_encrypt(ptr::null(), secret.as_ptr()).is_null());
            assert_eq!(strongbox_last_error_code(), error::CODE_NULL_POINTER);

            assert_eq!(strongbox_verify_password(password.as_ptr(), stored.as_ptr()), 1);
            assert_eq!(strongbox_last_error_code(), error::CODE_OK);
            assert!(strongbox_last_error().is_null());

            assert!(strongbox_encrypt(ptr::null(), secret.as_ptr()).is_null());
            assert_eq!(strongbox_verify_password(ptr::null(), stored.as_ptr()), 0);
            assert_eq!(strongbox_last_error_code(), error::CODE_OK);
        }
    }

    #[test]
    fn test_configure_rejects_weak_costs() {
        let json = CString::new(r#"{"encryption":{"iterations":5}}"#).unwrap();

        unsafe {
            assert_eq!(strongbox_configure(json.as_ptr()), -1);
            assert_eq!(strongbox_last_error_code(), ErrorKind::InvalidInput.code());
        }
    }

    #[test]
    fn test_version_is_null_terminated() {
        let version = unsafe { CStr::from_ptr(strongbox_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
