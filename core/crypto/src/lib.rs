//! Cryptographic core for Strongbox.
//!
//! This module provides:
//! - Passphrase-based authenticated encryption (AES-256-CBC + HMAC-SHA-256,
//!   encrypt-then-MAC, verify-then-decrypt)
//! - Password hashing and verification for credential storage
//! - PBKDF2-HMAC-SHA-256 key derivation
//! - Constant-time comparison and OS-backed randomness
//!
//! # Security Guarantees
//! - Every call derives fresh key material; nothing is cached between calls
//! - Derived keys are zeroized on drop, on success and failure paths alike
//! - No passphrase, plaintext or key material is ever logged
//! - Authentication tags and password hashes are compared in constant time

pub mod compare;
pub mod config;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod password;
pub mod random;

pub use compare::fixed_time_eq;
pub use config::{CryptoConfig, Strongbox};
pub use envelope::{decrypt, encrypt, EncryptionPackage};
pub use kdf::{derive_key, KdfParams};
pub use keys::{DerivedKey, Iv, Salt};
pub use password::{hash_password, verify_password, PasswordHashPackage};
