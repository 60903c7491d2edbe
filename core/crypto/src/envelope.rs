//! Passphrase-based authenticated encryption.
//!
//! Envelope layout, base-64 encoded for transport:
//!
//! ```text
//! SALT(16) | IV(16) | CIPHERTEXT(n * 16) | TAG(32)
//! ```
//!
//! The key is PBKDF2-derived from the passphrase and salt. The plaintext is
//! encrypted with AES-256-CBC (PKCS#7), then HMAC-SHA-256 under the same key
//! authenticates salt, IV and ciphertext as one message. On the way back the
//! tag is checked in constant time before any decryption is attempted, so a
//! forged or corrupted envelope never reaches the padding check.

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroize;

use crate::compare::fixed_time_eq;
use crate::kdf::{derive_key, KdfParams};
use crate::keys::{DerivedKey, Iv, Salt, BLOCK_SIZE, IV_LENGTH, SALT_LENGTH, TAG_LENGTH};
use strongbox_common::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Smallest well-formed decoded envelope: salt, IV and tag with no ciphertext.
///
/// Real envelopes are always at least one block longer, since PKCS#7
/// padding never produces an empty ciphertext.
pub const MIN_PACKAGE_LENGTH: usize = SALT_LENGTH + IV_LENGTH + TAG_LENGTH;

/// Decoded encryption envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionPackage {
    /// Key-derivation salt.
    pub salt: Salt,
    /// CBC initialization vector.
    pub iv: Iv,
    /// AES-256-CBC ciphertext, a positive multiple of the block size.
    pub ciphertext: Vec<u8>,
    /// HMAC-SHA-256 over salt, IV and ciphertext.
    pub tag: [u8; TAG_LENGTH],
}

impl EncryptionPackage {
    /// Split a decoded envelope into its fields.
    ///
    /// # Errors
    /// - Returns `Error::Decode` if the input is shorter than
    ///   [`MIN_PACKAGE_LENGTH`] or the ciphertext is not a positive
    ///   multiple of the block size
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_PACKAGE_LENGTH {
            return Err(Error::Decode(format!(
                "Package too short: expected at least {} bytes, got {}",
                MIN_PACKAGE_LENGTH,
                bytes.len()
            )));
        }

        let ciphertext_len = bytes.len() - MIN_PACKAGE_LENGTH;
        if ciphertext_len == 0 || ciphertext_len % BLOCK_SIZE != 0 {
            return Err(Error::Decode(format!(
                "Ciphertext length {} is not a positive multiple of {}",
                ciphertext_len, BLOCK_SIZE
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_LENGTH);
        let (iv, rest) = rest.split_at(IV_LENGTH);
        let (ciphertext, tag) = rest.split_at(ciphertext_len);

        let mut tag_bytes = [0u8; TAG_LENGTH];
        tag_bytes.copy_from_slice(tag);

        Ok(Self {
            salt: Salt::from_slice(salt)?,
            iv: Iv::from_slice(iv)?,
            ciphertext: ciphertext.to_vec(),
            tag: tag_bytes,
        })
    }

    /// Decode a base-64 envelope and split it into its fields.
    ///
    /// # Errors
    /// - Returns `Error::Decode` if the input is not valid base-64 or
    ///   [`EncryptionPackage::parse`] rejects the decoded bytes
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Decode(format!("Invalid base64: {}", e)))?;
        Self::parse(&bytes)
    }

    /// Concatenate the fields in wire order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_PACKAGE_LENGTH + self.ciphertext.len());
        out.extend_from_slice(self.salt.as_bytes());
        out.extend_from_slice(self.iv.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Base-64 encoding of [`EncryptionPackage::to_bytes`].
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}

/// HMAC-SHA-256 over `salt || iv || ciphertext`, fed as a single message.
fn compute_tag(key: &DerivedKey, salt: &Salt, iv: &Iv, ciphertext: &[u8]) -> Result<[u8; TAG_LENGTH]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Internal(format!("HMAC initialization failed: {}", e)))?;
    mac.update(salt.as_bytes());
    mac.update(iv.as_bytes());
    mac.update(ciphertext);

    let mut tag = [0u8; TAG_LENGTH];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Encrypt `plaintext` under `secret` with the default encryption cost.
///
/// Returns the base-64 envelope. Two calls with identical inputs produce
/// different envelopes (fresh salt and IV each time).
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String> {
    encrypt_with_params(plaintext, secret, &KdfParams::encryption())
}

/// Decrypt a base-64 envelope under `secret` with the default encryption cost.
///
/// # Errors
/// - `Error::Decode` on malformed base-64 or layout
/// - `Error::Integrity` on tag mismatch (wrong passphrase or tampering)
/// - `Error::Cipher` on padding or UTF-8 failure after a valid tag
pub fn decrypt(encoded: &str, secret: &str) -> Result<String> {
    decrypt_with_params(encoded, secret, &KdfParams::encryption())
}

/// Encrypt `plaintext` under `secret` with explicit KDF parameters.
///
/// # Postconditions
/// - The decoded envelope is `64 + 16k` bytes for some `k >= 1`
///
/// # Errors
/// - `Error::Internal` if randomness or primitive setup fails
/// - `Error::InvalidInput` if `params` is unusable
///
/// No partial output is ever returned.
pub fn encrypt_with_params(plaintext: &str, secret: &str, params: &KdfParams) -> Result<String> {
    let salt = Salt::generate()?;
    let key = derive_key(secret.as_bytes(), &salt, params)?;
    let iv = Iv::generate()?;

    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| Error::Internal(format!("Cipher initialization failed: {}", e)))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let tag = compute_tag(&key, &salt, &iv, &ciphertext)?;

    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        iterations = params.iterations,
        "Sealed envelope"
    );

    let package = EncryptionPackage {
        salt,
        iv,
        ciphertext,
        tag,
    };
    Ok(package.to_base64())
}

/// Decrypt a base-64 envelope under `secret` with explicit KDF parameters.
///
/// The tag is verified before decryption; on mismatch the ciphertext is
/// never touched.
pub fn decrypt_with_params(encoded: &str, secret: &str, params: &KdfParams) -> Result<String> {
    let package = EncryptionPackage::from_base64(encoded)?;
    let key = derive_key(secret.as_bytes(), &package.salt, params)?;

    let expected = compute_tag(&key, &package.salt, &package.iv, &package.ciphertext)?;
    if !fixed_time_eq(&expected, &package.tag) {
        debug!(
            ciphertext_len = package.ciphertext.len(),
            "Envelope rejected: authentication tag mismatch"
        );
        return Err(Error::Integrity);
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), package.iv.as_bytes())
        .map_err(|e| Error::Internal(format!("Cipher initialization failed: {}", e)))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&package.ciphertext)
        .map_err(|_| Error::Cipher("Invalid padding".to_string()))?;

    debug!(
        plaintext_len = plaintext.len(),
        iterations = params.iterations,
        "Opened envelope"
    );

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        Error::Cipher("Decrypted data is not valid UTF-8".to_string())
    })
}
