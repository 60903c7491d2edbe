//! Cost configuration and the four-operation service.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::envelope::{decrypt_with_params, encrypt_with_params};
use crate::kdf::KdfParams;
use crate::password::{hash_password_with_params, verify_password_with_params};
use strongbox_common::{Error, Result};

/// Iteration counts for both pipelines.
///
/// Packages do not record the cost they were made with, so a package only
/// opens (or verifies) under the configuration that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CryptoConfig {
    /// KDF parameters for envelope encryption keys.
    pub encryption: KdfParams,
    /// KDF parameters for password hashes.
    pub password: KdfParams,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            encryption: KdfParams::encryption(),
            password: KdfParams::password(),
        }
    }
}

impl CryptoConfig {
    /// Check both iteration counts against the configured floor.
    pub fn validate(&self) -> Result<()> {
        self.encryption.validate()?;
        self.password.validate()?;
        Ok(())
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize and validate configuration from JSON.
    ///
    /// Missing sections fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            encryption_iterations = config.encryption.iterations,
            password_iterations = config.password.iterations,
            "Loaded crypto configuration"
        );
        Ok(config)
    }
}

/// The four public operations, bound to one validated [`CryptoConfig`].
///
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Strongbox {
    config: CryptoConfig,
}

impl Strongbox {
    /// Create a service after validating `config`.
    pub fn new(config: CryptoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// Encrypt `plaintext` under `secret` into a base-64 envelope.
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> Result<String> {
        encrypt_with_params(plaintext, secret, &self.config.encryption)
    }

    /// Open a base-64 envelope under `secret`.
    pub fn decrypt(&self, package: &str, secret: &str) -> Result<String> {
        decrypt_with_params(package, secret, &self.config.encryption)
    }

    /// Hash `password` into a base-64 record.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash_password_with_params(password, &self.config.password)
    }

    /// Check `password` against a stored record. Never fails.
    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        verify_password_with_params(password, stored, &self.config.password)
    }
}
