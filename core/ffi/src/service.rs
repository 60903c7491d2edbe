//! Process-wide service configuration for FFI
//!
//! The crypto core is stateless; the only thing the adapter keeps between
//! calls is which iteration counts the host asked for.

use once_cell::sync::Lazy;
use std::sync::RwLock;

use strongbox_crypto::{CryptoConfig, Strongbox};

use crate::error::FFIResult;

static SERVICE: Lazy<RwLock<Strongbox>> = Lazy::new(|| RwLock::new(Strongbox::default()));

/// Snapshot of the configured service.
pub fn service() -> Strongbox {
    match SERVICE.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the configured service from a JSON configuration.
pub fn configure(json: &str) -> FFIResult<()> {
    let config = CryptoConfig::from_json(json)?;
    let next = Strongbox::new(config)?;

    let mut guard = SERVICE.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = next;

    tracing::info!(
        encryption_iterations = config.encryption.iterations,
        password_iterations = config.password.iterations,
        "FFI service reconfigured"
    );
    Ok(())
}
