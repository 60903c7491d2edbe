//! Common types shared across the Strongbox crates.
//!
//! Every crate in the workspace reports failures through the single
//! [`Error`] type defined here, so adapters can translate one taxonomy
//! into whatever their host expects.

pub mod error;

pub use error::{Error, ErrorKind, Result};
