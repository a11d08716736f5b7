//! Common types and utilities.

/// Runtime error type.
pub use crate::error::Error;

/// Runtime result type.
pub type Result<T> = core::result::Result<T, Error>;
