//! Error types for the expiring map
//!
//! Only construction can fail. Lookups of missing or expired keys are not
//! errors, and a full map configured with `panic_full` panics instead of
//! returning one.

use thiserror::Error;

// == Expiring Map Error Enum ==
/// Unified error type for the expiring map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpiringMapError {
    /// Settings that cannot produce a working map
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A background sweeper was requested outside a tokio runtime
    #[error("No tokio runtime available to run the background sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the expiring map.
pub type Result<T> = std::result::Result<T, ExpiringMapError>;
