//! Error types for cache operations
//!
//! Misses, expiry and capacity eviction are normal outcomes and never show up
//! here. Only caller misuse (bad configuration, unserializable parameters) and
//! a failed background sweep task are reported as errors.

use thiserror::Error;

/// Main error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration error - rejected at pool construction or env loading
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parameter bag could not be canonically serialized into a key
    #[error("Key derivation failed for operation '{operation}': {source}")]
    KeyDerivationError {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// The blocking sweep task panicked or was cancelled
    #[error("Sweep error: {0}")]
    SweepError(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
