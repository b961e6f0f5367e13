//! Validation and configuration errors.
//!
//! [`ValidationError`] is the user-facing half of the taxonomy: every
//! variant describes a malformed request and is never retried.  Downstream
//! crates wrap it (`#[from]`) in their own error enums.

use thiserror::Error;

/// A request (or trip record) that cannot be scored as given.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("zone id {id} is out of range for a grid of {zone_count} zones")]
    ZoneOutOfRange { id: i64, zone_count: usize },

    #[error("pickup and dropoff are the same zone ({0})")]
    SameZone(i64),

    #[error("request time is missing")]
    MissingTimestamp,

    #[error("request time {0:?} is not an ISO-8601 timestamp")]
    InvalidTimestamp(String),
}

/// Shorthand result type for request validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration could not be loaded or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON, wrong types, or an unrecognised option name.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration value `{option}`: {reason}")]
    Invalid { option: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
