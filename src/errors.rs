//! Error types for amr_oracle
//!
//! This module defines the error taxonomy used throughout the library.
//! Only [`OracleError::Inconsistent`] is recoverable: the driver reacts to
//! it by resetting the machine and retrying, up to the configured budget.
//! Every other variant propagates to the caller.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, OracleError>;

/// Main error type for amr_oracle
#[derive(Error, Debug, Clone)]
pub enum OracleError {
    /// The chosen action cannot be reconciled with the gold graph at the
    /// machine's current cursor. Raised by the machine's update step;
    /// recovered by resetting and retrying within the retry budget.
    #[error("alignment inconsistency: {reason}")]
    Inconsistent { reason: String },

    /// Precision/recall are undefined for the accumulated totals
    /// (zero decoded edges or zero gold edges across the corpus).
    #[error("degenerate metric: tries={tries}, gold={gold}")]
    DegenerateMetric { tries: u64, gold: u64 },

    /// Configuration validation failed
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The per-sample loop observed the cancellation flag
    #[error("alignment cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl OracleError {
    /// Create an alignment-inconsistency error with a human-readable reason
    pub fn inconsistent(reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable by resetting the machine and
    /// retrying the sample
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Inconsistent { .. })
    }

    /// The rejection reason recorded in diagnostics, if any.
    ///
    /// Only alignment inconsistencies carry a reason; other variants are
    /// never recorded as rejections.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Inconsistent { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
