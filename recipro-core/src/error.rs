//! Error types for RECIPRO.
//!
//! This module provides the error hierarchy using `thiserror`.
//!
//! Only parameter and input problems are errors. Protocol-level outcomes such
//! as a miscorrected block or a poorly correlated channel are data, reported
//! through decode outcomes and evaluator measurements, never through this type.

use thiserror::Error;

/// Result type alias using `ReciproError`.
pub type Result<T> = std::result::Result<T, ReciproError>;

/// Main error type for all RECIPRO operations.
#[derive(Debug, Error)]
pub enum ReciproError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A numeric parameter is outside its domain (σ ≤ 0, ρ ∉ [-1, 1], ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two sequences that must line up have different lengths.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An operation that needs at least one element received none.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CODEC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No codec is known for the requested (n, k) pair.
    #[error("Unsupported code: no codec for n={n}, k={k}")]
    UnsupportedCode { n: usize, k: usize },

    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Unknown hash primitive name.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration is internally inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReciproError {
    /// Shorthand for an [`ReciproError::InvalidParameter`] error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ReciproError::InvalidParameter(msg.into())
    }

    /// Returns true if this error comes from eager input validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ReciproError::InvalidParameter(_)
                | ReciproError::LengthMismatch { .. }
                | ReciproError::EmptyInput(_)
        )
    }

    /// Returns true if this error comes from loading or checking configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ReciproError::ConfigError(_)
                | ReciproError::JsonError(_)
                | ReciproError::IoError(_)
                | ReciproError::UnsupportedCode { .. }
                | ReciproError::UnsupportedAlgorithm(_)
        )
    }
}
