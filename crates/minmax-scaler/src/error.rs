//! Scaler Error Types

use thiserror::Error;

/// Errors while loading or constructing a fitted normalizer
#[derive(Debug, Error)]
pub enum ScalerError {
    /// Fitted arrays have the wrong number of features
    #[error("Expected {expected} fitted values for {field}, got {actual}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Feature names in the fitted state differ from the canonical order
    #[error("Fitted feature order mismatch at position {position}: expected {expected}, got {actual}")]
    FeatureOrderMismatch {
        position: usize,
        expected: &'static str,
        actual: String,
    },

    /// A feature's fitted range is empty, inverted or non-finite
    #[error("Degenerate fitted range for {feature}: min {min}, max {max}")]
    DegenerateRange {
        feature: &'static str,
        min: f64,
        max: f64,
    },

    /// Fitted state file could not be read
    #[error("Failed to read normalizer state: {0}")]
    Io(#[from] std::io::Error),

    /// Fitted state file is not valid JSON
    #[error("Invalid normalizer state format: {0}")]
    Format(#[from] serde_json::Error),
}
