//! Feature Error Types

use thiserror::Error;

/// Errors during feature selection and window construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// A canonical feature key is absent (or not numeric) in a record
    #[error("Missing required feature '{feature}' in record {index}")]
    MissingFeature { feature: &'static str, index: usize },

    /// No records were supplied
    #[error("Telemetry sequence is empty")]
    EmptySequence,
}

/// Errors raised by upstream sequence validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Records from more than one unit in a single sequence
    #[error("Sequence mixes units: expected engine {expected}, found {found} in record {index}")]
    MixedUnits { expected: i64, found: i64, index: usize },

    /// Cycle indices are not strictly increasing
    #[error("Cycle {current} in record {index} does not follow cycle {previous}")]
    CycleOrder { previous: i64, current: i64, index: usize },
}
