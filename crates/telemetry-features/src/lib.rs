//! Telemetry Feature Engine
//!
//! Turns raw per-cycle telemetry records into canonical feature vectors and
//! fixed-length windows for sequence regression.

mod error;
mod record;
mod validator;
mod window;

pub use error::{FeatureError, ValidationError};
pub use record::{
    FeatureSelector, FeatureVector, TelemetryRecord, CANONICAL_FEATURES, FEATURE_COUNT,
};
pub use validator::{SequenceValidator, ValidationConfig};
pub use window::{FeatureWindow, WindowBuilder, SEQ_LEN};
