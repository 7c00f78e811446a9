//! Min-Max Normalizer

use crate::error::ScalerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use telemetry_features::{FeatureVector, CANONICAL_FEATURES, FEATURE_COUNT};
use tracing::{debug, info};

/// Per-feature `(min, max)` observed over the training distribution.
///
/// Invariant: `min < max` and both finite for every feature, checked at
/// construction so `transform` never divides by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerState {
    data_min: FeatureVector,
    data_max: FeatureVector,
}

/// On-disk layout of a fitted normalizer
#[derive(Debug, Serialize, Deserialize)]
struct FittedState {
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl NormalizerState {
    /// Build a state from fitted per-feature bounds in canonical order
    pub fn new(data_min: FeatureVector, data_max: FeatureVector) -> Result<Self, ScalerError> {
        for (j, &feature) in CANONICAL_FEATURES.iter().enumerate() {
            let (min, max) = (data_min[j], data_max[j]);
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(ScalerError::DegenerateRange {
                    feature,
                    min,
                    max,
                });
            }
        }
        Ok(Self { data_min, data_max })
    }

    /// Fitted minimum per feature
    pub fn data_min(&self) -> &FeatureVector {
        &self.data_min
    }

    /// Fitted maximum per feature
    pub fn data_max(&self) -> &FeatureVector {
        &self.data_max
    }

    fn from_fitted(fitted: FittedState) -> Result<Self, ScalerError> {
        if let Some(names) = &fitted.feature_names {
            if names.len() != FEATURE_COUNT {
                return Err(ScalerError::WrongLength {
                    field: "feature_names",
                    expected: FEATURE_COUNT,
                    actual: names.len(),
                });
            }
            for (position, (name, expected)) in names.iter().zip(CANONICAL_FEATURES).enumerate() {
                if name != expected {
                    return Err(ScalerError::FeatureOrderMismatch {
                        position,
                        expected,
                        actual: name.clone(),
                    });
                }
            }
        }

        let data_min = to_vector("data_min", &fitted.data_min)?;
        let data_max = to_vector("data_max", &fitted.data_max)?;
        Self::new(data_min, data_max)
    }
}

fn to_vector(field: &'static str, values: &[f64]) -> Result<FeatureVector, ScalerError> {
    values.try_into().map_err(|_| ScalerError::WrongLength {
        field,
        expected: FEATURE_COUNT,
        actual: values.len(),
    })
}

/// Applies a fitted min-max transform to raw feature rows.
///
/// Values outside the training range are not clamped and may scale outside
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    state: NormalizerState,
}

impl MinMaxScaler {
    /// Create a scaler over a fitted state
    pub fn new(state: NormalizerState) -> Self {
        Self { state }
    }

    /// Parse a fitted state from its JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ScalerError> {
        let fitted: FittedState = serde_json::from_str(json)?;
        Ok(Self::new(NormalizerState::from_fitted(fitted)?))
    }

    /// Load a fitted state from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScalerError> {
        let path = path.as_ref();
        info!("Loading normalizer state from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the fitted state in the same layout [`MinMaxScaler::from_json_str`] reads
    pub fn to_json_string(&self) -> Result<String, ScalerError> {
        let fitted = FittedState {
            feature_names: Some(CANONICAL_FEATURES.iter().map(|s| s.to_string()).collect()),
            data_min: self.state.data_min.to_vec(),
            data_max: self.state.data_max.to_vec(),
        };
        Ok(serde_json::to_string_pretty(&fitted)?)
    }

    /// Fitted state
    pub fn state(&self) -> &NormalizerState {
        &self.state
    }

    /// Scale one row of raw readings
    pub fn transform_row(&self, raw: &FeatureVector) -> FeatureVector {
        let mut scaled = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            let (min, max) = (self.state.data_min[j], self.state.data_max[j]);
            scaled[j] = (raw[j] - min) / (max - min);
        }
        scaled
    }

    /// Scale a matrix of raw readings; output has the same shape as input.
    ///
    /// Only genuine sensor rows belong here. Padding is added after scaling.
    pub fn transform(&self, raw: &[FeatureVector]) -> Vec<FeatureVector> {
        debug!("Scaling {} rows", raw.len());
        raw.iter().map(|row| self.transform_row(row)).collect()
    }
}
