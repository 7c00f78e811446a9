//! ONNX Model Adapter using tract

use crate::invoker::WindowTensor;
use crate::model::RulModel;
use crate::InferenceError;
use std::path::Path;
use telemetry_features::{FEATURE_COUNT, SEQ_LEN};
use tract_onnx::prelude::*;
use tracing::info;

/// Trained regression network exported to ONNX.
///
/// The plan is optimized for a fixed `(1, SEQ_LEN, F)` input and is shared
/// read-only across threads.
pub struct OnnxRulModel {
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxRulModel {
    /// Load and optimize a model for `(1, SEQ_LEN, F)` windows
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, SEQ_LEN, FEATURE_COUNT]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Model loaded successfully");
        Ok(Self { plan })
    }
}

impl RulModel for OnnxRulModel {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, input: &WindowTensor) -> Result<f64, InferenceError> {
        let expected = [1, SEQ_LEN, FEATURE_COUNT];
        if input.shape() != expected {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", input.shape()),
            });
        }

        let tensor = Tensor::from_shape(&input.shape(), input.data())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;
        let values = output
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        values
            .first()
            .map(|&v| v as f64)
            .ok_or_else(|| InferenceError::InferenceFailed("model output is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let result = OnnxRulModel::load("/nonexistent/rul_model.onnx");
        assert!(matches!(result, Err(InferenceError::ModelLoadError(_))));
    }
}
