//! Regression Model Capability

use crate::invoker::WindowTensor;
use crate::InferenceError;
use telemetry_features::FEATURE_COUNT;

/// A trained sequence regression model: `tensor[1][SEQ_LEN][F] -> RUL`.
///
/// Implementations must be deterministic and safe to call from many threads
/// at once; the pipeline shares one instance across all requests.
pub trait RulModel: Send + Sync {
    /// Short identifier for logs and health output
    fn name(&self) -> &str;

    /// Predict the raw RUL for one batch-of-one tensor
    fn predict(&self, input: &WindowTensor) -> Result<f64, InferenceError>;

    /// Predict several independent tensors. Output order matches input order.
    fn predict_batch(&self, inputs: &[WindowTensor]) -> Result<Vec<f64>, InferenceError> {
        inputs.iter().map(|input| self.predict(input)).collect()
    }
}

/// Always returns the same estimate
#[derive(Debug, Clone, Copy)]
pub struct ConstantModel {
    value: f64,
}

impl ConstantModel {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl RulModel for ConstantModel {
    fn name(&self) -> &str {
        "constant"
    }

    fn predict(&self, _input: &WindowTensor) -> Result<f64, InferenceError> {
        Ok(self.value)
    }
}

/// Linear read-out of the most recent cycle: `bias + sum(w_j * x_j)`.
///
/// Used as the mock engine when no trained artifact is configured, and in
/// tests where the output has to depend on the window contents.
#[derive(Debug, Clone, Copy)]
pub struct LinearModel {
    weights: [f64; FEATURE_COUNT],
    bias: f64,
}

impl LinearModel {
    pub fn new(weights: [f64; FEATURE_COUNT], bias: f64) -> Self {
        Self { weights, bias }
    }
}

impl Default for LinearModel {
    /// Higher scaled sensor readings mean more wear, as in the turbofan data
    fn default() -> Self {
        Self::new([-12.5; FEATURE_COUNT], 125.0)
    }
}

impl RulModel for LinearModel {
    fn name(&self) -> &str {
        "linear-mock"
    }

    fn predict(&self, input: &WindowTensor) -> Result<f64, InferenceError> {
        let last = input.last_row().ok_or_else(|| {
            InferenceError::InferenceFailed("empty input tensor".to_string())
        })?;
        Ok(self.bias
            + last
                .iter()
                .zip(self.weights.iter())
                .map(|(&x, w)| x as f64 * w)
                .sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry_features::WindowBuilder;

    fn tensor(last: f64) -> WindowTensor {
        let window = WindowBuilder::default().build(&[[last; FEATURE_COUNT]]);
        WindowTensor::from_window(&window).unwrap()
    }

    #[test]
    fn test_constant_model() {
        let model = ConstantModel::new(42.0);
        assert_eq!(model.predict(&tensor(0.3)).unwrap(), 42.0);
    }

    #[test]
    fn test_linear_model_reads_last_row() {
        let model = LinearModel::default();
        assert!((model.predict(&tensor(0.0)).unwrap() - 125.0).abs() < 1e-9);
        assert!((model.predict(&tensor(1.0)).unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_batch_preserves_order() {
        let model = LinearModel::default();
        let inputs = vec![tensor(0.0), tensor(0.5), tensor(1.0)];
        let outputs = model.predict_batch(&inputs).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs[0] > outputs[1] && outputs[1] > outputs[2]);
    }
}
