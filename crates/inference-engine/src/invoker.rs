//! Inference Invoker

use crate::model::RulModel;
use crate::InferenceError;
use std::sync::Arc;
use std::time::Instant;
use telemetry_features::{FeatureWindow, FEATURE_COUNT, SEQ_LEN};
use tracing::debug;

/// Row-major `f32` model input of shape `(1, SEQ_LEN, F)`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTensor {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl WindowTensor {
    /// Reshape a window into a batch of one.
    ///
    /// Fails if the window is not exactly `(SEQ_LEN, F)`; that can only happen
    /// through a construction defect upstream.
    pub fn from_window(window: &FeatureWindow) -> Result<Self, InferenceError> {
        let (rows, cols) = window.shape();
        if rows != SEQ_LEN || cols != FEATURE_COUNT {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("({}, {})", SEQ_LEN, FEATURE_COUNT),
                actual: format!("({}, {})", rows, cols),
            });
        }
        Ok(Self {
            data: window.to_tensor(),
            shape: [1, SEQ_LEN, FEATURE_COUNT],
        })
    }

    /// Flat buffer
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// `[1, SEQ_LEN, F]`
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Most recent cycle
    pub fn last_row(&self) -> Option<&[f32]> {
        self.data.rchunks_exact(self.shape[2]).next()
    }
}

/// Hands fixed-shape windows to the shared model
#[derive(Clone)]
pub struct InferenceInvoker {
    model: Arc<dyn RulModel>,
}

impl InferenceInvoker {
    /// Create an invoker around a shared model
    pub fn new(model: Arc<dyn RulModel>) -> Self {
        Self { model }
    }

    /// Shared model
    pub fn model(&self) -> &Arc<dyn RulModel> {
        &self.model
    }

    /// Check the window shape and reshape it for the model
    pub fn prepare(&self, window: &FeatureWindow) -> Result<WindowTensor, InferenceError> {
        WindowTensor::from_window(window)
    }

    /// Run the model on one window. Never retried, never cached.
    pub fn invoke(&self, window: &FeatureWindow) -> Result<f64, InferenceError> {
        let tensor = self.prepare(window)?;
        let start = Instant::now();
        let raw = self.model.predict(&tensor)?;
        debug!(
            "Inference with {} completed in {}us: raw RUL {:.3}",
            self.model.name(),
            start.elapsed().as_micros(),
            raw
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstantModel;
    use telemetry_features::{FeatureVector, WindowBuilder};

    fn invoker() -> InferenceInvoker {
        InferenceInvoker::new(Arc::new(ConstantModel::new(80.0)))
    }

    #[test]
    fn test_invoke_valid_window() {
        let window = WindowBuilder::default().build(&[[0.5; FEATURE_COUNT]; 3]);
        assert_eq!(invoker().invoke(&window).unwrap(), 80.0);
    }

    #[test]
    fn test_reshape_to_batch_of_one() {
        let rows: Vec<FeatureVector> = (0..SEQ_LEN).map(|i| [i as f64; FEATURE_COUNT]).collect();
        let window = WindowBuilder::default().build(&rows);
        let tensor = invoker().prepare(&window).unwrap();

        assert_eq!(tensor.shape(), [1, SEQ_LEN, FEATURE_COUNT]);
        assert_eq!(tensor.data().len(), SEQ_LEN * FEATURE_COUNT);
        assert_eq!(tensor.data()[FEATURE_COUNT], 1.0);
        assert_eq!(tensor.last_row().unwrap(), &[(SEQ_LEN - 1) as f32; FEATURE_COUNT]);
    }

    #[test]
    fn test_wrong_row_count_rejected() {
        let window = FeatureWindow::from_rows(vec![[0.0; FEATURE_COUNT]; SEQ_LEN - 1]);
        let err = invoker().invoke(&window).unwrap_err();
        match err {
            InferenceError::InvalidInputShape { expected, actual } => {
                assert_eq!(expected, "(50, 10)");
                assert_eq!(actual, "(49, 10)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builder_length_mismatch_rejected() {
        let window = WindowBuilder::new(30).build(&[]);
        assert!(matches!(
            invoker().invoke(&window),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }

    #[test]
    fn test_zero_length_window_rejected() {
        let window = WindowBuilder::new(0).build(&[[0.5; FEATURE_COUNT]; 4]);
        assert_eq!(window.shape(), (0, FEATURE_COUNT));
        match invoker().invoke(&window).unwrap_err() {
            InferenceError::InvalidInputShape { actual, .. } => assert_eq!(actual, "(0, 10)"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
