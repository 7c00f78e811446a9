//! RUL Inference Engine
//!
//! Invokes the trained sequence regression model on fixed-shape windows and
//! wires the full scoring pipeline together.

mod batcher;
mod invoker;
mod model;
mod onnx;
mod pipeline;

pub use batcher::{BatchHandle, InferenceBatcher};
pub use invoker::{InferenceInvoker, WindowTensor};
pub use model::{ConstantModel, LinearModel, RulModel};
pub use onnx::OnnxRulModel;
pub use pipeline::{PipelineConfig, RulPipeline};

use health_evaluator::HealthReport;
use telemetry_features::{FeatureError, ValidationError};
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Inference batcher is not running")]
    BatcherClosed,
}

/// Errors from the end-to-end pipeline, local to a single request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Result of one pipeline run
pub type PipelineResult = Result<HealthReport, PipelineError>;
