//! End-to-End RUL Scoring Pipeline
//!
//! records -> validate -> select -> scale -> window -> invoke -> evaluate
//!
//! Scaling runs over the real rows only and always before windowing. The
//! window builder pads in scaled space, so a synthetic zero row is never
//! mistaken for a reading at the training minimum.

use crate::batcher::BatchHandle;
use crate::invoker::{InferenceInvoker, WindowTensor};
use crate::model::RulModel;
use crate::{PipelineError, PipelineResult};
use health_evaluator::{HealthEvaluator, HealthReport};
use minmax_scaler::MinMaxScaler;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry_features::{
    FeatureError, FeatureSelector, FeatureWindow, SequenceValidator, TelemetryRecord,
    ValidationConfig, WindowBuilder, SEQ_LEN,
};
use tracing::{debug, warn};

/// Pipeline configuration.
///
/// The window length is fixed at [`SEQ_LEN`] and is not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Fail empty sequences instead of scoring an all-zero window
    pub reject_empty: bool,
    /// Upstream record checks
    pub validation: ValidationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reject_empty: true,
            validation: ValidationConfig::default(),
        }
    }
}

/// Stateless, reentrant scoring pipeline.
///
/// Holds only read-only shared state (fitted scaler and model), so one
/// instance can serve any number of concurrent requests.
#[derive(Clone)]
pub struct RulPipeline {
    validator: SequenceValidator,
    selector: FeatureSelector,
    scaler: Arc<MinMaxScaler>,
    builder: WindowBuilder,
    invoker: InferenceInvoker,
    evaluator: HealthEvaluator,
    reject_empty: bool,
}

impl RulPipeline {
    /// Assemble a pipeline around injected assets
    pub fn new(scaler: Arc<MinMaxScaler>, model: Arc<dyn RulModel>, config: PipelineConfig) -> Self {
        Self {
            validator: SequenceValidator::new(config.validation),
            selector: FeatureSelector::new(),
            scaler,
            builder: WindowBuilder::new(SEQ_LEN),
            invoker: InferenceInvoker::new(model),
            evaluator: HealthEvaluator::default(),
            reject_empty: config.reject_empty,
        }
    }

    /// Shared model, e.g. for handing to a batcher
    pub fn model(&self) -> &Arc<dyn RulModel> {
        self.invoker.model()
    }

    /// Name of the underlying model
    pub fn model_name(&self) -> &str {
        self.invoker.model().name()
    }

    /// Construct the scaled model window for a sequence
    pub fn window_for(&self, records: &[TelemetryRecord]) -> Result<FeatureWindow, PipelineError> {
        if records.is_empty() && self.reject_empty {
            warn!("Rejecting empty telemetry sequence");
            return Err(FeatureError::EmptySequence.into());
        }

        self.validator.validate(records)?;
        let raw = self.selector.select_sequence(records)?;
        let scaled = self.scaler.transform(&raw);
        Ok(self.builder.build(&scaled))
    }

    /// Window reshaped into the model's batch-of-one input
    pub fn prepare(&self, records: &[TelemetryRecord]) -> Result<WindowTensor, PipelineError> {
        let window = self.window_for(records)?;
        debug!(
            "Window ready: {} real rows, {} padding rows",
            window.real_rows(),
            window.padding()
        );
        Ok(self.invoker.prepare(&window)?)
    }

    /// Map a raw model output to the user-facing verdict
    pub fn evaluate(&self, raw_rul: f64) -> HealthReport {
        self.evaluator.evaluate(raw_rul)
    }

    /// Score a sequence synchronously
    pub fn predict(&self, records: &[TelemetryRecord]) -> PipelineResult {
        let window = self.window_for(records)?;
        let raw = self.invoker.invoke(&window)?;
        Ok(self.evaluate(raw))
    }

    /// Score a sequence through a running batcher
    pub async fn predict_batched(
        &self,
        records: &[TelemetryRecord],
        batcher: &BatchHandle,
    ) -> PipelineResult {
        let tensor = self.prepare(records)?;
        let raw = batcher.predict(tensor).await?;
        Ok(self.evaluate(raw))
    }
}
