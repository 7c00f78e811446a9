//! Prediction Route

use axum::{extract::State, Json};
use health_evaluator::HealthReport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use telemetry_features::TelemetryRecord;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Request body: the cycle-ordered telemetry of one unit
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub data: Vec<TelemetryRecord>,
}

/// Score one unit's telemetry
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<HealthReport>, ApiError> {
    let pipeline = state.pipeline.clone().ok_or(ApiError::Unavailable)?;
    let records = request.data;
    debug!("Prediction request with {} records", records.len());

    let start = Instant::now();
    let result = match &state.batcher {
        Some(batcher) => pipeline.predict_batched(&records, batcher).await,
        None => tokio::task::spawn_blocking(move || pipeline.predict(&records))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    };
    metrics::histogram!("rul_request_latency_seconds").record(start.elapsed().as_secs_f64());

    let report = result?;
    metrics::counter!("rul_predictions_total", "status" => report.status.as_str()).increment(1);
    Ok(Json(report))
}
