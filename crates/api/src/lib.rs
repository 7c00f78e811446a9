//! RUL Prediction API Server
//!
//! HTTP surface around the remaining-useful-life pipeline. Assets are loaded
//! once at startup and shared read-only by every request.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inference_engine::{
    BatchHandle, InferenceBatcher, LinearModel, OnnxRulModel, RulModel, RulPipeline,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use minmax_scaler::MinMaxScaler;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
mod routes;

pub use crate::config::{LogFormat, ServiceConfig};
pub use error::ApiError;
pub use routes::predict::PredictRequest;

/// Load state of one startup asset
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            detail: Some(detail.into()),
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: "unavailable".to_string(),
            detail: Some(detail.into()),
        }
    }
}

/// Component status
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub model: ComponentHealth,
    pub scaler: ComponentHealth,
    pub batcher: ComponentHealth,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Application state shared across handlers
pub struct AppState {
    /// Scoring pipeline, `None` when an asset failed to load
    pub pipeline: Option<RulPipeline>,
    /// Batcher submission handle when batching is enabled
    pub batcher: Option<BatchHandle>,
    /// Asset load results for the health endpoint
    pub components: ComponentStatus,
    /// Prometheus render handle, if a recorder was installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state around an already assembled pipeline
    pub fn new(pipeline: Option<RulPipeline>, components: ComponentStatus) -> Self {
        Self {
            pipeline,
            batcher: None,
            components,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Load the normalizer and model named by the config.
    ///
    /// Load failures are logged and leave the pipeline unset; the server
    /// still starts and answers prediction requests with 503.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let scaler = match MinMaxScaler::load(&config.scaler_path) {
            Ok(scaler) => Ok(Arc::new(scaler)),
            Err(e) => {
                warn!("Normalizer unavailable: {}", e);
                Err(e.to_string())
            }
        };

        let model: Result<Arc<dyn RulModel>, String> = match &config.model_path {
            Some(path) => match OnnxRulModel::load(path) {
                Ok(model) => Ok(Arc::new(model) as Arc<dyn RulModel>),
                Err(e) => {
                    warn!("Model unavailable: {}", e);
                    Err(e.to_string())
                }
            },
            None => {
                warn!("No model_path configured, using mock linear model");
                Ok(Arc::new(LinearModel::default()) as Arc<dyn RulModel>)
            }
        };

        let components = ComponentStatus {
            model: match &model {
                Ok(m) => ComponentHealth::ok(m.name()),
                Err(e) => ComponentHealth::failed(e.clone()),
            },
            scaler: match &scaler {
                Ok(_) => ComponentHealth::ok(config.scaler_path.display().to_string()),
                Err(e) => ComponentHealth::failed(e.clone()),
            },
            batcher: ComponentHealth {
                status: "disabled".to_string(),
                detail: None,
            },
        };

        let pipeline = match (scaler, model) {
            (Ok(scaler), Ok(model)) => Some(RulPipeline::new(scaler, model, config.pipeline.clone())),
            _ => None,
        };

        Self::new(pipeline, components)
    }

    /// Start the batcher task and route predictions through it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_batcher(&mut self, batch_size: usize, timeout_ms: u64) {
        let Some(pipeline) = &self.pipeline else {
            warn!("Batching requested but no pipeline is loaded");
            return;
        };
        let (handle, batcher) = InferenceBatcher::channel(batch_size, timeout_ms);
        tokio::spawn(batcher.run(Arc::clone(pipeline.model())));
        self.batcher = Some(handle);
        self.components.batcher = ComponentHealth::ok(format!(
            "batch_size={}, timeout={}ms",
            batch_size, timeout_ms
        ));
    }

    fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }
}

/// Index response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/predict", post(routes::predict::predict))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        status: "online",
        message: "Predictive Maintenance API is running",
        endpoints: vec!["/api/predict", "/api/v1/health", "/metrics"],
    })
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (code, status) = if state.is_ready() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: state.components.clone(),
    };

    (code, Json(response))
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(config: &ServiceConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    match config.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish()),
    }
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::from_config(&config);

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state.metrics = Some(handle),
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }

    if config.batching_enabled() {
        state.start_batcher(config.batch_size, config.batch_timeout_ms);
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
