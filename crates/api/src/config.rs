//! Service configuration

use inference_engine::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "RUL_CONFIG";

/// Default configuration file, optional
pub const DEFAULT_CONFIG_PATH: &str = "rul-service.toml";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// ONNX export of the trained model; mock model when absent
    pub model_path: Option<PathBuf>,
    /// Fitted normalizer state (JSON)
    pub scaler_path: PathBuf,
    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Windows per model call; 1 disables batching
    pub batch_size: usize,
    /// Wait for more requests after the first one in a batch (ms)
    pub batch_timeout_ms: u64,
    pub pipeline: PipelineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            model_path: None,
            scaler_path: PathBuf::from("model/scaler.json"),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            batch_size: 1,
            batch_timeout_ms: 5,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load from the file named by `RUL_CONFIG` (or the default path) and
    /// `RUL__*` environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// Load from a specific file (missing file is fine) plus environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("RUL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Whether requests go through the batcher
    pub fn batching_enabled(&self) -> bool {
        self.batch_size > 1
    }
}
