//! RUL Prediction Service - Main Entry Point

use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load()?;
    init_logging(&config)?;

    info!("=== RUL Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model: {}, scaler: {}",
        config
            .model_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "mock".to_string()),
        config.scaler_path.display()
    );

    run_server(config).await?;

    Ok(())
}
