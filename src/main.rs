//! # Triage Board API Main Entry Point
//!
//! This is the main entry point for the triage board API service.

use triageboard::{config::ConfigLoader, server::run_server, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config);

    // Log the loaded configuration (secrets redacted)
    tracing::info!(profile = %config.profile, "configuration loaded");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(configuration = %redacted_json, "effective configuration");
    }

    // Start the server with the loaded configuration
    run_server(config).await
}
