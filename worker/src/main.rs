// Worker binary entry point
// Runs the heartbeat handler on the parallel engine and the uptime handler on
// the sequence engine until Ctrl+C.

mod handlers;

use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use workit::config::Settings;
use workit::worker::{combined, parallel, sequence};
use workit::{telemetry, Registry, RegistryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    telemetry::init_logging(&settings.observability.log_level)?;

    info!(environment = %settings.environment, "Starting worker");

    let meter = telemetry::init_metrics(settings.observability.metrics_port).map_err(|e| {
        error!(error = %e, "Failed to initialize metrics exporter");
        e
    })?;

    let registry = Arc::new(Registry::new(RegistryConfig {
        env: settings.environment.clone(),
        meter: Some(meter),
        ..Default::default()
    }));

    let par = Arc::new(parallel::Worker::new(parallel::Config {
        handlers: vec![Arc::new(handlers::heartbeat::Handler::new(
            settings.worker.heartbeat(),
        ))],
        registry: Some(Arc::clone(&registry)),
    }));

    let seq = Arc::new(sequence::Worker::new(sequence::Config {
        cooler: settings.worker.sequence_cooler(),
        handlers: vec![vec![Arc::new(handlers::uptime::Handler::new())]],
        registry: Some(registry),
    }));

    let worker = combined::Worker::new(combined::Config {
        parallel: Some(par),
        sequence: Some(seq),
    });

    worker.daemon();
    worker.ready().await;

    info!("Worker is running. Press Ctrl+C to shutdown");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    }

    info!("Worker shutdown complete");
    Ok(())
}
