// Telemetry module for structured logging and handler execution metrics

use crate::handler::metrics::{DURATION_BUCKETS, METRIC_DURATION};
use crate::registry::Meter;
use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusRecorder};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize structured logging with JSON formatting
///
/// `RUST_LOG` takes precedence over the given level.
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = log_level,
        "Structured logging initialized with JSON formatting"
    );

    Ok(())
}

fn builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(METRIC_DURATION.to_string()),
            DURATION_BUCKETS,
        )
        .map_err(|e| anyhow::anyhow!("Invalid histogram buckets: {}", e))
}

/// Build a Prometheus recorder with the handler duration buckets installed,
/// without exposing it over HTTP
pub fn recorder() -> Result<PrometheusRecorder> {
    Ok(builder()?.build_recorder())
}

/// Initialize the Prometheus metrics exporter
///
/// Serves `/metrics` on the given port and returns the meter to hand to the
/// registry. Must be called from within a tokio runtime.
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<Meter> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    let (recorder, exporter) = builder()?
        .with_http_listener(addr)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build Prometheus exporter: {}", e))?;

    tokio::spawn(async move {
        if exporter.await.is_err() {
            tracing::error!("Prometheus exporter stopped");
        }
    });

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(Arc::new(recorder))
}
