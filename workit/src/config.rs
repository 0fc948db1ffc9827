// Configuration management with layered configuration (file, env)

use crate::errors::ConfigError as InvalidConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Process settings of a worker deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Environment label attached to every handler metric, e.g. `staging`
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub metrics_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Cooler of the heartbeat handler run by the parallel engine
    pub heartbeat_seconds: u64,
    /// Cooler of the sequence engine, zero disables its daemon
    pub sequence_cooler_seconds: u64,
}

impl WorkerConfig {
    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_seconds)
    }

    pub fn sequence_cooler(&self) -> Duration {
        Duration::from_secs(self.sequence_cooler_seconds)
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Local overrides, not committed to git
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.environment.is_empty() {
            return Err(InvalidConfig::missing("Settings", "environment"));
        }

        if self.observability.log_level.is_empty() {
            return Err(InvalidConfig::missing("Settings", "observability.log_level"));
        }
        if self.observability.metrics_port == 0 {
            return Err(InvalidConfig::InvalidFieldValue {
                field: "observability.metrics_port".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.worker.heartbeat_seconds == 0 {
            return Err(InvalidConfig::InvalidFieldValue {
                field: "worker.heartbeat_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            heartbeat_seconds: 5,
            sequence_cooler_seconds: 60,
        }
    }
}
