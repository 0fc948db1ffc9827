// Handler decoration factory
//
// Produces fully decorated handlers, metrics(proxy(handler)), and exposes the
// shared error filter to the worker engines.

use crate::errors::{fatal, ConfigError};
use crate::handler::{Ensure, Metrics, Proxy};
use std::sync::Arc;

/// Predicate deciding whether a handler failure should be kept out of the
/// error logs. The failure is still recorded as a failed execution.
pub type ErrorFilter = Arc<dyn Fn(&anyhow::Error) -> bool + Send + Sync>;

/// Shared metrics backend every decorated handler registers against
pub type Meter = Arc<dyn metrics::Recorder + Send + Sync>;

#[derive(Clone, Default)]
pub struct RegistryConfig {
    /// Environment label attached to every metric, e.g. `env=staging`
    pub env: String,
    /// Optional matcher for failures that should not be logged. All failures
    /// are logged by default.
    pub filter: Option<ErrorFilter>,
    /// Metrics backend for all handler execution metrics
    pub meter: Option<Meter>,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.env.is_empty() {
            return Err(ConfigError::missing("RegistryConfig", "env"));
        }
        if self.meter.is_none() {
            return Err(ConfigError::missing("RegistryConfig", "meter"));
        }

        Ok(())
    }
}

pub struct Registry {
    env: String,
    fil: ErrorFilter,
    met: Meter,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        if let Err(err) = config.validate() {
            fatal(err);
        }

        let RegistryConfig { env, filter, meter } = config;
        let Some(met) = meter else {
            fatal(ConfigError::missing("RegistryConfig", "meter"));
        };

        Self {
            env,
            fil: filter.unwrap_or_else(|| Arc::new(|_: &anyhow::Error| false)),
            met,
        }
    }

    /// Decorate the given handler with the adapter and the metrics wrapper.
    /// The metric instruments of the handler are created eagerly.
    pub fn decorate(&self, han: Arc<dyn Ensure>) -> Arc<Metrics> {
        let pro = Arc::new(Proxy::new(han));

        Arc::new(Metrics::new(
            pro,
            &self.env,
            self.met.as_ref(),
            Arc::clone(&self.fil),
        ))
    }

    /// Whether the given failure should be kept out of the error logs
    pub fn suppress(&self, err: &anyhow::Error) -> bool {
        (self.fil)(err)
    }

    pub fn env(&self) -> &str {
        &self.env
    }
}
