// Error handling framework
// Typed construction/metrics errors plus annotation helpers for handler failures

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Construction-time configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{config}.{field} must not be empty")]
    MissingField { config: &'static str, field: String },

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

impl ConfigError {
    pub fn missing(config: &'static str, field: impl Into<String>) -> Self {
        ConfigError::MissingField {
            config,
            field: field.into(),
        }
    }
}

/// Metric recording errors
///
/// The label schema is fixed when the instruments are created, so any of
/// these indicates a programming error rather than a runtime condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metric {0} is not registered")]
    UnknownMetric(String),

    #[error("label {label} is not registered for metric {metric}")]
    UnknownLabel { metric: String, label: String },

    #[error("label {label} is missing for metric {metric}")]
    MissingLabel { metric: String, label: String },

    #[error("label value {label}={value} is not registered for metric {metric}")]
    InvalidLabelValue {
        metric: String,
        label: String,
        value: String,
    },
}

/// A handler panicked during execution. Reported like any other failure of
/// that handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

impl HandlerPanic {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        if let Some(msg) = payload.downcast_ref::<&'static str>() {
            Self((*msg).to_string())
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Self(msg.clone())
        } else {
            Self("unknown panic".to_string())
        }
    }
}

/// Key/value context attached to an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub key: &'static str,
    pub value: String,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Wrap an error with a key/value annotation.
///
/// The original cause remains reachable through `downcast_ref`, so error
/// filters keep matching annotated errors.
pub fn annotate(err: anyhow::Error, key: &'static str, value: impl Into<String>) -> anyhow::Error {
    err.context(Annotation {
        key,
        value: value.into(),
    })
}

/// Read back the outermost annotation for the given key, if any
pub fn annotation<'a>(err: &'a anyhow::Error, key: &str) -> Option<&'a str> {
    err.downcast_ref::<Annotation>()
        .filter(|a| a.key == key)
        .map(|a| a.value.as_str())
}

/// Terminate abruptly on a construction-time defect.
#[track_caller]
pub fn fatal(err: impl std::error::Error) -> ! {
    tracing::error!(error = %err, "fatal configuration error");
    panic!("{err}");
}
