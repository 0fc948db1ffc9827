// Metric instruments with a closed label schema
//
// Every label combination of every declared metric is registered eagerly
// against the meter. Recording outside of the declared schema fails.

use crate::errors::MetricsError;
use metrics::{Counter, Histogram, Key, KeyName, Label, Level, Metadata, Recorder, Unit};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Counter,
    Histogram,
}

/// Declaration of one metric and its allowed label values
#[derive(Debug, Clone)]
pub struct InstrumentSpec {
    kind: Kind,
    name: &'static str,
    description: &'static str,
    unit: Option<Unit>,
    labels: BTreeMap<&'static str, Vec<String>>,
}

impl InstrumentSpec {
    pub fn counter(name: &'static str, description: &'static str) -> Self {
        Self::new(Kind::Counter, name, description)
    }

    pub fn histogram(name: &'static str, description: &'static str) -> Self {
        Self::new(Kind::Histogram, name, description)
    }

    fn new(kind: Kind, name: &'static str, description: &'static str) -> Self {
        Self {
            kind,
            name,
            description,
            unit: None,
            labels: BTreeMap::new(),
        }
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Declare a label key together with every value it may take
    pub fn label<I, V>(mut self, key: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.labels
            .insert(key, values.into_iter().map(Into::into).collect());
        self
    }
}

/// Registered handles of one metric, keyed by label values in key order
struct Series<T> {
    labels: BTreeMap<&'static str, Vec<String>>,
    handles: HashMap<Vec<String>, T>,
}

impl<T> Series<T> {
    fn get(&self, metric: &str, labels: &[(&str, &str)]) -> Result<&T, MetricsError> {
        if let Some((label, _)) = labels.iter().find(|(k, _)| !self.labels.contains_key(k)) {
            return Err(MetricsError::UnknownLabel {
                metric: metric.to_string(),
                label: label.to_string(),
            });
        }

        let mut values = Vec::with_capacity(self.labels.len());
        for (key, allowed) in &self.labels {
            let value = labels
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| *v)
                .ok_or_else(|| MetricsError::MissingLabel {
                    metric: metric.to_string(),
                    label: key.to_string(),
                })?;

            if !allowed.iter().any(|x| x == value) {
                return Err(MetricsError::InvalidLabelValue {
                    metric: metric.to_string(),
                    label: key.to_string(),
                    value: value.to_string(),
                });
            }

            values.push(value.to_string());
        }

        self.handles
            .get(&values)
            .ok_or_else(|| MetricsError::UnknownMetric(metric.to_string()))
    }
}

/// Eagerly registered counters and histograms
pub struct Instruments {
    counters: HashMap<&'static str, Series<Counter>>,
    histograms: HashMap<&'static str, Series<Histogram>>,
}

impl Instruments {
    /// Register all series of the given specs. Every series is additionally
    /// labelled with `env`.
    pub fn new(env: &str, meter: &dyn Recorder, specs: Vec<InstrumentSpec>) -> Self {
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

        let mut counters = HashMap::new();
        let mut histograms = HashMap::new();

        for spec in specs {
            let keys: Vec<&'static str> = spec.labels.keys().copied().collect();

            match spec.kind {
                Kind::Counter => {
                    meter.describe_counter(
                        KeyName::from(spec.name),
                        spec.unit,
                        spec.description.into(),
                    );

                    let handles = combinations(&spec.labels)
                        .into_iter()
                        .map(|values| {
                            let key = key(spec.name, env, &keys, &values);
                            (values, meter.register_counter(&key, &metadata))
                        })
                        .collect();

                    counters.insert(
                        spec.name,
                        Series {
                            labels: spec.labels,
                            handles,
                        },
                    );
                }
                Kind::Histogram => {
                    meter.describe_histogram(
                        KeyName::from(spec.name),
                        spec.unit,
                        spec.description.into(),
                    );

                    let handles = combinations(&spec.labels)
                        .into_iter()
                        .map(|values| {
                            let key = key(spec.name, env, &keys, &values);
                            (values, meter.register_histogram(&key, &metadata))
                        })
                        .collect();

                    histograms.insert(
                        spec.name,
                        Series {
                            labels: spec.labels,
                            handles,
                        },
                    );
                }
            }
        }

        Self {
            counters,
            histograms,
        }
    }

    pub fn counter(
        &self,
        name: &str,
        delta: u64,
        labels: &[(&str, &str)],
    ) -> Result<(), MetricsError> {
        let series = self
            .counters
            .get(name)
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))?;

        series.get(name, labels)?.increment(delta);
        Ok(())
    }

    pub fn histogram(
        &self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), MetricsError> {
        let series = self
            .histograms
            .get(name)
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))?;

        series.get(name, labels)?.record(value);
        Ok(())
    }
}

fn key(name: &'static str, env: &str, keys: &[&'static str], values: &[String]) -> Key {
    let mut labels = vec![Label::new("env", env.to_string())];
    labels.extend(
        keys.iter()
            .zip(values.iter())
            .map(|(k, v)| Label::new(*k, v.clone())),
    );

    Key::from_parts(name, labels)
}

/// Cartesian product of all label values, in key order
fn combinations(labels: &BTreeMap<&'static str, Vec<String>>) -> Vec<Vec<String>> {
    labels.values().fold(vec![Vec::new()], |acc, values| {
        acc.iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push(v.clone());
                    next
                })
            })
            .collect()
    })
}
