// Execution instrumentation decorator

use super::{Active, Cooler, Ensure, Handler, Unwrap};
use crate::errors::fatal;
use crate::instruments::{InstrumentSpec, Instruments};
use crate::registry::ErrorFilter;
use async_trait::async_trait;
use ::metrics::{Recorder, Unit};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const METRIC_TOTAL: &str = "worker_handler_execution_total";
pub const METRIC_DURATION: &str = "worker_handler_execution_duration_seconds";

/// Histogram boundaries of [`METRIC_DURATION`] in seconds
pub const DURATION_BUCKETS: &[f64] = &[
    0.10, //  100 ms
    0.15, //  150 ms
    0.20, //  200 ms
    0.25, //  250 ms
    0.50, //  500 ms
    1.00, // 1000 ms
    1.50, // 1500 ms
    2.00, // 2000 ms
    2.50, // 2500 ms
    5.00, // 5000 ms
];

/// Decorator that times every execution of the wrapped handler and records
/// its outcome. Every other capability is forwarded unchanged.
pub struct Metrics {
    han: Arc<dyn Handler>,
    nam: String,
    ins: Instruments,
    fil: ErrorFilter,
}

impl Metrics {
    /// Wrap an already adapted handler. The instruments of the handler are
    /// registered against the given meter right away, labelled with the
    /// identity of the innermost handler.
    pub fn new(han: Arc<dyn Handler>, env: &str, met: &dyn Recorder, fil: ErrorFilter) -> Self {
        let nam = super::name(han.unwrap().as_ref());
        let ins = Instruments::new(env, met, specs(&nam));

        Self { han, nam, ins, fil }
    }

    /// Identity of the innermost handler
    pub fn name(&self) -> &str {
        &self.nam
    }

    fn instrument(&self, lat: Duration, res: &anyhow::Result<()>) {
        let suc = if res.is_ok() { "true" } else { "false" };

        debug!(
            handler = %self.nam,
            latency = ?lat,
            success = suc,
            filtered = res.as_ref().err().is_some_and(|e| (self.fil)(e)),
            "executed worker handler"
        );

        let lab = [("handler", self.nam.as_str()), ("success", suc)];

        if let Err(err) = self.ins.counter(METRIC_TOTAL, 1, &lab) {
            fatal(err);
        }

        if let Err(err) = self.ins.histogram(METRIC_DURATION, lat.as_secs_f64(), &lab) {
            fatal(err);
        }
    }
}

fn specs(nam: &str) -> Vec<InstrumentSpec> {
    vec![
        InstrumentSpec::counter(METRIC_TOTAL, "the total amount of worker handler executions")
            .label("handler", [nam])
            .label("success", ["true", "false"]),
        InstrumentSpec::histogram(
            METRIC_DURATION,
            "the time it takes for worker handler executions to complete",
        )
        .unit(Unit::Seconds)
        .label("handler", [nam])
        .label("success", ["true", "false"]),
    ]
}

#[async_trait]
impl Ensure for Metrics {
    async fn ensure(&self) -> anyhow::Result<()> {
        let sta = Instant::now();
        let res = self.han.ensure().await;

        self.instrument(sta.elapsed(), &res);

        res
    }

    fn as_cooler(self: Arc<Self>) -> Option<Arc<dyn Cooler>> {
        Some(self)
    }

    fn as_active(self: Arc<Self>) -> Option<Arc<dyn Active>> {
        Some(self)
    }

    fn as_unwrap(self: Arc<Self>) -> Option<Arc<dyn Unwrap>> {
        Some(self)
    }
}

impl Cooler for Metrics {
    fn cooler(&self) -> Duration {
        self.han.cooler()
    }
}

impl Active for Metrics {
    fn active(&self) -> bool {
        self.han.active()
    }
}

impl Unwrap for Metrics {
    fn unwrap(&self) -> Arc<dyn Ensure> {
        self.han.unwrap()
    }
}
