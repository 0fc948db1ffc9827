// Shared helpers for worker engine integration tests
#![allow(dead_code)]

use metrics_exporter_prometheus::PrometheusHandle;
use regex::Regex;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use workit::{ErrorFilter, Registry, RegistryConfig};

/// Log sink that can be shared between the subscriber and the test
#[derive(Clone, Default)]
pub struct Logs(Arc<Mutex<Vec<u8>>>);

impl Logs {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for Logs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Logs {
    type Writer = Logs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture error level JSON logs of the current thread. Tests using this
/// must run on a current thread runtime so that spawned tasks log into the
/// same subscriber.
pub fn capture() -> (Logs, DefaultGuard) {
    let logs = Logs::default();

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::ERROR)
        .with_writer(logs.clone())
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}

/// Registry backed by its own Prometheus recorder
pub fn registry(filter: Option<ErrorFilter>) -> (Arc<Registry>, PrometheusHandle) {
    let rec = workit::telemetry::recorder().unwrap();
    let out = rec.handle();

    let reg = Registry::new(RegistryConfig {
        env: "testing".to_string(),
        filter,
        meter: Some(Arc::new(rec)),
    });

    (Arc::new(reg), out)
}

/// Value of the first sample of `metric` carrying all of the given labels
pub fn sample(out: &PrometheusHandle, metric: &str, labels: &[(&str, &str)]) -> Option<f64> {
    let rgx = Regex::new(&format!(r"^{}\{{([^}}]*)\}} (\S+)$", regex::escape(metric))).unwrap();
    let txt = out.render();

    txt.lines()
        .filter_map(|line| rgx.captures(line))
        .find(|cap| {
            labels.iter().all(|(k, v)| {
                let lab = format!(r#"{k}="{v}""#);
                cap[1].split(',').any(|x| x == lab)
            })
        })
        .and_then(|cap| cap[2].parse().ok())
}

/// Poll the condition until it holds, failing the test after one second
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    panic!("condition not met within one second");
}
