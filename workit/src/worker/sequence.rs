// Sequence worker engine
//
// Executes an ordered pipeline of handler groups. A group of one handler
// runs alone, larger groups run their members concurrently. All groups share
// one failure domain, the first failure aborts the rest of the pass.

use super::{annotated, log_failure};
use crate::errors::{fatal, ConfigError};
use crate::handler::{Ensure, Handler};
use crate::registry::Registry;
use crate::ticker::Ticker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::info;

#[derive(Clone, Default)]
pub struct Config {
    /// Time to wait after a pass before the next one starts. The daemon is
    /// disabled when zero, while [`Worker::ensure`] remains usable on demand.
    pub cooler: Duration,
    /// Handler groups in execution order
    pub handlers: Vec<Vec<Arc<dyn Ensure>>>,
    /// Registry decorating every handler for instrumentation
    pub registry: Option<Arc<Registry>>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handlers.is_empty() {
            return Err(ConfigError::missing("sequence::Config", "handlers"));
        }
        if let Some(i) = self.handlers.iter().position(Vec::is_empty) {
            return Err(ConfigError::missing(
                "sequence::Config",
                format!("handlers[{i}]"),
            ));
        }
        if self.registry.is_none() {
            return Err(ConfigError::missing("sequence::Config", "registry"));
        }

        Ok(())
    }
}

pub struct Worker {
    han: Vec<Vec<Arc<dyn Handler>>>,
    reg: Arc<Registry>,
    tic: Ticker,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        if let Err(err) = config.validate() {
            fatal(err);
        }

        let Some(reg) = config.registry else {
            fatal(ConfigError::missing("sequence::Config", "registry"));
        };

        let han = config
            .handlers
            .into_iter()
            .map(|grp| {
                grp.into_iter()
                    .map(|x| reg.decorate(x) as Arc<dyn Handler>)
                    .collect()
            })
            .collect();

        Self {
            han,
            reg,
            tic: Ticker::new(config.cooler),
        }
    }

    /// Run the pipeline once right away and again on every tick, forever.
    /// Returns immediately without side effects if no cooler is configured.
    pub async fn daemon(&self) {
        if self.tic.is_disabled() {
            return;
        }

        info!(pipelines = 1, groups = self.han.len(), "worker is executing tasks");

        loop {
            if let Err(err) = self.ensure().await {
                if !self.reg.suppress(&err) {
                    log_failure(&err);
                }
            }

            self.tic.tick().await;
        }
    }

    /// Execute a single pass over all groups.
    ///
    /// The ticker is reset afterwards regardless of the outcome, so that an
    /// on-demand pass postpones the next scheduled one by a full cooler.
    pub async fn ensure(&self) -> anyhow::Result<()> {
        let res = self.pass().await;
        self.tic.reset();
        res
    }

    async fn pass(&self) -> anyhow::Result<()> {
        for grp in &self.han {
            match grp.as_slice() {
                [han] => ensure_one(han).await?,
                _ => ensure_all(grp).await?,
            }
        }

        Ok(())
    }
}

async fn ensure_one(han: &Arc<dyn Handler>) -> anyhow::Result<()> {
    if !han.active() {
        return Ok(());
    }

    han.ensure()
        .await
        .map_err(|err| annotated(han.as_ref(), err))
}

/// Run every active member concurrently and wait for all of them. The first
/// failure to complete is returned. Handler panics arrive here as failures,
/// any other panic of a member task is re-raised.
async fn ensure_all(grp: &[Arc<dyn Handler>]) -> anyhow::Result<()> {
    let mut set = JoinSet::new();

    for han in grp.iter().filter(|x| x.active()) {
        let han = Arc::clone(han);
        set.spawn(async move {
            han.ensure()
                .await
                .map_err(|err| annotated(han.as_ref(), err))
        });
    }

    let mut res = Ok(());
    while let Some(out) = set.join_next().await {
        match out {
            Ok(Err(err)) if res.is_ok() => res = Err(err),
            Ok(_) => {}
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => {}
        }
    }

    res
}
