// Parallel worker engine
//
// Every handler runs along its own perpetual pipeline, so that runtime
// errors and execution delays of one handler cannot affect any other.

use super::{annotated, log_failure};
use crate::errors::{fatal, ConfigError};
use crate::handler::{Ensure, Handler};
use crate::ready::Ready;
use crate::registry::Registry;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::info;

#[derive(Clone, Default)]
pub struct Config {
    /// Handlers executed concurrently, each within its own failure domain
    pub handlers: Vec<Arc<dyn Ensure>>,
    /// Registry decorating every handler for instrumentation
    pub registry: Option<Arc<Registry>>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handlers.is_empty() {
            return Err(ConfigError::missing("parallel::Config", "handlers"));
        }
        if self.registry.is_none() {
            return Err(ConfigError::missing("parallel::Config", "registry"));
        }

        Ok(())
    }
}

pub struct Worker {
    han: Vec<Arc<dyn Handler>>,
    reg: Arc<Registry>,
    rdy: Ready,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        if let Err(err) = config.validate() {
            fatal(err);
        }

        let Some(reg) = config.registry else {
            fatal(ConfigError::missing("parallel::Config", "registry"));
        };

        let han = config
            .handlers
            .into_iter()
            .map(|x| reg.decorate(x) as Arc<dyn Handler>)
            .collect();

        Self {
            han,
            reg,
            rdy: Ready::new(),
        }
    }

    /// Start one loop per handler and block forever.
    ///
    /// Readiness is signalled once all loops are scheduled. Calling `daemon`
    /// twice on the same worker panics. A panicking handler fails like any
    /// other and keeps its loop, only a defect of the loop itself, such as a
    /// metric schema mismatch, is re-raised here.
    pub async fn daemon(&self) {
        info!(pipelines = self.han.len(), "worker is executing tasks");

        let mut set = JoinSet::new();
        for han in &self.han {
            set.spawn(ensure(Arc::clone(han), Arc::clone(&self.reg)));
        }

        self.rdy.signal();

        while let Some(res) = set.join_next().await {
            if let Err(err) = res {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
            }
        }

        std::future::pending::<()>().await;
    }

    /// Wait until all handler loops of [`Worker::daemon`] are scheduled
    pub async fn ready(&self) {
        self.rdy.wait().await;
    }
}

async fn ensure(han: Arc<dyn Handler>, reg: Arc<Registry>) {
    loop {
        if let Err(err) = han.ensure().await {
            let err = annotated(han.as_ref(), err);
            if !reg.suppress(&err) {
                log_failure(&err);
            }
        }

        // The cooler applies after failures as well.
        sleep(han.cooler()).await;
    }
}
