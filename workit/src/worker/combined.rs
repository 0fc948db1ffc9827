// Combined worker engine

use super::{parallel, sequence};
use crate::errors::{fatal, ConfigError};
use std::future::Future;
use std::sync::Arc;
use tracing::error;

#[derive(Clone, Default)]
pub struct Config {
    pub parallel: Option<Arc<parallel::Worker>>,
    pub sequence: Option<Arc<sequence::Worker>>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel.is_none() {
            return Err(ConfigError::missing("combined::Config", "parallel"));
        }
        if self.sequence.is_none() {
            return Err(ConfigError::missing("combined::Config", "sequence"));
        }

        Ok(())
    }
}

/// Runs a parallel and a sequence engine as independent background tasks
pub struct Worker {
    par: Arc<parallel::Worker>,
    seq: Arc<sequence::Worker>,
}

impl Worker {
    pub fn new(config: Config) -> Self {
        if let Err(err) = config.validate() {
            fatal(err);
        }

        let Some(par) = config.parallel else {
            fatal(ConfigError::missing("combined::Config", "parallel"));
        };
        let Some(seq) = config.sequence else {
            fatal(ConfigError::missing("combined::Config", "sequence"));
        };

        Self { par, seq }
    }

    /// Spawn both engines and return immediately. Keeping the process alive
    /// and handling shutdown signals is up to the caller. Must be called from
    /// within a tokio runtime.
    ///
    /// An engine terminating abnormally is logged at error level.
    pub fn daemon(&self) {
        let par = Arc::clone(&self.par);
        supervise("parallel", async move { par.daemon().await });

        let seq = Arc::clone(&self.seq);
        supervise("sequence", async move { seq.daemon().await });
    }

    /// Wait until all handler loops of the parallel engine are scheduled
    pub async fn ready(&self) {
        self.par.ready().await;
    }

    pub fn parallel(&self) -> &Arc<parallel::Worker> {
        &self.par
    }

    /// The sequence engine, e.g. to run a pass on demand
    pub fn sequence(&self) -> &Arc<sequence::Worker> {
        &self.seq
    }
}

fn supervise<F>(engine: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let han = tokio::spawn(fut);

    tokio::spawn(async move {
        if let Err(err) = han.await {
            error!(engine, error = %err, "worker engine stopped");
        }
    });
}
