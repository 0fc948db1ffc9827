// Uptime handler

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::info;
use workit::Ensure;

/// Reports the process uptime on every sequence pass
pub struct Handler {
    sta: Instant,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            sta: Instant::now(),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ensure for Handler {
    async fn ensure(&self) -> anyhow::Result<()> {
        info!(uptime_seconds = self.sta.elapsed().as_secs(), "worker uptime");
        Ok(())
    }
}
