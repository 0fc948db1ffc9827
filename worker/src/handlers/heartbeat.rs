// Heartbeat handler

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use workit::{Cooler, Ensure};

/// Emits a liveness beat every cooler period
pub struct Handler {
    coo: Duration,
    beats: AtomicU64,
}

impl Handler {
    pub fn new(coo: Duration) -> Self {
        Self {
            coo,
            beats: AtomicU64::new(0),
        }
    }

    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Ensure for Handler {
    async fn ensure(&self) -> anyhow::Result<()> {
        let beat = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(beat, "heartbeat");
        Ok(())
    }

    fn as_cooler(self: Arc<Self>) -> Option<Arc<dyn Cooler>> {
        Some(self)
    }
}

impl Cooler for Handler {
    fn cooler(&self) -> Duration {
        self.coo
    }
}
