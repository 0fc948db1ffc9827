// One-shot readiness latch

use tokio::sync::watch;

/// Latch that is signalled exactly once and can be awaited any number of
/// times. Signalling it twice is a usage error and panics.
#[derive(Debug)]
pub struct Ready {
    tx: watch::Sender<bool>,
}

impl Ready {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(false),
        }
    }

    /// Open the latch, waking every current and future waiter
    pub fn signal(&self) {
        if self.tx.send_replace(true) {
            panic!("readiness must only be signalled once");
        }
    }

    /// Wait until the latch was signalled
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so waiting cannot fail.
        let _ = rx.wait_for(|rdy| *rdy).await;
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Ready {
    fn default() -> Self {
        Self::new()
    }
}
