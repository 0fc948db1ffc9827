// Closure backed handler

use super::{Cooler, Ensure};
use crate::errors::{fatal, ConfigError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Handler that creates a fresh future from a closure on every execution.
///
/// The given name is used as the handler identity instead of the type name,
/// which would be the same for every closure handler.
///
/// ```rust
/// use std::time::Duration;
/// use workit::FnHandler;
///
/// let han = FnHandler::arc("heartbeat", Duration::from_secs(5), || async {
///     Ok::<_, anyhow::Error>(())
/// });
///
/// assert_eq!(workit::handler::name(han.as_ref()), "heartbeat");
/// ```
pub struct FnHandler<F> {
    name: &'static str,
    cooler: Duration,
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new(name: &'static str, cooler: Duration, f: F) -> Self {
        if name.is_empty() {
            fatal(ConfigError::missing("FnHandler", "name"));
        }

        Self { name, cooler, f }
    }

    pub fn arc(name: &'static str, cooler: Duration, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, cooler, f))
    }
}

#[async_trait]
impl<F, Fut> Ensure for FnHandler<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn ensure(&self) -> anyhow::Result<()> {
        (self.f)().await
    }

    fn as_cooler(self: Arc<Self>) -> Option<Arc<dyn Cooler>> {
        Some(self)
    }

    fn type_name(&self) -> &'static str {
        self.name
    }
}

impl<F: Send + Sync> Cooler for FnHandler<F> {
    fn cooler(&self) -> Duration {
        self.cooler
    }
}
