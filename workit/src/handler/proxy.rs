// Capability completing adapter

use super::{Active, Cooler, Ensure, Unwrap};
use crate::errors::HandlerPanic;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Adapter that resolves the optional capabilities of the wrapped handler.
///
/// The probes are called once in [`Proxy::new`]. Handlers without `Cooler`
/// cool down for zero, handlers without `Active` are always active, and
/// `unwrap` always terminates at a handler that is not a decorator. A panic
/// of the wrapped handler surfaces as a [`HandlerPanic`] failure, keeping it
/// inside the failure domain of that handler:
///
/// ```text
/// metrics -> proxy -> artefact
/// ```
pub struct Proxy {
    han: Arc<dyn Ensure>,
    coo: Option<Arc<dyn Cooler>>,
    act: Option<Arc<dyn Active>>,
    unw: Option<Arc<dyn Unwrap>>,
}

impl Proxy {
    pub fn new(han: Arc<dyn Ensure>) -> Self {
        Self {
            coo: Arc::clone(&han).as_cooler(),
            act: Arc::clone(&han).as_active(),
            unw: Arc::clone(&han).as_unwrap(),
            han,
        }
    }
}

#[async_trait]
impl Ensure for Proxy {
    async fn ensure(&self) -> anyhow::Result<()> {
        match AssertUnwindSafe(self.han.ensure()).catch_unwind().await {
            Ok(res) => res,
            Err(payload) => Err(HandlerPanic::from_payload(payload).into()),
        }
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

impl Cooler for Proxy {
    fn cooler(&self) -> Duration {
        self.coo.as_ref().map_or(Duration::ZERO, |x| x.cooler())
    }
}

impl Active for Proxy {
    fn active(&self) -> bool {
        self.act.as_ref().map_or(true, |x| x.active())
    }
}

impl Unwrap for Proxy {
    fn unwrap(&self) -> Arc<dyn Ensure> {
        match &self.unw {
            Some(x) => x.unwrap(),
            None => Arc::clone(&self.han),
        }
    }
}
