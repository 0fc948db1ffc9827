// Handler capability model
//
// A handler must implement `Ensure`. `Cooler`, `Active` and `Unwrap` are
// optional and advertised through the `as_*` probes on `Ensure`, which the
// proxy adapter resolves once at decoration time.

pub mod function;
pub mod metrics;
pub mod proxy;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use function::FnHandler;
pub use self::metrics::Metrics;
pub use proxy::Proxy;

/// Unit of recurring work
///
/// Implementations advertise optional capabilities by overriding the probes:
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use workit::{Cooler, Ensure};
///
/// struct Reconcile;
///
/// #[async_trait::async_trait]
/// impl Ensure for Reconcile {
///     async fn ensure(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn as_cooler(self: Arc<Self>) -> Option<Arc<dyn Cooler>> {
///         Some(self)
///     }
/// }
///
/// impl Cooler for Reconcile {
///     fn cooler(&self) -> Duration {
///         Duration::from_secs(5)
///     }
/// }
/// ```
#[async_trait]
pub trait Ensure: Send + Sync + 'static {
    /// Execute the business logic once. Any error is recorded and logged by
    /// the executing engine, it never stops the engine.
    async fn ensure(&self) -> anyhow::Result<()>;

    /// Probe for the `Cooler` capability
    fn as_cooler(self: Arc<Self>) -> Option<Arc<dyn Cooler>> {
        None
    }

    /// Probe for the `Active` capability
    fn as_active(self: Arc<Self>) -> Option<Arc<dyn Active>> {
        None
    }

    /// Probe for the `Unwrap` capability
    fn as_unwrap(self: Arc<Self>) -> Option<Arc<dyn Unwrap>> {
        None
    }

    /// Fully qualified name of the implementing type, used for identity only
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Time to wait after one execution before the next one is attempted.
/// This is not an interval on a strict schedule.
pub trait Cooler: Send + Sync {
    fn cooler(&self) -> Duration;
}

/// Whether the handler should run during the current cycle
pub trait Active: Send + Sync {
    fn active(&self) -> bool;
}

/// Access to the innermost handler behind a chain of decorators
pub trait Unwrap: Send + Sync {
    fn unwrap(&self) -> Arc<dyn Ensure>;
}

/// Fully decorated handler as executed by the worker engines
pub trait Handler: Ensure + Cooler + Active + Unwrap {}

impl<T: Ensure + Cooler + Active + Unwrap> Handler for T {}

/// Short identity of the given handler, e.g. `app::artefact::Handler`
/// resolves to `artefact`.
pub fn name(han: &dyn Ensure) -> String {
    short(han.type_name())
}

/// Identities of the given handlers, in order
pub fn names(han: &[Arc<dyn Ensure>]) -> Vec<String> {
    han.iter().map(|x| name(x.as_ref())).collect()
}

fn short(typ: &str) -> String {
    let path = typ.split('<').next().unwrap_or(typ);
    let mut segments = path.rsplit("::");
    let last = segments.next().unwrap_or(path);
    segments.next().unwrap_or(last).to_string()
}
