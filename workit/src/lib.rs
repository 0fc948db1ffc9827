// Recurring task execution engine
//
// Handlers are decorated by the registry (adapter + metrics) and executed by
// one of the worker engines: parallel (isolated cooldown loops), sequence
// (ordered pipeline of groups on a resettable ticker) or combined (both).

pub mod config;
pub mod errors;
pub mod handler;
pub mod instruments;
pub mod ready;
pub mod registry;
pub mod telemetry;
pub mod ticker;
pub mod worker;

pub use handler::{Active, Cooler, Ensure, FnHandler, Handler, Unwrap};
pub use registry::{ErrorFilter, Meter, Registry, RegistryConfig};
