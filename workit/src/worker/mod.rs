// Worker engines
//
// parallel: one isolated perpetual loop per handler, paced by its cooler
// sequence: ordered pipeline of handler groups on a resettable ticker
// combined: runs a parallel and a sequence engine side by side

pub mod combined;
pub mod parallel;
pub mod sequence;

use crate::errors::{annotate, annotation};
use crate::handler::{self, Handler};
use tracing::error;

/// Attach the identity of the innermost handler to a failure
fn annotated(han: &dyn Handler, err: anyhow::Error) -> anyhow::Error {
    annotate(err, "handler", handler::name(han.unwrap().as_ref()))
}

fn log_failure(err: &anyhow::Error) {
    error!(
        handler = annotation(err, "handler").unwrap_or_default(),
        error = %format!("{err:#}"),
        stack = ?err,
        "worker execution failed"
    );
}
