// Reference handlers hosted by the worker binary
// The module names double as the handler identities in metrics and logs.

pub mod heartbeat;
pub mod uptime;
