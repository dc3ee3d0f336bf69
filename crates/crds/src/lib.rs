//! Checkly operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions managed by the Checkly controllers.

pub mod alert_channel;
pub mod references;

pub use alert_channel::*;
pub use references::*;
