//! Request interceptors.

pub mod gate;
pub mod metrics;

pub use gate::{gate_middleware, AdmittedIdentity};
pub use metrics::track_metrics;
