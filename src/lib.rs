//! Access-control front end for an HTTP service.
//!
//! Authenticates callers, issues opaque bearer tokens and enforces a
//! per-identity sliding window rate limit before requests reach protected
//! resources.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GateConfig;
pub use error::GateError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::Gate;
