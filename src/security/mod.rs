//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming protected request:
//!     → gate.rs (compose checks)
//!         → rate_limit.rs (per-identity sliding window)
//!         → auth::token (bearer token shape)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Cheap identity-keyed check first to shed load
//! - Fail closed: any failed check rejects the request
//! - Time is injected through clock.rs for deterministic tests

pub mod clock;
pub mod gate;
pub mod rate_limit;

pub use clock::{Clock, MockClock, SystemClock};
pub use gate::Gate;
pub use rate_limit::{PolicyError, RateLimitPolicy, RateLimiter};
