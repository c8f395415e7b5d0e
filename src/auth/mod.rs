//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login
//!     → credentials.rs (identity + secret lookup)
//!     → token.rs (issue opaque bearer token)
//!
//! GET /secure-data
//!     → token.rs (structural check of the presented token)
//! ```
//!
//! # Design Decisions
//! - Credential storage sits behind a trait; the gate never sees records
//! - Tokens are not bound to identities; validation checks shape only

pub mod credentials;
pub mod token;

pub use credentials::{CredentialStore, InMemoryCredentialStore};
pub use token::{Token, TokenIssuer, TokenValidator, TOKEN_LEN};
