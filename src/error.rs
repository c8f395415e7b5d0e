//! Gate outcomes surfaced to callers.
//!
//! Every variant is a terminal, user-visible rejection. Nothing here is
//! retried internally and nothing is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Rejection produced by the gate or the credential store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Login with an unknown identity or a wrong secret.
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// The identity has used up its quota for the current window.
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,

    /// Missing or malformed bearer token.
    #[error("Unauthorized. Invalid token.")]
    Unauthorized,

    /// Registration for an identity that already has a record.
    #[error("Username already exists.")]
    IdentityTaken,

    /// Registration with an empty identity.
    #[error("Username must not be empty.")]
    InvalidIdentity,
}

impl GateError {
    /// HTTP status the hosting layer reports for this outcome.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GateError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GateError::Unauthorized => StatusCode::FORBIDDEN,
            GateError::IdentityTaken => StatusCode::CONFLICT,
            GateError::InvalidIdentity => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
