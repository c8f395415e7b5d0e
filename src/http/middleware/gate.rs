//! Gate middleware.
//! Runs the admission checks in front of protected routes.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::auth::token::strip_bearer;
use crate::error::GateError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Identity claim carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct IdentityQuery {
    pub username: Option<String>,
}

/// Context attached to admitted requests.
#[derive(Clone, Debug)]
pub struct AdmittedIdentity(pub Option<String>);

pub async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // A query string that fails to parse counts as no identity
    let identity = Query::<IdentityQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.username);

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(strip_bearer);

    let now = state.clock.now();
    let outcome = state
        .gate
        .access_protected(identity.as_deref(), token, now);
    metrics::record_tracked_identities(state.gate.limiter().tracked_identities());

    match outcome {
        Ok(()) => {
            tracing::debug!(
                request_id = %request_id(req.headers()),
                username = identity.as_deref().unwrap_or_default(),
                "Request admitted"
            );
            req.extensions_mut().insert(AdmittedIdentity(identity));
            next.run(req).await
        }
        Err(GateError::RateLimited) => {
            tracing::warn!(
                request_id = %request_id(req.headers()),
                username = identity.as_deref().unwrap_or_default(),
                "Rate limit exceeded"
            );
            metrics::record_rate_limited();
            GateError::RateLimited.into_response()
        }
        Err(err) => {
            tracing::warn!(
                request_id = %request_id(req.headers()),
                username = identity.as_deref().unwrap_or_default(),
                "Unauthorized access attempt."
            );
            err.into_response()
        }
    }
}
