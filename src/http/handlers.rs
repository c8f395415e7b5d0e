//! Route handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::GateError;
use crate::http::middleware::AdmittedIdentity;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::gate::SECURE_PAYLOAD;

/// Body of `POST /login` and `POST /register`.
///
/// Missing fields are treated as empty, which never authenticates.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse {
    pub data: String,
}

pub async fn login(State(state): State<AppState>, Json(body): Json<CredentialsBody>) -> Response {
    match state.gate.login(&body.username, &body.password) {
        Ok(token) => {
            tracing::info!(username = %body.username, "User logged in successfully.");
            metrics::record_login("success");
            Json(LoginResponse {
                status: "success".to_string(),
                token: token.into_inner(),
            })
            .into_response()
        }
        Err(err) => {
            tracing::warn!(username = %body.username, "Failed login attempt.");
            metrics::record_login("failure");
            (
                err.status_code(),
                Json(json!({ "status": "failure", "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, GateError> {
    state.gate.register(&body.username, &body.password)?;
    tracing::info!(username = %body.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "User registered successfully." })),
    ))
}

pub async fn secure_data(Extension(identity): Extension<AdmittedIdentity>) -> Json<DataResponse> {
    tracing::debug!(username = ?identity.0, "Serving secure data");
    Json(DataResponse {
        data: SECURE_PAYLOAD.to_string(),
    })
}

pub async fn public_data(State(state): State<AppState>) -> Json<DataResponse> {
    Json(DataResponse {
        data: state.gate.access_public().to_string(),
    })
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
