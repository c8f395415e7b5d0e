//! Client for the access gate's HTTP API.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct DataResponse {
    pub data: String,
}

/// Non-success answer from the gate.
#[derive(Debug)]
pub struct GateRejection {
    pub status: StatusCode,
    pub body: String,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gate returned {}: {}", self.status, self.body)
    }
}

impl std::error::Error for GateRejection {}

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct GateClient {
    client: Client,
    base_url: String,
}

impl GateClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Log in and return the issued token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let resp = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&Credentials { username, password })
            .send()
            .await?;
        parse(resp).await
    }

    /// Register a new user.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/register", self.base_url))
            .json(&Credentials { username, password })
            .send()
            .await?;
        parse::<serde_json::Value>(resp).await.map(|_| ())
    }

    /// Fetch the protected resource as `username` with `token`.
    pub async fn secure_data(&self, username: &str, token: &str) -> Result<DataResponse> {
        let resp = self
            .client
            .get(format!("{}/secure-data", self.base_url))
            .query(&[("username", username)])
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;
        parse(resp).await
    }

    /// Fetch the public resource.
    pub async fn public_data(&self) -> Result<DataResponse> {
        let resp = self
            .client
            .get(format!("{}/public-data", self.base_url))
            .send()
            .await?;
        parse(resp).await
    }
}

async fn parse<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(Box::new(GateRejection { status, body: text }));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Status code of a rejection, if `err` is one.
pub fn rejection_status(err: &(dyn std::error::Error + Send + Sync + 'static)) -> Option<StatusCode> {
    err.downcast_ref::<GateRejection>().map(|r| r.status)
}
