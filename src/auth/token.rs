//! Bearer token issuance and validation.
//!
//! A token is the SHA-256 digest of the identity followed by a random
//! integer, rendered as lowercase hex. The digest only yields fixed-length
//! pseudo-random output; nothing ties a token back to its identity.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length in characters of every issued token.
pub const TOKEN_LEN: usize = 64;

/// Opaque bearer token handed out at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stateless token issuer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenIssuer;

impl TokenIssuer {
    pub fn new() -> Self {
        Self
    }

    /// Issue a fresh token for `identity`.
    pub fn issue(&self, identity: &str) -> Token {
        let salt: u64 = rand::thread_rng().gen();
        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        hasher.update(salt.to_string().as_bytes());
        Token(format!("{:x}", hasher.finalize()))
    }
}

/// Shape-only token check.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenValidator;

impl TokenValidator {
    pub fn new() -> Self {
        Self
    }

    /// True iff a token is present and exactly [`TOKEN_LEN`] characters long.
    ///
    /// Authenticity and freshness are not checked.
    pub fn is_structurally_valid(&self, token: Option<&str>) -> bool {
        match token {
            Some(t) => t.chars().count() == TOKEN_LEN,
            None => false,
        }
    }
}

/// Strip an optional `Bearer ` scheme from an `Authorization` header value.
pub fn strip_bearer(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}
