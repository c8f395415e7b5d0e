//! Admission gate in front of protected resources.
//!
//! # Order of checks
//! ```text
//! access_protected(identity, token, now)
//!     → RateLimiter::admit      (identity-keyed, cheap)    ✗ → RateLimited
//!     → TokenValidator          (shape of bearer token)    ✗ → Unauthorized
//!     → Ok
//! ```
//!
//! The identity used for rate limiting is whatever the caller claims; it is
//! not tied to the token. A missing identity shares the anonymous key.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::{CredentialStore, Token, TokenIssuer, TokenValidator};
use crate::error::GateError;
use crate::security::rate_limit::RateLimiter;

/// Rate-limit key for requests that carry no identity.
pub const ANONYMOUS: &str = "";

/// Payload served to admitted callers of the protected resource.
pub const SECURE_PAYLOAD: &str = "This is secure data.";

/// Payload served by the unguarded resource.
pub const PUBLIC_PAYLOAD: &str = "This is public data.";

/// Composition of credential store, token issuer/validator and rate limiter.
///
/// Holds no state of its own; all mutable state lives in the limiter's
/// windows and the credential store.
#[derive(Clone)]
pub struct Gate {
    credentials: Arc<dyn CredentialStore>,
    limiter: Arc<RateLimiter>,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl Gate {
    pub fn new(credentials: Arc<dyn CredentialStore>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            credentials,
            limiter,
            issuer: TokenIssuer::new(),
            validator: TokenValidator::new(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    /// Authenticate and issue a token.
    pub fn login(&self, identity: &str, secret: &str) -> Result<Token, GateError> {
        if self.credentials.authenticate(identity, secret) {
            Ok(self.issuer.issue(identity))
        } else {
            Err(GateError::InvalidCredentials)
        }
    }

    /// Add a credential record.
    pub fn register(&self, identity: &str, secret: &str) -> Result<(), GateError> {
        self.credentials.register(identity, secret)
    }

    /// Guard the protected resource.
    pub fn access_protected(
        &self,
        identity: Option<&str>,
        token: Option<&str>,
        now: Instant,
    ) -> Result<(), GateError> {
        let key = identity.unwrap_or(ANONYMOUS);

        if !self.limiter.admit(key, now) {
            return Err(GateError::RateLimited);
        }

        if !self.validator.is_structurally_valid(token) {
            return Err(GateError::Unauthorized);
        }

        Ok(())
    }

    /// Unguarded resource. Always succeeds.
    pub fn access_public(&self) -> &'static str {
        PUBLIC_PAYLOAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryCredentialStore;
    use crate::config::UserConfig;
    use crate::security::rate_limit::RateLimitPolicy;
    use std::time::Duration;

    fn gate(max: usize) -> Gate {
        let store = InMemoryCredentialStore::from_users(&[UserConfig {
            username: "user1".into(),
            password: "password1".into(),
        }]);
        let policy = RateLimitPolicy::new(max, Duration::from_secs(60)).unwrap();
        Gate::new(Arc::new(store), Arc::new(RateLimiter::new(policy)))
    }

    #[test]
    fn test_login() {
        let gate = gate(5);
        let token = gate.login("user1", "password1").unwrap();
        assert_eq!(token.as_str().len(), 64);

        assert_eq!(gate.login("user1", "wrong"), Err(GateError::InvalidCredentials));
        assert_eq!(gate.login("ghost", "password1"), Err(GateError::InvalidCredentials));
    }

    #[test]
    fn test_register_then_login() {
        let gate = gate(5);
        gate.register("user9", "secret").unwrap();
        assert!(gate.login("user9", "secret").is_ok());
        assert_eq!(gate.register("user9", "other"), Err(GateError::IdentityTaken));
    }

    #[test]
    fn test_access_with_valid_token() {
        let gate = gate(5);
        let token = gate.login("user1", "password1").unwrap();
        let now = Instant::now();
        assert_eq!(gate.access_protected(Some("user1"), Some(token.as_str()), now), Ok(()));
    }

    #[test]
    fn test_missing_or_short_token_is_unauthorized() {
        let gate = gate(5);
        let now = Instant::now();
        assert_eq!(gate.access_protected(Some("user1"), None, now), Err(GateError::Unauthorized));
        assert_eq!(
            gate.access_protected(Some("user1"), Some("short"), now),
            Err(GateError::Unauthorized)
        );
    }

    #[test]
    fn test_rate_limit_checked_before_token() {
        let gate = gate(2);
        let now = Instant::now();

        // Invalid tokens still spend quota
        assert_eq!(gate.access_protected(Some("user1"), None, now), Err(GateError::Unauthorized));
        assert_eq!(gate.access_protected(Some("user1"), None, now), Err(GateError::Unauthorized));
        assert_eq!(gate.access_protected(Some("user1"), None, now), Err(GateError::RateLimited));

        let token = "a".repeat(64);
        assert_eq!(
            gate.access_protected(Some("user1"), Some(&token), now),
            Err(GateError::RateLimited)
        );
    }

    #[test]
    fn test_missing_identity_uses_anonymous_key() {
        let gate = gate(1);
        let now = Instant::now();
        let token = "a".repeat(64);

        assert_eq!(gate.access_protected(None, Some(&token), now), Ok(()));
        assert_eq!(gate.access_protected(None, Some(&token), now), Err(GateError::RateLimited));
        assert_eq!(gate.access_protected(Some(""), Some(&token), now), Err(GateError::RateLimited));
        assert_eq!(gate.access_protected(Some("user1"), Some(&token), now), Ok(()));
    }

    #[test]
    fn test_public_always_succeeds() {
        let gate = gate(1);
        let now = Instant::now();
        gate.access_protected(Some("user1"), None, now).ok();
        gate.access_protected(Some("user1"), None, now).ok();
        assert_eq!(gate.access_public(), PUBLIC_PAYLOAD);
    }
}
