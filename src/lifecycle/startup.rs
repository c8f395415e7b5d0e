//! Startup orchestration.
//!
//! Builds the gate from a validated configuration: credential store from
//! the seed, rate limiter from the policy.

use std::sync::Arc;

use crate::auth::InMemoryCredentialStore;
use crate::config::GateConfig;
use crate::security::{Gate, PolicyError, RateLimitPolicy, RateLimiter};

/// Construct the gate described by `config`.
pub fn build_gate(config: &GateConfig) -> Result<Gate, PolicyError> {
    let policy = RateLimitPolicy::try_from(&config.rate_limit)?;
    let credentials = InMemoryCredentialStore::from_users(&config.credentials.users);

    tracing::info!(
        max_requests = policy.max_requests(),
        window_secs = policy.window().as_secs(),
        users = config.credentials.users.len(),
        "Gate initialized"
    );

    Ok(Gate::new(Arc::new(credentials), Arc::new(RateLimiter::new(policy))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_defaults() {
        let gate = build_gate(&GateConfig::default()).unwrap();
        assert_eq!(gate.limiter().policy().max_requests(), 5);
        assert_eq!(gate.credentials().len(), 2);
        assert!(gate.login("user2", "password2").is_ok());
    }

    #[test]
    fn test_zero_policy_rejected() {
        let mut config = GateConfig::default();
        config.rate_limit.max_requests = 0;
        assert!(matches!(build_gate(&config), Err(PolicyError::ZeroMaxRequests)));
    }
}
