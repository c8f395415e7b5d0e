//! Per-identity sliding window log rate limiter.
//!
//! Each identity owns a [`RequestWindow`] of admitted timestamps behind its
//! own mutex. The map only hands out the `Arc` to that mutex; the shard lock
//! is released before the window is locked, so identities never contend on
//! each other's windows.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Rejected policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("max_requests must be greater than zero")]
    ZeroMaxRequests,
    #[error("window must be greater than zero")]
    ZeroWindow,
}

/// Admission policy shared by every identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: usize,
    window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: usize, window: Duration) -> Result<Self, PolicyError> {
        if max_requests == 0 {
            return Err(PolicyError::ZeroMaxRequests);
        }
        if window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        Ok(Self { max_requests, window })
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl TryFrom<&RateLimitConfig> for RateLimitPolicy {
    type Error = PolicyError;

    fn try_from(config: &RateLimitConfig) -> Result<Self, Self::Error> {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }
}

/// Timestamps of admitted requests for one identity, oldest first.
#[derive(Debug, Default)]
struct RequestWindow {
    hits: VecDeque<Instant>,
}

impl RequestWindow {
    /// Drop every hit with `now - t >= window`.
    ///
    /// Hits later than `now` are treated as age zero and kept.
    fn prune(&mut self, now: Instant, window: Duration) {
        self.hits
            .retain(|&t| now.saturating_duration_since(t) < window);
    }

    fn live(&self, now: Instant, window: Duration) -> usize {
        self.hits
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < window)
            .count()
    }
}

/// Sliding window rate limiter keyed by identity.
pub struct RateLimiter {
    windows: DashMap<String, Arc<Mutex<RequestWindow>>>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            windows: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Fetch the identity's window, creating an empty one if absent.
    fn window_for(&self, identity: &str) -> Arc<Mutex<RequestWindow>> {
        if let Some(existing) = self.windows.get(identity) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.windows
                .entry(identity.to_string())
                .or_default()
                .value(),
        )
    }

    /// Decide whether `identity` may make a request at `now`.
    ///
    /// Prune, compare and append happen under the identity's lock as one
    /// step. A rejection leaves the window pruned but otherwise unchanged.
    pub fn admit(&self, identity: &str, now: Instant) -> bool {
        let window = self.window_for(identity);
        let mut window = window.lock();

        window.prune(now, self.policy.window);
        if window.hits.len() >= self.policy.max_requests {
            return false;
        }

        window.hits.push_back(now);
        true
    }

    /// Quota left for `identity` at `now` without consuming any.
    pub fn remaining(&self, identity: &str, now: Instant) -> usize {
        let window = self.windows.get(identity).map(|e| Arc::clone(e.value()));
        let used = match window {
            Some(window) => window.lock().live(now, self.policy.window),
            None => 0,
        };
        self.policy.max_requests.saturating_sub(used)
    }

    /// Number of identities with a window, expired or not.
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn limiter(max: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitPolicy::new(max, secs(window_secs)).unwrap())
    }

    #[test]
    fn test_policy_rejects_zero() {
        assert_eq!(RateLimitPolicy::new(0, secs(60)), Err(PolicyError::ZeroMaxRequests));
        assert_eq!(RateLimitPolicy::new(5, Duration::ZERO), Err(PolicyError::ZeroWindow));
    }

    #[test]
    fn test_fresh_identity_gets_full_quota() {
        let limiter = RateLimiter::default();
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(limiter.admit("fresh", t0));
        }
        assert!(!limiter.admit("fresh", t0));
    }

    #[test]
    fn test_sliding_window_example() {
        let limiter = limiter(2, 60);
        let t0 = Instant::now();

        assert!(limiter.admit("u1", t0));
        assert!(limiter.admit("u1", t0 + secs(1)));
        assert!(!limiter.admit("u1", t0 + secs(2)));
        assert!(limiter.admit("u1", t0 + secs(62)));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.admit("u1", t0));
        assert!(!limiter.admit("u1", t0 + secs(59)));
        // Exactly one window later the first hit has expired
        assert!(limiter.admit("u1", t0 + secs(60)));
    }

    #[test]
    fn test_partial_expiry_frees_one_slot() {
        let limiter = limiter(2, 60);
        let t0 = Instant::now();

        assert!(limiter.admit("u1", t0));
        assert!(limiter.admit("u1", t0 + secs(1)));
        assert!(limiter.admit("u1", t0 + secs(60)));
        assert!(!limiter.admit("u1", t0 + secs(60)));
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let limiter = limiter(1, 10);
        let t0 = Instant::now();

        assert!(limiter.admit("u1", t0));
        for i in 1..10 {
            assert!(!limiter.admit("u1", t0 + secs(i)));
        }
        assert!(limiter.admit("u1", t0 + secs(10)));
    }

    #[test]
    fn test_quota_resets_after_window() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();
        for _ in 0..3 {
            assert!(limiter.admit("u1", t0));
        }
        assert!(!limiter.admit("u1", t0));

        let later = t0 + secs(60);
        for _ in 0..3 {
            assert!(limiter.admit("u1", later));
        }
        assert!(!limiter.admit("u1", later));
    }

    #[test]
    fn test_identities_are_isolated() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.admit("a", t0));
        assert!(!limiter.admit("a", t0));
        assert!(limiter.admit("b", t0));
        assert!(limiter.admit("", t0));
        assert!(!limiter.admit("", t0));
    }

    #[test]
    fn test_out_of_order_timestamp_is_kept() {
        let limiter = limiter(1, 60);
        let t0 = Instant::now();

        assert!(limiter.admit("u1", t0 + secs(30)));
        assert!(!limiter.admit("u1", t0));
    }

    #[test]
    fn test_remaining_does_not_consume() {
        let limiter = limiter(3, 60);
        let t0 = Instant::now();

        assert_eq!(limiter.remaining("u1", t0), 3);
        assert_eq!(limiter.tracked_identities(), 0);

        limiter.admit("u1", t0);
        assert_eq!(limiter.remaining("u1", t0), 2);
        assert_eq!(limiter.remaining("u1", t0), 2);
        assert_eq!(limiter.remaining("u1", t0 + secs(60)), 3);
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn test_concurrent_admits_never_overshoot() {
        let limiter = limiter(5, 60);
        let now = Instant::now();
        let threads = 32;
        let barrier = Barrier::new(threads);

        let admitted = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let limiter = &limiter;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        limiter.admit("shared", now)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(admitted, 5);
    }

    #[test]
    fn test_concurrent_identities_each_get_quota() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        std::thread::scope(|s| {
            for id in 0..8 {
                let limiter = &limiter;
                s.spawn(move || {
                    let identity = format!("user{}", id);
                    let admitted = (0..10).filter(|_| limiter.admit(&identity, now)).count();
                    assert_eq!(admitted, 3);
                });
            }
        });

        assert_eq!(limiter.tracked_identities(), 8);
    }
}
