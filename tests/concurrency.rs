//! Concurrent admission through the full HTTP stack.

use std::sync::Arc;
use std::time::Instant;

use access_gate::security::{Gate, RateLimitPolicy, RateLimiter};
use access_gate::auth::InMemoryCredentialStore;
use reqwest::StatusCode;
use tokio::sync::Barrier;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_admit_exactly_max() {
    let gate = common::start_gate(5, 60).await;
    let token = "a".repeat(64);
    let tasks = 40;
    let barrier = Arc::new(Barrier::new(tasks));

    let handles: Vec<_> = (0..tasks)
        .map(|_| {
            let url = gate.url("/secure-data");
            let token = token.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                let client = common::client();
                barrier.wait().await;
                client
                    .get(url)
                    .query(&[("username", "burst")])
                    .header("Authorization", token)
                    .send()
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    let mut ok = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(ok, 5);
    assert_eq!(limited, tasks - 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_shared_across_tasks() {
    let policy = RateLimitPolicy::new(3, std::time::Duration::from_secs(60)).unwrap();
    let gate = Gate::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(RateLimiter::new(policy)),
    );
    let now = Instant::now();
    let token = "b".repeat(64);

    let handles: Vec<_> = (0..10)
        .flat_map(|id| (0..6).map(move |_| id))
        .map(|id| {
            let gate = gate.clone();
            let token = token.clone();
            tokio::spawn(async move {
                let identity = format!("user{}", id);
                (id, gate.access_protected(Some(&identity), Some(&token), now).is_ok())
            })
        })
        .collect();

    let mut admitted = [0usize; 10];
    for handle in handles {
        let (id, ok) = handle.await.unwrap();
        if ok {
            admitted[id] += 1;
        }
    }

    assert!(admitted.iter().all(|&n| n == 3));
}
