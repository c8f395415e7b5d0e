//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use access_gate::security::MockClock;
use access_gate::{GateConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A gate running on an ephemeral local port.
pub struct TestGate {
    pub addr: SocketAddr,
    pub clock: MockClock,
    pub shutdown: Shutdown,
}

impl TestGate {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestGate {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gate with `max_requests` per `window_secs`, driven by a mock clock.
pub async fn start_gate(max_requests: usize, window_secs: u64) -> TestGate {
    let mut config = GateConfig::default();
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.window_secs = window_secs;
    start_gate_with(config).await
}

pub async fn start_gate_with(config: GateConfig) -> TestGate {
    let clock = MockClock::default();
    let server = HttpServer::with_clock(config, Arc::new(clock.clone())).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Wait for the listener to accept
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("http://{}/health", addr)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestGate { addr, clock, shutdown }
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
