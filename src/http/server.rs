//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wrap protected routes in the gate middleware
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Serve until the shutdown signal fires

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::http::handlers;
use crate::http::middleware::{gate_middleware, track_metrics};
use crate::http::request::UuidRequestId;
use crate::http::response::{not_found, panic_response};
use crate::lifecycle::{shutdown, startup};
use crate::security::{Clock, Gate, PolicyError, SystemClock};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Gate,
    pub clock: Arc<dyn Clock>,
}

/// HTTP front end of the gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server using the wall clock.
    pub fn new(config: GateConfig) -> Result<Self, PolicyError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a server reading time from `clock`.
    pub fn with_clock(config: GateConfig, clock: Arc<dyn Clock>) -> Result<Self, PolicyError> {
        let gate = startup::build_gate(&config)?;
        let state = AppState { gate, clock };
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        let protected = Router::new()
            .route("/secure-data", get(handlers::secure_data))
            .route("/secure-resource", get(handlers::secure_data))
            .route_layer(middleware::from_fn_with_state(state.clone(), gate_middleware));

        Router::new()
            .route("/login", post(handlers::login))
            .route("/register", post(handlers::register))
            .route("/public-data", get(handlers::public_data))
            .route("/public-resource", get(handlers::public_data))
            .route("/health", get(handlers::health))
            .merge(protected)
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server on `listener` until `stop` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        stop: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(stop))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Shared state, for inspection.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The router, for in-process dispatch.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
