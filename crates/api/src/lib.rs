//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Liveness and readiness probes
//! - Account and transfer routes over any [`Store`]
//! - Mapping of store errors and handler panics onto JSON error responses

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use bubblebank_db::Store;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ledger store, usually the decorated `SqlStore`.
    pub store: Arc<dyn Store>,
    /// Flipped once migrations have run.
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    /// Creates a state that reports not-ready until [`AppState::set_ready`].
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Marks the service as ready to take traffic.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Whether [`AppState::set_ready`] has been called.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
