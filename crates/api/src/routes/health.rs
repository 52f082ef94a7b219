//! Liveness and readiness endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Time the probe was answered.
    pub timestamp: DateTime<Utc>,
    /// Service version.
    pub version: &'static str,
}

/// Readiness response.
#[derive(Serialize)]
pub struct ReadyResponse {
    /// `ready` or `not ready`.
    pub status: &'static str,
    /// `complete` or `pending`.
    pub migrations: &'static str,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "up",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 503 until the server has finished migrating.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                migrations: "complete",
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not ready",
                migrations: "pending",
            }),
        )
    }
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bubblebank_db::testing::MockLedgerStore;

    use crate::test_support::{app, get, json_body, send};
    use crate::{AppState, create_router};

    use super::*;

    #[tokio::test]
    async fn test_health_is_up() {
        let response = send(app(MockLedgerStore::new()), get("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "up");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_ready_after_set_ready() {
        let response = send(app(MockLedgerStore::new()), get("/ready")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["migrations"], "complete");
    }

    #[tokio::test]
    async fn test_not_ready_before_migrations() {
        let state = AppState::new(Arc::new(MockLedgerStore::new()));
        let response = send(create_router(state), get("/ready")).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["migrations"], "pending");
    }
}
