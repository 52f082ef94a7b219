//! JSON error responses.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bubblebank_db::StoreError;
use bubblebank_shared::AppError;
use serde_json::json;
use tracing::error;

/// Handler error rendered as `{"error": CODE, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// A 400 with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Backend details stay in the logs.
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self.0, "Request failed");
            "An error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Renders a handler panic as a 500 `INTERNAL_ERROR`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError(AppError::Internal(detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get, json_body, send};
    use axum::{Router, routing};
    use rstest::rstest;
    use tower_http::catch_panic::CatchPanicLayer;

    #[rstest]
    #[case(StoreError::not_found("account", 7), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(StoreError::invalid("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(
        StoreError::InsufficientFunds { account_id: 1, balance: -5 },
        StatusCode::UNPROCESSABLE_ENTITY,
        "BUSINESS_RULE_VIOLATION"
    )]
    #[case(StoreError::Timeout, StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")]
    #[case(
        StoreError::Database("boom".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "DATABASE_ERROR"
    )]
    #[tokio::test]
    async fn test_store_errors_render_as_json(
        #[case] err: StoreError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);

        let body = json_body(response).await;
        assert_eq!(body["error"], code);
    }

    async fn broken_handler() -> StatusCode {
        panic!("ledger invariant broken")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error() {
        let app = Router::new()
            .route("/broken", routing::get(broken_handler))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = send(app, get("/broken")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "An error occurred");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = ApiError::from(StoreError::Database("secret dsn".to_string())).into_response();

        let body = json_body(response).await;
        assert_eq!(body["message"], "An error occurred");
    }
}
