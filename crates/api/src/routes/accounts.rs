//! Account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use bubblebank_db::{Account, CreateAccountParams, ListAccountsParams, Querier};
use bubblebank_shared::types::{Currency, PageRequest};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account).delete(delete_account))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Account holder.
    #[validate(length(min = 1))]
    pub owner: String,
    /// One of the supported currency codes.
    pub currency: String,
}

/// Rejects ids the database can never have issued.
pub(crate) fn require_id(id: i64) -> ApiResult<i64> {
    if id < 1 {
        return Err(ApiError::validation(format!("Invalid account id: {id}")));
    }
    Ok(id)
}

/// POST `/accounts` - Opens an account with a zero balance.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    if payload.owner.trim().is_empty() {
        return Err(ApiError::validation("owner must not be blank"));
    }
    let currency: Currency = payload.currency.parse().map_err(ApiError::validation)?;

    let account = state
        .store
        .create_account(CreateAccountParams {
            owner: payload.owner,
            balance: 0,
            currency: currency.to_string(),
        })
        .await?;

    info!(account_id = account.id, currency = %currency, "Account created");
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{id}` - Fetches one account.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Account>> {
    let account = state.store.get_account(require_id(id)?).await?;
    Ok(Json(account))
}

/// GET `/accounts?page_id=&page_size=` - Lists accounts by ascending id.
async fn list_accounts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Vec<Account>>> {
    page.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let accounts = state
        .store
        .list_accounts(ListAccountsParams {
            limit: page.limit(),
            offset: page.offset(),
        })
        .await?;
    Ok(Json(accounts))
}

/// DELETE `/accounts/{id}` - Removes an account with no entries or transfers.
async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete_account(require_id(id)?).await?;
    info!(account_id = id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use bubblebank_db::StoreError;
    use bubblebank_db::testing::{MockLedgerStore, account};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_support::{app, get, json_body, post_json, send};

    #[tokio::test]
    async fn test_create_account_starts_at_zero() {
        let mut store = MockLedgerStore::new();
        store
            .expect_create_account()
            .withf(|p| p.owner == "alice" && p.balance == 0 && p.currency == "USD")
            .times(1)
            .returning(|_| Ok(account(1, 0, "USD")));

        let response = send(
            app(store),
            post_json("/accounts", &json!({"owner": "alice", "currency": "usd"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["balance"], 0);
        assert_eq!(body["currency"], "USD");
    }

    #[rstest]
    #[case(json!({"owner": "", "currency": "USD"}))]
    #[case(json!({"owner": "   ", "currency": "USD"}))]
    #[case(json!({"owner": "bob", "currency": "GBP"}))]
    #[tokio::test]
    async fn test_create_account_rejects_bad_input(#[case] payload: serde_json::Value) {
        let mut store = MockLedgerStore::new();
        store.expect_create_account().never();

        let response = send(app(store), post_json("/accounts", &payload)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_account() {
        let mut store = MockLedgerStore::new();
        store
            .expect_get_account()
            .with(eq(42))
            .returning(|id| Ok(account(id, 250, "EUR")));

        let response = send(app(store), get("/accounts/42")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["balance"], 250);
    }

    #[tokio::test]
    async fn test_get_missing_account_is_404() {
        let mut store = MockLedgerStore::new();
        store
            .expect_get_account()
            .returning(|id| Err(StoreError::not_found("account", id)));

        let response = send(app(store), get("/accounts/9")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_account_rejects_non_positive_id() {
        let mut store = MockLedgerStore::new();
        store.expect_get_account().never();

        let response = send(app(store), get("/accounts/0")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_accounts_pages() {
        let mut store = MockLedgerStore::new();
        store
            .expect_list_accounts()
            .with(eq(ListAccountsParams { limit: 5, offset: 5 }))
            .returning(|_| Ok((6..=10).map(|id| account(id, 0, "CAD")).collect()));

        let response = send(app(store), get("/accounts?page_id=2&page_size=5")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(5));
    }

    #[rstest]
    #[case("/accounts?page_id=0&page_size=5")]
    #[case("/accounts?page_id=1&page_size=4")]
    #[case("/accounts?page_id=1&page_size=11")]
    #[tokio::test]
    async fn test_list_accounts_rejects_bad_page(#[case] uri: &str) {
        let mut store = MockLedgerStore::new();
        store.expect_list_accounts().never();

        let response = send(app(store), get(uri)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_referenced_account_conflicts() {
        let mut store = MockLedgerStore::new();
        store.expect_delete_account().returning(|_| {
            Err(StoreError::ConstraintViolation {
                kind: bubblebank_db::ConstraintKind::ForeignKey,
                message: "entries_account_id_fkey".to_string(),
            })
        });

        let request = Request::builder()
            .method("DELETE")
            .uri("/accounts/3")
            .body(Body::empty())
            .unwrap();
        let response = send(app(store), request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_account() {
        let mut store = MockLedgerStore::new();
        store
            .expect_delete_account()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(()));

        let request = Request::builder()
            .method("DELETE")
            .uri("/accounts/3")
            .body(Body::empty())
            .unwrap();
        let response = send(app(store), request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
