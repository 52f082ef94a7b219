//! Transfer route.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use bubblebank_core::ledger::TransferRequest;
use bubblebank_db::{Querier, Store, TransferTxParams, TransferTxResult};
use bubblebank_shared::types::Currency;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(create_transfer))
}

/// Request body for moving money between two accounts.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransferRequest {
    /// Account debited.
    #[validate(range(min = 1))]
    pub from_account_id: i64,
    /// Account credited.
    #[validate(range(min = 1))]
    pub to_account_id: i64,
    /// Amount in minor units.
    #[validate(range(min = 1))]
    pub amount: i64,
    /// Currency both accounts must hold.
    pub currency: String,
}

/// Fails unless the account exists and holds `currency`.
async fn check_account_currency(
    store: &dyn Store,
    account_id: i64,
    currency: Currency,
) -> ApiResult<()> {
    let account = store.get_account(account_id).await?;
    if account.currency != currency.code() {
        return Err(ApiError::validation(format!(
            "account [{account_id}] currency mismatch: {} vs {currency}",
            account.currency
        )));
    }
    Ok(())
}

/// POST `/transfers` - Runs a transfer and returns everything it wrote.
async fn create_transfer(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransferRequest>,
) -> ApiResult<Json<TransferTxResult>> {
    payload
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let currency: Currency = payload.currency.parse().map_err(ApiError::validation)?;

    let params = TransferTxParams {
        from_account_id: payload.from_account_id,
        to_account_id: payload.to_account_id,
        amount: payload.amount,
    };
    TransferRequest::from(params)
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    check_account_currency(state.store.as_ref(), params.from_account_id, currency).await?;
    check_account_currency(state.store.as_ref(), params.to_account_id, currency).await?;

    let result = state.store.transfer_tx(params).await?;

    info!(
        transfer_id = result.transfer.id,
        amount = result.transfer.amount,
        "Transfer completed"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use bubblebank_db::StoreError;
    use bubblebank_db::testing::{MockLedgerStore, account, entry, transfer};
    use mockall::predicate::eq;
    use serde_json::json;

    use super::*;
    use crate::test_support::{app, json_body, post_json, send};

    fn body(from: i64, to: i64, amount: i64, currency: &str) -> serde_json::Value {
        json!({
            "from_account_id": from,
            "to_account_id": to,
            "amount": amount,
            "currency": currency
        })
    }

    fn store_with_accounts(accounts: &[(i64, i64, &'static str)]) -> MockLedgerStore {
        let mut store = MockLedgerStore::new();
        for &(id, balance, currency) in accounts {
            store
                .expect_get_account()
                .with(eq(id))
                .returning(move |_| Ok(account(id, balance, currency)));
        }
        store
    }

    #[tokio::test]
    async fn test_transfer_succeeds() {
        let mut store = store_with_accounts(&[(1, 100, "USD"), (2, 50, "USD")]);
        store
            .expect_transfer_tx()
            .with(eq(TransferTxParams {
                from_account_id: 1,
                to_account_id: 2,
                amount: 30,
            }))
            .times(1)
            .returning(|_| {
                Ok(TransferTxResult {
                    transfer: transfer(10, 1, 2, 30),
                    from_account: account(1, 70, "USD"),
                    to_account: account(2, 80, "USD"),
                    from_entry: entry(20, 1, -30),
                    to_entry: entry(21, 2, 30),
                })
            });

        let response = send(app(store), post_json("/transfers", &body(1, 2, 30, "USD"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["from_account"]["balance"], 70);
        assert_eq!(json["to_account"]["balance"], 80);
        assert_eq!(json["from_entry"]["amount"], -30);
    }

    #[tokio::test]
    async fn test_transfer_rejects_non_positive_amount() {
        let mut store = MockLedgerStore::new();
        store.expect_get_account().never();
        store.expect_transfer_tx().never();

        let response = send(app(store), post_json("/transfers", &body(1, 2, 0, "USD"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transfer_to_same_account_succeeds() {
        let mut store = store_with_accounts(&[(4, 100, "USD")]);
        store
            .expect_transfer_tx()
            .with(eq(TransferTxParams {
                from_account_id: 4,
                to_account_id: 4,
                amount: 10,
            }))
            .times(1)
            .returning(|_| {
                Ok(TransferTxResult {
                    transfer: transfer(11, 4, 4, 10),
                    from_account: account(4, 100, "USD"),
                    to_account: account(4, 100, "USD"),
                    from_entry: entry(22, 4, -10),
                    to_entry: entry(23, 4, 10),
                })
            });

        let response = send(app(store), post_json("/transfers", &body(4, 4, 10, "USD"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["from_account"]["balance"], 100);
        assert_eq!(json["to_account"]["balance"], 100);
    }

    #[tokio::test]
    async fn test_transfer_rejects_currency_mismatch() {
        let mut store = store_with_accounts(&[(1, 100, "USD"), (2, 50, "EUR")]);
        store.expect_transfer_tx().never();

        let response = send(app(store), post_json("/transfers", &body(1, 2, 10, "USD"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["message"].as_str().unwrap_or_default().contains("currency mismatch"));
    }

    #[tokio::test]
    async fn test_transfer_from_missing_account_is_404() {
        let mut store = MockLedgerStore::new();
        store
            .expect_get_account()
            .returning(|id| Err(StoreError::not_found("account", id)));
        store.expect_transfer_tx().never();

        let response = send(app(store), post_json("/transfers", &body(1, 2, 10, "USD"))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_422() {
        let mut store = store_with_accounts(&[(1, 5, "CAD"), (2, 0, "CAD")]);
        store.expect_transfer_tx().returning(|_| {
            Err(StoreError::InsufficientFunds {
                account_id: 1,
                balance: -5,
            })
        });

        let response = send(app(store), post_json("/transfers", &body(1, 2, 10, "CAD"))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
