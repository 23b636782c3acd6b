//! Reconciliation API: browse trades and unassigned transactions, create
//! trades, assign transactions to a trade.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::error::Error;
use crate::persistence::Store;
use crate::types::trade::{NewTrade, Page, Trade};
use crate::types::transaction::{TransactionId, UnassignedLine};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

/// Table paging parameters as sent by the web UI.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub draw: Option<i64>,
    pub start: Option<i64>,
    pub length: Option<i64>,
    #[serde(rename = "search[value]")]
    pub search: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Page {
        Page::new(self.start, self.length, self.search.clone())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub draw: i64,
    pub records_total: i64,
    pub records_filtered: i64,
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub transaction_ids: Vec<TransactionId>,
}

enum ApiError {
    BadRequest(String),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(err) => {
                error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Unfiltered window used to count every row.
fn everything() -> Page {
    Page { start: 0, length: 0, search: None }
}

async fn health() -> &'static str {
    "healthy"
}

async fn list_trades(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Trade>>, ApiError> {
    let (data, filtered) = state.store.list_trades(&query.page()).await?;
    let (_, total) = state.store.list_trades(&everything()).await?;
    Ok(Json(ListResponse {
        draw: query.draw.unwrap_or(0),
        records_total: total,
        records_filtered: filtered,
        data,
    }))
}

async fn create_trade(
    State(state): State<AppState>,
    Json(trade): Json<NewTrade>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if trade.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description must not be empty".to_string()));
    }
    let trade_id = state.store.insert_trade(&trade).await?;
    info!(trade_id, account_id = trade.account_id, "trade created");
    Ok((StatusCode::CREATED, Json(json!({ "trade_id": trade_id }))))
}

async fn list_unassigned_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<UnassignedLine>>, ApiError> {
    let (data, filtered) = state.store.list_unassigned_lines(&query.page()).await?;
    let (_, total) = state.store.list_unassigned_lines(&everything()).await?;
    Ok(Json(ListResponse {
        draw: query.draw.unwrap_or(0),
        records_total: total,
        records_filtered: filtered,
        data,
    }))
}

async fn assign_transactions(
    State(state): State<AppState>,
    Path(trade_id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> Result<StatusCode, ApiError> {
    if request.transaction_ids.is_empty() {
        return Err(ApiError::BadRequest("transaction_ids must not be empty".to_string()));
    }
    let updated = state
        .store
        .assign_transactions(trade_id, &request.transaction_ids)
        .await?;
    info!(trade_id, updated, "transactions assigned");
    Ok(StatusCode::NO_CONTENT)
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/trades", get(list_trades).post(create_trade))
        .route("/api/unassigned_transactions", get(list_unassigned_transactions))
        .route("/api/assign_transactions/{trade_id}", post(assign_transactions))
        .with_state(state)
}
