//! HTTP broker client against a local stand-in for the trading API.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use theta_ledger::client::{BrokerClient, DateRange, TraderClient};
use theta_ledger::error::Error;
use theta_ledger::types::security::SecurityLookup;

const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn account_numbers(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "accountNumber": "11111111", "hashValue": "HASH-1" },
        { "accountNumber": "22222222", "hashValue": "HASH-2" }
    ]))
    .into_response()
}

async fn search_instruments(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("projection").map(String::as_str) != Some("symbol-search") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    match params.get("symbol").map(String::as_str) {
        Some("AAPL") => Json(json!({ "instruments": [
            { "symbol": "AAPL", "description": "APPLE INC", "exchange": "NASDAQ", "assetType": "EQUITY", "cusip": "037833100" }
        ]}))
        .into_response(),
        _ => Json(json!({ "instruments": [] })).into_response(),
    }
}

async fn instrument_by_cusip(Path(cusip): Path<String>) -> Response {
    if cusip == "000000000" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({ "instruments": [
        { "symbol": "AAPL", "description": "APPLE INC", "exchange": "NASDAQ", "assetType": "EQUITY", "cusip": cusip }
    ]}))
    .into_response()
}

async fn echo(
    Path(hash): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    Json(json!({ "hash": hash, "query": params }))
}

async fn spawn_vendor() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/trader/v1/accounts/accountNumbers", get(account_numbers))
        .route("/trader/v1/accounts/{hash}", get(echo))
        .route("/trader/v1/accounts/{hash}/transactions", get(echo))
        .route("/trader/v1/accounts/{hash}/orders", get(echo))
        .route("/marketdata/v1/instruments", get(search_instruments))
        .route("/marketdata/v1/instruments/{cusip}", get(instrument_by_cusip));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

fn range() -> DateRange {
    DateRange {
        start: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 4, 8, 12, 30, 0).unwrap(),
    }
}

#[tokio::test]
async fn linked_accounts_are_parsed() {
    let (base_url, _handle) = spawn_vendor().await;
    let client = TraderClient::new(&base_url, TOKEN);

    let accounts = client.linked_accounts().await.unwrap();

    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].account_number, 11111111);
    assert_eq!(accounts[1].hash_value, "HASH-2");
}

#[tokio::test]
async fn bad_token_is_an_http_error() {
    let (base_url, _handle) = spawn_vendor().await;
    let client = TraderClient::new(&base_url, "wrong");

    let err = client.linked_accounts().await.unwrap_err();

    assert!(matches!(err, Error::Http(_)), "{err}");
}

#[tokio::test]
async fn instrument_search_takes_the_first_match() {
    let (base_url, _handle) = spawn_vendor().await;
    let client = TraderClient::new(&base_url, TOKEN);

    let found = client
        .find_instrument(&SecurityLookup::Symbol("AAPL".to_string()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.description, "APPLE INC");
    assert_eq!(found.exchange, "NASDAQ");

    let by_cusip = client
        .find_instrument(&SecurityLookup::Cusip("037833100".to_string()))
        .await
        .unwrap();
    assert_eq!(by_cusip.map(|i| i.symbol).as_deref(), Some("AAPL"));
}

#[tokio::test]
async fn missing_instruments_are_none() {
    let (base_url, _handle) = spawn_vendor().await;
    let client = TraderClient::new(&base_url, TOKEN);

    let empty = client
        .find_instrument(&SecurityLookup::Symbol("ZZZZ".to_string()))
        .await
        .unwrap();
    let not_found = client
        .find_instrument(&SecurityLookup::Cusip("000000000".to_string()))
        .await
        .unwrap();

    assert!(empty.is_none());
    assert!(not_found.is_none());
}

#[tokio::test]
async fn transaction_and_order_queries_carry_the_window() {
    let (base_url, _handle) = spawn_vendor().await;
    let client = TraderClient::new(&base_url, TOKEN);

    let transactions = client.transactions("HASH-1", &range(), "TRADE").await.unwrap();
    assert_eq!(transactions["hash"], "HASH-1");
    assert_eq!(transactions["query"]["types"], "TRADE");
    assert_eq!(transactions["query"]["startDate"], "2024-04-01T00:00:00.000Z");
    assert_eq!(transactions["query"]["endDate"], "2024-04-08T12:30:00.000Z");

    let orders = client.orders("HASH-1", &range(), Some("FILLED")).await.unwrap();
    assert_eq!(orders["query"]["maxResults"], "5000");
    assert_eq!(orders["query"]["status"], "FILLED");
    assert_eq!(orders["query"]["fromEnteredTime"], "2024-04-01T00:00:00.000Z");

    let unfiltered = client.orders("HASH-1", &range(), None).await.unwrap();
    assert!(unfiltered["query"].get("status").is_none());

    let positions = client.account_positions("HASH-2").await.unwrap();
    assert_eq!(positions["hash"], "HASH-2");
    assert_eq!(positions["query"]["fields"], "positions");
}
