//! Transaction ingestion: dedup, classification end to end, dividend symbol
//! lookup, and the opportunistic security backfill.

mod common;

use chrono::NaiveDate;
use common::{dividend, equity_trade, StaticBrokerClient};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use theta_ledger::documents::{parse, Activity};
use theta_ledger::error::DocumentKind;
use theta_ledger::ingest::ingest_transactions;
use theta_ledger::persistence::MemoryStore;
use theta_ledger::types::security::{Security, SecurityLookup};
use theta_ledger::types::transaction::LineKind;

const ACCOUNT_ID: i32 = 7;

fn activities(docs: Vec<Value>) -> Vec<Activity> {
    parse(DocumentKind::Activities, Value::Array(docs)).unwrap()
}

#[tokio::test]
async fn equity_buy_is_stored_with_fee_line() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new().with_instrument(
        SecurityLookup::Symbol("AAPL".to_string()),
        "AAPL",
        "APPLE INC",
    );

    let batch = activities(vec![equity_trade(1001, "AAPL", 10.0, 50.0, 500.0)]);
    let summary = ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(summary.new_count, 1);
    assert_eq!(summary.skipped_count, 0);

    let transactions = store.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_id, 1001);
    assert_eq!(transactions[0].account_id, ACCOUNT_ID);
    assert_eq!(transactions[0].date, NaiveDate::from_ymd_opt(2024, 4, 19).unwrap());
    assert_eq!(transactions[0].amount, dec!(-500));
    assert_eq!(transactions[0].trade_id, None);

    let items = store.transaction_items().await;
    assert_eq!(items.len(), 2);
    let fee = items.iter().find(|i| i.kind == LineKind::Fee).unwrap();
    assert_eq!(fee.description.as_deref(), Some("COMMISSION"));
    assert_eq!(fee.quantity, dec!(0));

    let buy = items.iter().find(|i| i.kind == LineKind::Buy).unwrap();
    assert_eq!(buy.asset_type, "EQUITY");
    assert_eq!(buy.quantity, dec!(10));
    assert_eq!(buy.amount, Some(dec!(50)));
    assert_eq!(buy.extended_amount, Some(dec!(500)));
    assert_eq!(buy.symbol.as_deref(), Some("AAPL"));
    assert_eq!(buy.underlying.as_deref(), Some("AAPL"));
    assert_eq!(buy.position_effect.as_deref(), Some("OPENING"));

    let securities = store.securities().await;
    assert_eq!(securities.len(), 1);
    assert_eq!(securities[0].description, "APPLE INC");
}

#[tokio::test]
async fn negative_transfer_amount_is_a_sell() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();

    let batch = activities(vec![equity_trade(1002, "MSFT", -5.0, 400.0, 2000.0)]);
    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    let items = store.transaction_items().await;
    let sell = items.iter().find(|i| i.asset_type == "EQUITY").unwrap();
    assert_eq!(sell.kind, LineKind::Sell);
    assert_eq!(sell.quantity, dec!(5));
}

#[tokio::test]
async fn reingesting_a_batch_stores_nothing_new() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![
        equity_trade(2001, "AAPL", 1.0, 10.0, 10.0),
        dividend(2002, "ABC CORP DIVIDEND~ABC~0.50", 12.5),
    ]);

    let first = ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();
    let transactions = store.transactions().await;
    let items = store.transaction_items().await;

    let second = ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(first.new_count, 2);
    assert_eq!(second.new_count, 0);
    assert_eq!(second.skipped_count, 2);
    assert_eq!(store.transactions().await, transactions);
    assert_eq!(store.transaction_items().await, items);
}

#[tokio::test]
async fn duplicate_ids_within_one_batch_are_stored_once() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![
        equity_trade(3001, "AAPL", 1.0, 10.0, 10.0),
        equity_trade(3001, "AAPL", 1.0, 10.0, 10.0),
    ]);

    let summary = ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(summary.new_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(store.transactions().await.len(), 1);
}

#[tokio::test]
async fn dividend_symbol_comes_from_description_marker() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![dividend(4001, "ABC CORP DIVIDEND~ABC~0.50", 12.5)]);

    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    let items = store.transaction_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, LineKind::Dividend);
    assert_eq!(items[0].symbol.as_deref(), Some("ABC"));
    assert_eq!(items[0].underlying.as_deref(), Some("ABC"));
    assert_eq!(items[0].amount, Some(dec!(12.5)));
    assert_eq!(items[0].extended_amount, Some(dec!(12.5)));
    assert_eq!(items[0].quantity, dec!(0));
}

#[tokio::test]
async fn bank_interest_is_interest() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![dividend(4002, "BANK INT 042524-052324 SCHWAB BANK", 0.42)]);

    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    let items = store.transaction_items().await;
    assert_eq!(items[0].kind, LineKind::Interest);
    assert_eq!(items[0].symbol, None);
}

#[tokio::test]
async fn dividend_without_marker_uses_stored_security() {
    let store = MemoryStore::new();
    store
        .add_security(Security {
            symbol: "VTI".to_string(),
            description: "VANGUARD TOTAL STOCK MARKET ETF".to_string(),
            exchange: "NYSE".to_string(),
            asset_type: "EQUITY".to_string(),
        })
        .await;
    let client = StaticBrokerClient::new();
    let batch = activities(vec![dividend(4003, "VANGUARD TOTAL STOCK MARKET ETF", 30.0)]);

    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    let items = store.transaction_items().await;
    assert_eq!(items[0].kind, LineKind::Dividend);
    assert_eq!(items[0].symbol.as_deref(), Some("VTI"));
    assert_eq!(items[0].underlying.as_deref(), Some("VTI"));
}

#[tokio::test]
async fn dividend_without_description_gets_no_symbol() {
    let store = MemoryStore::new();
    store
        .add_security(Security {
            symbol: "ZZZ".to_string(),
            description: String::new(),
            exchange: "NYSE".to_string(),
            asset_type: "EQUITY".to_string(),
        })
        .await;
    let client = StaticBrokerClient::new();
    let mut doc = dividend(4004, "unused", 12.0);
    doc.as_object_mut().unwrap().remove("description");

    ingest_transactions(&store, &client, ACCOUNT_ID, &activities(vec![doc])).await.unwrap();

    let items = store.transaction_items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, LineKind::Dividend);
    assert_eq!(items[0].symbol, None);
    assert_eq!(items[0].underlying, None);
}

#[tokio::test]
async fn expired_option_takes_expiration_from_symbol() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![json!({
        "accountNumber": 12345678,
        "activityId": 5001,
        "tradeDate": "2024-04-20T00:00:00+0000",
        "type": "TRADE",
        "status": "VALID",
        "netAmount": 0,
        "description": "REMOVAL OF OPTION DUE TO EXPIRATION",
        "transferItems": [{
            "instrument": {
                "assetType": "OPTION",
                "status": "DISABLED",
                "symbol": "NFLX_041924P550",
                "description": "NETFLIX INC 04/19/2024 $550 Put",
                "putCall": "PUT",
                "underlyingSymbol": "NFLX",
                "strikePrice": 550,
                "expirationDate": "garbage",
                "optionDeliverables": [{ "deliverableUnits": 100 }]
            },
            "amount": 1,
            "price": 0,
            "cost": 0,
            "positionEffect": "CLOSING"
        }]
    })]);

    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    let items = store.transaction_items().await;
    assert_eq!(items.len(), 1);
    let option = &items[0];
    assert_eq!(option.asset_type, "PUT");
    assert_eq!(option.kind, LineKind::Buy);
    assert_eq!(option.expiration_date, NaiveDate::from_ymd_opt(2024, 4, 19));
    assert_eq!(option.strike_price, Some(dec!(550)));
    assert_eq!(option.underlying.as_deref(), Some("NFLX"));
    assert_eq!(option.multiplier, Some(dec!(100)));
}

#[tokio::test]
async fn failed_backfill_does_not_abort_the_batch() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient {
        fail_lookups: true,
        ..StaticBrokerClient::new()
    };
    let batch = activities(vec![
        equity_trade(6001, "AAPL", 1.0, 10.0, 10.0),
        equity_trade(6002, "MSFT", 1.0, 10.0, 10.0),
    ]);

    let summary = ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(summary.new_count, 2);
    assert!(store.securities().await.is_empty());
}

#[tokio::test]
async fn each_equity_symbol_is_backfilled_once_per_batch() {
    let store = MemoryStore::new();
    let client = StaticBrokerClient::new();
    let batch = activities(vec![
        equity_trade(7001, "AAPL", 1.0, 10.0, 10.0),
        equity_trade(7002, "AAPL", 2.0, 10.0, 20.0),
        equity_trade(7003, "MSFT", 1.0, 10.0, 10.0),
    ]);

    ingest_transactions(&store, &client, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(
        client.lookups(),
        vec![
            SecurityLookup::Symbol("AAPL".to_string()),
            SecurityLookup::Symbol("MSFT".to_string()),
        ]
    );
}

#[test]
fn activity_without_transfer_items_is_malformed() {
    let err = parse::<Vec<Activity>>(
        DocumentKind::Activities,
        json!([{ "activityId": 1, "type": "TRADE", "status": "VALID", "netAmount": 0 }]),
    )
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("activities document"), "{msg}");
    assert!(msg.contains("transferItems"), "{msg}");
}
