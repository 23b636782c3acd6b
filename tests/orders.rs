//! Order ingestion: insert, skip on same status, replace on status change.

mod common;

use common::order;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use theta_ledger::documents::{parse, OrderDocument};
use theta_ledger::error::DocumentKind;
use theta_ledger::ingest::ingest_orders;
use theta_ledger::persistence::MemoryStore;

const ACCOUNT_ID: i32 = 3;

fn orders(docs: Vec<Value>) -> Vec<OrderDocument> {
    parse(DocumentKind::Orders, Value::Array(docs)).unwrap()
}

#[tokio::test]
async fn new_order_is_stored_with_its_legs() {
    let store = MemoryStore::new();

    let summary = ingest_orders(&store, ACCOUNT_ID, &orders(vec![order(900, "WORKING")]))
        .await
        .unwrap();

    assert_eq!(summary.new_count, 1);
    let stored = store.orders().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].order_id, 900);
    assert_eq!(stored[0].account_id, ACCOUNT_ID);
    assert_eq!(stored[0].status, "WORKING");
    assert_eq!(stored[0].price, Some(dec!(1.25)));

    let legs = store.order_items().await;
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].order_item_id, 1);
    assert_eq!(legs[0].strike_price, Some(dec!(550)));
    assert_eq!(legs[0].multiplier, dec!(100));
    assert_eq!(legs[0].put_call.as_deref(), Some("PUT"));
    assert_eq!(legs[0].underlying.as_deref(), Some("NFLX"));
}

#[tokio::test]
async fn same_status_is_skipped() {
    let store = MemoryStore::new();
    let batch = orders(vec![order(901, "WORKING")]);

    ingest_orders(&store, ACCOUNT_ID, &batch).await.unwrap();
    let summary = ingest_orders(&store, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(summary.new_count, 0);
    assert_eq!(summary.updated_count, 0);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(store.orders().await.len(), 1);
    assert_eq!(store.order_items().await.len(), 1);
}

#[tokio::test]
async fn status_change_replaces_order_and_items() {
    let store = MemoryStore::new();
    ingest_orders(&store, ACCOUNT_ID, &orders(vec![order(902, "WORKING")]))
        .await
        .unwrap();

    let mut filled = order(902, "FILLED");
    filled["filledQuantity"] = json!(2);
    filled["remainingQuantity"] = json!(0);
    filled["closeTime"] = json!("2024-04-18T15:30:00+0000");
    let summary = ingest_orders(&store, ACCOUNT_ID, &orders(vec![filled])).await.unwrap();

    assert_eq!(summary.updated_count, 1);
    let stored = store.orders().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, "FILLED");
    assert_eq!(stored[0].filled_quantity, Some(dec!(2)));
    assert!(stored[0].close_time.is_some());
    assert_eq!(store.order_items().await.len(), 1);
}

#[tokio::test]
async fn statuses_update_within_one_batch() {
    let store = MemoryStore::new();
    let batch = orders(vec![order(903, "WORKING"), order(903, "WORKING"), order(903, "CANCELED")]);

    let summary = ingest_orders(&store, ACCOUNT_ID, &batch).await.unwrap();

    assert_eq!(summary.new_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.updated_count, 1);
    assert_eq!(store.orders().await[0].status, "CANCELED");
}

#[tokio::test]
async fn equity_legs_have_no_strike_and_unit_multiplier() {
    let store = MemoryStore::new();
    let mut doc = order(904, "FILLED");
    doc["orderLegCollection"] = json!([{
        "orderLegType": "EQUITY",
        "legId": "2",
        "instruction": "BUY",
        "quantity": 10,
        "instrument": { "assetType": "EQUITY", "symbol": "AAPL", "cusip": "037833100" }
    }]);

    ingest_orders(&store, ACCOUNT_ID, &orders(vec![doc])).await.unwrap();

    let legs = store.order_items().await;
    assert_eq!(legs[0].order_item_id, 2);
    assert_eq!(legs[0].strike_price, None);
    assert_eq!(legs[0].multiplier, dec!(1));
    assert_eq!(legs[0].cusip.as_deref(), Some("037833100"));
}

#[test]
fn order_without_entered_time_is_malformed() {
    let mut doc = order(905, "WORKING");
    doc.as_object_mut().unwrap().remove("enteredTime");
    let err = parse::<Vec<OrderDocument>>(DocumentKind::Orders, json!([doc])).unwrap_err();
    assert!(err.to_string().contains("enteredTime"), "{err}");
}
