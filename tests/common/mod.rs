//! Shared fixtures: a scripted broker client and JSON document builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use theta_ledger::client::{BrokerClient, DateRange};
use theta_ledger::documents::{Instrument, LinkedAccount};
use theta_ledger::error::{Error, Result};
use theta_ledger::types::security::SecurityLookup;

/// Broker client answering from fixed data. Instrument lookups are recorded.
#[derive(Default)]
pub struct StaticBrokerClient {
    pub linked: Vec<LinkedAccount>,
    pub instruments: HashMap<SecurityLookup, Instrument>,
    pub transactions: HashMap<String, Value>,
    pub orders: Value,
    pub positions: Value,
    pub fail_lookups: bool,
    pub lookups: Mutex<Vec<SecurityLookup>>,
}

impl StaticBrokerClient {
    pub fn new() -> Self {
        Self {
            orders: json!([]),
            positions: json!({}),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, account_number: i64, hash: &str) -> Self {
        self.linked.push(LinkedAccount {
            account_number,
            hash_value: hash.to_string(),
        });
        self
    }

    pub fn with_instrument(mut self, lookup: SecurityLookup, symbol: &str, description: &str) -> Self {
        self.instruments.insert(
            lookup,
            Instrument {
                symbol: symbol.to_string(),
                description: description.to_string(),
                exchange: "NYSE".to_string(),
                asset_type: "EQUITY".to_string(),
                underlying_symbol: None,
                cusip: None,
            },
        );
        self
    }

    pub fn lookups(&self) -> Vec<SecurityLookup> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrokerClient for StaticBrokerClient {
    async fn linked_accounts(&self) -> Result<Vec<LinkedAccount>> {
        Ok(self.linked.clone())
    }

    async fn find_instrument(&self, lookup: &SecurityLookup) -> Result<Option<Instrument>> {
        self.lookups.lock().unwrap().push(lookup.clone());
        if self.fail_lookups {
            return Err(Error::Config("instrument service unavailable".to_string()));
        }
        Ok(self.instruments.get(lookup).cloned())
    }

    async fn transactions(&self, _hash: &str, _range: &DateRange, types: &str) -> Result<Value> {
        Ok(self.transactions.get(types).cloned().unwrap_or_else(|| json!([])))
    }

    async fn orders(&self, _hash: &str, _range: &DateRange, _status: Option<&str>) -> Result<Value> {
        Ok(self.orders.clone())
    }

    async fn account_positions(&self, _hash: &str) -> Result<Value> {
        Ok(self.positions.clone())
    }
}

pub fn equity_trade(activity_id: i64, symbol: &str, amount: f64, price: f64, cost: f64) -> Value {
    json!({
        "accountNumber": "12345678",
        "activityId": activity_id,
        "time": "2024-04-19T14:30:00+0000",
        "tradeDate": "2024-04-19T14:30:00+0000",
        "type": "TRADE",
        "status": "VALID",
        "netAmount": -cost,
        "description": format!("{symbol} trade"),
        "transferItems": [
            { "instrument": { "assetType": "CURRENCY", "symbol": "CURRENCY_USD" },
              "amount": 0.0, "cost": 0.0, "feeType": "COMMISSION" },
            { "instrument": { "assetType": "EQUITY", "symbol": symbol, "description": format!("{symbol} INC") },
              "amount": amount, "price": price, "cost": cost, "positionEffect": "OPENING" }
        ]
    })
}

pub fn dividend(activity_id: i64, description: &str, amount: f64) -> Value {
    json!({
        "accountNumber": "12345678",
        "activityId": activity_id,
        "tradeDate": "2024-05-01T00:00:00+0000",
        "type": "DIVIDEND_OR_INTEREST",
        "status": "VALID",
        "netAmount": amount,
        "description": description,
        "transferItems": [
            { "instrument": { "assetType": "CURRENCY", "symbol": "CURRENCY_USD" }, "amount": amount }
        ]
    })
}

pub fn order(order_id: i64, status: &str) -> Value {
    json!({
        "orderId": order_id,
        "status": status,
        "enteredTime": "2024-04-18T15:01:02+0000",
        "orderType": "LIMIT",
        "orderStrategyType": "SINGLE",
        "orderDuration": "DAY",
        "price": 1.25,
        "quantity": 2,
        "filledQuantity": 0,
        "remainingQuantity": 2,
        "orderLegCollection": [
            {
                "orderLegType": "OPTION",
                "legId": 1,
                "instruction": "SELL_TO_OPEN",
                "quantity": 2,
                "positionEffect": "OPENING",
                "instrument": {
                    "assetType": "OPTION",
                    "symbol": "NFLX  240419P00550000",
                    "description": "NETFLIX INC 04/19/2024 $550 Put",
                    "putCall": "PUT",
                    "underlyingSymbol": "NFLX",
                    "optionDeliverables": [ { "deliverableUnits": 100 } ]
                }
            }
        ]
    })
}

pub fn positions_document(account_number: i64, entries: Vec<Value>) -> Value {
    json!({ "securitiesAccount": { "accountNumber": account_number.to_string(), "positions": entries } })
}

pub fn equity_position(symbol: &str, cusip: Option<&str>, quantity: f64) -> Value {
    json!({
        "shortQuantity": 0,
        "longQuantity": quantity,
        "averagePrice": 50,
        "currentDayProfitLoss": 1.5,
        "currentDayProfitLossPercentage": 0.3,
        "marketValue": quantity * 51.0,
        "instrument": {
            "assetType": "EQUITY",
            "symbol": symbol,
            "cusip": cusip,
            "description": format!("{symbol} INC"),
            "netChange": 1.0
        }
    })
}
