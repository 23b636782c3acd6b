use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::account::AccountId;

pub type OrderId = i64;

/// Order header. Replaced wholesale when the broker reports a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub account_id: AccountId,
    pub order_id: OrderId,
    pub entered_time: DateTime<FixedOffset>,
    pub cancel_time: Option<DateTime<FixedOffset>>,
    pub close_time: Option<DateTime<FixedOffset>>,
    pub order_type: Option<String>,
    pub order_class: Option<String>,
    pub order_strategy_type: Option<String>,
    pub order_duration: Option<String>,
    pub requested_destination: Option<String>,
    pub status: String,
    pub price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub filled_quantity: Option<Decimal>,
    pub remaining_quantity: Option<Decimal>,
}

/// One leg of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub account_id: AccountId,
    pub order_id: OrderId,
    pub order_item_id: i64,
    pub order_leg_type: Option<String>,
    pub instruction: Option<String>,
    pub quantity: Option<Decimal>,
    pub asset_type: Option<String>,
    pub symbol: Option<String>,
    pub cusip: Option<String>,
    pub description: Option<String>,
    pub put_call: Option<String>,
    pub underlying: Option<String>,
    pub maturity_date: Option<NaiveDate>,
    pub strike_price: Option<Decimal>,
    pub multiplier: Decimal,
    pub position_effect: Option<String>,
}

/// Result of one order ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub new_count: usize,
    pub updated_count: usize,
    pub skipped_count: usize,
}
