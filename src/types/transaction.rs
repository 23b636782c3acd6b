use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;

pub type TransactionId = i64;

/// Classification of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    Dividend,
    Interest,
    Fee,
    Buy,
    Sell,
}

impl LineKind {
    /// BUY for a positive transfer amount, SELL otherwise.
    pub fn from_signed_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO { LineKind::Buy } else { LineKind::Sell }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Dividend => "DIVIDEND",
            LineKind::Interest => "INTEREST",
            LineKind::Fee => "FEE",
            LineKind::Buy => "BUY",
            LineKind::Sell => "SELL",
        }
    }
}

/// Stored activity header. Immutable once inserted, except for the trade
/// assignment made during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub status: String,
    pub trade_id: Option<i64>,
    pub order_id: Option<i64>,
    pub position_id: Option<i64>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Reconciliation row: a transaction without a trade joined with one of its
/// line items. A transaction with no items appears once, item columns empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UnassignedLine {
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub status: String,
    pub order_id: Option<i64>,
    pub position_id: Option<i64>,
    pub net_amount: Decimal,
    pub description: Option<String>,
    /// Line kind, e.g. BUY or DIVIDEND.
    pub transaction: Option<String>,
    pub asset_type: Option<String>,
    pub symbol: Option<String>,
    pub underlying: Option<String>,
    pub quantity: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub extended_amount: Option<Decimal>,
    pub strike_price: Option<Decimal>,
    pub expiration_date: Option<NaiveDate>,
}

impl UnassignedLine {
    pub fn new(transaction: &Transaction, item: Option<&TransactionItem>) -> Self {
        Self {
            transaction_id: transaction.transaction_id,
            account_id: transaction.account_id,
            date: transaction.date,
            transaction_type: transaction.transaction_type.clone(),
            status: transaction.status.clone(),
            order_id: transaction.order_id,
            position_id: transaction.position_id,
            net_amount: transaction.amount,
            description: transaction.description.clone(),
            transaction: item.map(|i| i.kind.as_str().to_string()),
            asset_type: item.map(|i| i.asset_type.clone()),
            symbol: item.and_then(|i| i.symbol.clone()),
            underlying: item.and_then(|i| i.underlying.clone()),
            quantity: item.map(|i| i.quantity),
            amount: item.and_then(|i| i.amount),
            extended_amount: item.and_then(|i| i.extended_amount),
            strike_price: item.and_then(|i| i.strike_price),
            expiration_date: item.and_then(|i| i.expiration_date),
        }
    }
}

/// Classified line item of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionItem {
    pub transaction_id: TransactionId,
    pub kind: LineKind,
    pub asset_type: String,
    pub quantity: Decimal,
    pub amount: Option<Decimal>,
    pub extended_amount: Option<Decimal>,
    pub symbol: Option<String>,
    pub underlying: Option<String>,
    pub description: Option<String>,
    pub strike_price: Option<Decimal>,
    pub expiration_date: Option<NaiveDate>,
    pub multiplier: Option<Decimal>,
    pub position_effect: Option<String>,
}

impl TransactionItem {
    pub(crate) fn new(transaction_id: TransactionId, kind: LineKind, asset_type: &str) -> Self {
        Self {
            transaction_id,
            kind,
            asset_type: asset_type.to_string(),
            quantity: Decimal::ZERO,
            amount: None,
            extended_amount: None,
            symbol: None,
            underlying: None,
            description: None,
            strike_price: None,
            expiration_date: None,
            multiplier: None,
            position_effect: None,
        }
    }
}

/// Result of one transaction ingestion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    pub new_count: usize,
    pub skipped_count: usize,
}
