//! Typed vendor documents.
//!
//! Raw JSON goes through [`parse`] so that a bad payload surfaces as
//! `malformed <kind> document: missing field ...` instead of a failure deep
//! inside an ingestor. Header timestamps are validated here; instrument dates
//! stay as strings because expired contracts carry unusable values.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::error::{DocumentKind, Error, Result};

/// Vendor timestamp format. The fractional part is optional.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

pub fn parse<T: DeserializeOwned>(kind: DocumentKind, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| Error::Document { kind, source })
}

pub fn parse_slice<T: DeserializeOwned>(kind: DocumentKind, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Document { kind, source })
}

pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).or_else(|_| DateTime::parse_from_rfc3339(raw))
}

/// Date part of a vendor timestamp, or a bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw)
        .map(|ts| ts.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

fn timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

fn optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{raw}': {e}"))),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    fn into_i64<E: de::Error>(self) -> std::result::Result<i64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a numeric id, got '{s}'"))),
        }
    }
}

/// Vendor ids arrive as numbers or as numeric strings.
fn id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?.into_i64()
}

fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(v) => v.into_i64().map(Some),
        None => Ok(None),
    }
}

// --- Activities ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Trade,
    DividendOrInterest,
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, deserialize_with = "optional_id")]
    pub account_number: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub account_id: Option<i64>,
    #[serde(deserialize_with = "id")]
    pub activity_id: i64,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub trade_date: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub status: String,
    pub net_amount: Decimal,
    #[serde(default, deserialize_with = "optional_id")]
    pub order_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub position_id: Option<i64>,
    pub description: Option<String>,
    pub transfer_items: Vec<TransferItem>,
}

impl Activity {
    pub fn kind(&self) -> ActivityType {
        match self.activity_type.as_str() {
            "TRADE" => ActivityType::Trade,
            "DIVIDEND_OR_INTEREST" => ActivityType::DividendOrInterest,
            _ => ActivityType::Other,
        }
    }

    /// Broker account number, falling back to `accountId`.
    pub fn account(&self) -> Option<i64> {
        self.account_number.or(self.account_id)
    }

    /// Trade date, falling back to the activity time.
    pub fn date(&self) -> Result<NaiveDate> {
        self.trade_date
            .or(self.time)
            .map(|ts| ts.date_naive())
            .ok_or(Error::MissingField {
                kind: DocumentKind::Activities,
                field: "tradeDate",
            })
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    pub instrument: ActivityInstrument,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub fee_type: Option<String>,
    pub position_effect: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInstrument {
    pub asset_type: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub cusip: Option<String>,
    pub put_call: Option<String>,
    pub underlying_symbol: Option<String>,
    pub strike_price: Option<Decimal>,
    pub expiration_date: Option<String>,
    pub maturity_date: Option<String>,
    pub multiplier: Option<Decimal>,
    pub status: Option<String>,
    pub option_deliverables: Option<Vec<OptionDeliverable>>,
}

impl ActivityInstrument {
    pub fn is_disabled(&self) -> bool {
        self.status.as_deref() == Some("DISABLED")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDeliverable {
    pub deliverable_units: Decimal,
}

/// Contract multiplier carried by option deliverables, if any.
pub fn deliverable_units(deliverables: Option<&[OptionDeliverable]>) -> Option<Decimal> {
    deliverables
        .and_then(|d| d.first())
        .map(|d| d.deliverable_units)
}

// --- Orders ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(deserialize_with = "id")]
    pub order_id: i64,
    pub status: String,
    #[serde(deserialize_with = "timestamp")]
    pub entered_time: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub cancel_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub close_time: Option<DateTime<FixedOffset>>,
    pub order_type: Option<String>,
    pub quantity: Option<Decimal>,
    pub filled_quantity: Option<Decimal>,
    pub remaining_quantity: Option<Decimal>,
    pub requested_destination: Option<String>,
    pub order_strategy_type: Option<String>,
    pub price: Option<Decimal>,
    pub order_duration: Option<String>,
    pub order_class: Option<String>,
    #[serde(default)]
    pub order_leg_collection: Vec<OrderLeg>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLeg {
    pub order_leg_type: Option<String>,
    pub instruction: Option<String>,
    pub quantity: Option<Decimal>,
    pub instrument: LegInstrument,
    #[serde(deserialize_with = "id")]
    pub leg_id: i64,
    pub position_effect: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegInstrument {
    pub asset_type: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub cusip: Option<String>,
    pub put_call: Option<String>,
    pub underlying_symbol: Option<String>,
    pub maturity_date: Option<String>,
    pub option_deliverables: Option<Vec<OptionDeliverable>>,
}

// --- Positions ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsDocument {
    pub securities_account: SecuritiesAccount,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritiesAccount {
    #[serde(deserialize_with = "id")]
    pub account_number: i64,
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEntry {
    pub short_quantity: Decimal,
    pub long_quantity: Decimal,
    pub average_price: Decimal,
    pub maintenance_requirement: Option<Decimal>,
    pub current_day_profit_loss: Decimal,
    pub market_value: Decimal,
    pub current_day_profit_loss_percentage: Decimal,
    pub instrument: PositionInstrument,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInstrument {
    pub cusip: Option<String>,
    pub put_call: Option<String>,
    pub asset_type: Option<String>,
    pub symbol: Option<String>,
    pub underlying_symbol: Option<String>,
    pub description: Option<String>,
    pub variable_rate: Option<Decimal>,
    pub net_change: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub maturity_date: Option<DateTime<FixedOffset>>,
    pub status: Option<String>,
}

// --- Reference data ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    #[serde(deserialize_with = "id")]
    pub account_number: i64,
    pub hash_value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrumentSearch {
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub asset_type: String,
    pub underlying_symbol: Option<String>,
    pub cusip: Option<String>,
}
