use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::account::AccountId;

/// One row of an account's position snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub account_id: AccountId,
    pub date: DateTime<Utc>,
    pub asset_type: Option<String>,
    pub short_quantity: Decimal,
    pub long_quantity: Decimal,
    pub average_price: Decimal,
    pub market_value: Decimal,
    pub current_day_profit_loss: Decimal,
    pub current_day_profit_loss_percentage: Decimal,
    pub maintenance_requirement: Option<Decimal>,
    pub net_change: Decimal,
    pub cusip: Option<String>,
    pub symbol: Option<String>,
    pub underlying: Option<String>,
    pub description: Option<String>,
    pub maturity_date: Option<DateTime<FixedOffset>>,
    pub variable_rate: Option<Decimal>,
    /// Marks rows of the account's current snapshot.
    pub latest: bool,
}

impl Position {
    pub fn is_equity(&self) -> bool {
        self.asset_type.as_deref() == Some("EQUITY")
    }
}
