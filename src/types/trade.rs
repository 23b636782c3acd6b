use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;

/// Logical trade that reconciled transactions are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trade {
    pub trade_id: i64,
    pub account_id: AccountId,
    pub open_date: NaiveDate,
    pub close_date: Option<NaiveDate>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub trade_type: String,
    pub status: String,
    pub amount: Decimal,
    pub description: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTrade {
    pub account_id: AccountId,
    pub open_date: NaiveDate,
    pub close_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub status: String,
    pub amount: Decimal,
    pub description: String,
    pub comment: Option<String>,
}

/// Offset/limit window with an optional description filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub start: i64,
    pub length: i64,
    pub search: Option<String>,
}

impl Page {
    pub const DEFAULT_LENGTH: i64 = 25;

    pub fn new(start: Option<i64>, length: Option<i64>, search: Option<String>) -> Self {
        Self {
            start: start.unwrap_or(0).max(0),
            length: length.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LENGTH),
            search: search.filter(|s| !s.trim().is_empty()),
        }
    }

    pub(crate) fn matches(&self, description: Option<&str>) -> bool {
        match &self.search {
            None => true,
            Some(term) => description
                .map(|d| d.to_lowercase().contains(&term.to_lowercase()))
                .unwrap_or(false),
        }
    }
}
