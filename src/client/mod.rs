//! Vendor trading API seam.
//!
//! Ingestors only see [`BrokerClient`]. [`TraderClient`] talks HTTP;
//! [`OfflineClient`] stands in when no access token is configured, which is
//! enough for replaying files against stored accounts.

mod http;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::Value;

use crate::documents::{Instrument, LinkedAccount};
use crate::error::{Error, Result};
use crate::types::security::SecurityLookup;

pub use http::TraderClient;

pub const DEFAULT_BASE_URL: &str = "https://api.schwabapi.com";

/// Default look-back window for transactions and orders.
pub const DEFAULT_DAYS: i64 = 7;

#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Account numbers visible to the token, with their access hashes.
    async fn linked_accounts(&self) -> Result<Vec<LinkedAccount>>;

    /// First instrument matching the lookup, `None` on 404 or an empty result.
    async fn find_instrument(&self, lookup: &SecurityLookup) -> Result<Option<Instrument>>;

    /// Raw activity array for the account.
    async fn transactions(&self, account_hash: &str, range: &DateRange, types: &str)
    -> Result<Value>;

    /// Raw order array for the account.
    async fn orders(
        &self,
        account_hash: &str,
        range: &DateRange,
        status: Option<&str>,
    ) -> Result<Value>;

    /// Raw account document including positions.
    async fn account_positions(&self, account_hash: &str) -> Result<Value>;
}

/// Inclusive time window sent to the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// `start_date` defaults to `days` before `now`, `end_date` to `now`.
    /// An explicit end date covers that whole day.
    pub fn resolve(
        days: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let start = match start_date {
            Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            None => now - Duration::days(days),
        };
        let end = match end_date {
            Some(date) => {
                let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                    .ok_or_else(|| Error::Config("invalid end of day".to_string()))?;
                Utc.from_utc_datetime(&date.and_time(last))
            }
            None => now,
        };
        if start > end {
            return Err(Error::Config(format!(
                "start date {} is after end date {}",
                start.date_naive(),
                end.date_naive()
            )));
        }
        Ok(Self { start, end })
    }
}

/// Client used without credentials. Instrument lookups find nothing; every
/// other call is a configuration error.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

fn missing_token() -> Error {
    Error::Config("BROKER_ACCESS_TOKEN is not set".to_string())
}

#[async_trait]
impl BrokerClient for OfflineClient {
    async fn linked_accounts(&self) -> Result<Vec<LinkedAccount>> {
        Err(missing_token())
    }

    async fn find_instrument(&self, _lookup: &SecurityLookup) -> Result<Option<Instrument>> {
        Ok(None)
    }

    async fn transactions(&self, _hash: &str, _range: &DateRange, _types: &str) -> Result<Value> {
        Err(missing_token())
    }

    async fn orders(&self, _hash: &str, _range: &DateRange, _status: Option<&str>) -> Result<Value> {
        Err(missing_token())
    }

    async fn account_positions(&self, _hash: &str) -> Result<Value> {
        Err(missing_token())
    }
}
