//! reqwest implementation of [`BrokerClient`] for the trader and market data
//! APIs.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use super::{BrokerClient, DateRange};
use crate::documents::{parse, Instrument, InstrumentSearch, LinkedAccount};
use crate::error::{DocumentKind, Result};
use crate::types::security::SecurityLookup;

const MAX_ORDER_RESULTS: &str = "5000";

pub struct TraderClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl TraderClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}

fn vendor_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl BrokerClient for TraderClient {
    async fn linked_accounts(&self) -> Result<Vec<LinkedAccount>> {
        let body = self.fetch(self.get("/trader/v1/accounts/accountNumbers")).await?;
        parse(DocumentKind::LinkedAccounts, body)
    }

    async fn find_instrument(&self, lookup: &SecurityLookup) -> Result<Option<Instrument>> {
        let request = match lookup {
            SecurityLookup::Symbol(symbol) => self
                .get("/marketdata/v1/instruments")
                .query(&[("symbol", symbol.as_str()), ("projection", "symbol-search")]),
            SecurityLookup::Cusip(cusip) => self.get(&format!("/marketdata/v1/instruments/{cusip}")),
        };

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            info!(%lookup, "instrument not found");
            return Ok(None);
        }
        let body = response.error_for_status()?.json::<Value>().await?;
        let search: InstrumentSearch = parse(DocumentKind::Instruments, body)?;
        let first = search.instruments.into_iter().next();
        if first.is_none() {
            info!(%lookup, "instrument search returned no instruments");
        }
        Ok(first)
    }

    async fn transactions(
        &self,
        account_hash: &str,
        range: &DateRange,
        types: &str,
    ) -> Result<Value> {
        debug!(types, start = %range.start, end = %range.end, "fetching transactions");
        let request = self
            .get(&format!("/trader/v1/accounts/{account_hash}/transactions"))
            .query(&[
                ("startDate", vendor_time(range.start)),
                ("endDate", vendor_time(range.end)),
                ("types", types.to_string()),
            ]);
        self.fetch(request).await
    }

    async fn orders(
        &self,
        account_hash: &str,
        range: &DateRange,
        status: Option<&str>,
    ) -> Result<Value> {
        let mut query = vec![
            ("maxResults", MAX_ORDER_RESULTS.to_string()),
            ("fromEnteredTime", vendor_time(range.start)),
            ("toEnteredTime", vendor_time(range.end)),
        ];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        let request = self
            .get(&format!("/trader/v1/accounts/{account_hash}/orders"))
            .query(&query);
        self.fetch(request).await
    }

    async fn account_positions(&self, account_hash: &str) -> Result<Value> {
        let request = self
            .get(&format!("/trader/v1/accounts/{account_hash}"))
            .query(&[("fields", "positions")]);
        self.fetch(request).await
    }
}
