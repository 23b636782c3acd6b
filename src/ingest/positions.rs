//! Position snapshots. Each call stores one snapshot for the account and makes
//! it the only one flagged latest.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::securities::backfill_security;
use crate::client::BrokerClient;
use crate::documents::{PositionEntry, PositionsDocument};
use crate::error::{DocumentKind, Error, Result};
use crate::persistence::Store;
use crate::types::account::AccountId;
use crate::types::position::Position;
use crate::types::security::{normalize_asset_type, SecurityLookup};

/// Stores the snapshot and returns the number of rows written. Securities of
/// equity positions are backfilled afterwards.
pub async fn ingest_positions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    account_id: AccountId,
    document: &PositionsDocument,
) -> Result<usize> {
    let rows = snapshot(account_id, document, Utc::now())?;
    store.replace_latest_positions(account_id, &rows).await?;
    info!(account_id, positions = rows.len(), "position snapshot stored");

    for row in rows.iter().filter(|row| row.is_equity()) {
        match SecurityLookup::prefer_cusip(row.cusip.as_deref(), row.symbol.as_deref()) {
            Ok(lookup) => backfill_security(store, client, &lookup).await,
            Err(err) => warn!(account_id, error = %err, "equity position without identifiers"),
        }
    }
    Ok(rows.len())
}

/// Rows of one snapshot, all stamped with `taken_at` and flagged latest.
pub fn snapshot(
    account_id: AccountId,
    document: &PositionsDocument,
    taken_at: DateTime<Utc>,
) -> Result<Vec<Position>> {
    let entries = &document.securities_account.positions;
    if entries.is_empty() {
        return Err(Error::MissingField {
            kind: DocumentKind::Positions,
            field: "positions",
        });
    }
    Ok(entries
        .iter()
        .map(|entry| position(account_id, entry, taken_at))
        .collect())
}

fn position(account_id: AccountId, entry: &PositionEntry, taken_at: DateTime<Utc>) -> Position {
    let instrument = &entry.instrument;
    let asset_type = instrument
        .put_call
        .as_deref()
        .or(instrument.asset_type.as_deref())
        .map(|raw| normalize_asset_type(raw).to_string());

    Position {
        account_id,
        date: taken_at,
        asset_type,
        short_quantity: entry.short_quantity,
        long_quantity: entry.long_quantity,
        average_price: entry.average_price,
        market_value: entry.market_value,
        current_day_profit_loss: entry.current_day_profit_loss,
        current_day_profit_loss_percentage: entry.current_day_profit_loss_percentage,
        maintenance_requirement: entry.maintenance_requirement,
        net_change: instrument.net_change.unwrap_or(Decimal::ZERO),
        cusip: instrument.cusip.clone(),
        symbol: instrument.symbol.clone(),
        underlying: instrument
            .underlying_symbol
            .clone()
            .or_else(|| instrument.symbol.clone()),
        description: instrument.description.clone(),
        maturity_date: instrument.maturity_date,
        variable_rate: instrument.variable_rate,
        latest: true,
    }
}
