//! Lazy creation of security reference rows.

use tracing::{info, warn};

use crate::client::BrokerClient;
use crate::error::Result;
use crate::persistence::Store;
use crate::types::security::{Security, SecurityLookup, SecurityResolution, SecurityStatus};

/// Finds the instrument for `lookup` and makes sure a security with its
/// description is stored. `None` when the broker knows no such instrument
/// or the instrument has no description to key it by.
pub async fn get_or_create_security(
    store: &dyn Store,
    client: &dyn BrokerClient,
    lookup: &SecurityLookup,
) -> Result<Option<SecurityResolution>> {
    let Some(instrument) = client.find_instrument(lookup).await? else {
        info!(%lookup, "no instrument for security lookup");
        return Ok(None);
    };
    if instrument.description.trim().is_empty() {
        info!(%lookup, symbol = %instrument.symbol, "instrument has no description, not stored");
        return Ok(None);
    }

    if let Some(existing) = store.find_security_by_description(&instrument.description).await? {
        return Ok(Some(SecurityResolution {
            symbol: existing.symbol,
            status: SecurityStatus::Exists,
        }));
    }

    let security = Security {
        symbol: instrument.symbol,
        description: instrument.description,
        exchange: instrument.exchange,
        asset_type: instrument.asset_type,
    };
    let status = if store.insert_security(&security).await? {
        info!(symbol = %security.symbol, description = %security.description, "security created");
        SecurityStatus::Created
    } else {
        SecurityStatus::Exists
    };
    Ok(Some(SecurityResolution { symbol: security.symbol, status }))
}

/// Best-effort [`get_or_create_security`]: failures are logged, never raised.
pub(crate) async fn backfill_security(
    store: &dyn Store,
    client: &dyn BrokerClient,
    lookup: &SecurityLookup,
) {
    if let Err(err) = get_or_create_security(store, client, lookup).await {
        warn!(%lookup, error = %err, "security backfill failed");
    }
}
