//! Activity ingestion: dedup by activity id, classify transfer items, store
//! header and line items together.

use tracing::{debug, info};

use super::classifier::classify;
use super::securities::backfill_security;
use crate::client::BrokerClient;
use crate::documents::Activity;
use crate::error::Result;
use crate::persistence::Store;
use crate::types::account::AccountId;
use crate::types::security::{AssetType, SecurityLookup};
use crate::types::transaction::{LineKind, Transaction, TransactionItem, TransactionSummary};

/// Stores every activity not seen before. Equity symbols traded in the batch
/// are backfilled into the securities table afterwards, once per symbol.
pub async fn ingest_transactions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    account_id: AccountId,
    activities: &[Activity],
) -> Result<TransactionSummary> {
    let mut known = store.transaction_ids().await?;
    let mut summary = TransactionSummary::default();
    let mut equity_symbols: Vec<String> = Vec::new();

    for activity in activities {
        if known.contains(&activity.activity_id) {
            debug!(transaction_id = activity.activity_id, "transaction already stored");
            summary.skipped_count += 1;
            continue;
        }

        let transaction = header(account_id, activity)?;
        let mut items = Vec::with_capacity(activity.transfer_items.len());
        for transfer in &activity.transfer_items {
            let asset = AssetType::resolve(&transfer.instrument.asset_type);
            if let Some(line) = classify(activity, transfer, asset) {
                items.push(line);
            }
        }
        resolve_dividend_symbols(store, activity, &mut items).await?;

        store.insert_transaction(&transaction, &items).await?;
        known.insert(activity.activity_id);
        summary.new_count += 1;

        for line in &items {
            if let Some(symbol) = traded_equity_symbol(line) {
                if !equity_symbols.iter().any(|s| s == symbol) {
                    equity_symbols.push(symbol.to_string());
                }
            }
        }
    }

    backfill_equities(store, client, &equity_symbols).await;
    info!(
        account_id,
        new = summary.new_count,
        skipped = summary.skipped_count,
        "transactions ingested"
    );
    Ok(summary)
}

fn header(account_id: AccountId, activity: &Activity) -> Result<Transaction> {
    Ok(Transaction {
        transaction_id: activity.activity_id,
        account_id,
        date: activity.date()?,
        transaction_type: activity.activity_type.clone(),
        status: activity.status.clone(),
        trade_id: None,
        order_id: activity.order_id,
        position_id: activity.position_id,
        amount: activity.net_amount,
        description: activity.description.clone(),
    })
}

/// Dividend descriptions without an embedded symbol are matched against
/// stored security descriptions.
async fn resolve_dividend_symbols(
    store: &dyn Store,
    activity: &Activity,
    items: &mut [TransactionItem],
) -> Result<()> {
    let unresolved = items
        .iter()
        .any(|line| is_income(line.kind) && line.symbol.is_none());
    if !unresolved {
        return Ok(());
    }

    let description = activity.description().trim();
    if description.is_empty() {
        debug!(transaction_id = activity.activity_id, "income without description, symbol left empty");
        return Ok(());
    }
    let Some(security) = store.find_security_by_description(description).await? else {
        return Ok(());
    };
    for line in items
        .iter_mut()
        .filter(|line| is_income(line.kind) && line.symbol.is_none())
    {
        line.symbol = Some(security.symbol.clone());
        line.underlying = Some(security.symbol.clone());
    }
    Ok(())
}

fn is_income(kind: LineKind) -> bool {
    matches!(kind, LineKind::Dividend | LineKind::Interest)
}

fn traded_equity_symbol(line: &TransactionItem) -> Option<&str> {
    if line.asset_type != "EQUITY" || !matches!(line.kind, LineKind::Buy | LineKind::Sell) {
        return None;
    }
    line.symbol.as_deref()
}

async fn backfill_equities(store: &dyn Store, client: &dyn BrokerClient, symbols: &[String]) {
    for symbol in symbols {
        backfill_security(store, client, &SecurityLookup::Symbol(symbol.clone())).await;
    }
}
