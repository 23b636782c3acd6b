//! Command bodies behind the CLI. Each works through its accounts one after
//! another; a failure on one account (or document) is logged and the rest
//! carry on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::{BrokerClient, DateRange};
use crate::documents::{parse, parse_slice, Activity, OrderDocument, PositionsDocument};
use crate::error::{DocumentKind, Error, Result};
use crate::ingest::{ingest_orders, ingest_positions, ingest_transactions, resolve_accounts};
use crate::persistence::Store;
use crate::types::account::{AccountId, AccountNumber, ResolvedAccount};
use crate::types::order::OrderSummary;
use crate::types::transaction::TransactionSummary;

/// Activity types pulled by `get-transactions`.
pub const TRANSACTION_TYPES: [&str; 2] = ["TRADE", "DIVIDEND_OR_INTEREST"];

pub const PROCESSED_DIR: &str = "processed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileImportSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Replays every `*.json` activity file in `import_dir`. Imported files move
/// to `import_dir/processed`; files that fail stay where they are.
pub async fn process_transaction_files(
    store: &dyn Store,
    client: &dyn BrokerClient,
    import_dir: &Path,
) -> Result<FileImportSummary> {
    info!(dir = %import_dir.display(), "importing transaction files");
    let files = json_files(import_dir).await?;
    let processed_dir = import_dir.join(PROCESSED_DIR);
    tokio::fs::create_dir_all(&processed_dir).await?;
    let accounts = store.account_ids().await?;

    let mut summary = FileImportSummary::default();
    for path in files {
        match import_file(store, client, &accounts, &path).await {
            Ok(counts) => {
                let Some(name) = path.file_name() else { continue };
                tokio::fs::rename(&path, processed_dir.join(name)).await?;
                info!(
                    file = %path.display(),
                    new = counts.new_count,
                    skipped = counts.skipped_count,
                    "file imported"
                );
                summary.processed += 1;
            }
            Err(err) => {
                error!(file = %path.display(), error = %err, "file import failed, leaving it in place");
                summary.failed += 1;
            }
        }
    }
    info!(processed = summary.processed, failed = summary.failed, "transaction files done");
    Ok(summary)
}

async fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        } else {
            info!(file = %path.display(), "skipping non-json file");
        }
    }
    files.sort();
    Ok(files)
}

async fn import_file(
    store: &dyn Store,
    client: &dyn BrokerClient,
    accounts: &HashMap<AccountNumber, AccountId>,
    path: &Path,
) -> Result<TransactionSummary> {
    let bytes = tokio::fs::read(path).await?;
    let activities: Vec<Activity> = parse_slice(DocumentKind::Activities, &bytes)?;
    let Some(first) = activities.first() else {
        return Ok(TransactionSummary::default());
    };
    let account_number = first.account().ok_or(Error::MissingField {
        kind: DocumentKind::Activities,
        field: "accountNumber",
    })?;
    let account_id = *accounts
        .get(&account_number)
        .ok_or(Error::UnknownAccount(account_number))?;
    ingest_transactions(store, client, account_id, &activities).await
}

/// Pulls TRADE and DIVIDEND_OR_INTEREST activity for each account.
pub async fn get_transactions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    accounts: &[AccountNumber],
    range: &DateRange,
    debug: bool,
) -> Result<()> {
    let resolved = resolve_accounts(store, client).await?;
    for account in selected(&resolved, accounts) {
        for types in TRANSACTION_TYPES {
            if let Err(err) = pull_transactions(store, client, account, range, types, debug).await {
                error!(
                    account_number = account.account_number,
                    types,
                    error = %err,
                    "transactions not ingested"
                );
            }
        }
    }
    Ok(())
}

async fn pull_transactions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    account: &ResolvedAccount,
    range: &DateRange,
    types: &str,
    debug: bool,
) -> Result<TransactionSummary> {
    let body = client.transactions(&account.account_hash, range, types).await?;
    print_debug(debug, &body);
    let activities: Vec<Activity> = parse(DocumentKind::Activities, body)?;
    ingest_transactions(store, client, account.account_id, &activities).await
}

/// Takes a position snapshot for each account.
pub async fn get_positions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    accounts: &[AccountNumber],
    debug: bool,
) -> Result<()> {
    let resolved = resolve_accounts(store, client).await?;
    for account in selected(&resolved, accounts) {
        if let Err(err) = pull_positions(store, client, account, debug).await {
            error!(account_number = account.account_number, error = %err, "positions not ingested");
        }
    }
    Ok(())
}

async fn pull_positions(
    store: &dyn Store,
    client: &dyn BrokerClient,
    account: &ResolvedAccount,
    debug: bool,
) -> Result<usize> {
    let body = client.account_positions(&account.account_hash).await?;
    print_debug(debug, &body);
    let document: PositionsDocument = parse(DocumentKind::Positions, body)?;
    let reported = document.securities_account.account_number;
    if reported != account.account_number {
        warn!(
            expected = account.account_number,
            reported,
            "positions document reports a different account number"
        );
    }
    ingest_positions(store, client, account.account_id, &document).await
}

/// Pulls orders entered in `range`, optionally only those with `status`.
pub async fn get_orders(
    store: &dyn Store,
    client: &dyn BrokerClient,
    accounts: &[AccountNumber],
    range: &DateRange,
    status: Option<&str>,
    debug: bool,
) -> Result<()> {
    let resolved = resolve_accounts(store, client).await?;
    for account in selected(&resolved, accounts) {
        if let Err(err) = pull_orders(store, client, account, range, status, debug).await {
            error!(account_number = account.account_number, error = %err, "orders not ingested");
        }
    }
    Ok(())
}

async fn pull_orders(
    store: &dyn Store,
    client: &dyn BrokerClient,
    account: &ResolvedAccount,
    range: &DateRange,
    status: Option<&str>,
    debug: bool,
) -> Result<OrderSummary> {
    let body = client.orders(&account.account_hash, range, status).await?;
    print_debug(debug, &body);
    let orders: Vec<OrderDocument> = parse(DocumentKind::Orders, body)?;
    ingest_orders(store, account.account_id, &orders).await
}

/// Requested accounts that resolved; the others are logged.
fn selected<'a>(
    resolved: &'a HashMap<AccountNumber, ResolvedAccount>,
    requested: &[AccountNumber],
) -> Vec<&'a ResolvedAccount> {
    requested
        .iter()
        .filter_map(|number| {
            let account = resolved.get(number);
            if account.is_none() {
                error!(account_number = number, "account is not linked or not mapped, skipping");
            }
            account
        })
        .collect()
}

fn print_debug(debug: bool, body: &Value) {
    if !debug {
        return;
    }
    match serde_json::to_string_pretty(body) {
        Ok(text) => println!("{text}"),
        Err(err) => warn!(error = %err, "cannot render response"),
    }
}
