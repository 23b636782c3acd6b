use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use theta_ledger::api::routes::{app_router, AppState};
use theta_ledger::client::{BrokerClient, DateRange, OfflineClient, TraderClient, DEFAULT_DAYS};
use theta_ledger::commands;
use theta_ledger::config::Config;
use theta_ledger::persistence::{create_pool_and_migrate, PgStore};
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "theta_ledger", version, about = "Brokerage activity ingestion and reconciliation")]
struct Cli {
    /// Append logs to this file as well as stdout
    #[arg(long, global = true, env = "LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay activity JSON files from a directory
    ProcessTransactionFiles {
        /// Defaults to IMPORT_DIR
        #[arg(long)]
        import_dir: Option<PathBuf>,
    },
    /// Pull TRADE and DIVIDEND_OR_INTEREST transactions
    GetTransactions {
        #[command(flatten)]
        accounts: AccountArgs,
        #[command(flatten)]
        range: RangeArgs,
        /// Print the raw responses
        #[arg(long)]
        debug: bool,
    },
    /// Store a position snapshot
    GetPositions {
        #[command(flatten)]
        accounts: AccountArgs,
        #[arg(long)]
        debug: bool,
    },
    /// Pull orders by entered time
    GetOrders {
        #[command(flatten)]
        accounts: AccountArgs,
        #[command(flatten)]
        range: RangeArgs,
        /// Only orders with this status
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        debug: bool,
    },
    /// Run the reconciliation API
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
        bind: String,
    },
}

#[derive(Debug, Args)]
struct AccountArgs {
    /// One or more broker account numbers
    #[arg(long = "account", required = true, num_args = 1..)]
    accounts: Vec<i64>,
}

#[derive(Debug, Args)]
struct RangeArgs {
    /// Days back from now, used when no start date is given
    #[arg(long, default_value_t = DEFAULT_DAYS)]
    days: i64,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// YYYY-MM-DD, inclusive
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

impl RangeArgs {
    fn resolve(&self) -> theta_ledger::Result<DateRange> {
        DateRange::resolve(self.days, self.start_date, self.end_date, Utc::now())
    }
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("theta_ledger=info"));
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();
    Ok(())
}

fn broker_client(config: &Config) -> Box<dyn BrokerClient> {
    match &config.broker_access_token {
        Some(token) => Box::new(TraderClient::new(&config.broker_base_url, token)),
        None => Box::new(OfflineClient),
    }
}

async fn run(command: Command, config: &Config, store: &PgStore) -> anyhow::Result<()> {
    let client = broker_client(config);
    match command {
        Command::ProcessTransactionFiles { import_dir } => {
            let dir = import_dir.unwrap_or_else(|| config.import_dir.clone());
            commands::process_transaction_files(store, client.as_ref(), &dir).await?;
        }
        Command::GetTransactions { accounts, range, debug } => {
            let range = range.resolve()?;
            commands::get_transactions(store, client.as_ref(), &accounts.accounts, &range, debug)
                .await?;
        }
        Command::GetPositions { accounts, debug } => {
            commands::get_positions(store, client.as_ref(), &accounts.accounts, debug).await?;
        }
        Command::GetOrders { accounts, range, status, debug } => {
            let range = range.resolve()?;
            commands::get_orders(
                store,
                client.as_ref(),
                &accounts.accounts,
                &range,
                status.as_deref(),
                debug,
            )
            .await?;
        }
        Command::Serve { bind } => {
            let state = AppState { store: Arc::new(store.clone()) };
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("cannot bind {bind}"))?;
            info!(%bind, "reconciliation api listening");
            axum::serve(listener, app_router(state)).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = Config::from_env()?;
    let pool = create_pool_and_migrate(&config.database_url, config.max_connections)
        .await
        .context("cannot open database")?;
    let store = PgStore::new(pool);

    let result = run(cli.command, &config, &store).await;
    store.close().await;
    if let Err(err) = &result {
        error!(error = %err, "command failed");
    }
    result
}
