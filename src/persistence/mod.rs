//! Database layer: pool, migrations, and record-level access for accounts,
//! securities, transactions, orders, positions and trades.
//!
//! Ingestion talks to the [`Store`] trait. [`PgStore`] is the postgres
//! implementation; [`MemoryStore`] keeps everything in process for replay and
//! tests.

mod accounts;
mod memory;
mod orders;
mod pg;
mod pool;
mod positions;
mod securities;
mod trades;
mod transactions;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::account::{AccountId, AccountNumber};
use crate::types::order::{Order, OrderId, OrderItem};
use crate::types::position::Position;
use crate::types::security::Security;
use crate::types::trade::{NewTrade, Page, Trade};
use crate::types::transaction::{Transaction, TransactionId, TransactionItem, UnassignedLine};

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use pool::{create_pool_and_migrate, run_migrations};
pub use sqlx::PgPool;

/// Record-level operations the engine needs. Multi-row writes are atomic.
#[async_trait]
pub trait Store: Send + Sync {
    async fn account_ids(&self) -> Result<HashMap<AccountNumber, AccountId>>;

    async fn find_security_by_description(&self, description: &str) -> Result<Option<Security>>;

    /// Insert unless a security with the same description exists. Returns
    /// whether a row was written.
    async fn insert_security(&self, security: &Security) -> Result<bool>;

    async fn transaction_ids(&self) -> Result<HashSet<TransactionId>>;

    /// Insert a transaction header together with its line items.
    async fn insert_transaction(
        &self,
        transaction: &Transaction,
        items: &[TransactionItem],
    ) -> Result<()>;

    async fn order_statuses(&self) -> Result<HashMap<OrderId, String>>;

    /// Insert an order together with its legs.
    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()>;

    /// Delete the stored order with the same id (and its legs), then insert.
    async fn replace_order(&self, order: &Order, items: &[OrderItem]) -> Result<()>;

    /// Mark every stored row of the account as not latest and insert the new
    /// snapshot.
    async fn replace_latest_positions(
        &self,
        account_id: AccountId,
        positions: &[Position],
    ) -> Result<()>;

    /// One page of trades plus the total matching count.
    async fn list_trades(&self, page: &Page) -> Result<(Vec<Trade>, i64)>;

    async fn insert_trade(&self, trade: &NewTrade) -> Result<i64>;

    /// One page of line items of transactions without a trade, plus the total
    /// matching row count.
    async fn list_unassigned_lines(&self, page: &Page) -> Result<(Vec<UnassignedLine>, i64)>;

    async fn assign_transactions(
        &self,
        trade_id: i64,
        transaction_ids: &[TransactionId],
    ) -> Result<u64>;
}
