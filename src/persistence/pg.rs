//! Postgres-backed [`Store`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{accounts, orders, positions, securities, trades, transactions, Store};
use crate::error::Result;
use crate::types::account::{AccountId, AccountNumber};
use crate::types::order::{Order, OrderId, OrderItem};
use crate::types::position::Position;
use crate::types::security::Security;
use crate::types::trade::{NewTrade, Page, Trade};
use crate::types::transaction::{Transaction, TransactionId, TransactionItem, UnassignedLine};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Release every connection of the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for PgStore {
    async fn account_ids(&self) -> Result<HashMap<AccountNumber, AccountId>> {
        Ok(accounts::list_account_ids(&self.pool).await?.into_iter().collect())
    }

    async fn find_security_by_description(&self, description: &str) -> Result<Option<Security>> {
        Ok(securities::get_security_by_description(&self.pool, description).await?)
    }

    async fn insert_security(&self, security: &Security) -> Result<bool> {
        Ok(securities::insert_security(&self.pool, security).await?)
    }

    async fn transaction_ids(&self) -> Result<HashSet<TransactionId>> {
        Ok(transactions::list_transaction_ids(&self.pool).await?.into_iter().collect())
    }

    async fn insert_transaction(
        &self,
        transaction: &Transaction,
        items: &[TransactionItem],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        transactions::insert_transaction(&mut *tx, transaction).await?;
        for item in items {
            transactions::insert_transaction_item(&mut *tx, item).await?;
        }
        tx.commit().await?;
        debug!(transaction_id = transaction.transaction_id, items = items.len(), "transaction stored");
        Ok(())
    }

    async fn order_statuses(&self) -> Result<HashMap<OrderId, String>> {
        Ok(orders::list_order_statuses(&self.pool).await?.into_iter().collect())
    }

    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        orders::insert_order(&mut *tx, order).await?;
        for item in items {
            orders::insert_order_item(&mut *tx, item).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn replace_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete_order(&mut *tx, order.order_id).await?;
        orders::insert_order(&mut *tx, order).await?;
        for item in items {
            orders::insert_order_item(&mut *tx, item).await?;
        }
        tx.commit().await?;
        debug!(order_id = order.order_id, deleted, "order replaced");
        Ok(())
    }

    async fn replace_latest_positions(
        &self,
        account_id: AccountId,
        snapshot: &[Position],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let reset = positions::reset_latest_positions(&mut *tx, account_id).await?;
        for position in snapshot {
            positions::insert_position(&mut *tx, position).await?;
        }
        tx.commit().await?;
        debug!(account_id, reset, inserted = snapshot.len(), "position snapshot stored");
        Ok(())
    }

    async fn list_trades(&self, page: &Page) -> Result<(Vec<Trade>, i64)> {
        let rows = trades::list_trades(&self.pool, page).await?;
        let total = trades::count_trades(&self.pool, page).await?;
        Ok((rows, total))
    }

    async fn insert_trade(&self, trade: &NewTrade) -> Result<i64> {
        Ok(trades::insert_trade(&self.pool, trade).await?)
    }

    async fn list_unassigned_lines(&self, page: &Page) -> Result<(Vec<UnassignedLine>, i64)> {
        let rows = transactions::list_unassigned_lines(&self.pool, page).await?;
        let total = transactions::count_unassigned_lines(&self.pool, page).await?;
        Ok((rows, total))
    }

    async fn assign_transactions(
        &self,
        trade_id: i64,
        transaction_ids: &[TransactionId],
    ) -> Result<u64> {
        Ok(transactions::assign_transactions(&self.pool, trade_id, transaction_ids).await?)
    }
}
