//! In-process [`Store`] used for dry replays and tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::error::Result;
use crate::types::account::{AccountId, AccountNumber};
use crate::types::order::{Order, OrderId, OrderItem};
use crate::types::position::Position;
use crate::types::security::Security;
use crate::types::trade::{NewTrade, Page, Trade};
use crate::types::transaction::{Transaction, TransactionId, TransactionItem, UnassignedLine};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountNumber, AccountId>,
    securities: Vec<Security>,
    transactions: Vec<Transaction>,
    transaction_items: Vec<TransactionItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    positions: Vec<Position>,
    trades: Vec<Trade>,
}

/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_account(&self, account_number: AccountNumber, account_id: AccountId) {
        self.state.write().await.accounts.insert(account_number, account_id);
    }

    pub async fn add_security(&self, security: Security) {
        self.state.write().await.securities.push(security);
    }

    pub async fn securities(&self) -> Vec<Security> {
        self.state.read().await.securities.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn transaction_items(&self) -> Vec<TransactionItem> {
        self.state.read().await.transaction_items.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn order_items(&self) -> Vec<OrderItem> {
        self.state.read().await.order_items.clone()
    }

    pub async fn positions(&self) -> Vec<Position> {
        self.state.read().await.positions.clone()
    }

    pub async fn trades(&self) -> Vec<Trade> {
        self.state.read().await.trades.clone()
    }
}

fn page_of<T: Clone>(rows: &[T], page: &Page) -> Vec<T> {
    rows.iter()
        .skip(page.start as usize)
        .take(page.length as usize)
        .cloned()
        .collect()
}

fn push_order(state: &mut MemoryState, order: &Order, items: &[OrderItem]) {
    state.orders.push(order.clone());
    state.order_items.extend_from_slice(items);
}

#[async_trait]
impl Store for MemoryStore {
    async fn account_ids(&self) -> Result<HashMap<AccountNumber, AccountId>> {
        Ok(self.state.read().await.accounts.clone())
    }

    async fn find_security_by_description(&self, description: &str) -> Result<Option<Security>> {
        let state = self.state.read().await;
        Ok(state
            .securities
            .iter()
            .find(|s| s.description == description)
            .cloned())
    }

    async fn insert_security(&self, security: &Security) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.securities.iter().any(|s| s.description == security.description) {
            return Ok(false);
        }
        state.securities.push(security.clone());
        Ok(true)
    }

    async fn transaction_ids(&self) -> Result<HashSet<TransactionId>> {
        let state = self.state.read().await;
        Ok(state.transactions.iter().map(|t| t.transaction_id).collect())
    }

    async fn insert_transaction(
        &self,
        transaction: &Transaction,
        items: &[TransactionItem],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.transactions.push(transaction.clone());
        state.transaction_items.extend_from_slice(items);
        Ok(())
    }

    async fn order_statuses(&self) -> Result<HashMap<OrderId, String>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .map(|o| (o.order_id, o.status.clone()))
            .collect())
    }

    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let mut state = self.state.write().await;
        push_order(&mut state, order, items);
        Ok(())
    }

    async fn replace_order(&self, order: &Order, items: &[OrderItem]) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.retain(|o| o.order_id != order.order_id);
        state.order_items.retain(|i| i.order_id != order.order_id);
        push_order(&mut state, order, items);
        Ok(())
    }

    async fn replace_latest_positions(
        &self,
        account_id: AccountId,
        positions: &[Position],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        for row in state.positions.iter_mut().filter(|p| p.account_id == account_id) {
            row.latest = false;
        }
        state.positions.extend_from_slice(positions);
        Ok(())
    }

    async fn list_trades(&self, page: &Page) -> Result<(Vec<Trade>, i64)> {
        let state = self.state.read().await;
        let mut matching: Vec<Trade> = state
            .trades
            .iter()
            .filter(|t| page.matches(Some(t.description.as_str())))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.open_date, b.trade_id).cmp(&(a.open_date, a.trade_id)));
        Ok((page_of(&matching, page), matching.len() as i64))
    }

    async fn insert_trade(&self, trade: &NewTrade) -> Result<i64> {
        let mut state = self.state.write().await;
        let trade_id = state.trades.iter().map(|t| t.trade_id).max().unwrap_or(0) + 1;
        state.trades.push(Trade {
            trade_id,
            account_id: trade.account_id,
            open_date: trade.open_date,
            close_date: trade.close_date,
            trade_type: trade.trade_type.clone(),
            status: trade.status.clone(),
            amount: trade.amount,
            description: trade.description.clone(),
            comment: trade.comment.clone(),
        });
        Ok(trade_id)
    }

    async fn list_unassigned_lines(&self, page: &Page) -> Result<(Vec<UnassignedLine>, i64)> {
        let state = self.state.read().await;
        let mut headers: Vec<&Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.trade_id.is_none() && page.matches(t.description.as_deref()))
            .collect();
        headers.sort_by(|a, b| (b.date, b.transaction_id).cmp(&(a.date, a.transaction_id)));

        let mut lines = Vec::new();
        for header in headers {
            let mut items = state
                .transaction_items
                .iter()
                .filter(|i| i.transaction_id == header.transaction_id)
                .peekable();
            if items.peek().is_none() {
                lines.push(UnassignedLine::new(header, None));
            }
            lines.extend(items.map(|item| UnassignedLine::new(header, Some(item))));
        }
        Ok((page_of(&lines, page), lines.len() as i64))
    }

    async fn assign_transactions(
        &self,
        trade_id: i64,
        transaction_ids: &[TransactionId],
    ) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for transaction in state
            .transactions
            .iter_mut()
            .filter(|t| transaction_ids.contains(&t.transaction_id))
        {
            transaction.trade_id = Some(trade_id);
            updated += 1;
        }
        Ok(updated)
    }
}
