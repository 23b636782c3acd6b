//! Transaction persistence: dedup ids, header + line item inserts, and the
//! reconciliation queries over unassigned transactions.

use sqlx::{PgConnection, PgPool};

use crate::types::trade::Page;
use crate::types::transaction::{Transaction, TransactionId, TransactionItem, UnassignedLine};

/// Every stored transaction id, across accounts.
pub async fn list_transaction_ids(pool: &PgPool) -> Result<Vec<TransactionId>, sqlx::Error> {
    sqlx::query_scalar::<_, TransactionId>("SELECT transaction_id FROM transactions")
        .fetch_all(pool)
        .await
}

pub async fn insert_transaction(
    conn: &mut PgConnection,
    transaction: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (transaction_id, account_id, date, type, status, trade_id, \
         order_id, position_id, amount, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(transaction.transaction_id)
    .bind(transaction.account_id)
    .bind(transaction.date)
    .bind(&transaction.transaction_type)
    .bind(&transaction.status)
    .bind(transaction.trade_id)
    .bind(transaction.order_id)
    .bind(transaction.position_id)
    .bind(transaction.amount)
    .bind(&transaction.description)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_transaction_item(
    conn: &mut PgConnection,
    item: &TransactionItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transaction_items (transaction_id, transaction, asset_type, quantity, amount, \
         extended_amount, symbol, underlying, description, strike_price, expiration_date, \
         multiplier, position_effect) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(item.transaction_id)
    .bind(item.kind.as_str())
    .bind(&item.asset_type)
    .bind(item.quantity)
    .bind(item.amount)
    .bind(item.extended_amount)
    .bind(&item.symbol)
    .bind(&item.underlying)
    .bind(&item.description)
    .bind(item.strike_price)
    .bind(item.expiration_date)
    .bind(item.multiplier)
    .bind(&item.position_effect)
    .execute(conn)
    .await?;
    Ok(())
}

const UNASSIGNED_FROM: &str = "FROM transactions t \
     LEFT JOIN transaction_items i ON i.transaction_id = t.transaction_id \
     WHERE t.trade_id IS NULL AND ($1::text IS NULL OR t.description ILIKE '%' || $1 || '%')";

/// Line items of transactions not yet assigned to a trade, newest first.
pub async fn list_unassigned_lines(
    pool: &PgPool,
    page: &Page,
) -> Result<Vec<UnassignedLine>, sqlx::Error> {
    sqlx::query_as::<_, UnassignedLine>(&format!(
        "SELECT t.transaction_id, t.account_id, t.date, t.type, t.status, t.order_id, \
         t.position_id, t.amount AS net_amount, t.description, i.transaction, i.asset_type, \
         i.symbol, i.underlying, i.quantity, i.amount, i.extended_amount, i.strike_price, \
         i.expiration_date \
         {UNASSIGNED_FROM} \
         ORDER BY t.date DESC, t.transaction_id DESC, i.item_id OFFSET $2 LIMIT $3"
    ))
    .bind(page.search.as_deref())
    .bind(page.start)
    .bind(page.length)
    .fetch_all(pool)
    .await
}

pub async fn count_unassigned_lines(pool: &PgPool, page: &Page) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {UNASSIGNED_FROM}"))
        .bind(page.search.as_deref())
        .fetch_one(pool)
        .await
}

/// Assign transactions to a trade. Returns the number of rows updated.
pub async fn assign_transactions(
    pool: &PgPool,
    trade_id: i64,
    transaction_ids: &[TransactionId],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE transactions SET trade_id = $1 WHERE transaction_id = ANY($2)")
        .bind(trade_id)
        .bind(transaction_ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
