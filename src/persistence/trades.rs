//! Trade persistence for reconciliation: list, count, insert.

use sqlx::PgPool;

use crate::types::trade::{NewTrade, Page, Trade};

/// List trades (newest first), optionally filtered by description.
pub async fn list_trades(pool: &PgPool, page: &Page) -> Result<Vec<Trade>, sqlx::Error> {
    sqlx::query_as::<_, Trade>(
        "SELECT trade_id, account_id, open_date, close_date, type, status, amount, description, comment \
         FROM trades WHERE ($1::text IS NULL OR description ILIKE '%' || $1 || '%') \
         ORDER BY open_date DESC, trade_id DESC OFFSET $2 LIMIT $3",
    )
    .bind(page.search.as_deref())
    .bind(page.start)
    .bind(page.length)
    .fetch_all(pool)
    .await
}

pub async fn count_trades(pool: &PgPool, page: &Page) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM trades WHERE ($1::text IS NULL OR description ILIKE '%' || $1 || '%')",
    )
    .bind(page.search.as_deref())
    .fetch_one(pool)
    .await
}

/// Insert a trade and return its id.
pub async fn insert_trade(pool: &PgPool, trade: &NewTrade) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO trades (account_id, open_date, close_date, type, status, amount, description, comment) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING trade_id",
    )
    .bind(trade.account_id)
    .bind(trade.open_date)
    .bind(trade.close_date)
    .bind(&trade.trade_type)
    .bind(&trade.status)
    .bind(trade.amount)
    .bind(&trade.description)
    .bind(&trade.comment)
    .fetch_one(pool)
    .await
}
