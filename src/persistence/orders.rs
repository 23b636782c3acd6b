//! Order persistence: status lookup for dedup, header and leg inserts, delete
//! (order items follow through the cascade).

use sqlx::{PgConnection, PgPool};

use crate::types::order::{Order, OrderId, OrderItem};

/// Stored (order_id, status) pairs, across accounts.
pub async fn list_order_statuses(pool: &PgPool) -> Result<Vec<(OrderId, String)>, sqlx::Error> {
    sqlx::query_as::<_, (OrderId, String)>("SELECT order_id, status FROM orders")
        .fetch_all(pool)
        .await
}

pub async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (account_id, order_id, entered_time, cancel_time, close_time, \
         order_type, order_class, order_strategy_type, order_duration, requested_destination, \
         status, price, quantity, filled_quantity, remaining_quantity) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(order.account_id)
    .bind(order.order_id)
    .bind(order.entered_time)
    .bind(order.cancel_time)
    .bind(order.close_time)
    .bind(&order.order_type)
    .bind(&order.order_class)
    .bind(&order.order_strategy_type)
    .bind(&order.order_duration)
    .bind(&order.requested_destination)
    .bind(&order.status)
    .bind(order.price)
    .bind(order.quantity)
    .bind(order.filled_quantity)
    .bind(order.remaining_quantity)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_order_item(conn: &mut PgConnection, item: &OrderItem) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items (account_id, order_id, order_item_id, order_leg_type, instruction, \
         quantity, asset_type, symbol, cusip, description, put_call, underlying, maturity_date, \
         strike_price, multiplier, position_effect) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(item.account_id)
    .bind(item.order_id)
    .bind(item.order_item_id)
    .bind(&item.order_leg_type)
    .bind(&item.instruction)
    .bind(item.quantity)
    .bind(&item.asset_type)
    .bind(&item.symbol)
    .bind(&item.cusip)
    .bind(&item.description)
    .bind(&item.put_call)
    .bind(&item.underlying)
    .bind(item.maturity_date)
    .bind(item.strike_price)
    .bind(item.multiplier)
    .bind(&item.position_effect)
    .execute(conn)
    .await?;
    Ok(())
}

/// Delete an order by id; its items go with it.
pub async fn delete_order(conn: &mut PgConnection, order_id: OrderId) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
