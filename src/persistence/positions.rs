//! Position snapshot persistence.

use sqlx::PgConnection;

use crate::types::account::AccountId;
use crate::types::position::Position;

fn latest_flag(latest: bool) -> &'static str {
    if latest { "Y" } else { "N" }
}

/// Clear the latest flag on every row of the account.
pub async fn reset_latest_positions(
    conn: &mut PgConnection,
    account_id: AccountId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE positions SET latest = $1 WHERE account_id = $2 AND latest <> $1")
        .bind(latest_flag(false))
        .bind(account_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_position(conn: &mut PgConnection, position: &Position) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (account_id, date, asset_type, short_quantity, long_quantity, \
         average_price, market_value, current_day_profit_loss, current_day_profit_loss_percentage, \
         maintenance_requirement, net_change, cusip, symbol, underlying, description, maturity_date, \
         variable_rate, latest) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(position.account_id)
    .bind(position.date)
    .bind(&position.asset_type)
    .bind(position.short_quantity)
    .bind(position.long_quantity)
    .bind(position.average_price)
    .bind(position.market_value)
    .bind(position.current_day_profit_loss)
    .bind(position.current_day_profit_loss_percentage)
    .bind(position.maintenance_requirement)
    .bind(position.net_change)
    .bind(&position.cusip)
    .bind(&position.symbol)
    .bind(&position.underlying)
    .bind(&position.description)
    .bind(position.maturity_date)
    .bind(position.variable_rate)
    .bind(latest_flag(position.latest))
    .execute(conn)
    .await?;
    Ok(())
}
