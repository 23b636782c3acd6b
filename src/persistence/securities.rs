//! Security persistence: lookup by description, insert-if-absent.

use sqlx::PgPool;

use crate::types::security::Security;

pub async fn get_security_by_description(
    pool: &PgPool,
    description: &str,
) -> Result<Option<Security>, sqlx::Error> {
    sqlx::query_as::<_, Security>(
        "SELECT symbol, description, exchange, asset_type FROM securities \
         WHERE description = $1 ORDER BY security_id LIMIT 1",
    )
    .bind(description)
    .fetch_optional(pool)
    .await
}

/// Insert a security unless one with the same description exists.
/// Returns whether a row was written.
pub async fn insert_security(pool: &PgPool, security: &Security) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO securities (symbol, description, exchange, asset_type) \
         VALUES ($1, $2, $3, $4) ON CONFLICT (description) DO NOTHING",
    )
    .bind(&security.symbol)
    .bind(&security.description)
    .bind(&security.exchange)
    .bind(&security.asset_type)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
