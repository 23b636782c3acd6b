//! Account lookups. Accounts are created out-of-band.

use sqlx::PgPool;

use crate::types::account::{AccountId, AccountNumber};

/// All (account_number, account_id) pairs.
pub async fn list_account_ids(pool: &PgPool) -> Result<Vec<(AccountNumber, AccountId)>, sqlx::Error> {
    sqlx::query_as::<_, (AccountNumber, AccountId)>(
        "SELECT account_number, account_id FROM accounts",
    )
    .fetch_all(pool)
    .await
}
