use std::collections::HashMap;

use tracing::{debug, error};

use crate::client::BrokerClient;
use crate::error::Result;
use crate::persistence::Store;
use crate::types::account::{AccountNumber, ResolvedAccount};

/// Live broker accounts that have a stored internal id, keyed by account
/// number. Accounts the broker reports but the store does not know are logged
/// and left out.
pub async fn resolve_accounts(
    store: &dyn Store,
    client: &dyn BrokerClient,
) -> Result<HashMap<AccountNumber, ResolvedAccount>> {
    let known = store.account_ids().await?;
    let linked = client.linked_accounts().await?;

    let mut resolved = HashMap::with_capacity(linked.len());
    for account in linked {
        match known.get(&account.account_number) {
            Some(&account_id) => {
                resolved.insert(
                    account.account_number,
                    ResolvedAccount {
                        account_number: account.account_number,
                        account_id,
                        account_hash: account.hash_value,
                    },
                );
            }
            None => error!(
                account_number = account.account_number,
                "broker account has no internal account, skipping"
            ),
        }
    }
    debug!(resolved = resolved.len(), "accounts resolved");
    Ok(resolved)
}
