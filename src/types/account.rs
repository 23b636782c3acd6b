pub type AccountId = i32;
pub type AccountNumber = i64;

/// Broker account mapped to its internal id and the vendor access hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub account_number: AccountNumber,
    pub account_id: AccountId,
    pub account_hash: String,
}
