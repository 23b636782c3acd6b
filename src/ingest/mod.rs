//! Normalization of vendor documents into stored records.

pub mod accounts;
pub mod classifier;
pub mod orders;
pub mod positions;
pub mod securities;
pub mod transactions;

pub use accounts::resolve_accounts;
pub use orders::ingest_orders;
pub use positions::ingest_positions;
pub use securities::get_or_create_security;
pub use transactions::ingest_transactions;
