//! Domain records written to and read from the store.

pub mod account;
pub mod order;
pub mod position;
pub mod security;
pub mod trade;
pub mod transaction;
