//! Brokerage activity ledger: pulls transactions, orders and positions from
//! the broker's trading API, normalizes them into postgres, and serves the
//! reconciliation API used to group transactions into trades.

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod ingest;
pub mod persistence;
pub mod types;

pub use error::{Error, Result};
