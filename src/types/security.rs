use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimal security reference. Description is the natural key: dividend
/// activity carries a description but never a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Security {
    pub symbol: String,
    pub description: String,
    pub exchange: String,
    pub asset_type: String,
}

/// Asset class as the classifier sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Equity,
    Option,
    Future,
    FixedIncome,
    Currency,
    Other,
}

impl AssetType {
    /// Maps a vendor asset type. Collective investments are treated as equity.
    pub fn resolve(raw: &str) -> Self {
        match raw {
            "EQUITY" | "COLLECTIVE_INVESTMENT" => AssetType::Equity,
            "OPTION" => AssetType::Option,
            "FUTURE" => AssetType::Future,
            "FIXED_INCOME" => AssetType::FixedIncome,
            "CURRENCY" => AssetType::Currency,
            _ => AssetType::Other,
        }
    }
}

/// Normalizes the stored asset type of positions and line items.
pub fn normalize_asset_type(raw: &str) -> &str {
    if raw == "COLLECTIVE_INVESTMENT" { "EQUITY" } else { raw }
}

/// Instrument search key. Exactly one of symbol or cusip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecurityLookup {
    Symbol(String),
    Cusip(String),
}

impl SecurityLookup {
    /// Builds a lookup from optional parts, preferring the cusip.
    pub fn prefer_cusip(cusip: Option<&str>, symbol: Option<&str>) -> Result<Self> {
        match (cusip, symbol) {
            (Some(cusip), _) => Ok(SecurityLookup::Cusip(cusip.to_string())),
            (None, Some(symbol)) => Ok(SecurityLookup::Symbol(symbol.to_string())),
            (None, None) => Err(Error::EmptySecurityLookup),
        }
    }
}

impl std::fmt::Display for SecurityLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityLookup::Symbol(symbol) => write!(f, "symbol={symbol}"),
            SecurityLookup::Cusip(cusip) => write!(f, "cusip={cusip}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityStatus {
    Exists,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityResolution {
    pub symbol: String,
    pub status: SecurityStatus,
}
