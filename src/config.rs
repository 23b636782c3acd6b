//! Runtime configuration read from the environment (and `.env`).

use std::path::PathBuf;

use crate::client::DEFAULT_BASE_URL;
use crate::error::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_IMPORT_DIR: &str = "./data/import";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub broker_base_url: String,
    /// Commands that only replay files work without it.
    pub broker_access_token: Option<String>,
    pub import_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as
    /// unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
                    )));
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
            broker_base_url: var("BROKER_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            broker_access_token: var("BROKER_ACCESS_TOKEN"),
            import_dir: PathBuf::from(var("IMPORT_DIR").unwrap_or_else(|| DEFAULT_IMPORT_DIR.to_string())),
        })
    }
}
