//! Crate error type.

use std::fmt;

/// Vendor document families, used to say which document failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Activities,
    Orders,
    Positions,
    LinkedAccounts,
    Instruments,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Activities => "activities",
            DocumentKind::Orders => "orders",
            DocumentKind::Positions => "positions",
            DocumentKind::LinkedAccounts => "linked accounts",
            DocumentKind::Instruments => "instruments",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed {kind} document: {source}")]
    Document {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing field `{field}` in {kind} document")]
    MissingField {
        kind: DocumentKind,
        field: &'static str,
    },

    #[error("account number {0} is not mapped to an internal account")]
    UnknownAccount(i64),

    #[error("a security lookup needs a symbol or a cusip")]
    EmptySecurityLookup,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
