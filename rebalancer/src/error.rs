//! Error types for the rebalancer.

use std::path::PathBuf;

/// All errors that can occur during a rebalancer run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid holdings: {0}")]
    Holdings(String),

    #[error("invalid lots: {0}")]
    Lots(String),

    #[error("failed to read {path}: {source}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rebalance failed: {0}")]
    Core(#[from] glidepath::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

impl Error {
    /// Whether the error comes from the holdings file contents rather than
    /// from the environment.
    pub fn is_invalid_holdings(&self) -> bool {
        matches!(self, Error::Holdings(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
