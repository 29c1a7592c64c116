//! Folio-Harvest: a book catalog collector and query API
//!
//! This crate crawls a paginated book catalog site (category discovery, page-by-page
//! traversal, per-item field extraction), merges the results into a SQLite store
//! without duplicating records, and serves the collected data over HTTP with basic
//! statistics and a token-gated re-collection trigger.

pub mod config;
pub mod model;
pub mod scraper;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for Folio-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] scraper::FetchError),

    #[error("Category discovery failed: {0}")]
    Discovery(scraper::FetchError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Folio-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{BookRecord, CategoryRef, IngestReport};
pub use storage::{BookStore, SqliteStore};
