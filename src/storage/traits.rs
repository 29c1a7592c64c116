//! Storage trait and error types

use crate::model::BookRecord;
use crate::storage::{BookFilter, CategoryStats, OverviewStats, StoredBook, UpsertSummary, UserRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the record store consumed by the scraper and the HTTP layer
pub trait BookStore {
    // ===== Ingest surface =====

    /// Inserts records, ignoring any whose `source_url` already exists
    ///
    /// Runs as one transaction. A duplicate key is counted in the summary,
    /// never raised as an error.
    fn upsert_books(&mut self, records: &[BookRecord]) -> StorageResult<UpsertSummary>;

    /// Total number of stored books
    fn count_books(&self) -> StorageResult<u64>;

    // ===== Query surface =====

    /// Gets a single book by database id
    fn get_book(&self, id: i64) -> StorageResult<Option<StoredBook>>;

    /// All stored books, ordered by id
    fn list_books(&self) -> StorageResult<Vec<StoredBook>>;

    /// Books matching the filter's title/category substring constraints
    fn search_books(&self, filter: &BookFilter) -> StorageResult<Vec<StoredBook>>;

    /// Distinct categories present in the store, sorted
    fn list_categories(&self) -> StorageResult<Vec<String>>;

    // ===== Statistics =====

    /// Store-wide aggregates
    fn overview_stats(&self) -> StorageResult<OverviewStats>;

    /// Aggregates broken down by category, sorted by category name
    fn category_stats(&self) -> StorageResult<Vec<CategoryStats>>;

    // ===== Users =====

    /// Creates a user row; returns false when the username is taken
    fn create_user(&mut self, username: &str, password_hash: &str) -> StorageResult<bool>;

    /// Looks up a user by username
    fn get_user(&self, username: &str) -> StorageResult<Option<UserRecord>>;
}
