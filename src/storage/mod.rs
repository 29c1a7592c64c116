//! Storage module for persisting collected book data
//!
//! This module handles all database operations, including:
//! - SQLite initialization and schema management
//! - Insert-or-ignore upsert keyed on each book's source URL
//! - Parameterized query surface for the HTTP layer
//! - Aggregate statistics
//! - User rows for the auth gate

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{BookStore, StorageError, StorageResult};

use serde::Serialize;
use std::path::Path;

use crate::HarvestError;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStore, HarvestError> {
    Ok(SqliteStore::new(path)?)
}

/// A book row as stored, with its database id
#[derive(Debug, Clone, Serialize)]
pub struct StoredBook {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub rating: u8,
    pub is_in_stock: bool,
    pub availability_text: String,
    pub image_url: String,
    pub source_url: String,
}

/// Result of a batched upsert
///
/// Duplicate keys are reported here, never raised as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub ignored_duplicate: usize,
}

/// Title/category filters for the search endpoint; both are substring matches
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub title: Option<String>,
    pub category: Option<String>,
}

/// A registered user row
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Store-wide aggregate statistics
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub total_books: u64,
    pub total_categories: u64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub in_stock: u64,
}

/// Per-category aggregate statistics
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub book_count: u64,
    pub average_price: f64,
    pub in_stock: u64,
}
