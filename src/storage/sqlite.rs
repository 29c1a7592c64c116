//! SQLite storage implementation

use crate::model::BookRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{BookStore, StorageResult};
use crate::storage::{
    BookFilter, CategoryStats, OverviewStats, StoredBook, UpsertSummary, UserRecord,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

const BOOK_COLUMNS: &str = "id, title, category, price, rating, is_in_stock,
                            availability_text, image_url, source_url";

fn book_from_row(row: &Row<'_>) -> Result<StoredBook, rusqlite::Error> {
    Ok(StoredBook {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        rating: row.get(4)?,
        is_in_stock: row.get(5)?,
        availability_text: row.get(6)?,
        image_url: row.get(7)?,
        source_url: row.get(8)?,
    })
}

impl BookStore for SqliteStore {
    // ===== Ingest surface =====

    fn upsert_books(&mut self, records: &[BookRecord]) -> StorageResult<UpsertSummary> {
        let tx = self.conn.transaction()?;
        let mut summary = UpsertSummary::default();

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO books
                 (title, category, price, rating, is_in_stock,
                  availability_text, image_url, source_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in records {
                let changed = stmt.execute(params![
                    record.title,
                    record.category,
                    record.price,
                    record.rating,
                    record.is_in_stock,
                    record.availability_text,
                    record.image_url,
                    record.source_url,
                ])?;

                if changed == 1 {
                    summary.inserted += 1;
                } else {
                    summary.ignored_duplicate += 1;
                    tracing::debug!(source_url = %record.source_url, "duplicate source_url ignored");
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Query surface =====

    fn get_book(&self, id: i64) -> StorageResult<Option<StoredBook>> {
        let book = self
            .conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
                params![id],
                book_from_row,
            )
            .optional()?;
        Ok(book)
    }

    fn list_books(&self) -> StorageResult<Vec<StoredBook>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))?;
        let books = stmt
            .query_map([], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn search_books(&self, filter: &BookFilter) -> StorageResult<Vec<StoredBook>> {
        let mut sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(title) = &filter.title {
            sql.push_str(&format!(" AND title LIKE ?{}", args.len() + 1));
            args.push(format!("%{title}%"));
        }
        if let Some(category) = &filter.category {
            sql.push_str(&format!(" AND category LIKE ?{}", args.len() + 1));
            args.push(format!("%{category}%"));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let books = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn list_categories(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM books ORDER BY category")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    // ===== Statistics =====

    fn overview_stats(&self) -> StorageResult<OverviewStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    COUNT(DISTINCT category),
                    COALESCE(AVG(price), 0.0),
                    COALESCE(MIN(price), 0.0),
                    COALESCE(MAX(price), 0.0),
                    COALESCE(SUM(is_in_stock), 0)
             FROM books",
            [],
            |row| {
                Ok(OverviewStats {
                    total_books: row.get::<_, i64>(0)? as u64,
                    total_categories: row.get::<_, i64>(1)? as u64,
                    average_price: row.get(2)?,
                    min_price: row.get(3)?,
                    max_price: row.get(4)?,
                    in_stock: row.get::<_, i64>(5)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    fn category_stats(&self) -> StorageResult<Vec<CategoryStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*), AVG(price), SUM(is_in_stock)
             FROM books GROUP BY category ORDER BY category",
        )?;
        let stats = stmt
            .query_map([], |row| {
                Ok(CategoryStats {
                    category: row.get(0)?,
                    book_count: row.get::<_, i64>(1)? as u64,
                    average_price: row.get(2)?,
                    in_stock: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stats)
    }

    // ===== Users =====

    fn create_user(&mut self, username: &str, password_hash: &str) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, created_at)
             VALUES (?1, ?2, ?3)",
            params![username, password_hash, Utc::now().to_rfc3339()],
        )?;
        Ok(changed == 1)
    }

    fn get_user(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_hash, created_at
                 FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
