//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore trait.

use crate::fetcher::PageMetadata;
use crate::state::ScrapeStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::{ArticleRecord, FailedScrape, StatusCounts};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = "id, url, scrape_status, retry_count, title, description, \
                               image_url, last_error, created_at, updated_at";

/// SQLite storage backend
///
/// A single connection guarded by a mutex; every trait method holds the lock
/// for exactly one statement.
pub struct SqliteArticleStore {
    conn: Mutex<Connection>,
}

impl SqliteArticleStore {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteArticleStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database or apply the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }
}

/// Maps a row selected with `ARTICLE_COLUMNS` to an ArticleRecord
fn article_from_row(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
    let status: String = row.get(2)?;
    Ok(ArticleRecord {
        id: uuid_from_column(row, 0)?,
        url: row.get(1)?,
        status: ScrapeStatus::from_db_string(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("unknown scrape status '{}'", status).into(),
            )
        })?,
        retry_count: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        image_url: row.get(6)?,
        last_error: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn uuid_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl ArticleStore for SqliteArticleStore {
    fn create_article(&self, url: &str) -> StorageResult<ArticleRecord> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        self.conn()?.execute(
            "INSERT INTO articles (id, url, scrape_status, retry_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![
                id.to_string(),
                url,
                ScrapeStatus::Pending.to_db_string(),
                now
            ],
        )?;

        Ok(ArticleRecord {
            id,
            url: url.to_string(),
            status: ScrapeStatus::Pending,
            retry_count: 0,
            title: None,
            description: None,
            image_url: None,
            last_error: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn find_by_id(&self, id: Uuid) -> StorageResult<ArticleRecord> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles WHERE id = ?1",
            ARTICLE_COLUMNS
        ))?;

        let article = stmt
            .query_row(params![id.to_string()], article_from_row)
            .optional()?;

        article.ok_or(StorageError::ArticleNotFound(id))
    }

    fn update_metadata(&self, id: Uuid, metadata: &PageMetadata) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn()?.execute(
            "UPDATE articles SET title = ?1, description = ?2, image_url = ?3,
             scrape_status = ?4, last_error = NULL, updated_at = ?5 WHERE id = ?6",
            params![
                metadata.title,
                metadata.description,
                metadata.image_url,
                ScrapeStatus::Success.to_db_string(),
                now,
                id.to_string()
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::ArticleNotFound(id));
        }
        Ok(())
    }

    fn mark_scrape_failed(&self, id: Uuid, cause: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn()?.execute(
            "UPDATE articles SET scrape_status = ?1, retry_count = retry_count + 1,
             last_error = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                ScrapeStatus::Failed.to_db_string(),
                cause,
                now,
                id.to_string()
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::ArticleNotFound(id));
        }
        Ok(())
    }

    fn find_failed_scrapes(&self, max_retries: u32) -> StorageResult<Vec<FailedScrape>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, retry_count FROM articles
             WHERE scrape_status = ?1 AND retry_count < ?2
             ORDER BY updated_at ASC",
        )?;

        let failed = stmt
            .query_map(
                params![ScrapeStatus::Failed.to_db_string(), max_retries],
                |row| {
                    Ok(FailedScrape {
                        id: uuid_from_column(row, 0)?,
                        url: row.get(1)?,
                        retry_count: row.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(failed)
    }

    fn delete_article(&self, id: Uuid) -> StorageResult<()> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM articles WHERE id = ?1", params![id.to_string()])?;

        if deleted == 0 {
            return Err(StorageError::ArticleNotFound(id));
        }
        Ok(())
    }

    fn list_articles(&self, limit: usize) -> StorageResult<Vec<ArticleRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            ARTICLE_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let articles = stmt
            .query_map(params![limit], article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn count_by_status(&self) -> StorageResult<StatusCounts> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT scrape_status, COUNT(*) FROM articles GROUP BY scrape_status")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let (status, count) = row?;
            let status = ScrapeStatus::from_db_string(&status).ok_or_else(|| {
                StorageError::Serialization(format!("unknown scrape status '{}'", status))
            })?;
            counts.add(status, row_count(count)?);
        }

        Ok(counts)
    }
}

/// Converts a SQLite COUNT(*) value into an unsigned count
fn row_count(count: i64) -> StorageResult<u64> {
    u64::try_from(count)
        .map_err(|_| StorageError::Serialization(format!("invalid row count {}", count)))
}
