//! Database schema definitions
//!
//! This module contains the SQL schema for the article database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Submitted articles and their preview metadata
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT,
    description TEXT,
    image_url TEXT,
    scrape_status TEXT NOT NULL DEFAULT 'pending',
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (scrape_status IN ('pending', 'success', 'failed')),
    CHECK (scrape_status != 'failed' OR retry_count >= 1)
);

CREATE INDEX IF NOT EXISTS idx_articles_status ON articles(scrape_status, retry_count);
CREATE INDEX IF NOT EXISTS idx_articles_created ON articles(created_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
