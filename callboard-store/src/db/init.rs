//! Database initialization
//!
//! Creates the schema on first run. SQLite, one file (or in-memory for
//! tests); no migration machinery, the tables are created idempotently.

use crate::error::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Open (and create if missing) the store database
pub async fn open_pool(db_url: &str) -> Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Create tables if they do not exist
pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Ensuring store schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'waiting'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS performances (
            guid TEXT PRIMARY KEY,
            event_guid TEXT NOT NULL,
            item_number INTEGER,
            performance_order INTEGER,
            status TEXT NOT NULL DEFAULT 'scheduled',
            entry_type TEXT NOT NULL DEFAULT 'live',
            music_cue TEXT,
            present INTEGER,
            checked_in_by TEXT,
            checked_in_at TEXT,
            title TEXT NOT NULL,
            contestant_name TEXT,
            participant_names TEXT,
            video_external_url TEXT,
            FOREIGN KEY (event_guid) REFERENCES events(guid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_performances_event ON performances(event_guid)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
