//! Event (competition session) queries

use crate::error::{Error, Result};
use callboard_common::model::{EventStatus, LiveEvent};
use sqlx::{Pool, Sqlite};
use tracing::debug;
use uuid::Uuid;

fn parse_status(s: &str) -> EventStatus {
    match s {
        "active" => EventStatus::Active,
        "paused" => EventStatus::Paused,
        "completed" => EventStatus::Completed,
        _ => EventStatus::Waiting,
    }
}

/// Insert a new event
pub async fn insert(pool: &Pool<Sqlite>, event: &LiveEvent) -> Result<()> {
    sqlx::query("INSERT INTO events (guid, name, status) VALUES (?, ?, ?)")
        .bind(event.id.to_string())
        .bind(&event.name)
        .bind(event.status.to_string())
        .execute(pool)
        .await?;
    debug!("Created event {} ({})", event.id, event.name);
    Ok(())
}

/// Fetch one event by id
pub async fn get(pool: &Pool<Sqlite>, id: Uuid) -> Result<LiveEvent> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT guid, name, status FROM events WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    let (guid, name, status) = row.ok_or_else(|| Error::NotFound(format!("event {}", id)))?;
    Ok(LiveEvent {
        id: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
        name,
        status: parse_status(&status),
    })
}

/// All events, most recently created last
pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<LiveEvent>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT guid, name, status FROM events ORDER BY rowid ASC")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(guid, name, status)| {
            Ok(LiveEvent {
                id: Uuid::parse_str(&guid).map_err(|e| Error::Internal(e.to_string()))?,
                name,
                status: parse_status(&status),
            })
        })
        .collect()
}

/// Update the control-room lifecycle status of an event
pub async fn update_status(pool: &Pool<Sqlite>, id: Uuid, status: EventStatus) -> Result<()> {
    let updated = sqlx::query("UPDATE events SET status = ? WHERE guid = ?")
        .bind(status.to_string())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("event {}", id)));
    }
    Ok(())
}
