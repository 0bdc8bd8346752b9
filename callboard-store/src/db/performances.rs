//! Performance queries
//!
//! All writes that the sync protocol depends on live here. The reorder write
//! is a single transaction: partial application of a reorder is worse than
//! none. Status writes re-validate the state machine against the currently
//! stored status, so no console can persist an illegal transition.

use crate::error::{Error, Result};
use callboard_common::model::{
    EntryType, MusicCue, OrderAssignment, Performance, PerformanceStatus, Presence,
};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

type PerformanceRow = (
    String,         // guid
    String,         // event_guid
    Option<i64>,    // item_number
    Option<i64>,    // performance_order
    String,         // status
    String,         // entry_type
    Option<String>, // music_cue
    Option<i64>,    // present
    Option<String>, // checked_in_by
    Option<String>, // checked_in_at
    String,         // title
    Option<String>, // contestant_name
    Option<String>, // participant_names (JSON array)
    Option<String>, // video_external_url
);

const SELECT_COLUMNS: &str = "guid, event_guid, item_number, performance_order, status, \
     entry_type, music_cue, present, checked_in_by, checked_in_at, \
     title, contestant_name, participant_names, video_external_url";

fn row_to_performance(row: PerformanceRow) -> Result<Performance> {
    let status: PerformanceStatus = row
        .4
        .parse()
        .map_err(|_| Error::Internal(format!("bad status in db: {}", row.4)))?;
    let entry_type = match row.5.as_str() {
        "virtual" => EntryType::Virtual,
        _ => EntryType::Live,
    };
    let music_cue = match row.6.as_deref() {
        Some("onstage") => Some(MusicCue::Onstage),
        Some("offstage") => Some(MusicCue::Offstage),
        _ => None,
    };
    let presence = row.7.map(|present| Presence {
        present: present != 0,
        checked_in_by: row.8.clone(),
        checked_in_at: row
            .9
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    });
    let participant_names = row
        .12
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    Ok(Performance {
        id: Uuid::parse_str(&row.0).map_err(|e| Error::Internal(e.to_string()))?,
        event_id: Uuid::parse_str(&row.1).map_err(|e| Error::Internal(e.to_string()))?,
        item_number: row.2.map(|n| n as u32),
        performance_order: row.3.map(|n| n as u32),
        status,
        entry_type,
        music_cue,
        presence,
        announced: false,
        announcer_notes: None,
        title: row.10,
        contestant_name: row.11,
        participant_names,
        video_external_url: row.13,
    })
}

/// All performances for an event, in running order
///
/// Sort matches the console comparator: performance_order ascending with
/// NULL last, then item_number the same way, then title case-insensitive.
pub async fn list_by_event(pool: &Pool<Sqlite>, event_id: Uuid) -> Result<Vec<Performance>> {
    let rows = sqlx::query_as::<_, PerformanceRow>(&format!(
        r#"
        SELECT {}
        FROM performances
        WHERE event_guid = ?
        ORDER BY performance_order IS NULL, performance_order ASC,
                 item_number IS NULL, item_number ASC,
                 LOWER(title) ASC
        "#,
        SELECT_COLUMNS
    ))
    .bind(event_id.to_string())
    .fetch_all(pool)
    .await?;

    debug!("Loaded {} performances for event {}", rows.len(), event_id);
    rows.into_iter().map(row_to_performance).collect()
}

/// Fetch one performance by id
pub async fn get(pool: &Pool<Sqlite>, id: Uuid) -> Result<Performance> {
    let row = sqlx::query_as::<_, PerformanceRow>(&format!(
        "SELECT {} FROM performances WHERE guid = ?",
        SELECT_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("performance {}", id)))?;

    row_to_performance(row)
}

/// Insert a freshly registered performance
///
/// `performance_order` defaults to the end of the current running order, or
/// is derived from `item_number` when the event has no ordered items yet.
pub async fn insert(pool: &Pool<Sqlite>, perf: &Performance) -> Result<()> {
    let order = match perf.performance_order {
        Some(o) => Some(i64::from(o)),
        None => {
            let max: Option<i64> = sqlx::query_scalar(
                "SELECT MAX(performance_order) FROM performances WHERE event_guid = ?",
            )
            .bind(perf.event_id.to_string())
            .fetch_one(pool)
            .await?;
            match (max, perf.item_number) {
                (Some(max), _) => Some(max + 1),
                (None, Some(n)) => Some(i64::from(n)),
                (None, None) => Some(1),
            }
        }
    };

    sqlx::query(
        r#"
        INSERT INTO performances (
            guid, event_guid, item_number, performance_order, status, entry_type,
            music_cue, present, checked_in_by, checked_in_at,
            title, contestant_name, participant_names, video_external_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(perf.id.to_string())
    .bind(perf.event_id.to_string())
    .bind(perf.item_number.map(i64::from))
    .bind(order)
    .bind(perf.status.to_string())
    .bind(perf.entry_type.to_string())
    .bind(perf.music_cue.map(|c| c.to_string()))
    .bind(perf.presence.as_ref().map(|p| p.present as i64))
    .bind(perf.presence.as_ref().and_then(|p| p.checked_in_by.clone()))
    .bind(
        perf.presence
            .as_ref()
            .and_then(|p| p.checked_in_at.map(|t| t.to_rfc3339())),
    )
    .bind(&perf.title)
    .bind(&perf.contestant_name)
    .bind(serde_json::to_string(&perf.participant_names).ok())
    .bind(&perf.video_external_url)
    .execute(pool)
    .await?;

    debug!("Inserted performance {} ({})", perf.id, perf.title);
    Ok(())
}

/// Persist a status transition after validating it against the stored status
pub async fn update_status(
    pool: &Pool<Sqlite>,
    id: Uuid,
    next: PerformanceStatus,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let current: Option<String> =
        sqlx::query_scalar("SELECT status FROM performances WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;

    let current: PerformanceStatus = current
        .ok_or_else(|| Error::NotFound(format!("performance {}", id)))?
        .parse()
        .map_err(|_| Error::Internal("bad status in db".to_string()))?;

    if !current.can_transition_to(next) {
        return Err(Error::IllegalTransition {
            from: current,
            to: next,
        });
    }

    sqlx::query("UPDATE performances SET status = ? WHERE guid = ?")
        .bind(next.to_string())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Performance {} status {} -> {}", id, current, next);
    Ok(())
}

/// Persist a full reorder for an event, all-or-nothing
///
/// Rejects unknown ids, any `item_number` that differs from the stored one
/// (item numbers are never reassigned), any order set that is not a dense
/// 1..N sequence, and any set that does not cover the event's full roster
/// (a partial reorder would leave stale orders colliding with new ones).
/// Only `performance_order` is written.
pub async fn reorder(
    pool: &Pool<Sqlite>,
    event_id: Uuid,
    assignments: &[OrderAssignment],
) -> Result<()> {
    if assignments.is_empty() {
        return Err(Error::Validation("empty reorder".to_string()));
    }

    // Dense 1..N check
    let mut orders: Vec<u32> = assignments.iter().map(|a| a.performance_order).collect();
    orders.sort_unstable();
    let expected: Vec<u32> = (1..=assignments.len() as u32).collect();
    if orders != expected {
        return Err(Error::Validation(format!(
            "performance_order values must form a dense 1..{} sequence",
            assignments.len()
        )));
    }

    let submitted: HashSet<String> = assignments.iter().map(|a| a.id.to_string()).collect();
    if submitted.len() != assignments.len() {
        return Err(Error::Validation(
            "duplicate performance ids in reorder".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    for a in assignments {
        let row: Option<(String, Option<i64>)> = sqlx::query_as(
            "SELECT event_guid, item_number FROM performances WHERE guid = ?",
        )
        .bind(a.id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let (event_guid, stored_number) =
            row.ok_or_else(|| Error::NotFound(format!("performance {}", a.id)))?;

        if event_guid != event_id.to_string() {
            return Err(Error::Validation(format!(
                "performance {} does not belong to event {}",
                a.id, event_id
            )));
        }
        if stored_number.map(|n| n as u32) != a.item_number {
            return Err(Error::Validation(format!(
                "item_number for {} does not match the stored value; item numbers are immutable",
                a.id
            )));
        }

        sqlx::query("UPDATE performances SET performance_order = ? WHERE guid = ?")
            .bind(i64::from(a.performance_order))
            .bind(a.id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    // Event-wide density only holds if every item was renumbered together;
    // an uncovered item would keep a stale order colliding with a new one
    let roster: Vec<String> =
        sqlx::query_scalar("SELECT guid FROM performances WHERE event_guid = ?")
            .bind(event_id.to_string())
            .fetch_all(&mut *tx)
            .await?;
    if let Some(missing) = roster.iter().find(|g| !submitted.contains(g.as_str())) {
        return Err(Error::Validation(format!(
            "reorder must cover the full roster for event {}; performance {} is missing",
            event_id, missing
        )));
    }

    tx.commit().await?;
    info!(
        "Reordered {} performances for event {}",
        assignments.len(),
        event_id
    );
    Ok(())
}

/// Persist a music cue change
pub async fn set_music_cue(pool: &Pool<Sqlite>, id: Uuid, cue: Option<MusicCue>) -> Result<()> {
    let updated = sqlx::query("UPDATE performances SET music_cue = ? WHERE guid = ?")
        .bind(cue.map(|c| c.to_string()))
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("performance {}", id)));
    }
    Ok(())
}

/// Persist a check-in from the registration console
pub async fn set_presence(
    pool: &Pool<Sqlite>,
    id: Uuid,
    present: bool,
    checked_in_by: Option<String>,
    checked_in_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let updated = sqlx::query(
        "UPDATE performances SET present = ?, checked_in_by = ?, checked_in_at = ? WHERE guid = ?",
    )
    .bind(present as i64)
    .bind(checked_in_by)
    .bind(checked_in_at.map(|t| t.to_rfc3339()))
    .bind(id.to_string())
    .execute(pool)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("performance {}", id)));
    }
    Ok(())
}

/// Persist a virtual entry's external video URL
pub async fn set_video_url(pool: &Pool<Sqlite>, id: Uuid, url: Option<String>) -> Result<()> {
    let updated = sqlx::query("UPDATE performances SET video_external_url = ? WHERE guid = ?")
        .bind(url)
        .bind(id.to_string())
        .execute(pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(Error::NotFound(format!("performance {}", id)));
    }
    Ok(())
}
