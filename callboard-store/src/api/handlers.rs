//! HTTP request handlers
//!
//! Implements the store endpoints every console depends on. Consoles are
//! responsible for publishing sync messages after their own confirmed
//! writes; the store only emits messages for mutations that originate at
//! its registration boundary (entry creation, video updates).

use crate::api::server::AppContext;
use crate::db;
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::Sse,
    Json,
};
use callboard_common::api::{
    CreateEventRequest, CreatePerformanceRequest, CreatedResponse, FlagField, FlagUpdateRequest,
    PerformanceListResponse, ReorderRequest, StatusResponse, StatusUpdateRequest,
};
use callboard_common::events::SyncMessage;
use callboard_common::model::{
    EventStatus, LiveEvent, MusicCue, Performance, Presence,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

type HandlerError = (StatusCode, Json<StatusResponse>);

/// Map a store error to an HTTP response
fn error_response(e: Error) -> HandlerError {
    let code = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::IllegalTransition { .. } | Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(StatusResponse::error(e)))
}

// ============================================================================
// Health Endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "performance_store".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Event Endpoints
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    events: Vec<LiveEvent>,
}

/// GET /events - List all events
pub async fn list_events(
    State(ctx): State<AppContext>,
) -> Result<Json<EventListResponse>, HandlerError> {
    let events = db::events::list(&ctx.db_pool)
        .await
        .map_err(error_response)?;
    Ok(Json(EventListResponse { events }))
}

/// POST /events - Create an event
pub async fn create_event(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<CreatedResponse>, HandlerError> {
    let event = LiveEvent {
        id: Uuid::new_v4(),
        name: req.name,
        status: EventStatus::Waiting,
    };
    db::events::insert(&ctx.db_pool, &event)
        .await
        .map_err(error_response)?;

    info!("Created event {} ({})", event.id, event.name);
    Ok(Json(CreatedResponse {
        status: "ok".to_string(),
        id: event.id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EventStatusRequest {
    status: EventStatus,
}

/// PUT /events/:event_id/status - Control-room event lifecycle
pub async fn update_event_status(
    State(ctx): State<AppContext>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<EventStatusRequest>,
) -> Result<StatusCode, HandlerError> {
    db::events::update_status(&ctx.db_pool, event_id, req.status)
        .await
        .map_err(error_response)?;
    info!("Event {} status set to {}", event_id, req.status);
    Ok(StatusCode::OK)
}

// ============================================================================
// Performance Endpoints
// ============================================================================

/// GET /events/:event_id/performances - Full roster in running order
pub async fn list_performances(
    State(ctx): State<AppContext>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<PerformanceListResponse>, HandlerError> {
    // 404 for an unknown event rather than an empty list
    db::events::get(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?;

    let performances = db::performances::list_by_event(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?;
    Ok(Json(PerformanceListResponse { performances }))
}

/// POST /events/:event_id/performances - Registration-side creation
///
/// Emits `entry:created` so connected consoles re-fetch the roster.
pub async fn create_performance(
    State(ctx): State<AppContext>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreatePerformanceRequest>,
) -> Result<Json<CreatedResponse>, HandlerError> {
    db::events::get(&ctx.db_pool, event_id)
        .await
        .map_err(error_response)?;

    let mut perf = Performance::new(event_id, req.title, req.entry_type);
    perf.item_number = req.item_number;
    perf.contestant_name = req.contestant_name;
    perf.participant_names = req.participant_names;

    db::performances::insert(&ctx.db_pool, &perf)
        .await
        .map_err(error_response)?;

    ctx.broadcaster.publish(SyncMessage::EntryCreated {
        event_id,
        timestamp: Utc::now(),
    });

    info!("Registered performance {} for event {}", perf.id, event_id);
    Ok(Json(CreatedResponse {
        status: "ok".to_string(),
        id: perf.id,
    }))
}

/// PUT /performances/:id/status - Persist a status transition
///
/// Rejected transitions never reach the record; the caller's replica is
/// expected to remain untouched on 422.
pub async fn update_performance_status(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<StatusCode, HandlerError> {
    match db::performances::update_status(&ctx.db_pool, id, req.status).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            error!("Status update failed for {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

/// PUT /events/:event_id/performances/order - Persist a full reorder
///
/// All-or-nothing: either the entire new ordering is applied or the stored
/// order is unchanged.
pub async fn reorder_performances(
    State(ctx): State<AppContext>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, HandlerError> {
    match db::performances::reorder(&ctx.db_pool, event_id, &req.performances).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            error!("Reorder failed for event {}: {}", event_id, e);
            Err(error_response(e))
        }
    }
}

/// PUT /performances/:id/flag - Persist a single advisory field
pub async fn update_flag(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<FlagUpdateRequest>,
) -> Result<StatusCode, HandlerError> {
    let result = match req.field {
        FlagField::MusicCue => {
            let cue: Option<MusicCue> = serde_json::from_value(req.value).map_err(|e| {
                error_response(Error::Validation(format!("bad music_cue value: {}", e)))
            })?;
            db::performances::set_music_cue(&ctx.db_pool, id, cue).await
        }
        FlagField::Presence => {
            let presence: Presence = serde_json::from_value(req.value).map_err(|e| {
                error_response(Error::Validation(format!("bad presence value: {}", e)))
            })?;
            db::performances::set_presence(
                &ctx.db_pool,
                id,
                presence.present,
                presence.checked_in_by,
                presence.checked_in_at,
            )
            .await
        }
    };

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            error!("Flag update failed for {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoUpdateRequest {
    video_external_url: Option<String>,
}

/// PUT /performances/:id/video - Upload-side video URL update
///
/// Emits `entry:video_updated` for media consoles.
pub async fn update_video(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<VideoUpdateRequest>,
) -> Result<StatusCode, HandlerError> {
    let perf = db::performances::get(&ctx.db_pool, id)
        .await
        .map_err(error_response)?;

    db::performances::set_video_url(&ctx.db_pool, id, req.video_external_url.clone())
        .await
        .map_err(error_response)?;

    ctx.broadcaster.publish(SyncMessage::EntryVideoUpdated {
        event_id: perf.event_id,
        entry_id: id,
        video_external_url: req.video_external_url,
        timestamp: Utc::now(),
    });

    Ok(StatusCode::OK)
}

// ============================================================================
// Broadcast Relay
// ============================================================================

/// POST /broadcast - Relay a console-published sync message
///
/// Fire-and-forget: the relay succeeds even when nobody is listening.
pub async fn publish_message(
    State(ctx): State<AppContext>,
    Json(msg): Json<SyncMessage>,
) -> Json<StatusResponse> {
    info!(
        "Relaying {} for event {}",
        msg.kind(),
        msg.event_id()
    );
    ctx.broadcaster.publish(msg);
    Json(StatusResponse::ok())
}

/// GET /events/:event_id/stream - SSE stream scoped to one event
pub async fn event_stream(
    State(ctx): State<AppContext>,
    Path(event_id): Path<Uuid>,
) -> Sse<impl futures::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>>
{
    ctx.broadcaster.handle_sse_connection(event_id)
}
