//! Shared API request/response types
//!
//! Wire types for the performance store HTTP interface, used by the store's
//! handlers and by every console's store client so both sides agree on the
//! contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::{OrderAssignment, Performance, PerformanceStatus};

/// Generic status/error body, returned alongside non-2xx codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn error(msg: impl std::fmt::Display) -> Self {
        Self {
            status: format!("error: {}", msg),
        }
    }
}

/// GET /events/:event_id/performances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceListResponse {
    pub performances: Vec<Performance>,
}

/// PUT /performances/:id/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: PerformanceStatus,
}

/// PUT /events/:event_id/performances/order
///
/// The full new ordering in one request. Partial application of a reorder is
/// worse than none, so the store applies this all-or-nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub performances: Vec<OrderAssignment>,
}

/// Which single advisory field a flag update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagField {
    MusicCue,
    Presence,
}

impl std::fmt::Display for FlagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagField::MusicCue => write!(f, "music_cue"),
            FlagField::Presence => write!(f, "presence"),
        }
    }
}

/// PUT /performances/:id/flag
///
/// `value` is the JSON encoding of the target field: an optional music cue
/// string, or a presence object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagUpdateRequest {
    pub field: FlagField,
    pub value: Value,
}

/// POST /events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
}

/// POST /events/:event_id/performances (registration-side creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerformanceRequest {
    pub title: String,
    pub entry_type: crate::model::EntryType,
    #[serde(default)]
    pub item_number: Option<u32>,
    #[serde(default)]
    pub contestant_name: Option<String>,
    #[serde(default)]
    pub participant_names: Vec<String>,
}

/// Response carrying the id of a created resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub status: String,
    pub id: Uuid,
}
