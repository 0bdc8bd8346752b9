//! Sync message types for the Callboard broadcast channel
//!
//! Every message carries the `event_id` of the event it concerns; consoles
//! viewing a different event drop it at the dispatch boundary. The channel
//! is at-most-once with no retry and no cross-sender ordering, so every
//! message is designed to be safe to apply twice or out of order
//! (last-write-wins per field).
//!
//! There is deliberately no sequence or version number on these messages: a
//! receiver cannot tell "older than what I applied" from "newer". Stale
//! application self-heals on the next authoritative read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::{MusicCue, OrderAssignment, PerformanceStatus};

/// Callboard sync message types
///
/// Shared by every console and the store's broadcast relay. Messages are
/// serialized for SSE transmission with the variant name as the `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    /// Full new running order for an event, published by the console whose
    /// reorder write was confirmed by the store
    ///
    /// Receivers replace `performance_order` (and only that field) on
    /// matching ids and re-sort. Unknown ids are skipped; `item_number` is
    /// never taken from this message.
    #[serde(rename = "performance:reorder")]
    PerformanceReorder {
        event_id: Uuid,
        performances: Vec<OrderAssignment>,
        timestamp: DateTime<Utc>,
    },

    /// A performance's status changed and the store confirmed the write
    ///
    /// `in_progress` is the trigger other consoles use to surface a
    /// "now performing" prompt.
    #[serde(rename = "performance:status")]
    PerformanceStatusChanged {
        event_id: Uuid,
        performance_id: Uuid,
        status: PerformanceStatus,
        timestamp: DateTime<Utc>,
    },

    /// Music cue flag changed (advisory, when audio should start)
    #[serde(rename = "performance:music_cue")]
    MusicCueChanged {
        event_id: Uuid,
        performance_id: Uuid,
        music_cue: Option<MusicCue>,
        timestamp: DateTime<Utc>,
    },

    /// Performer checked in (or un-checked) at the registration console
    #[serde(rename = "presence:update")]
    PresenceUpdate {
        event_id: Uuid,
        performance_id: Uuid,
        present: bool,
        checked_in_by: Option<String>,
        checked_in_at: Option<DateTime<Utc>>,
    },

    /// A virtual entry's video URL changed (media console concern)
    #[serde(rename = "entry:video_updated")]
    EntryVideoUpdated {
        event_id: Uuid,
        entry_id: Uuid,
        video_external_url: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A new entry was registered externally; receivers re-fetch the full list
    #[serde(rename = "entry:created")]
    EntryCreated {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// An entry's registration data changed; receivers re-fetch the full list
    #[serde(rename = "entry:updated")]
    EntryUpdated {
        event_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl SyncMessage {
    /// The event this message is scoped to
    ///
    /// The single dispatch guard: subscribers viewing a different event id
    /// ignore the message entirely.
    pub fn event_id(&self) -> Uuid {
        match self {
            SyncMessage::PerformanceReorder { event_id, .. }
            | SyncMessage::PerformanceStatusChanged { event_id, .. }
            | SyncMessage::MusicCueChanged { event_id, .. }
            | SyncMessage::PresenceUpdate { event_id, .. }
            | SyncMessage::EntryVideoUpdated { event_id, .. }
            | SyncMessage::EntryCreated { event_id, .. }
            | SyncMessage::EntryUpdated { event_id, .. } => *event_id,
        }
    }

    /// Wire name of the message kind (the serde `type` tag)
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::PerformanceReorder { .. } => "performance:reorder",
            SyncMessage::PerformanceStatusChanged { .. } => "performance:status",
            SyncMessage::MusicCueChanged { .. } => "performance:music_cue",
            SyncMessage::PresenceUpdate { .. } => "presence:update",
            SyncMessage::EntryVideoUpdated { .. } => "entry:video_updated",
            SyncMessage::EntryCreated { .. } => "entry:created",
            SyncMessage::EntryUpdated { .. } => "entry:updated",
        }
    }
}

/// In-process distribution bus for sync messages
///
/// Wraps tokio::broadcast: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop. Used by the store's
/// SSE fan-out and by in-process console pairs in tests. No delivery
/// guarantee beyond at-most-once per send; slow subscribers lag and lose
/// messages rather than blocking producers.
#[derive(Clone)]
pub struct SyncBus {
    tx: broadcast::Sender<SyncMessage>,
}

impl SyncBus {
    /// Create a bus buffering up to `capacity` messages per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future messages
    ///
    /// Messages published before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.tx.subscribe()
    }

    /// Publish a message to all current subscribers
    ///
    /// Returns the number of subscribers it reached; zero subscribers is not
    /// an error (fire-and-forget).
    pub fn publish(&self, msg: SyncMessage) -> usize {
        self.tx.send(msg).unwrap_or(0)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
