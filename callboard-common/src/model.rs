//! Performance and event data model
//!
//! A `Performance` is one scheduled program item in a live event. Two order
//! fields coexist and must never be confused:
//!
//! - `item_number`: assigned once when the item is first scheduled, printed
//!   on judging paperwork, never reassigned.
//! - `performance_order`: the item's current position in the live running
//!   sequence, recomputed as a dense 1..N sequence on every reorder.
//!
//! Consoles sort by `performance_order` during live running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

pub use crate::status::PerformanceStatus;

/// Whether an entry performs on the floor or was submitted as video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Live,
    Virtual,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Live => write!(f, "live"),
            EntryType::Virtual => write!(f, "virtual"),
        }
    }
}

/// Advisory cue for when the music should start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicCue {
    Onstage,
    Offstage,
}

impl std::fmt::Display for MusicCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MusicCue::Onstage => write!(f, "onstage"),
            MusicCue::Offstage => write!(f, "offstage"),
        }
    }
}

/// Check-in record set by the registration console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presence {
    pub present: bool,
    pub checked_in_by: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// One scheduled program item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performance {
    /// Stable identifier, created once by the store, never reassigned
    pub id: Uuid,
    /// The event this performance belongs to
    pub event_id: Uuid,
    /// Permanent judge-facing number; immutable after assignment
    pub item_number: Option<u32>,
    /// Current position in the live running sequence (1-based, dense)
    pub performance_order: Option<u32>,
    pub status: PerformanceStatus,
    pub entry_type: EntryType,
    pub music_cue: Option<MusicCue>,
    pub presence: Option<Presence>,
    /// Set locally by the announcer console; advisory only
    #[serde(default)]
    pub announced: bool,
    #[serde(default)]
    pub announcer_notes: Option<String>,
    pub title: String,
    #[serde(default)]
    pub contestant_name: Option<String>,
    #[serde(default)]
    pub participant_names: Vec<String>,
    /// External video URL for virtual entries (media console)
    #[serde(default)]
    pub video_external_url: Option<String>,
}

/// Control-room lifecycle of the containing event, distinct from
/// per-performance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Waiting,
    Active,
    Paused,
    Completed,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Waiting => write!(f, "waiting"),
            EventStatus::Active => write!(f, "active"),
            EventStatus::Paused => write!(f, "paused"),
            EventStatus::Completed => write!(f, "completed"),
        }
    }
}

/// The containing competition session; owns an ordered set of performances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveEvent {
    pub id: Uuid,
    pub name: String,
    pub status: EventStatus,
}

/// Wire unit of a reorder write and of a `performance:reorder` broadcast
///
/// `item_number` is carried through unchanged so receivers can verify it was
/// not mutated; only `performance_order` is authoritative in this message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: Uuid,
    pub item_number: Option<u32>,
    pub performance_order: u32,
    /// 0-based position in the list the sender displayed; informational
    pub display_order: u32,
}

/// Running-order comparator used for every initial sort and after every
/// reorder broadcast, so all consoles render identical order regardless of
/// message arrival order.
///
/// Keys, in priority: `performance_order` ascending (absent sorts last),
/// then `item_number` ascending (absent sorts last), then title,
/// case-insensitive.
pub fn running_order_cmp(a: &Performance, b: &Performance) -> Ordering {
    match (a.performance_order, b.performance_order) {
        (Some(x), Some(y)) if x != y => return x.cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }
    match (a.item_number, b.item_number) {
        (Some(x), Some(y)) if x != y => return x.cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}

impl Performance {
    /// Minimal constructor for a freshly registered item
    pub fn new(event_id: Uuid, title: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            item_number: None,
            performance_order: None,
            status: PerformanceStatus::Scheduled,
            entry_type,
            music_cue: None,
            presence: None,
            announced: false,
            announcer_notes: None,
            title: title.into(),
            contestant_name: None,
            participant_names: Vec::new(),
            video_external_url: None,
        }
    }
}
