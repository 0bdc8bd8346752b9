//! Local replica of one event's performances
//!
//! The console's in-memory view of "all performances for the selected
//! event", kept sorted by the shared running-order comparator. It is a
//! best-effort, possibly-stale cache of the store; it is replaced wholesale
//! on every authoritative fetch and patched field-by-field by inbound
//! broadcasts.
//!
//! Broadcast application is idempotent and last-write-wins: applying the
//! same message twice, or an older message after a newer one, leaves the
//! replica consistent (at worst stale until the next authoritative read).
//! A message referencing an id the replica does not hold is a silent no-op,
//! never an error.

use callboard_common::model::{
    running_order_cmp, EntryType, MusicCue, OrderAssignment, Performance, PerformanceStatus,
    Presence,
};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// One console's ordered view of an event's performances
#[derive(Debug, Clone)]
pub struct LocalReplica {
    event_id: Uuid,
    items: Vec<Performance>,
}

impl LocalReplica {
    /// Empty replica for an event, populated by the first fetch
    pub fn new(event_id: Uuid) -> Self {
        Self {
            event_id,
            items: Vec::new(),
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Replace the whole replica with an authoritative fetch result
    ///
    /// Items belonging to other events are dropped; the rest is re-sorted
    /// with the shared comparator.
    pub fn replace_all(&mut self, items: Vec<Performance>) {
        self.items = items
            .into_iter()
            .filter(|p| p.event_id == self.event_id)
            .collect();
        self.items.sort_by(running_order_cmp);
        debug!(
            "Replica for event {} replaced with {} items",
            self.event_id,
            self.items.len()
        );
    }

    /// Current items in running order
    pub fn items(&self) -> &[Performance] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Performance> {
        self.items.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Performance> {
        self.items.iter_mut().find(|p| p.id == id)
    }

    /// Apply a reorder (local optimistic or inbound broadcast)
    ///
    /// Replaces `performance_order` — and only that field — on matching ids,
    /// then re-sorts. Unknown ids are skipped, and `item_number` is never
    /// taken from the assignment set.
    pub fn apply_reorder(&mut self, assignments: &[OrderAssignment]) {
        for a in assignments {
            if let Some(item) = self.get_mut(a.id) {
                item.performance_order = Some(a.performance_order);
            }
        }
        self.items.sort_by(running_order_cmp);
    }

    /// Apply a confirmed status change; unknown id is a silent no-op
    pub fn apply_status(&mut self, id: Uuid, status: PerformanceStatus) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Local-only status mutation for the running-order console's private
    /// completion tracking; bypasses persistence entirely by design
    pub fn set_status_local(&mut self, id: Uuid, status: PerformanceStatus) -> bool {
        self.apply_status(id, status)
    }

    pub fn apply_music_cue(&mut self, id: Uuid, cue: Option<MusicCue>) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.music_cue = cue;
                true
            }
            None => false,
        }
    }

    pub fn apply_presence(&mut self, id: Uuid, presence: Presence) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.presence = Some(presence);
                true
            }
            None => false,
        }
    }

    pub fn apply_video_url(&mut self, id: Uuid, url: Option<String>) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.video_external_url = url;
                true
            }
            None => false,
        }
    }

    /// Record the announcer's advisory bookkeeping; local, not synchronized
    pub fn mark_announced(
        &mut self,
        id: Uuid,
        operator: &str,
        at: DateTime<Utc>,
    ) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.announced = true;
                item.announcer_notes = Some(format!("performed, marked by {} at {}", operator, at.to_rfc3339()));
                true
            }
            None => false,
        }
    }

    /// Read-side projection: items visible to a console that excludes
    /// virtual entries. Pure view over the replica, never synchronized.
    pub fn live_entries(&self) -> Vec<&Performance> {
        self.items
            .iter()
            .filter(|p| p.entry_type == EntryType::Live)
            .collect()
    }

    /// Read-side projection by status and free-text search
    ///
    /// Matches title, contestant name, and participant names,
    /// case-insensitive. Recomputed locally from whatever the replica
    /// currently holds.
    pub fn filtered(
        &self,
        status: Option<PerformanceStatus>,
        query: Option<&str>,
    ) -> Vec<&Performance> {
        let needle = query.map(|q| q.to_lowercase());
        self.items
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| match &needle {
                None => true,
                Some(q) => {
                    p.title.to_lowercase().contains(q)
                        || p.contestant_name
                            .as_deref()
                            .map_or(false, |c| c.to_lowercase().contains(q))
                        || p.participant_names
                            .iter()
                            .any(|n| n.to_lowercase().contains(q))
                }
            })
            .collect()
    }
}
