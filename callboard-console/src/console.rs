//! Console session: one role's view of one event
//!
//! Every operation follows the same discipline: user action, optimistic
//! local mutation where the protocol allows it (reorders only), persistence
//! call, and a broadcast only after the store confirmed the write. Status
//! and flag writes are never optimistic; showing a status the store
//! rejected would desynchronize paperwork and audio cues.
//!
//! Within a console, a local user action and an inbound broadcast are each
//! handled as one atomic step with respect to the replica (the replica lock
//! is held for the whole mutation, never across an await).

use std::sync::Arc;

use callboard_common::api::FlagField;
use callboard_common::events::SyncMessage;
use callboard_common::model::{
    MusicCue, Performance, PerformanceStatus, Presence,
};
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bus::BroadcastBus;
use crate::error::{Error, Result};
use crate::notify::{Notice, NoticeKind};
use crate::reorder::{self, ReorderPlan, StepDirection};
use crate::replica::LocalReplica;
use crate::role::ConsoleRole;
use crate::store::PerformanceStore;

/// One console's sync engine instance
pub struct Console {
    role: ConsoleRole,
    event_id: Uuid,
    operator: String,
    replica: RwLock<LocalReplica>,
    store: Arc<dyn PerformanceStore>,
    bus: Arc<dyn BroadcastBus>,
    notices: broadcast::Sender<Notice>,
}

impl Console {
    pub fn new(
        role: ConsoleRole,
        event_id: Uuid,
        operator: impl Into<String>,
        store: Arc<dyn PerformanceStore>,
        bus: Arc<dyn BroadcastBus>,
    ) -> Self {
        let (notices, _) = broadcast::channel(64);
        Self {
            role,
            event_id,
            operator: operator.into(),
            replica: RwLock::new(LocalReplica::new(event_id)),
            store,
            bus,
            notices,
        }
    }

    pub fn role(&self) -> ConsoleRole {
        self.role
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Operator-facing notifications (failed writes, "now performing")
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn notice(&self, kind: NoticeKind, performance_id: Option<Uuid>, message: impl Into<String>) {
        let n = Notice::new(kind, performance_id, message);
        debug!("Notice [{:?}]: {}", n.kind, n.message);
        let _ = self.notices.send(n);
    }

    /// Replace the replica with an authoritative fetch
    pub async fn refresh(&self) -> Result<()> {
        let items = self.store.list(self.event_id).await?;
        self.replica.write().await.replace_all(items);
        Ok(())
    }

    /// Clone of the current replica contents, in running order
    pub async fn snapshot(&self) -> Vec<Performance> {
        self.replica.read().await.items().to_vec()
    }

    /// Items visible to this console's role (floor consoles exclude
    /// virtual entries); a pure projection, recomputed on every call
    pub async fn visible(&self) -> Vec<Performance> {
        let replica = self.replica.read().await;
        if self.role.includes_virtual_entries() {
            replica.items().to_vec()
        } else {
            replica.live_entries().into_iter().cloned().collect()
        }
    }

    /// Current status of one item, if the replica holds it
    pub async fn status_of(&self, id: Uuid) -> Option<PerformanceStatus> {
        self.replica.read().await.get(id).map(|p| p.status)
    }

    // ------------------------------------------------------------------
    // Reorder protocol
    // ------------------------------------------------------------------

    /// Move an item to a target position (0-based) in the full running order
    ///
    /// Optimistic: the replica reflects the move immediately; on a failed
    /// persist the replica is replaced by a fresh authoritative fetch (not
    /// the pre-move snapshot, which may itself be stale by then).
    pub async fn move_performance(&self, source_id: Uuid, target_index: usize) -> Result<()> {
        if !self.role.can_reorder() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        let plan = {
            let replica = self.replica.read().await;
            reorder::plan_move(replica.items(), source_id, target_index)?
        };
        self.commit_reorder(plan).await
    }

    /// Nudge an item one position up or down; no-op at the edges
    pub async fn step_performance(&self, id: Uuid, direction: StepDirection) -> Result<()> {
        if !self.role.can_reorder() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        let plan = {
            let replica = self.replica.read().await;
            reorder::plan_step(replica.items(), id, direction)?
        };
        match plan {
            Some(plan) => self.commit_reorder(plan).await,
            None => Ok(()),
        }
    }

    async fn commit_reorder(&self, plan: ReorderPlan) -> Result<()> {
        // optimistic apply for instant operator feedback
        self.replica.write().await.apply_reorder(&plan.proposed);

        match self.store.put_order(self.event_id, &plan.proposed).await {
            Ok(()) => {
                info!(
                    "Reorder persisted for event {} ({} items)",
                    self.event_id,
                    plan.proposed.len()
                );
                let msg = SyncMessage::PerformanceReorder {
                    event_id: self.event_id,
                    performances: plan.proposed,
                    timestamp: Utc::now(),
                };
                if let Err(e) = self.bus.publish(msg).await {
                    // the write stands; other consoles catch up on refresh
                    warn!("Reorder broadcast failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                // discard the optimistic state wholesale; never inverse-apply
                if let Err(fetch_err) = self.refresh().await {
                    warn!("Revert fetch after failed reorder also failed: {}", fetch_err);
                }
                self.notice(
                    NoticeKind::ReorderReverted,
                    None,
                    "reorder not saved - reverted",
                );
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Status state machine
    // ------------------------------------------------------------------

    /// General status update: persist first, reflect and broadcast only on
    /// confirmed success
    pub async fn set_status(&self, id: Uuid, next: PerformanceStatus) -> Result<()> {
        if !self.role.can_drive_status() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        self.persist_status(id, next).await
    }

    /// The announcer's "mark as performed" affordance: persists completed,
    /// broadcasts it, and records locally who performed the action and when
    /// (advisory bookkeeping, not re-synchronized)
    pub async fn mark_performed(&self, id: Uuid) -> Result<()> {
        if !self.role.can_mark_performed() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        self.persist_status(id, PerformanceStatus::Completed).await?;
        self.replica
            .write()
            .await
            .mark_announced(id, &self.operator, Utc::now());
        Ok(())
    }

    /// The running-order console's private completion tracker: mutates this
    /// replica only. No store write, no broadcast; other consoles are
    /// deliberately left unaware.
    pub async fn mark_complete_local(&self, id: Uuid) -> Result<()> {
        if !matches!(self.role, ConsoleRole::RunOrder) {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        let found = self
            .replica
            .write()
            .await
            .set_status_local(id, PerformanceStatus::Completed);
        if !found {
            return Err(Error::NotFound(format!("performance {}", id)));
        }
        debug!("Locally marked {} complete (not persisted)", id);
        Ok(())
    }

    async fn persist_status(&self, id: Uuid, next: PerformanceStatus) -> Result<()> {
        // pre-flight legality check; illegal transitions never reach the wire
        let current = self
            .status_of(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("performance {}", id)))?;
        if !current.can_transition_to(next) {
            return Err(Error::IllegalTransition {
                from: current,
                to: next,
            });
        }

        match self.store.put_status(id, next).await {
            Ok(()) => {
                self.replica.write().await.apply_status(id, next);
                let msg = SyncMessage::PerformanceStatusChanged {
                    event_id: self.event_id,
                    performance_id: id,
                    status: next,
                    timestamp: Utc::now(),
                };
                if let Err(e) = self.bus.publish(msg).await {
                    warn!("Status broadcast failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                // nothing was speculatively changed; replica stays as-is
                self.notice(NoticeKind::StatusUpdateFailed, Some(id), "status update failed");
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Presence / flag sync
    // ------------------------------------------------------------------

    /// Check a performer in (or out); write-then-reflect, no optimistic write
    pub async fn set_presence(&self, id: Uuid, present: bool) -> Result<()> {
        if !self.role.can_check_in() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        let presence = Presence {
            present,
            checked_in_by: Some(self.operator.clone()),
            checked_in_at: Some(Utc::now()),
        };
        let value = serde_json::to_value(&presence)
            .map_err(|e| Error::Internal(e.to_string()))?;

        match self.store.put_flag(id, FlagField::Presence, value).await {
            Ok(()) => {
                self.replica.write().await.apply_presence(id, presence.clone());
                let msg = SyncMessage::PresenceUpdate {
                    event_id: self.event_id,
                    performance_id: id,
                    present: presence.present,
                    checked_in_by: presence.checked_in_by,
                    checked_in_at: presence.checked_in_at,
                };
                if let Err(e) = self.bus.publish(msg).await {
                    warn!("Presence broadcast failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.notice(NoticeKind::FlagUpdateFailed, Some(id), "failed to update presence");
                Err(e)
            }
        }
    }

    /// Set or clear the music cue; write-then-reflect
    pub async fn set_music_cue(&self, id: Uuid, cue: Option<MusicCue>) -> Result<()> {
        if !self.role.can_set_music_cue() {
            return Err(Error::Forbidden(self.role.to_string()));
        }
        let value = serde_json::to_value(cue).map_err(|e| Error::Internal(e.to_string()))?;

        match self.store.put_flag(id, FlagField::MusicCue, value).await {
            Ok(()) => {
                self.replica.write().await.apply_music_cue(id, cue);
                let msg = SyncMessage::MusicCueChanged {
                    event_id: self.event_id,
                    performance_id: id,
                    music_cue: cue,
                    timestamp: Utc::now(),
                };
                if let Err(e) = self.bus.publish(msg).await {
                    warn!("Music cue broadcast failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.notice(NoticeKind::FlagUpdateFailed, Some(id), "failed to update music cue");
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Inbound broadcast dispatch
    // ------------------------------------------------------------------

    /// Apply one inbound broadcast to the replica
    ///
    /// The event-id guard lives here and nowhere else. Messages for unknown
    /// performance ids are silent no-ops. This never fails the caller:
    /// internal re-fetch failures surface as operator notices.
    pub async fn handle_message(&self, msg: SyncMessage) {
        if msg.event_id() != self.event_id {
            return;
        }

        match msg {
            SyncMessage::PerformanceReorder { performances, .. } => {
                self.replica.write().await.apply_reorder(&performances);
            }
            SyncMessage::PerformanceStatusChanged {
                performance_id,
                status,
                ..
            } => {
                let newly_in_progress = {
                    let mut replica = self.replica.write().await;
                    let prior = replica.get(performance_id).map(|p| p.status);
                    let applied = replica.apply_status(performance_id, status);
                    applied
                        && status == PerformanceStatus::InProgress
                        && prior != Some(PerformanceStatus::InProgress)
                };
                // the trigger other consoles use for a "now performing" prompt;
                // own writes loop back already applied, so they don't re-fire
                if newly_in_progress {
                    self.notice(
                        NoticeKind::NowPerforming,
                        Some(performance_id),
                        "now performing",
                    );
                }
            }
            SyncMessage::MusicCueChanged {
                performance_id,
                music_cue,
                ..
            } => {
                self.replica.write().await.apply_music_cue(performance_id, music_cue);
            }
            SyncMessage::PresenceUpdate {
                performance_id,
                present,
                checked_in_by,
                checked_in_at,
                ..
            } => {
                self.replica.write().await.apply_presence(
                    performance_id,
                    Presence {
                        present,
                        checked_in_by,
                        checked_in_at,
                    },
                );
            }
            SyncMessage::EntryVideoUpdated {
                entry_id,
                video_external_url,
                ..
            } => {
                self.replica
                    .write()
                    .await
                    .apply_video_url(entry_id, video_external_url);
            }
            SyncMessage::EntryCreated { .. } | SyncMessage::EntryUpdated { .. } => {
                if let Err(e) = self.refresh().await {
                    warn!("Roster re-fetch after entry change failed: {}", e);
                    self.notice(NoticeKind::RefreshFailed, None, "failed to refresh roster");
                }
            }
        }
    }

    /// Drive the console from its bus subscription until the channel closes
    ///
    /// A lagged subscription re-fetches the roster; the replica is a
    /// disposable cache and a fresh read is always a legal replacement.
    pub async fn run(&self) {
        let mut rx = self.bus.subscribe();
        loop {
            match rx.recv().await {
                Ok(msg) => self.handle_message(msg).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Broadcast subscription lagged by {} messages; re-fetching", skipped);
                    if let Err(e) = self.refresh().await {
                        warn!("Re-fetch after lag failed: {}", e);
                        self.notice(NoticeKind::RefreshFailed, None, "failed to refresh roster");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!("Broadcast channel closed; console {} stopping", self.role);
    }
}
