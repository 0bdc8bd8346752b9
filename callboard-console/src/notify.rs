//! Operator notifications
//!
//! Every failed write produces exactly one human-readable notice naming the
//! action that failed; no failure is swallowed without operator-visible
//! feedback. Notices also carry the "now performing" prompt driven by
//! in_progress status broadcasts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of operator-facing notification this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A reorder write failed; the replica was reverted to a fresh fetch
    ReorderReverted,
    /// A status write failed; the replica was left unchanged
    StatusUpdateFailed,
    /// A presence or music-cue write failed; the replica was left unchanged
    FlagUpdateFailed,
    /// A re-fetch of the roster failed
    RefreshFailed,
    /// An item just went in_progress somewhere
    NowPerforming,
}

/// A single operator-facing notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    /// The performance concerned, when there is one
    pub performance_id: Option<Uuid>,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, performance_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            kind,
            performance_id,
            message: message.into(),
        }
    }
}
