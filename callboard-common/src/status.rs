//! Performance status state machine
//!
//! `scheduled -> ready -> in_progress -> completed`, with
//! `in_progress <-> hold` as the pause/resume pair and `cancelled` reachable
//! from any non-terminal state. `completed` and `cancelled` are terminal:
//! no transition out of them is defined here.
//!
//! Both sides of the wire enforce this machine: consoles only offer
//! transition-legal actions, and the store rejects anything else before it
//! reaches the record.

use serde::{Deserialize, Serialize};

/// Per-performance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStatus {
    Scheduled,
    Ready,
    Hold,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PerformanceStatus::Scheduled => write!(f, "scheduled"),
            PerformanceStatus::Ready => write!(f, "ready"),
            PerformanceStatus::Hold => write!(f, "hold"),
            PerformanceStatus::InProgress => write!(f, "in_progress"),
            PerformanceStatus::Completed => write!(f, "completed"),
            PerformanceStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for PerformanceStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(PerformanceStatus::Scheduled),
            "ready" => Ok(PerformanceStatus::Ready),
            "hold" => Ok(PerformanceStatus::Hold),
            "in_progress" => Ok(PerformanceStatus::InProgress),
            "completed" => Ok(PerformanceStatus::Completed),
            "cancelled" => Ok(PerformanceStatus::Cancelled),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown performance status: {}",
                other
            ))),
        }
    }
}

impl PerformanceStatus {
    /// True for states with no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PerformanceStatus::Completed | PerformanceStatus::Cancelled
        )
    }

    /// Whether the transition `self -> next` is legal
    ///
    /// Self-transitions are illegal; a console re-sending the current status
    /// is a bug, not a no-op.
    pub fn can_transition_to(&self, next: PerformanceStatus) -> bool {
        use PerformanceStatus::*;
        match (*self, next) {
            (Scheduled, Ready) => true,
            (Ready, InProgress) => true,
            (InProgress, Completed) => true,
            (InProgress, Hold) => true,
            (Hold, InProgress) => true,
            // cancellation from any non-terminal state
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Legal successor states from the current one, in display order
    ///
    /// Consoles use this to expose only transition-legal affordances.
    pub fn legal_transitions(&self) -> Vec<PerformanceStatus> {
        use PerformanceStatus::*;
        [Scheduled, Ready, Hold, InProgress, Completed, Cancelled]
            .into_iter()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PerformanceStatus::*;

    #[test]
    fn happy_path_is_legal() {
        assert!(Scheduled.can_transition_to(Ready));
        assert!(Ready.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn hold_is_reversible() {
        assert!(InProgress.can_transition_to(Hold));
        assert!(Hold.can_transition_to(InProgress));
        assert!(!Hold.can_transition_to(Completed));
        assert!(!Hold.can_transition_to(Ready));
    }

    #[test]
    fn skipping_states_is_illegal() {
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(!Scheduled.can_transition_to(InProgress));
        assert!(!Ready.can_transition_to(Completed));
    }

    #[test]
    fn cancel_from_any_non_terminal_state() {
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Ready.can_transition_to(Cancelled));
        assert!(Hold.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(Completed.legal_transitions().is_empty());
        assert!(Cancelled.legal_transitions().is_empty());
    }

    #[test]
    fn self_transition_is_illegal() {
        assert!(!Ready.can_transition_to(Ready));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn legal_transitions_match_machine() {
        assert_eq!(Scheduled.legal_transitions(), vec![Ready, Cancelled]);
        assert_eq!(InProgress.legal_transitions(), vec![Hold, Completed, Cancelled]);
        assert_eq!(Hold.legal_transitions(), vec![InProgress, Cancelled]);
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [Scheduled, Ready, Hold, InProgress, Completed, Cancelled] {
            let parsed: super::PerformanceStatus = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        let err = "paused".parse::<super::PerformanceStatus>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
    }
}
