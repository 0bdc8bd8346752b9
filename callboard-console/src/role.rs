//! Console roles and their capabilities
//!
//! Four independently operated consoles work the same event. Capabilities
//! gate which operations a console exposes; the store re-checks the parts
//! with correctness hazards (status machine, reorder validation) regardless.

use serde::{Deserialize, Serialize};

/// Which console this engine instance is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleRole {
    /// Running-order controller: drives the program order and item statuses
    RunOrder,
    /// Announcer: marks items performed, keeps private announcement notes
    Announcer,
    /// Front-of-house registration: checks performers in
    CheckIn,
    /// Media/observer: read-mostly view including virtual entries
    Media,
}

impl std::fmt::Display for ConsoleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleRole::RunOrder => write!(f, "run_order"),
            ConsoleRole::Announcer => write!(f, "announcer"),
            ConsoleRole::CheckIn => write!(f, "check_in"),
            ConsoleRole::Media => write!(f, "media"),
        }
    }
}

impl ConsoleRole {
    /// May drag/step items in the running order
    pub fn can_reorder(&self) -> bool {
        matches!(self, ConsoleRole::RunOrder)
    }

    /// May drive ready/hold/in_progress/completed through the general
    /// status-update operation
    pub fn can_drive_status(&self) -> bool {
        matches!(self, ConsoleRole::RunOrder)
    }

    /// May use the announcer's "mark as performed" affordance
    pub fn can_mark_performed(&self) -> bool {
        matches!(self, ConsoleRole::Announcer)
    }

    /// May check performers in/out
    pub fn can_check_in(&self) -> bool {
        matches!(self, ConsoleRole::CheckIn)
    }

    /// May set the music cue flag
    pub fn can_set_music_cue(&self) -> bool {
        matches!(self, ConsoleRole::RunOrder | ConsoleRole::Announcer)
    }

    /// Whether virtual entries appear in this console's view; floor
    /// operations (running order, check-in) see live entries only
    pub fn includes_virtual_entries(&self) -> bool {
        matches!(self, ConsoleRole::Media | ConsoleRole::Announcer)
    }
}
