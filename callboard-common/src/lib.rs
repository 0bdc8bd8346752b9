//! # Callboard Common Library
//!
//! Shared code for all Callboard consoles and the performance store:
//! - Performance and event data model
//! - Status state machine
//! - Running-order comparator
//! - Sync message types (SyncMessage enum)
//! - Store API request/response types
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod status;

pub use error::{Error, Result};
pub use events::{SyncBus, SyncMessage};
pub use model::{
    EntryType, LiveEvent, MusicCue, OrderAssignment, Performance, PerformanceStatus, Presence,
};
