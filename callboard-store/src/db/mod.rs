//! Database access layer
//!
//! Provides schema creation and queries for events and performances.

pub mod events;
pub mod init;
pub mod performances;
