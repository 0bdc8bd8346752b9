//! # Callboard Performance Store
//!
//! The single authoritative record keeper for performances, plus the
//! broadcast relay that fans console-published sync messages out to every
//! subscribed console. Consoles treat their local replicas as disposable
//! caches of what this service holds.

pub mod api;
pub mod db;
pub mod error;
pub mod sse;

pub use error::{Error, Result};
