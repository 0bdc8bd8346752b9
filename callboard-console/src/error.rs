//! Error types for the console engine
//!
//! The failure taxonomy the sync protocol distinguishes: a store that
//! declined the write, a transport that never delivered it, and a transition
//! the state machine forbids (caught before it reaches the wire). A
//! broadcast naming an unknown performance is deliberately NOT an error;
//! replicas ignore it silently.

use callboard_common::model::PerformanceStatus;
use thiserror::Error;

/// Main error type for the console engine
#[derive(Error, Debug)]
pub enum Error {
    /// The store declined a write (validation failure, not-found)
    #[error("Store rejected the write ({code}): {message}")]
    Store { code: u16, message: String },

    /// The write or fetch could not complete
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Status change outside the legal state machine, caught pre-flight
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: PerformanceStatus,
        to: PerformanceStatus,
    },

    /// A locally initiated action referenced an item the replica lacks
    #[error("Not found: {0}")]
    NotFound(String),

    /// The console's role does not permit this operation
    #[error("Forbidden for role: {0}")]
    Forbidden(String),

    /// Malformed move gesture (bad source or target)
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using console Error
pub type Result<T> = std::result::Result<T, Error>;
