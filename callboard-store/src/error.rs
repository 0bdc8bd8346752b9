//! Error types for callboard-store
//!
//! Module-specific error types using thiserror for clear error propagation.

use callboard_common::model::PerformanceStatus;
use thiserror::Error;

/// Main error type for the store service
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change outside the legal state machine
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: PerformanceStatus,
        to: PerformanceStatus,
    },

    /// Reorder or flag write that fails validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using store Error
pub type Result<T> = std::result::Result<T, Error>;
