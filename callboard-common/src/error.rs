//! Common error types for Callboard

use thiserror::Error;

/// Common result type for Callboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared across Callboard services
///
/// Only the failures the shared code itself produces live here; the store
/// and the console each carry their own richer error enums.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
