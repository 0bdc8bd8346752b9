//! HTTP API for the performance store
//!
//! Routing and handlers for the record-keeping endpoints consumed by every
//! console, plus the broadcast relay endpoints.

pub mod handlers;
pub mod server;

pub use server::{create_router, AppContext};
