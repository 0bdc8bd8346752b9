//! Server-Sent Events support
//!
//! The store is also the broadcast relay: messages published by consoles are
//! fanned out here to every console subscribed to the same event.

pub mod broadcaster;

pub use broadcaster::SseBroadcaster;
