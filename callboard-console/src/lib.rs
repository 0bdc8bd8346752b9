//! # Callboard Console Engine
//!
//! The per-console synchronization engine: each console (running-order
//! controller, announcer, registration, media) holds a local replica of one
//! event's performances, mutates it through the operations here, and
//! converges with every other console via the performance store plus the
//! broadcast channel.
//!
//! The replica is a disposable cache. All cross-console agreement flows
//! through the store: writes persist first, broadcast only on confirmed
//! success, and a failed reorder is recovered by re-reading the store, never
//! by inverse-applying the local change.

pub mod bus;
pub mod console;
pub mod error;
pub mod notify;
pub mod replica;
pub mod reorder;
pub mod role;
pub mod store;

pub use console::Console;
pub use error::{Error, Result};
pub use replica::LocalReplica;
pub use role::ConsoleRole;
