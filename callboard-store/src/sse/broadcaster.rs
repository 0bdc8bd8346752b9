//! SSE broadcaster for real-time console updates
//!
//! Fan-out is event-scoped: each SSE connection names the event it is
//! viewing, and the subscription filter drops every message tagged with a
//! different event id before it reaches the wire. Delivery is at most once
//! per send; there is no retry or redelivery, and slow subscribers lag
//! rather than block publishers.

use axum::response::sse::{Event, KeepAlive, Sse};
use callboard_common::events::{SyncBus, SyncMessage};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// SSE broadcaster manages console connections and message distribution
#[derive(Clone)]
pub struct SseBroadcaster {
    bus: SyncBus,
}

impl SseBroadcaster {
    /// Create a new broadcaster
    ///
    /// `capacity` is the per-subscriber buffer; 100 is plenty for the
    /// message rates a live program produces.
    pub fn new(capacity: usize) -> Self {
        info!("SSE broadcaster initialized with capacity {}", capacity);
        Self {
            bus: SyncBus::new(capacity),
        }
    }

    /// Relay a message to all connected consoles (fire-and-forget)
    pub fn publish(&self, msg: SyncMessage) {
        let reached = self.bus.publish(msg);
        debug!("Relayed message to {} subscribers", reached);
    }

    /// Current number of connected consoles
    pub fn client_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Create an SSE stream delivering only messages for `event_id`
    pub fn subscribe_stream(
        &self,
        event_id: Uuid,
    ) -> impl Stream<Item = Result<Event, Infallible>> {
        let rx = self.bus.subscribe();
        let stream = BroadcastStream::new(rx);

        stream.filter_map(move |result| async move {
            match result {
                Ok(msg) if msg.event_id() == event_id => Event::default()
                    .event(msg.kind())
                    .json_data(&msg)
                    .ok()
                    .map(Ok),
                Ok(_) => None, // different event, dropped at the boundary
                Err(e) => {
                    warn!("SSE subscriber lagged: {:?}", e);
                    None
                }
            }
        })
    }

    /// Axum SSE response for GET /events/:event_id/stream
    pub fn handle_sse_connection(
        &self,
        event_id: Uuid,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        info!(
            "New SSE console connected for event {}, total clients: {}",
            event_id,
            self.client_count() + 1
        );

        Sse::new(self.subscribe_stream(event_id)).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("heartbeat"),
        )
    }
}
