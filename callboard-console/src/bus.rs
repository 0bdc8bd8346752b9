//! Broadcast channel access
//!
//! Publishing happens only after a confirmed store write; subscription
//! filtering by event id is the console's job (a single guard at dispatch).
//! The channel guarantees at most once per send, no retry, no cross-sender
//! ordering.

use crate::error::{Error, Result};
use async_trait::async_trait;
use callboard_common::events::{SyncBus, SyncMessage};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Publish/subscribe access to the event-scoped broadcast channel
#[async_trait]
pub trait BroadcastBus: Send + Sync {
    /// Publish a message; fire-and-forget on the wire, but a transport
    /// failure to hand the message off is reported
    async fn publish(&self, msg: SyncMessage) -> Result<()>;

    /// Subscribe to all future messages (pre-subscription messages are lost)
    fn subscribe(&self) -> broadcast::Receiver<SyncMessage>;
}

/// In-process bus: consoles sharing one process (and tests) connect through
/// the same underlying channel
#[derive(Clone)]
pub struct LocalBus {
    bus: SyncBus,
}

impl LocalBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: SyncBus::new(capacity),
        }
    }
}

#[async_trait]
impl BroadcastBus for LocalBus {
    async fn publish(&self, msg: SyncMessage) -> Result<()> {
        let reached = self.bus.publish(msg);
        debug!("Published message to {} local subscribers", reached);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.bus.subscribe()
    }
}

/// Networked bus: publishes through the store's relay endpoint and mirrors
/// its SSE stream into a local channel
pub struct HttpBus {
    client: reqwest::Client,
    base_url: String,
    local: SyncBus,
}

impl HttpBus {
    /// Connect to the relay and start mirroring the event's SSE stream
    ///
    /// The reader task runs until the connection drops; there is no
    /// automatic reconnect (a console that loses its stream re-fetches on
    /// next use and may reconnect explicitly).
    pub fn connect(base_url: impl Into<String>, event_id: uuid::Uuid) -> Self {
        let base_url = base_url.into();
        let local = SyncBus::new(100);

        let stream_url = format!("{}/events/{}/stream", base_url, event_id);
        let reader_bus = local.clone();
        let client = reqwest::Client::new();
        let stream_client = client.clone();
        tokio::spawn(async move {
            if let Err(e) = mirror_sse_stream(stream_client, &stream_url, reader_bus).await {
                warn!("SSE stream for {} ended: {}", stream_url, e);
            }
        });

        Self {
            client,
            base_url,
            local,
        }
    }
}

/// Read an SSE stream and forward each `data:` frame as a SyncMessage
async fn mirror_sse_stream(
    client: reqwest::Client,
    url: &str,
    bus: SyncBus,
) -> Result<()> {
    use futures::StreamExt;

    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(Error::Store {
            code: resp.status().as_u16(),
            message: format!("stream connect failed: {}", url),
        });
    }

    let mut buffer = String::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        // SSE frames are newline-delimited; process complete lines only
        while let Some(pos) = buffer.find('\n') {
            let line: String = buffer.drain(..=pos).collect();
            let line = line.trim_end();
            if let Some(data) = line.strip_prefix("data:") {
                match serde_json::from_str::<SyncMessage>(data.trim()) {
                    Ok(msg) => {
                        bus.publish(msg);
                    }
                    Err(e) => {
                        // heartbeats and unknown frames are not ours to fail on
                        debug!("Ignoring non-message SSE data: {}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

#[async_trait]
impl BroadcastBus for HttpBus {
    async fn publish(&self, msg: SyncMessage) -> Result<()> {
        let url = format!("{}/broadcast", self.base_url);
        let resp = self.client.post(&url).json(&msg).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Store {
                code: resp.status().as_u16(),
                message: "broadcast relay rejected the message".to_string(),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.local.subscribe()
    }
}
