//! Performance store client
//!
//! The trait is the seam the sync engine is tested through: the real
//! implementation speaks HTTP to callboard-store, tests substitute an
//! in-memory fake that records calls and injects failures.

use crate::error::{Error, Result};
use async_trait::async_trait;
use callboard_common::api::{
    FlagField, FlagUpdateRequest, PerformanceListResponse, ReorderRequest, StatusUpdateRequest,
};
use callboard_common::model::{OrderAssignment, Performance, PerformanceStatus};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Request/response access to the authoritative performance records
#[async_trait]
pub trait PerformanceStore: Send + Sync {
    /// Fetch the full roster for an event
    async fn list(&self, event_id: Uuid) -> Result<Vec<Performance>>;

    /// Persist a status transition
    async fn put_status(&self, id: Uuid, status: PerformanceStatus) -> Result<()>;

    /// Persist a full reorder in one request (all-or-nothing)
    async fn put_order(&self, event_id: Uuid, assignments: &[OrderAssignment]) -> Result<()>;

    /// Persist a single advisory field
    async fn put_flag(&self, id: Uuid, field: FlagField, value: Value) -> Result<()>;
}

/// HTTP client for callboard-store
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Turn a non-2xx response into `Error::Store` with the body's message
    async fn check(resp: reqwest::Response) -> Result<()> {
        if resp.status().is_success() {
            return Ok(());
        }
        let code = resp.status().as_u16();
        let message = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("status").and_then(|s| s.as_str()).map(String::from))
            .unwrap_or_else(|| "no detail".to_string());
        Err(Error::Store { code, message })
    }
}

#[async_trait]
impl PerformanceStore for HttpStore {
    async fn list(&self, event_id: Uuid) -> Result<Vec<Performance>> {
        let url = format!("{}/events/{}/performances", self.base_url, event_id);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Store {
                code: resp.status().as_u16(),
                message: format!("list failed for event {}", event_id),
            });
        }
        let body: PerformanceListResponse = resp.json().await?;
        debug!(
            "Fetched {} performances for event {}",
            body.performances.len(),
            event_id
        );
        Ok(body.performances)
    }

    async fn put_status(&self, id: Uuid, status: PerformanceStatus) -> Result<()> {
        let url = format!("{}/performances/{}/status", self.base_url, id);
        let resp = self
            .client
            .put(&url)
            .json(&StatusUpdateRequest { status })
            .send()
            .await?;
        Self::check(resp).await
    }

    async fn put_order(&self, event_id: Uuid, assignments: &[OrderAssignment]) -> Result<()> {
        let url = format!("{}/events/{}/performances/order", self.base_url, event_id);
        let resp = self
            .client
            .put(&url)
            .json(&ReorderRequest {
                performances: assignments.to_vec(),
            })
            .send()
            .await?;
        Self::check(resp).await
    }

    async fn put_flag(&self, id: Uuid, field: FlagField, value: Value) -> Result<()> {
        let url = format!("{}/performances/{}/flag", self.base_url, id);
        let resp = self
            .client
            .put(&url)
            .json(&FlagUpdateRequest { field, value })
            .send()
            .await?;
        Self::check(resp).await
    }
}
