//! Shared test helpers: an in-memory performance store that records calls
//! and injects failures, plus roster builders.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use callboard_common::api::FlagField;
use callboard_common::model::{
    running_order_cmp, EntryType, MusicCue, OrderAssignment, Performance, PerformanceStatus,
    Presence,
};
use callboard_console::error::{Error, Result};
use callboard_console::store::PerformanceStore;
use serde_json::Value;
use uuid::Uuid;

/// In-memory stand-in for the performance store
///
/// Behaves like the real one (status machine validation, dense-order
/// validation, last-write-wins reorders) and additionally counts every write
/// so tests can assert on the *absence* of calls.
#[derive(Default)]
pub struct FakeStore {
    items: Mutex<Vec<Performance>>,
    pub fail_next_put_order: AtomicBool,
    pub fail_next_put_status: AtomicBool,
    pub fail_next_put_flag: AtomicBool,
    pub list_calls: AtomicUsize,
    pub put_order_calls: AtomicUsize,
    pub put_status_calls: AtomicUsize,
    pub put_flag_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, items: Vec<Performance>) {
        *self.items.lock().unwrap() = items;
    }

    /// Authoritative contents, in running order
    pub fn contents(&self) -> Vec<Performance> {
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by(running_order_cmp);
        items
    }

    /// Apply a reorder directly, simulating another console's confirmed write
    pub fn apply_order_directly(&self, assignments: &[OrderAssignment]) {
        let mut items = self.items.lock().unwrap();
        for a in assignments {
            if let Some(item) = items.iter_mut().find(|p| p.id == a.id) {
                item.performance_order = Some(a.performance_order);
            }
        }
    }

    fn rejected(code: u16, message: &str) -> Error {
        Error::Store {
            code,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PerformanceStore for FakeStore {
    async fn list(&self, event_id: Uuid) -> Result<Vec<Performance>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .contents()
            .into_iter()
            .filter(|p| p.event_id == event_id)
            .collect())
    }

    async fn put_status(&self, id: Uuid, status: PerformanceStatus) -> Result<()> {
        self.put_status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_put_status.swap(false, Ordering::SeqCst) {
            return Err(Self::rejected(500, "injected status failure"));
        }
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::rejected(404, "not found"))?;
        if !item.status.can_transition_to(status) {
            return Err(Self::rejected(422, "illegal transition"));
        }
        item.status = status;
        Ok(())
    }

    async fn put_order(&self, event_id: Uuid, assignments: &[OrderAssignment]) -> Result<()> {
        self.put_order_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_put_order.swap(false, Ordering::SeqCst) {
            return Err(Self::rejected(500, "injected reorder failure"));
        }
        let mut orders: Vec<u32> = assignments.iter().map(|a| a.performance_order).collect();
        orders.sort_unstable();
        let expected: Vec<u32> = (1..=assignments.len() as u32).collect();
        if orders != expected {
            return Err(Self::rejected(422, "order set not dense"));
        }
        let mut items = self.items.lock().unwrap();
        let uncovered = items
            .iter()
            .filter(|p| p.event_id == event_id)
            .any(|p| !assignments.iter().any(|a| a.id == p.id));
        if uncovered {
            return Err(Self::rejected(422, "reorder does not cover the full roster"));
        }
        for a in assignments {
            let item = items
                .iter_mut()
                .find(|p| p.id == a.id)
                .ok_or_else(|| Self::rejected(404, "not found"))?;
            if item.item_number != a.item_number {
                return Err(Self::rejected(422, "item_number mismatch"));
            }
            item.performance_order = Some(a.performance_order);
        }
        Ok(())
    }

    async fn put_flag(&self, id: Uuid, field: FlagField, value: Value) -> Result<()> {
        self.put_flag_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_put_flag.swap(false, Ordering::SeqCst) {
            return Err(Self::rejected(500, "injected flag failure"));
        }
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::rejected(404, "not found"))?;
        match field {
            FlagField::MusicCue => {
                let cue: Option<MusicCue> = serde_json::from_value(value)
                    .map_err(|_| Self::rejected(422, "bad music_cue"))?;
                item.music_cue = cue;
            }
            FlagField::Presence => {
                let presence: Presence = serde_json::from_value(value)
                    .map_err(|_| Self::rejected(422, "bad presence"))?;
                item.presence = Some(presence);
            }
        }
        Ok(())
    }
}

/// Build a roster of `n` live performances with item numbers `10, 20, ...`
/// and performance orders `1..=n`
pub fn roster(event_id: Uuid, n: u32) -> Vec<Performance> {
    (1..=n)
        .map(|i| {
            let mut p = Performance::new(event_id, format!("item {}", i), EntryType::Live);
            p.item_number = Some(i * 10);
            p.performance_order = Some(i);
            p
        })
        .collect()
}

/// The dense order values currently held by a list, sorted position-first
pub fn orders_of(items: &[Performance]) -> Vec<Option<u32>> {
    items.iter().map(|p| p.performance_order).collect()
}

/// Ids in current running order
pub fn ids_of(items: &[Performance]) -> Vec<Uuid> {
    items.iter().map(|p| p.id).collect()
}
