//! Broadcast application tests
//!
//! Inbound messages must be idempotent, last-write-wins, scoped to the
//! console's event, and silent no-ops for ids the replica does not hold.

mod helpers;

use std::sync::Arc;

use callboard_common::events::SyncMessage;
use callboard_common::model::{OrderAssignment, Performance, PerformanceStatus};
use callboard_console::bus::LocalBus;
use callboard_console::{Console, ConsoleRole};
use chrono::Utc;
use helpers::{ids_of, roster, FakeStore};
use uuid::Uuid;

async fn console_with(event_id: Uuid, store: Arc<FakeStore>) -> Console {
    let console = Console::new(
        ConsoleRole::Media,
        event_id,
        "observer",
        store,
        Arc::new(LocalBus::new(16)),
    );
    console.refresh().await.unwrap();
    console
}

fn reorder_message(event_id: Uuid, items: &[Performance], new_order: &[usize]) -> SyncMessage {
    let performances = new_order
        .iter()
        .enumerate()
        .map(|(idx, &src)| OrderAssignment {
            id: items[src].id,
            item_number: items[src].item_number,
            performance_order: (idx + 1) as u32,
            display_order: idx as u32,
        })
        .collect();
    SyncMessage::PerformanceReorder {
        event_id,
        performances,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn reorder_broadcast_is_idempotent() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 3));
    let console = console_with(event_id, store).await;
    let items = console.snapshot().await;

    let msg = reorder_message(event_id, &items, &[2, 0, 1]);
    console.handle_message(msg.clone()).await;
    let once = ids_of(&console.snapshot().await);
    console.handle_message(msg).await;
    let twice = ids_of(&console.snapshot().await);

    assert_eq!(once, vec![items[2].id, items[0].id, items[1].id]);
    assert_eq!(once, twice);
}

#[tokio::test]
async fn later_reorder_broadcast_wins() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 3));
    let console = console_with(event_id, store).await;
    let items = console.snapshot().await;

    // A and B computed independently; B lands second and must win
    let a = reorder_message(event_id, &items, &[1, 2, 0]);
    let b = reorder_message(event_id, &items, &[2, 0, 1]);
    console.handle_message(a).await;
    console.handle_message(b).await;

    assert_eq!(
        ids_of(&console.snapshot().await),
        vec![items[2].id, items[0].id, items[1].id]
    );
}

#[tokio::test]
async fn reorder_broadcast_never_supplies_item_numbers() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = console_with(event_id, store).await;
    let items = console.snapshot().await;

    // a broadcast with wrong item numbers must not overwrite local ones
    let msg = SyncMessage::PerformanceReorder {
        event_id,
        performances: vec![
            OrderAssignment {
                id: items[1].id,
                item_number: Some(7777),
                performance_order: 1,
                display_order: 0,
            },
            OrderAssignment {
                id: items[0].id,
                item_number: Some(8888),
                performance_order: 2,
                display_order: 1,
            },
        ],
        timestamp: Utc::now(),
    };
    console.handle_message(msg).await;

    let after = console.snapshot().await;
    assert_eq!(after[0].item_number, items[1].item_number);
    assert_eq!(after[1].item_number, items[0].item_number);
}

#[tokio::test]
async fn status_broadcast_for_unknown_id_is_silent_noop() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = console_with(event_id, store).await;
    let before = console.snapshot().await;

    console
        .handle_message(SyncMessage::PerformanceStatusChanged {
            event_id,
            performance_id: Uuid::new_v4(),
            status: PerformanceStatus::Completed,
            timestamp: Utc::now(),
        })
        .await;

    let after = console.snapshot().await;
    assert_eq!(ids_of(&before), ids_of(&after));
    assert!(after.iter().all(|p| p.status == PerformanceStatus::Scheduled));
}

#[tokio::test]
async fn messages_for_other_events_are_dropped_at_the_boundary() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 3));
    let console = console_with(event_id, store).await;
    let items = console.snapshot().await;

    // same performance ids, different event tag
    let foreign = reorder_message(Uuid::new_v4(), &items, &[2, 1, 0]);
    console.handle_message(foreign).await;

    assert_eq!(ids_of(&console.snapshot().await), ids_of(&items));
}

#[tokio::test]
async fn entry_created_triggers_full_refetch() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = console_with(event_id, store.clone()).await;
    assert_eq!(console.snapshot().await.len(), 2);

    // a registration lands directly at the store
    let mut grown = store.contents();
    grown.extend(roster(event_id, 3).into_iter().skip(2));
    store.seed(grown);

    console
        .handle_message(SyncMessage::EntryCreated {
            event_id,
            timestamp: Utc::now(),
        })
        .await;

    assert_eq!(console.snapshot().await.len(), 3);
}

#[tokio::test]
async fn presence_and_cue_broadcasts_patch_single_fields() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = console_with(event_id, store).await;
    let items = console.snapshot().await;

    console
        .handle_message(SyncMessage::PresenceUpdate {
            event_id,
            performance_id: items[0].id,
            present: true,
            checked_in_by: Some("front desk".to_string()),
            checked_in_at: Some(Utc::now()),
        })
        .await;
    console
        .handle_message(SyncMessage::MusicCueChanged {
            event_id,
            performance_id: items[1].id,
            music_cue: Some(callboard_common::model::MusicCue::Offstage),
            timestamp: Utc::now(),
        })
        .await;

    let after = console.snapshot().await;
    assert!(after[0].presence.as_ref().unwrap().present);
    assert_eq!(
        after[1].music_cue,
        Some(callboard_common::model::MusicCue::Offstage)
    );
    // nothing else moved
    assert_eq!(ids_of(&after), ids_of(&items));
}
