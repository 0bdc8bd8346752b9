//! Reorder protocol tests
//!
//! Covers order density after every successful reorder, item-number
//! immutability across arbitrary move sequences, and the revert-by-refetch
//! behavior when persistence fails (the replica must land on the fresh
//! authoritative order, not the pre-optimistic snapshot).

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use callboard_console::bus::LocalBus;
use callboard_console::notify::NoticeKind;
use callboard_console::reorder::StepDirection;
use callboard_console::{Console, ConsoleRole, Error};
use helpers::{ids_of, orders_of, roster, FakeStore};
use uuid::Uuid;

fn run_order_console(
    event_id: Uuid,
    store: Arc<FakeStore>,
    bus: Arc<LocalBus>,
) -> Console {
    Console::new(ConsoleRole::RunOrder, event_id, "ops", store, bus)
}

#[tokio::test]
async fn reorder_produces_dense_one_to_n() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 5));
    let console = run_order_console(event_id, store.clone(), Arc::new(LocalBus::new(16)));
    console.refresh().await.unwrap();

    let items = console.snapshot().await;
    console.move_performance(items[0].id, 4).await.unwrap();

    // both the replica and the authoritative copy hold a dense 1..5 set
    for list in [console.snapshot().await, store.contents()] {
        let mut orders: Vec<u32> = list.iter().filter_map(|p| p.performance_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }
}

#[tokio::test]
async fn item_numbers_survive_any_number_of_moves() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 4));
    let console = run_order_console(event_id, store.clone(), Arc::new(LocalBus::new(16)));
    console.refresh().await.unwrap();

    let before: Vec<(Uuid, Option<u32>)> = console
        .snapshot()
        .await
        .iter()
        .map(|p| (p.id, p.item_number))
        .collect();

    let items = console.snapshot().await;
    console.move_performance(items[3].id, 0).await.unwrap();
    let items = console.snapshot().await;
    console.move_performance(items[1].id, 3).await.unwrap();
    console
        .step_performance(items[0].id, StepDirection::Down)
        .await
        .unwrap();

    for (id, number) in before {
        let now = console.snapshot().await;
        let item = now.iter().find(|p| p.id == id).unwrap();
        assert_eq!(item.item_number, number, "item_number changed for {}", id);
    }
}

#[tokio::test]
async fn move_applies_splice_semantics() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 3));
    let console = run_order_console(event_id, store.clone(), Arc::new(LocalBus::new(16)));
    console.refresh().await.unwrap();

    // [1,2,3]: move head to the end -> [2,3,1]
    let before = console.snapshot().await;
    console.move_performance(before[0].id, 2).await.unwrap();
    let after = console.snapshot().await;
    assert_eq!(
        ids_of(&after),
        vec![before[1].id, before[2].id, before[0].id]
    );
    assert_eq!(orders_of(&after), vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn failed_persistence_reverts_to_fresh_fetch_not_snapshot() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 3));
    let console = run_order_console(event_id, store.clone(), Arc::new(LocalBus::new(16)));
    console.refresh().await.unwrap();
    let before = console.snapshot().await;
    let (a, b, c) = (before[0].clone(), before[1].clone(), before[2].clone());

    // another console's reorder lands at the store in the interim: [C,A,B]
    store.apply_order_directly(&[
        callboard_common::model::OrderAssignment {
            id: c.id,
            item_number: c.item_number,
            performance_order: 1,
            display_order: 0,
        },
        callboard_common::model::OrderAssignment {
            id: a.id,
            item_number: a.item_number,
            performance_order: 2,
            display_order: 1,
        },
        callboard_common::model::OrderAssignment {
            id: b.id,
            item_number: b.item_number,
            performance_order: 3,
            display_order: 2,
        },
    ]);

    // our own write fails; revert must land on the interim order
    store.fail_next_put_order.store(true, Ordering::SeqCst);
    let mut notices = console.subscribe_notices();
    let result = console.move_performance(a.id, 2).await;
    assert!(matches!(result, Err(Error::Store { .. })));

    let after = console.snapshot().await;
    assert_eq!(ids_of(&after), vec![c.id, a.id, b.id]);

    // and the operator saw a distinct revert notice
    let notice = notices.try_recv().expect("expected a revert notice");
    assert_eq!(notice.kind, NoticeKind::ReorderReverted);
    assert!(notice.message.contains("reverted"));
}

#[tokio::test]
async fn step_at_edge_is_a_quiet_noop() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = run_order_console(event_id, store.clone(), Arc::new(LocalBus::new(16)));
    console.refresh().await.unwrap();

    let items = console.snapshot().await;
    console
        .step_performance(items[0].id, StepDirection::Up)
        .await
        .unwrap();
    // nothing was persisted
    assert_eq!(store.put_order_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_reorder_roles_are_refused() {
    let event_id = Uuid::new_v4();
    let store = Arc::new(FakeStore::new());
    store.seed(roster(event_id, 2));
    let console = Console::new(
        ConsoleRole::CheckIn,
        event_id,
        "front desk",
        store.clone(),
        Arc::new(LocalBus::new(16)),
    );
    console.refresh().await.unwrap();

    let items = console.snapshot().await;
    let result = console.move_performance(items[0].id, 1).await;
    assert!(matches!(result, Err(Error::Forbidden(_))));
    assert_eq!(store.put_order_calls.load(Ordering::SeqCst), 0);
}
