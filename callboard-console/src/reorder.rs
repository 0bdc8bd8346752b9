//! Reorder planning
//!
//! A move gesture becomes an explicit two-phase value: the pre-move order it
//! was computed from, and the proposed dense renumbering. "Revert" is never
//! an inverse-apply of the plan; it is "discard the plan and replace the
//! replica with an authoritative read", because other consoles may have
//! reordered in the interim.
//!
//! Planning always operates on the complete unfiltered list for the event,
//! never a filtered subset.

use crate::error::{Error, Result};
use callboard_common::model::{OrderAssignment, Performance};
use uuid::Uuid;

/// Direction of an explicit up/down step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// A planned reorder: pre-state plus proposed state, not yet persisted
#[derive(Debug, Clone)]
pub struct ReorderPlan {
    /// Item ids in the order the plan was computed from
    pub pre_state: Vec<Uuid>,
    /// The full proposed ordering, dense 1..N
    pub proposed: Vec<OrderAssignment>,
}

fn assignments_from(items: &[&Performance]) -> Vec<OrderAssignment> {
    items
        .iter()
        .enumerate()
        .map(|(idx, p)| OrderAssignment {
            id: p.id,
            item_number: p.item_number, // copied through, never recomputed
            performance_order: (idx + 1) as u32,
            display_order: idx as u32,
        })
        .collect()
}

/// Plan moving `source_id` to `target_index` (0-based) with list-splice
/// semantics: remove the moved item, reinsert at the target index, renumber
/// everything 1..N.
pub fn plan_move(
    items: &[Performance],
    source_id: Uuid,
    target_index: usize,
) -> Result<ReorderPlan> {
    let source_pos = items
        .iter()
        .position(|p| p.id == source_id)
        .ok_or_else(|| Error::NotFound(format!("performance {}", source_id)))?;

    if target_index >= items.len() {
        return Err(Error::InvalidMove(format!(
            "target index {} out of range for {} items",
            target_index,
            items.len()
        )));
    }

    let mut order: Vec<&Performance> = items.iter().collect();
    let moved = order.remove(source_pos);
    order.insert(target_index, moved);

    Ok(ReorderPlan {
        pre_state: items.iter().map(|p| p.id).collect(),
        proposed: assignments_from(&order),
    })
}

/// Plan a single up/down step; `None` when the item is already at the edge
pub fn plan_step(
    items: &[Performance],
    id: Uuid,
    direction: StepDirection,
) -> Result<Option<ReorderPlan>> {
    let pos = items
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| Error::NotFound(format!("performance {}", id)))?;

    let target = match direction {
        StepDirection::Up if pos == 0 => return Ok(None),
        StepDirection::Down if pos + 1 == items.len() => return Ok(None),
        StepDirection::Up => pos - 1,
        StepDirection::Down => pos + 1,
    };

    plan_move(items, id, target).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use callboard_common::model::EntryType;

    fn roster(n: u32) -> Vec<Performance> {
        let event_id = Uuid::new_v4();
        (1..=n)
            .map(|i| {
                let mut p = Performance::new(event_id, format!("item {}", i), EntryType::Live);
                p.item_number = Some(i * 10); // deliberately not 1..N
                p.performance_order = Some(i);
                p
            })
            .collect()
    }

    #[test]
    fn move_renumbers_densely() {
        let items = roster(4);
        let plan = plan_move(&items, items[0].id, 3).unwrap();
        let orders: Vec<u32> = plan.proposed.iter().map(|a| a.performance_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(plan.proposed[3].id, items[0].id);
    }

    #[test]
    fn item_numbers_are_copied_through_unchanged() {
        let items = roster(3);
        let plan = plan_move(&items, items[2].id, 0).unwrap();
        for a in &plan.proposed {
            let original = items.iter().find(|p| p.id == a.id).unwrap();
            assert_eq!(a.item_number, original.item_number);
        }
    }

    #[test]
    fn pre_state_records_the_order_planned_from() {
        let items = roster(3);
        let plan = plan_move(&items, items[1].id, 0).unwrap();
        let original_ids: Vec<Uuid> = items.iter().map(|p| p.id).collect();
        assert_eq!(plan.pre_state, original_ids);
    }

    #[test]
    fn step_at_edge_is_none() {
        let items = roster(2);
        assert!(plan_step(&items, items[0].id, StepDirection::Up)
            .unwrap()
            .is_none());
        assert!(plan_step(&items, items[1].id, StepDirection::Down)
            .unwrap()
            .is_none());
    }

    #[test]
    fn step_down_swaps_neighbours() {
        let items = roster(3);
        let plan = plan_step(&items, items[0].id, StepDirection::Down)
            .unwrap()
            .unwrap();
        assert_eq!(plan.proposed[0].id, items[1].id);
        assert_eq!(plan.proposed[1].id, items[0].id);
        assert_eq!(plan.proposed[2].id, items[2].id);
    }

    #[test]
    fn unknown_source_is_not_found() {
        let items = roster(2);
        assert!(matches!(
            plan_move(&items, Uuid::new_v4(), 0),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn out_of_range_target_is_invalid() {
        let items = roster(2);
        assert!(matches!(
            plan_move(&items, items[0].id, 2),
            Err(Error::InvalidMove(_))
        ));
    }
}
