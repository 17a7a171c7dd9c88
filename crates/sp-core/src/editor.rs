//! Interactive edits on a live allocation list.
//!
//! None of these operations renormalize: a manual duration change is
//! allowed to leave the session over or under its length so the coach sees
//! the imbalance and resolves it. Requests that don't apply (unknown
//! component, index at a boundary) are no-ops reported through the `bool`
//! return value rather than errors.

use crate::allocation::{Allocation, MIN_DURATION};
use crate::draft::SessionDraft;
use crate::types::ComponentId;

/// Sets the duration of `id`, raising it to [`MIN_DURATION`] if needed.
///
/// Returns whether the duration changed.
pub fn adjust_duration(allocations: &mut [Allocation], id: &ComponentId, minutes: i64) -> bool {
    let Some(allocation) = allocations.iter_mut().find(|a| &a.component_id == id) else {
        tracing::debug!(component = %id, "adjust ignored: component not in session");
        return false;
    };

    let duration = minutes.max(MIN_DURATION);
    if allocation.duration == duration {
        return false;
    }

    tracing::debug!(
        component = %id,
        from = allocation.duration,
        to = duration,
        "adjusted duration"
    );
    allocation.duration = duration;
    true
}

/// Restores every duration to its baseline. Idempotent.
pub fn reset_to_baseline(allocations: &mut [Allocation]) -> bool {
    let mut changed = false;
    for allocation in allocations {
        if allocation.duration != allocation.baseline_duration {
            allocation.duration = allocation.baseline_duration;
            changed = true;
        }
    }
    changed
}

/// Swaps the slot at `index` with the one before it.
pub fn move_up(allocations: &mut [Allocation], index: usize) -> bool {
    if index == 0 || index >= allocations.len() {
        return false;
    }
    swap_slots(allocations, index - 1, index);
    true
}

/// Swaps the slot at `index` with the one after it.
pub fn move_down(allocations: &mut [Allocation], index: usize) -> bool {
    if index >= allocations.len().saturating_sub(1) {
        return false;
    }
    swap_slots(allocations, index, index + 1);
    true
}

/// Swaps two slots; each keeps its durations and drills, only position moves.
fn swap_slots(allocations: &mut [Allocation], a: usize, b: usize) {
    allocations.swap(a, b);
    allocations[a].order_index = a;
    allocations[b].order_index = b;
}

impl SessionDraft {
    /// See [`adjust_duration`].
    pub fn adjust_duration(&mut self, id: &ComponentId, minutes: i64) -> bool {
        adjust_duration(&mut self.allocations, id, minutes)
    }

    /// See [`reset_to_baseline`].
    pub fn reset_to_baseline(&mut self) -> bool {
        reset_to_baseline(&mut self.allocations)
    }

    /// See [`move_up`].
    pub fn move_up(&mut self, index: usize) -> bool {
        move_up(&mut self.allocations, index)
    }

    /// See [`move_down`].
    pub fn move_down(&mut self, index: usize) -> bool {
        move_down(&mut self.allocations, index)
    }
}
