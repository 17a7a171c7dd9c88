//! Drills and their attachment to component slots.

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::draft::SessionDraft;
use crate::types::{ComponentId, Difficulty, DrillId};

/// A training exercise from the drill catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drill {
    pub id: DrillId,
    pub name: String,
    /// Typical running time in minutes.
    pub duration_minutes: i64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Read-only source of drills.
///
/// Allocations store only [`DrillId`] references; the catalog is consulted
/// at the edges to confirm a drill exists or to render its details.
pub trait DrillCatalog {
    /// Looks up a drill by ID.
    fn drill(&self, id: &DrillId) -> Option<Drill>;
}

/// Appends `drill` to the slot for `id`. Repeats are kept.
///
/// Returns `false` if the component is not in the session.
pub fn attach_drill(allocations: &mut [Allocation], id: &ComponentId, drill: DrillId) -> bool {
    let Some(allocation) = allocations.iter_mut().find(|a| &a.component_id == id) else {
        tracing::debug!(component = %id, "attach ignored: component not in session");
        return false;
    };
    tracing::debug!(component = %id, drill = %drill, "attached drill");
    allocation.drills.push(drill);
    true
}

/// Removes the drill at `drill_index` from the slot for `id`.
///
/// Returns the removed drill, or `None` when the component or index does not exist.
pub fn detach_drill(
    allocations: &mut [Allocation],
    id: &ComponentId,
    drill_index: usize,
) -> Option<DrillId> {
    let allocation = allocations.iter_mut().find(|a| &a.component_id == id)?;
    if drill_index >= allocation.drills.len() {
        tracing::debug!(component = %id, drill_index, "detach ignored: index out of range");
        return None;
    }
    Some(allocation.drills.remove(drill_index))
}

impl SessionDraft {
    /// See [`attach_drill`].
    pub fn attach_drill(&mut self, id: &ComponentId, drill: DrillId) -> bool {
        attach_drill(&mut self.allocations, id, drill)
    }

    /// See [`detach_drill`].
    pub fn detach_drill(&mut self, id: &ComponentId, drill_index: usize) -> Option<DrillId> {
        detach_drill(&mut self.allocations, id, drill_index)
    }
}
