//! Assembling a finished draft into a session plan for storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocation::Allocation;
use crate::draft::{SessionDraft, SessionMeta};
use crate::types::{ComponentId, DrillId, StoredSessionId};

/// Why a draft could not be assembled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// One or more components have no drills attached.
    #[error("select at least one drill for every component (missing: {})", join_ids(.components))]
    IncompleteSession { components: Vec<ComponentId> },

    /// A component has no time left to run.
    #[error("component {id} has a non-positive duration ({minutes} minutes)")]
    NonPositiveDuration { id: ComponentId, minutes: i64 },
}

fn join_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rules the assembler re-checks before a plan is handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyPolicy {
    /// Every component must carry at least one drill.
    pub require_drills: bool,
}

impl Default for AssemblyPolicy {
    fn default() -> Self {
        Self {
            require_drills: true,
        }
    }
}

/// One finalized component slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSlot {
    pub component_id: ComponentId,
    /// Minutes given to the component.
    pub duration: i64,
    pub drills: Vec<DrillId>,
}

/// The finalized, ordered session ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub slots: Vec<PlanSlot>,
}

impl SessionPlan {
    /// Total minutes across all slots.
    pub fn total_minutes(&self) -> i64 {
        self.slots.iter().map(|s| s.duration).sum()
    }
}

/// Folds allocations into a plan ordered by `order_index`.
///
/// Every slot missing drills is reported at once when the policy requires
/// drills, so the coach can fix them in one pass.
pub fn assemble(
    allocations: &[Allocation],
    policy: AssemblyPolicy,
) -> Result<SessionPlan, AssemblyError> {
    let mut ordered: Vec<&Allocation> = allocations.iter().collect();
    ordered.sort_by_key(|a| a.order_index);

    if policy.require_drills {
        let missing: Vec<ComponentId> = ordered
            .iter()
            .filter(|a| a.drills.is_empty())
            .map(|a| a.component_id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AssemblyError::IncompleteSession {
                components: missing,
            });
        }
    }

    if let Some(bad) = ordered.iter().find(|a| a.duration <= 0) {
        return Err(AssemblyError::NonPositiveDuration {
            id: bad.component_id.clone(),
            minutes: bad.duration,
        });
    }

    let slots = ordered
        .into_iter()
        .map(|a| PlanSlot {
            component_id: a.component_id.clone(),
            duration: a.duration,
            drills: a.drills.clone(),
        })
        .collect();

    Ok(SessionPlan { slots })
}

/// Destination for finalized sessions.
pub trait SessionStore {
    type Error: std::error::Error + 'static;

    /// Persists a plan with its metadata and returns the stored session's ID.
    fn save_session(
        &mut self,
        meta: &SessionMeta,
        total_duration: i64,
        plan: &SessionPlan,
    ) -> Result<StoredSessionId, Self::Error>;
}

/// Failure to finalize a draft.
#[derive(Debug, Error)]
pub enum FinalizeError<E: std::error::Error + 'static> {
    /// The draft failed validation and was not sent to storage.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Storage rejected the plan.
    #[error("failed to save session")]
    Store(#[source] E),
}

/// Assembles `draft` and hands the plan to `store`.
///
/// The draft is consumed; on an assembly error nothing reaches the store.
pub fn finalize<S>(
    draft: SessionDraft,
    policy: AssemblyPolicy,
    store: &mut S,
) -> Result<StoredSessionId, FinalizeError<S::Error>>
where
    S: SessionStore + ?Sized,
{
    let plan = assemble(&draft.allocations, policy)?;
    if !draft.is_settled() {
        tracing::info!(
            allocated = draft.allocated(),
            total_duration = draft.total_duration,
            "saving session with unbalanced allocation"
        );
    }
    let id = store
        .save_session(&draft.meta, draft.total_duration, &plan)
        .map_err(FinalizeError::Store)?;
    tracing::debug!(session_id = %id, slots = plan.slots.len(), "session saved");
    Ok(id)
}
