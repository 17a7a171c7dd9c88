//! Session duration allocation engine.
//!
//! This crate contains the logic for building a timed training session:
//! - Catalog: the component phases and their default share of the session
//! - Allocation: initial per-component durations and normalization to the total
//! - Editing: manual duration changes, reset to baseline, reordering
//! - Drills: attaching catalog drills to component slots
//! - Plan: assembling the finished draft for storage

mod allocation;
pub mod catalog;
mod draft;
pub mod drills;
pub mod editor;
mod plan;
mod types;

pub use allocation::{Allocation, InitError, MIN_DURATION, initialize, normalize, sum_durations};
pub use catalog::{ComponentCatalog, ComponentDefinition, ComponentLookup};
pub use draft::{Balance, SessionDraft, SessionMeta};
pub use drills::{Drill, DrillCatalog};
pub use plan::{
    AssemblyError, AssemblyPolicy, FinalizeError, PlanSlot, SessionPlan, SessionStore, assemble,
    finalize,
};
pub use types::{ComponentId, Difficulty, DrillId, StoredSessionId, ValidationError, Weight};
