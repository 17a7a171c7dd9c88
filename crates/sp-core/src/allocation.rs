//! Session duration allocation.
//!
//! Splits a coach-chosen session length across the selected components.
//!
//! # Algorithm Summary
//!
//! 1. [`initialize`]: each component gets `round(total * weight)` minutes,
//!    raised to [`MIN_DURATION`] when the share is too small.
//! 2. [`normalize`]: durations are rescaled proportionally so their sum
//!    approaches the total, the remaining residual is added to the last slot,
//!    and the result is captured as the baseline for later resets.
//!
//! Rounding is half away from zero throughout. The rescale step is computed
//! in integers so ties are never decided by float error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ComponentLookup;
use crate::types::{ComponentId, DrillId};

/// Smallest duration, in minutes, a component may be given.
pub const MIN_DURATION: i64 = 5;

/// Errors raised while building the first allocation set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The session length was zero or negative.
    #[error("total duration must be positive, got {total} minutes")]
    InvalidTotal { total: i64 },

    /// No components were selected.
    #[error("select at least one component")]
    NoComponents,

    /// A selected component has no catalog entry.
    #[error("unknown component: {id}")]
    UnknownComponent { id: ComponentId },

    /// The same component was selected twice.
    #[error("component selected more than once: {id}")]
    DuplicateComponent { id: ComponentId },
}

/// One selected component within a session draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The component this slot is for.
    pub component_id: ComponentId,

    /// Current duration in minutes.
    pub duration: i64,

    /// Last normalized duration; the target of a reset.
    pub baseline_duration: i64,

    /// Position within the session (0-based, contiguous).
    pub order_index: usize,

    /// Attached drills in insertion order. Duplicates are allowed.
    #[serde(default)]
    pub drills: Vec<DrillId>,
}

/// Builds the initial allocation for `selected` components.
///
/// Durations follow catalog weights and the floor, so their sum generally
/// differs from `total_duration`; pass the result through [`normalize`]
/// before treating it as settled.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "session lengths are small whole minutes"
)]
pub fn initialize<C>(
    total_duration: i64,
    selected: &[ComponentId],
    catalog: &C,
) -> Result<Vec<Allocation>, InitError>
where
    C: ComponentLookup + ?Sized,
{
    if total_duration <= 0 {
        return Err(InitError::InvalidTotal {
            total: total_duration,
        });
    }
    if selected.is_empty() {
        return Err(InitError::NoComponents);
    }

    let mut seen = HashSet::with_capacity(selected.len());
    let mut allocations = Vec::with_capacity(selected.len());

    for (order_index, id) in selected.iter().enumerate() {
        if !seen.insert(id) {
            return Err(InitError::DuplicateComponent { id: id.clone() });
        }
        let definition = catalog
            .lookup(id)
            .ok_or_else(|| InitError::UnknownComponent { id: id.clone() })?;

        let raw = (total_duration as f64 * definition.default_weight.value()).round() as i64;
        let duration = raw.max(MIN_DURATION);

        allocations.push(Allocation {
            component_id: id.clone(),
            duration,
            baseline_duration: duration,
            order_index,
            drills: Vec::new(),
        });
    }

    tracing::debug!(
        total_duration,
        components = allocations.len(),
        initial_sum = sum_durations(&allocations),
        "initialized allocations"
    );

    Ok(allocations)
}

/// Rescales `allocations` so their durations sum to `total_duration`.
///
/// The order of the list is preserved. Any residual left after the
/// proportional rescale is added in full to the last slot (by order index),
/// which may take that slot below [`MIN_DURATION`] when the total is too
/// small for the number of components. Every slot's baseline is then set
/// to its final duration.
pub fn normalize(mut allocations: Vec<Allocation>, total_duration: i64) -> Vec<Allocation> {
    let Some(last) = allocations
        .iter()
        .enumerate()
        .max_by_key(|(_, a)| a.order_index)
        .map(|(i, _)| i)
    else {
        return allocations;
    };

    let current_sum = sum_durations(&allocations);

    if current_sum != total_duration {
        if current_sum > 0 {
            for allocation in &mut allocations {
                let scaled = div_round(
                    i128::from(allocation.duration) * i128::from(total_duration),
                    i128::from(current_sum),
                );
                // Bounded by the total for non-negative durations.
                allocation.duration = i64::try_from(scaled)
                    .unwrap_or(i64::MAX)
                    .max(MIN_DURATION);
            }
        }

        let residual = total_duration - sum_durations(&allocations);
        if residual != 0 {
            let slot = &mut allocations[last];
            slot.duration += residual;
            tracing::debug!(
                component = %slot.component_id,
                residual,
                "absorbed rounding residual in last slot"
            );
            if slot.duration < MIN_DURATION {
                tracing::warn!(
                    component = %slot.component_id,
                    duration = slot.duration,
                    total_duration,
                    "last slot fell below the minimum duration"
                );
            }
        }
    }

    for allocation in &mut allocations {
        allocation.baseline_duration = allocation.duration;
    }

    allocations
}

/// Sum of all durations in minutes.
pub fn sum_durations(allocations: &[Allocation]) -> i64 {
    allocations.iter().map(|a| a.duration).sum()
}

/// Integer division rounding half away from zero. `denominator` must be positive.
///
/// Works in `i128` so `duration * total` cannot overflow for any `i64` inputs.
const fn div_round(numerator: i128, denominator: i128) -> i128 {
    if numerator >= 0 {
        (2 * numerator + denominator) / (2 * denominator)
    } else {
        -((-2 * numerator + denominator) / (2 * denominator))
    }
}
