//! The editable session draft.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, InitError, initialize, normalize, sum_durations};
use crate::catalog::ComponentLookup;
use crate::types::ComponentId;

/// Session details carried alongside the allocations but not used by them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Session name chosen by the coach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Planned date of the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// A session being built: the chosen length and one allocation per component.
///
/// The draft is owned by a single editing workflow. It is settled when the
/// allocated minutes equal `total_duration`; manual edits may leave it
/// unsettled until the coach resets or renormalizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    /// Coach-chosen session length in minutes.
    pub total_duration: i64,

    /// Allocations ordered by `order_index`.
    pub allocations: Vec<Allocation>,

    #[serde(default)]
    pub meta: SessionMeta,
}

/// Difference between allocated minutes and the session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    /// Minutes still unallocated.
    Under(i64),
    Exact,
    /// Minutes allocated beyond the session length.
    Over(i64),
}

impl Balance {
    /// Computes the balance of `allocated` against `total`.
    pub const fn of(allocated: i64, total: i64) -> Self {
        let diff = allocated - total;
        if diff > 0 {
            Self::Over(diff)
        } else if diff < 0 {
            Self::Under(-diff)
        } else {
            Self::Exact
        }
    }

    /// Signed difference; positive when over.
    pub const fn signed_minutes(self) -> i64 {
        match self {
            Self::Under(m) => -m,
            Self::Exact => 0,
            Self::Over(m) => m,
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under(m) => write!(f, "{m} {} remaining", minutes_word(*m)),
            Self::Exact => write!(f, "balanced"),
            Self::Over(m) => write!(f, "{m} {} over", minutes_word(*m)),
        }
    }
}

const fn minutes_word(m: i64) -> &'static str {
    if m == 1 { "minute" } else { "minutes" }
}

impl SessionDraft {
    /// Creates a settled draft for the selected components.
    ///
    /// Runs [`initialize`] followed by [`normalize`], so the allocated time
    /// equals `total_duration` (see [`normalize`] for the small-total case).
    pub fn new<C>(
        total_duration: i64,
        selected: &[ComponentId],
        catalog: &C,
    ) -> Result<Self, InitError>
    where
        C: ComponentLookup + ?Sized,
    {
        let allocations = normalize(initialize(total_duration, selected, catalog)?, total_duration);
        Ok(Self {
            total_duration,
            allocations,
            meta: SessionMeta::default(),
        })
    }

    /// Attaches session metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: SessionMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Minutes currently allocated across all components.
    pub fn allocated(&self) -> i64 {
        sum_durations(&self.allocations)
    }

    pub fn balance(&self) -> Balance {
        Balance::of(self.allocated(), self.total_duration)
    }

    /// Whether allocated time matches the session length exactly.
    pub fn is_settled(&self) -> bool {
        self.balance() == Balance::Exact
    }

    /// Returns the allocation for `id`, if selected.
    pub fn allocation(&self, id: &ComponentId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| &a.component_id == id)
    }

    /// Accepts the current durations as the new starting point.
    ///
    /// Rescales the edited durations back to `total_duration` and captures
    /// the result as the reset baseline.
    pub fn renormalize(&mut self) {
        let allocations = std::mem::take(&mut self.allocations);
        self.allocations = normalize(allocations, self.total_duration);
    }
}
