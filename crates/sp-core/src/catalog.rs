//! Component catalog: the single lookup table for session phases.

use serde::{Deserialize, Serialize};

use crate::types::{ComponentId, Weight};

/// A session phase with its default share of the total time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Unique identifier (e.g. "warmup").
    pub id: ComponentId,

    /// Human-readable name shown to the coach.
    pub display_name: String,

    /// Default fraction of the total session time.
    pub default_weight: Weight,
}

impl ComponentDefinition {
    /// Creates a definition, validating the id and weight.
    pub fn new(
        id: &str,
        display_name: impl Into<String>,
        weight: f64,
    ) -> Result<Self, crate::ValidationError> {
        Ok(Self {
            id: ComponentId::new(id)?,
            display_name: display_name.into(),
            default_weight: Weight::new(weight)?,
        })
    }
}

/// A source of component definitions.
///
/// The allocation engine only needs read access, so anything that can
/// answer lookups (the built-in table, a table merged with user-defined
/// components, test fixtures) can drive initialization.
pub trait ComponentLookup {
    /// Returns the definition for `id`, if known.
    fn lookup(&self, id: &ComponentId) -> Option<&ComponentDefinition>;
}

/// Registry of component definitions, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    definitions: Vec<ComponentDefinition>,
}

/// Built-in phases: (id, display name, default weight).
const BUILTIN: &[(&str, &str, f64)] = &[
    ("warmup", "Warm-up", 0.15),
    ("technical", "Technical", 0.20),
    ("passing", "Passing", 0.20),
    ("dribbling", "Dribbling", 0.15),
    ("shooting", "Shooting", 0.20),
    ("possession", "Possession", 0.25),
    ("tactical", "Tactical", 0.25),
    ("set_pieces", "Set Pieces", 0.15),
    ("small_sided", "Small-Sided Games", 0.25),
    ("scrimmage", "Scrimmage", 0.30),
    ("cooldown", "Cool-down", 0.10),
];

impl ComponentCatalog {
    /// Creates an empty catalog.
    pub const fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Creates a catalog holding the standard training phases.
    pub fn builtin() -> Self {
        let definitions = BUILTIN
            .iter()
            .map(|&(id, name, weight)| ComponentDefinition {
                id: ComponentId(id.to_string()),
                display_name: name.to_string(),
                default_weight: Weight(weight),
            })
            .collect();
        Self { definitions }
    }

    /// Inserts a definition, replacing any existing one with the same id in place.
    pub fn register(&mut self, definition: ComponentDefinition) {
        if let Some(existing) = self
            .definitions
            .iter_mut()
            .find(|d| d.id == definition.id)
        {
            tracing::debug!(id = %definition.id, "replacing component definition");
            *existing = definition;
        } else {
            self.definitions.push(definition);
        }
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.iter()
    }

    /// Returns the display name for `id`, falling back to the raw id.
    pub fn display_name<'a>(&'a self, id: &'a ComponentId) -> &'a str {
        self.lookup(id)
            .map_or_else(|| id.as_str(), |d| d.display_name.as_str())
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ComponentLookup for ComponentCatalog {
    fn lookup(&self, id: &ComponentId) -> Option<&ComponentDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }
}
