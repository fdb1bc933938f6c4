use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests_store;

/// A rule referencing one or more entities by id. Enforcement belongs to an
/// external solver; the graph only tracks membership and the last-solve flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    Coincident { points: [EntityId; 2] },
    Horizontal { line: EntityId },
    Vertical { line: EntityId },
    Midpoint { point: EntityId, line: EntityId },
    Parallel { lines: [EntityId; 2] },
    Perpendicular { lines: [EntityId; 2] },
    Equal { entities: [EntityId; 2] },
    Distance { points: [EntityId; 2], value: f64 },
    Diameter { entity: EntityId, value: f64 },
    Angle { lines: [EntityId; 2], value: f64 },
    Ratio { lines: [EntityId; 2], value: f64 },
}

impl Constraint {
    pub fn type_label(&self) -> &'static str {
        match self {
            Constraint::Coincident { .. } => "Coincident",
            Constraint::Horizontal { .. } => "Horizontal",
            Constraint::Vertical { .. } => "Vertical",
            Constraint::Midpoint { .. } => "Midpoint",
            Constraint::Parallel { .. } => "Parallel",
            Constraint::Perpendicular { .. } => "Perpendicular",
            Constraint::Equal { .. } => "Equal",
            Constraint::Distance { .. } => "Distance",
            Constraint::Diameter { .. } => "Diameter",
            Constraint::Angle { .. } => "Angle",
            Constraint::Ratio { .. } => "Ratio",
        }
    }

    /// The collection this kind is stored in. One collection per kind,
    /// mirroring per-type registration in the host.
    pub(crate) fn collection_name(&self) -> &'static str {
        match self {
            Constraint::Coincident { .. } => "coincident",
            Constraint::Horizontal { .. } => "horizontal",
            Constraint::Vertical { .. } => "vertical",
            Constraint::Midpoint { .. } => "midpoint",
            Constraint::Parallel { .. } => "parallel",
            Constraint::Perpendicular { .. } => "perpendicular",
            Constraint::Equal { .. } => "equal",
            Constraint::Distance { .. } => "distance",
            Constraint::Diameter { .. } => "diameter",
            Constraint::Angle { .. } => "angle",
            Constraint::Ratio { .. } => "ratio",
        }
    }

    /// Every entity id this constraint references.
    pub fn entities(&self) -> Vec<EntityId> {
        match self {
            Constraint::Coincident { points } | Constraint::Distance { points, .. } => {
                points.to_vec()
            }
            Constraint::Horizontal { line } | Constraint::Vertical { line } => vec![*line],
            Constraint::Midpoint { point, line } => vec![*point, *line],
            Constraint::Parallel { lines }
            | Constraint::Perpendicular { lines }
            | Constraint::Angle { lines, .. }
            | Constraint::Ratio { lines, .. } => lines.to_vec(),
            Constraint::Equal { entities } => entities.to_vec(),
            Constraint::Diameter { entity, .. } => vec![*entity],
        }
    }

    pub fn references(&self, id: EntityId) -> bool {
        self.entities().contains(&id)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.entities().iter().map(|id| id.to_string()).collect();
        write!(f, "{} ({})", self.type_label(), ids.join(", "))
    }
}

/// A constraint plus per-entry status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub constraint: Constraint,
    /// Set by the solver when the last solve could not satisfy this entry.
    #[serde(default)]
    pub failed: bool,
}

impl ConstraintEntry {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            failed: false,
        }
    }
}

impl From<Constraint> for ConstraintEntry {
    fn from(constraint: Constraint) -> Self {
        Self::new(constraint)
    }
}

/// One named, ordered constraint collection. An entry's position is its
/// *local index*, distinct from any entity id; removal is by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCollection {
    name: String,
    entries: Vec<ConstraintEntry>,
}

impl ConstraintCollection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ConstraintEntry> {
        self.entries.get(index)
    }

    pub fn push(&mut self, entry: ConstraintEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintEntry> {
        self.entries.iter()
    }

    /// Local indices (ascending) of entries referencing `id`.
    pub fn indices_referencing(&self, id: EntityId) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.constraint.references(id))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn references(&self, id: EntityId) -> bool {
        self.entries.iter().any(|e| e.constraint.references(id))
    }

    /// Remove one entry by local index. Entries above `index` shift down;
    /// callers removing several entries must go high-to-low.
    pub fn remove_at(&mut self, index: usize) -> Option<ConstraintEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }
}

/// Fixed registration order: geometric kinds first, dimensional kinds last.
/// Deletion walks this in reverse, so the later (compound) collections are
/// cleared before the ones holding their constituent parts.
const REGISTRATION_ORDER: [&str; 11] = [
    "coincident",
    "horizontal",
    "vertical",
    "midpoint",
    "parallel",
    "perpendicular",
    "equal",
    "distance",
    "diameter",
    "angle",
    "ratio",
];

/// Every constraint collection of the graph, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintStore {
    collections: Vec<ConstraintCollection>,
}

impl Default for ConstraintStore {
    fn default() -> Self {
        Self {
            collections: REGISTRATION_ORDER
                .iter()
                .map(|name| ConstraintCollection::new(name))
                .collect(),
        }
    }
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a constraint to its kind's collection.
    pub fn add(&mut self, constraint: Constraint) {
        let name = constraint.collection_name();
        let coll = self
            .collections
            .iter_mut()
            .find(|c| c.name == name)
            .unwrap_or_else(|| unreachable!("collection {name} is always registered"));
        coll.push(constraint.into());
    }

    pub fn collections(&self) -> &[ConstraintCollection] {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut [ConstraintCollection] {
        &mut self.collections
    }

    /// Total entry count across all collections.
    pub fn len(&self) -> usize {
        self.collections.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(|c| c.is_empty())
    }

    pub fn references(&self, id: EntityId) -> bool {
        self.collections.iter().any(|c| c.references(id))
    }
}
