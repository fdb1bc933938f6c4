use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;


/// A stable integer identifier for a sketch entity.
/// Ids are allocated by a monotonic counter owned by the [`EntityCollection`]
/// and are never reused; removing an entity does not shift anyone else's id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed kind discriminator. `Sketch` is the container variant: it owns
/// every entity whose `sketch` back-reference points at it. Curves reference
/// their defining points by id, never by handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Point { pos: [f64; 2] },
    Line { p1: EntityId, p2: EntityId },
    Circle { center: EntityId, radius: f64 },
    Arc { center: EntityId, start: EntityId, end: EntityId },
    Sketch,
}

impl EntityKind {
    pub fn type_label(&self) -> &'static str {
        match self {
            EntityKind::Point { .. } => "Point",
            EntityKind::Line { .. } => "Line",
            EntityKind::Circle { .. } => "Circle",
            EntityKind::Arc { .. } => "Arc",
            EntityKind::Sketch => "Sketch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    #[serde(default)]
    pub selected: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Owning sketch, if this entity lives inside a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch: Option<EntityId>,
}

fn default_visible() -> bool {
    true
}

impl Entity {
    /// Display representation used in user-facing diagnostics, e.g. "Line 4".
    pub fn name(&self) -> String {
        format!("{} {}", self.kind.type_label(), self.id)
    }

    pub fn is_sketch(&self) -> bool {
        matches!(self.kind, EntityKind::Sketch)
    }

    /// Every entity id this entity references: the defining points of its
    /// kind plus the owning sketch. Derived on demand; the graph keeps no
    /// reverse index.
    pub fn dependencies(&self) -> Vec<EntityId> {
        let mut deps = match self.kind {
            EntityKind::Point { .. } | EntityKind::Sketch => Vec::new(),
            EntityKind::Line { p1, p2 } => vec![p1, p2],
            EntityKind::Circle { center, .. } => vec![center],
            EntityKind::Arc { center, start, end } => vec![center, start, end],
        };
        if let Some(owner) = self.sketch {
            deps.push(owner);
        }
        deps
    }
}

/// Ordered arena of entities keyed by stable id. Iteration is ascending by
/// id, which is creation order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCollection {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: EntityKind, sketch: Option<EntityId>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                kind,
                selected: false,
                visible: true,
                sketch,
            },
        );
        id
    }

    pub fn add_point(&mut self, pos: [f64; 2], sketch: Option<EntityId>) -> EntityId {
        self.insert(EntityKind::Point { pos }, sketch)
    }

    pub fn add_line(&mut self, p1: EntityId, p2: EntityId, sketch: Option<EntityId>) -> EntityId {
        self.insert(EntityKind::Line { p1, p2 }, sketch)
    }

    pub fn add_circle(
        &mut self,
        center: EntityId,
        radius: f64,
        sketch: Option<EntityId>,
    ) -> EntityId {
        self.insert(EntityKind::Circle { center, radius }, sketch)
    }

    pub fn add_arc(
        &mut self,
        center: EntityId,
        start: EntityId,
        end: EntityId,
        sketch: Option<EntityId>,
    ) -> EntityId {
        self.insert(EntityKind::Arc { center, start, end }, sketch)
    }

    pub fn add_sketch(&mut self, sketch: Option<EntityId>) -> EntityId {
        self.insert(EntityKind::Sketch, sketch)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Remove an entity by id. Every other entry keeps its id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of all currently selected entities, ascending.
    pub fn selected(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.selected)
            .map(|e| e.id)
            .collect()
    }

    /// Set the selection flag on one entity. Returns false if the id is not
    /// live.
    pub fn set_selected(&mut self, id: EntityId, selected: bool) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        for entity in self.entities.values_mut() {
            entity.selected = false;
        }
    }
}
