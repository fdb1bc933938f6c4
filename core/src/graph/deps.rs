//! Derived dependency queries over the sketch graph.
//!
//! The relation "X references E" is never stored; it is recomputed by
//! scanning entity attributes and constraint membership on every call, so
//! nested deletions cannot observe a stale cache.

use crate::entity::EntityId;
use crate::graph::SketchGraph;

/// True if any *other* live entity or any constraint references `id`.
pub fn is_entity_referenced(graph: &SketchGraph, id: EntityId) -> bool {
    if graph
        .entities
        .iter()
        .any(|e| e.id != id && e.dependencies().contains(&id))
    {
        return true;
    }
    graph.constraints.references(id)
}

/// Display names of everything referencing `id`: entities ascending by id,
/// then constraints in registration order and local-index order. The order
/// is deterministic, so repeated calls on the same graph yield an identical
/// list.
pub fn entity_dependents(graph: &SketchGraph, id: EntityId) -> Vec<String> {
    let mut names = Vec::new();
    for entity in graph.entities.iter() {
        if entity.id != id && entity.dependencies().contains(&id) {
            names.push(entity.name());
        }
    }
    for coll in graph.constraints.collections() {
        for index in coll.indices_referencing(id) {
            if let Some(entry) = coll.get(index) {
                names.push(entry.constraint.to_string());
            }
        }
    }
    names
}

/// Ids of every entity owned by `sketch`, transitively: direct members plus
/// the members of any nested sketch in the closure. Result is ascending by
/// id (creation order); cascade callers walk it in reverse so dependents
/// inside the container go before the entities they depend on.
pub fn sketch_owned_ids(graph: &SketchGraph, sketch: EntityId) -> Vec<EntityId> {
    let mut owned: Vec<EntityId> = Vec::new();
    let mut containers = vec![sketch];

    while let Some(container) = containers.pop() {
        for entity in graph.entities.iter() {
            if entity.sketch == Some(container) && !owned.contains(&entity.id) {
                owned.push(entity.id);
                if entity.is_sketch() {
                    containers.push(entity.id);
                }
            }
        }
    }

    owned.sort_unstable();
    owned
}
