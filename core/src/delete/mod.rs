//! Dependency-aware deletion over the sketch graph.
//!
//! Removing an entity must never leave a dangling reference: constraints on
//! it are cleared first, a sketch cascades through its owned entities, and a
//! referenced entity refuses to go at all on the single-target path. One
//! refresh fires per top-level command, after all mutation has settled.

use thiserror::Error;
use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::graph::deps::{entity_dependents, is_entity_referenced, sketch_owned_ids};
use crate::graph::SketchGraph;
use crate::session::{HostBridge, Session, Severity};


/// Why a single-target deletion did not happen.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeleteError {
    #[error("entity {0} not found")]
    NotFound(EntityId),

    #[error("Unable to delete {name}, other entities depend on it")]
    ReferencedByOthers { name: String, blockers: Vec<String> },
}

/// Operator-style outcome of a top-level deletion command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    Finished,
    Cancelled,
}

/// Delete one entity by id.
///
/// A sketch cascades: the active-sketch pointer is cleared first if it
/// points at the target, external resources are released, then every entity
/// in the owned closure (including members of nested sketches) goes in
/// reverse discovery order before the sketch itself. A plain
/// entity that anything else still references aborts atomically with a
/// popup naming every blocker. Either way the host refresh fires exactly
/// once.
pub fn delete_entity(
    session: &mut Session,
    host: &mut dyn HostBridge,
    id: EntityId,
) -> DeleteStatus {
    let status = match delete_target(session, host, id) {
        Ok(()) => DeleteStatus::Finished,
        Err(err) => {
            report_cancelled(host, &err);
            DeleteStatus::Cancelled
        }
    };
    host.refresh();
    status
}

fn delete_target(
    session: &mut Session,
    host: &mut dyn HostBridge,
    id: EntityId,
) -> Result<(), DeleteError> {
    let (is_sketch, name) = match session.graph.entities.get(id) {
        Some(entity) => (entity.is_sketch(), entity.name()),
        None => return Err(DeleteError::NotFound(id)),
    };

    if is_sketch {
        // No other code path may observe an active sketch with partially
        // removed contents, so the pointer is cleared before any removal.
        if session.active_sketch() == Some(id) {
            session.activate_sketch(None);
        }
        host.release_sketch_resources(id);

        // The owned closure crosses nested sketches; each container in it
        // releases its external resources before any removal starts.
        let owned = sketch_owned_ids(&session.graph, id);
        for &member in &owned {
            if session.graph.entities.get(member).is_some_and(|e| e.is_sketch()) {
                host.release_sketch_resources(member);
            }
        }
        for member in owned.into_iter().rev() {
            if session.graph.entities.contains(member) {
                remove_one(&mut session.graph, member);
            }
        }
    } else if is_entity_referenced(&session.graph, id) {
        let blockers = entity_dependents(&session.graph, id);
        return Err(DeleteError::ReferencedByOthers { name, blockers });
    }

    remove_one(&mut session.graph, id);
    Ok(())
}

fn report_cancelled(host: &mut dyn HostBridge, err: &DeleteError) {
    match err {
        DeleteError::NotFound(id) => {
            debug!("delete target {} not found, nothing to do", id);
        }
        DeleteError::ReferencedByOthers { name, blockers } => {
            let listing: Vec<String> = blockers.iter().map(|b| format!(" - {b}")).collect();
            let message = format!("{}:\n{}", err, listing.join("\n"));
            host.popup(&message, Severity::Error);
            warn!("Cannot delete {}, other entities depend on it.", name);
        }
    }
}

/// Unconditional removal of one entity: clears its selection flag, strips
/// every constraint referencing it, then drops it from the arena.
///
/// Collections are cleared in reverse registration order and entries at
/// descending local indices; both orders keep positions valid while entries
/// vanish under the scan. Indices are recomputed per collection rather than
/// cached, since a cascade re-enters this routine on the same store.
pub fn remove_one(graph: &mut SketchGraph, id: EntityId) {
    if let Some(entity) = graph.entities.get_mut(id) {
        entity.selected = false;
    }

    for coll in graph.constraints.collections_mut().iter_mut().rev() {
        let indices = coll.indices_referencing(id);
        for &index in indices.iter().rev() {
            if let Some(entry) = coll.remove_at(index) {
                debug!("delete constraint {} [{} #{}]", entry.constraint, coll.name(), index);
            }
        }
    }

    if let Some(entity) = graph.entities.remove(id) {
        debug!("delete entity {}", entity.name());
    }
}

/// Delete the current selection.
///
/// Exactly one selected entity behaves like [`delete_entity`] on it,
/// including the cascade and abort paths. Any other count is best-effort:
/// selected ids are visited in descending order, `is_entity_referenced` is
/// re-checked at visit time (an earlier removal may have freed a later
/// target), and anything still referenced is silently skipped. No cascade
/// here: a selected sketch only goes if nothing references it.
pub fn delete_selection(session: &mut Session, host: &mut dyn HostBridge) -> DeleteStatus {
    let mut selected = session.graph.entities.selected();

    if selected.len() == 1 {
        return delete_entity(session, host, selected[0]);
    }

    selected.sort_unstable_by(|a, b| b.cmp(a));

    // TODO: every visit rescans all collections; batch the reference check
    // if large selections turn out to matter.
    for id in selected {
        if !session.graph.entities.contains(id) {
            continue;
        }
        if is_entity_referenced(&session.graph, id) {
            continue;
        }
        remove_one(&mut session.graph, id);
    }

    host.refresh();
    DeleteStatus::Finished
}
