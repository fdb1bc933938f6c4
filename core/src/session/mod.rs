use crate::entity::EntityId;
use crate::graph::SketchGraph;
use serde::{Deserialize, Serialize};

/// Notice severity for the host's popup surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Host collaborators the core treats as opaque: user messaging, the
/// post-mutation refresh signal, and release of resources a sketch owns
/// outside the graph (viewport objects, solver caches).
pub trait HostBridge {
    fn popup(&mut self, message: &str, severity: Severity);

    /// Boundary synchronization point. Fired exactly once at the end of
    /// every top-level deletion command, never interleaved with mutation.
    fn refresh(&mut self);

    /// Invoked once per deleted sketch, before its contents are touched.
    fn release_sketch_resources(&mut self, sketch: EntityId);
}

/// Bridge that ignores every signal, for headless embedding and tests that
/// only care about graph state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBridge;

impl HostBridge for NullBridge {
    fn popup(&mut self, _message: &str, _severity: Severity) {}
    fn refresh(&mut self) {}
    fn release_sketch_resources(&mut self, _sketch: EntityId) {}
}

/// One editing session: the graph plus the active-sketch pointer. The
/// pointer is explicit session state, not a global, and is only ever set to
/// a live sketch entity.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Session {
    pub graph: SketchGraph,
    active_sketch: Option<EntityId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: SketchGraph) -> Self {
        Self {
            graph,
            active_sketch: None,
        }
    }

    pub fn active_sketch(&self) -> Option<EntityId> {
        self.active_sketch
    }

    /// Activate a sketch, or deactivate with `None`. Returns false and
    /// leaves the pointer unchanged if the id is not a live sketch entity.
    pub fn activate_sketch(&mut self, sketch: Option<EntityId>) -> bool {
        match sketch {
            None => {
                self.active_sketch = None;
                true
            }
            Some(id) => match self.graph.entities.get(id) {
                Some(entity) if entity.is_sketch() => {
                    self.active_sketch = Some(id);
                    true
                }
                _ => false,
            },
        }
    }
}
