use crate::constraint::ConstraintStore;
use crate::entity::EntityCollection;
use serde::{Deserialize, Serialize};

pub mod deps;


/// The whole mutable sketch graph: the entity arena plus every constraint
/// collection. One instance per session; a command has exclusive access for
/// the duration of a call (the host serializes user commands).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchGraph {
    pub entities: EntityCollection,
    pub constraints: ConstraintStore,
}

impl SketchGraph {
    pub fn new() -> Self {
        Self::default()
    }
}
