use crate::graph::{MaterialId, MeshId};
use aviator_common::NodeId;

/// Errors from scene graph edits.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("node {0} cannot be its own parent")]
    SelfParent(NodeId),
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("node {0} does not carry a mesh")]
    NotAMesh(NodeId),
    #[error("mesh {0:?} not found")]
    MeshNotFound(MeshId),
    #[error("material {0:?} not found")]
    MaterialNotFound(MaterialId),
}
