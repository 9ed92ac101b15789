//! Scene graph: a tree of transform nodes, some carrying meshes.
//!
//! # Invariants
//! - The parent links form a forest: no node is its own ancestor.
//! - A node appears in exactly one child list, or in the root list, or nowhere (detached).
//! - Mesh positions only change through `Mesh` methods, which bump the revision.

mod camera;
mod error;
mod graph;
mod light;
mod material;
mod mesh;

pub use camera::PerspectiveCamera;
pub use error::SceneError;
pub use graph::{MaterialId, MeshId, Node, NodeKind, SceneGraph};
pub use light::{Fog, Light};
pub use material::Material;
pub use mesh::Mesh;
