//! Developer tooling: read-only inspection of a running `World`.
//!
//! # Invariants
//! - Tools never mutate the world.

pub mod inspector;

pub use inspector::{NodeInfo, SceneInspector, WorldSummary};
