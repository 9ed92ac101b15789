//! Shared value types for the aviator workspace.
//!
//! # Invariants
//! - Everything here is plain data: `Copy`, no interior mutability.
//! - Arithmetic helpers are pure functions of their arguments.

pub mod color;
pub mod math;
pub mod types;

pub use color::{Color, palette};
pub use math::{ease_toward, normalize, wrap_angle};
pub use types::{NodeId, Transform};
