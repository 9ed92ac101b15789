//! Input: window-space events mapped to a shared action vocabulary.
//!
//! # Invariants
//! - The kernel consumes `Action`s, never raw window events.
//! - Pointer coordinates leaving this crate lie in `[-1, 1]²`, y up.

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::Pointer;
