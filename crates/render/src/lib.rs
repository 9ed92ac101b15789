//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene graph; they never mutate it.
//! - Render state derives from the scene and the view alone.
//!
//! The text renderer doubles as the headless backend for the CLI and tests;
//! the GPU backend lives in `aviator-render-wgpu`.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
