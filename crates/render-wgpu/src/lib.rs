//! wgpu render backend for the aviator scene.
//!
//! Draws every attached mesh node of a `SceneGraph` with its world matrix:
//! opaque meshes first, translucent ones (sea, windshield) after, blended and
//! without depth writes. Vertex buffers of deformed meshes are rewritten when
//! their revision changes.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Animation stepping is separate from the render frame rate.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
