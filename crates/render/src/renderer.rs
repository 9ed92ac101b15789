use aviator_scene::{NodeKind, PerspectiveCamera, SceneGraph};
use glam::Mat4;
use std::fmt::Write;

/// Camera plus output size for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub camera: PerspectiveCamera,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::new(PerspectiveCamera::default(), 1280, 720)
    }
}

impl RenderView {
    pub fn new(camera: PerspectiveCamera, width: u32, height: u32) -> Self {
        Self {
            camera,
            width,
            height,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.camera.view_projection()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene; animation is kernel-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene graph.
///
/// One line per attached node, indented by depth, with its world-space
/// position and, for mesh nodes, the mesh size and material.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Skip nodes deeper than this.
    pub max_depth: Option<usize>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        let cam = &view.camera;
        let _ = writeln!(
            out,
            "=== Scene ({} nodes, {} meshes, {} lights) ===",
            scene.node_count(),
            scene.meshes().len(),
            scene.lights.len()
        );
        let _ = writeln!(
            out,
            "Camera: pos=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3} viewport={}x{}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.fov_degrees,
            cam.aspect,
            view.width,
            view.height
        );
        if let Some(fog) = &scene.fog {
            let _ = writeln!(
                out,
                "Fog: {} {:.0}..{:.0}",
                fog.color.to_hex_string(),
                fog.near,
                fog.far
            );
        }

        scene.visit(|id, node, depth, world| {
            if self.max_depth.is_some_and(|max| depth > max) {
                return;
            }
            let p = world.w_axis;
            let indent = "  ".repeat(depth + 1);
            let _ = write!(
                out,
                "{indent}{id} {} pos=({:.2}, {:.2}, {:.2})",
                node.name, p.x, p.y, p.z
            );
            if let NodeKind::Mesh { mesh, material } = node.kind {
                if let (Some(mesh), Some(material)) =
                    (scene.mesh_by_id(mesh), scene.material(material))
                {
                    let _ = write!(
                        out,
                        " mesh[v={} t={}] {} a={:.2}",
                        mesh.vertex_count(),
                        mesh.triangle_count(),
                        material.color.to_hex_string(),
                        material.opacity
                    );
                }
            }
            out.push('\n');
        });

        tracing::trace!(bytes = out.len(), "scene dumped");
        out
    }
}
