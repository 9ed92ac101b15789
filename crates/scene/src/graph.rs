use crate::error::SceneError;
use crate::light::{Fog, Light};
use crate::material::Material;
use crate::mesh::Mesh;
use aviator_common::{NodeId, Transform};
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Index into the scene's mesh table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// Index into the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// What a node contributes besides its transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Pure container.
    Group,
    /// Draws `mesh` with `material`.
    Mesh { mesh: MeshId, material: MaterialId },
}

/// A transform node in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }
}

/// Retained scene: node arena plus shared mesh and material tables.
///
/// Nodes are created detached; `attach` or `add_to_root` places them in the
/// tree. Mesh and material tables are shared, so several nodes can draw the
/// same geometry.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub fog: Option<Fog>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_mesh()).count()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn insert_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn insert_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        tracing::debug!(kind = light.kind(), "light added");
        self.lights.push(light);
    }

    /// Create a detached container node.
    pub fn add_group(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        self.push_node(name.into(), transform, NodeKind::Group)
    }

    /// Create a detached node drawing `mesh` with `material`. Both ids must
    /// come from this graph's tables.
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        mesh: MeshId,
        material: MaterialId,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        if self.mesh_by_id(mesh).is_none() {
            return Err(SceneError::MeshNotFound(mesh));
        }
        if self.material(material).is_none() {
            return Err(SceneError::MaterialNotFound(material));
        }
        let kind = NodeKind::Mesh { mesh, material };
        Ok(self.push_node(name.into(), transform, kind))
    }

    fn push_node(&mut self, name: String, transform: Transform, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name,
            transform,
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Place `child` at the top level. Detaches it from any previous parent.
    pub fn add_to_root(&mut self, child: NodeId) -> Result<(), SceneError> {
        self.check(child)?;
        self.detach(child);
        self.roots.push(child);
        Ok(())
    }

    /// Make `child` the last child of `parent`. Detaches it from any previous
    /// parent first; rejects edits that would make a node its own ancestor.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check(child)?;
        if parent == child {
            return Err(SceneError::SelfParent(child));
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::Cycle { parent, child });
            }
            cursor = self.nodes[id.index()].parent;
        }
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        match self.nodes[child.index()].parent.take() {
            Some(old) => self.nodes[old.index()].children.retain(|&c| c != child),
            None => self.roots.retain(|&c| c != child),
        }
    }

    fn check(&self, id: NodeId) -> Result<(), SceneError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::NodeNotFound(id))
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.node(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.node_mut(id).map(|n| &mut n.transform)
    }

    fn mesh_id(&self, id: NodeId) -> Result<MeshId, SceneError> {
        match self.node(id).map(|n| n.kind) {
            Some(NodeKind::Mesh { mesh, .. }) => Ok(mesh),
            Some(NodeKind::Group) => Err(SceneError::NotAMesh(id)),
            None => Err(SceneError::NodeNotFound(id)),
        }
    }

    /// Mesh drawn by node `id`.
    pub fn mesh(&self, id: NodeId) -> Result<&Mesh, SceneError> {
        let mesh = self.mesh_id(id)?;
        self.meshes
            .get(mesh.0 as usize)
            .ok_or(SceneError::MeshNotFound(mesh))
    }

    /// Mutable mesh drawn by node `id`. Other nodes sharing it see the edit.
    pub fn mesh_mut(&mut self, id: NodeId) -> Result<&mut Mesh, SceneError> {
        let mesh = self.mesh_id(id)?;
        self.meshes
            .get_mut(mesh.0 as usize)
            .ok_or(SceneError::MeshNotFound(mesh))
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn mesh_by_id(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0 as usize)
    }

    /// Product of the local matrices from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.index()];
            m = node.transform.matrix() * m;
        }
        Some(m)
    }

    /// Depth-first walk of every attached node, parents before children,
    /// siblings in insertion order. The callback receives the node depth and
    /// world matrix.
    pub fn visit(&self, mut f: impl FnMut(NodeId, &Node, usize, Mat4)) {
        let mut stack: Vec<(NodeId, usize, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, 0, Mat4::IDENTITY))
            .collect();
        while let Some((id, depth, parent_world)) = stack.pop() {
            let node = &self.nodes[id.index()];
            let world = parent_world * node.transform.matrix();
            f(id, node, depth, world);
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1, world));
            }
        }
    }
}
