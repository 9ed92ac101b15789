use aviator_common::NodeId;
use aviator_kernel::World;
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the world for the HUD overlay and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let scene = world.scene();
        let airplane = world.airplane();
        let plane = scene.transform(airplane.node).copied().unwrap_or_default();
        let propeller = scene
            .transform(airplane.propeller)
            .map_or(0.0, |t| t.rotation.x);
        WorldSummary {
            tick: world.tick(),
            seed: world.config().seed,
            node_count: scene.node_count(),
            mesh_nodes: scene.mesh_node_count(),
            waves: world.sea().waves().len(),
            clouds: world.sky().clouds().len(),
            pointer: world.pointer().to_array(),
            airplane: plane.position.to_array(),
            roll: plane.rotation.z,
            pitch: plane.rotation.x,
            propeller,
            state_hash: world.state_hash(),
        }
    }

    /// Details of one node, with its world-space position.
    pub fn inspect_node(world: &World, id: NodeId) -> Option<NodeInfo> {
        let scene = world.scene();
        let node = scene.node(id)?;
        let world_pos = scene.world_matrix(id)?.w_axis.truncate();
        let mut depth = 0;
        let mut cursor = node.parent();
        while let Some(parent) = cursor {
            depth += 1;
            cursor = scene.node(parent).and_then(|n| n.parent());
        }
        let t = node.transform;
        Some(NodeInfo {
            id: id.0,
            name: node.name.clone(),
            depth,
            parent: node.parent().map(|p| p.0),
            children: node.children().len(),
            position: t.position.to_array(),
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
            world_position: world_pos.to_array(),
            vertices: scene.mesh(id).ok().map(|m| m.vertex_count()),
        })
    }

    /// Every node reachable from the roots, depth-first.
    pub fn list_nodes(world: &World) -> Vec<NodeInfo> {
        let mut ids = Vec::new();
        world.scene().visit(|id, _, _, _| ids.push(id));
        let nodes: Vec<NodeInfo> = ids
            .into_iter()
            .filter_map(|id| Self::inspect_node(world, id))
            .collect();
        tracing::trace!(count = nodes.len(), "nodes listed");
        nodes
    }

    /// Look a node up by name; the first match in traversal order wins.
    pub fn find_node(world: &World, name: &str) -> Option<NodeInfo> {
        let mut found = None;
        world.scene().visit(|id, node, _, _| {
            if found.is_none() && node.name == name {
                found = Some(id);
            }
        });
        found.and_then(|id| Self::inspect_node(world, id))
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub tick: u64,
    pub seed: u64,
    pub node_count: usize,
    pub mesh_nodes: usize,
    pub waves: usize,
    pub clouds: usize,
    pub pointer: [f32; 2],
    pub airplane: [f32; 3],
    pub roll: f32,
    pub pitch: f32,
    pub propeller: f32,
    pub state_hash: u64,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "World: tick={} seed={}", self.tick, self.seed)?;
        write!(f, " nodes={} meshes={}", self.node_count, self.mesh_nodes)?;
        writeln!(f, " waves={} clouds={}", self.waves, self.clouds)?;
        let [x, y] = self.pointer;
        writeln!(f, "Pointer: ({x:.3}, {y:.3})")?;
        let [x, y, z] = self.airplane;
        write!(f, "Airplane: pos=({x:.2}, {y:.2}, {z:.2})")?;
        write!(f, " roll={:.4} pitch={:.4}", self.roll, self.pitch)?;
        writeln!(f, " propeller={:.3}", self.propeller)?;
        write!(f, "State hash: {:016x}", self.state_hash)
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub id: u32,
    pub name: String,
    pub depth: usize,
    pub parent: Option<u32>,
    pub children: usize,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub world_position: [f32; 3],
    pub vertices: Option<usize>,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = NodeId(self.id);
        let [x, y, z] = self.position;
        write!(f, "{id} {} pos=({x:.2}, {y:.2}, {z:.2})", self.name)?;
        let [x, y, z] = self.world_position;
        write!(f, " world=({x:.2}, {y:.2}, {z:.2})")?;
        let [x, y, z] = self.scale;
        write!(f, " scale=({x:.2}, {y:.2}, {z:.2})")?;
        if let Some(v) = self.vertices {
            write!(f, " vertices={v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn summary_fresh_world() {
        let world = World::with_seed(7).unwrap();
        let summary = SceneInspector::summary(&world);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.seed, 7);
        assert_eq!(summary.clouds, 20);
        assert_eq!(summary.airplane, [0.0, 100.0, 0.0]);
        assert!(summary.mesh_nodes > 0);
        assert!(summary.mesh_nodes < summary.node_count);
    }

    #[test]
    fn summary_tracks_steps_and_pointer() {
        let mut world = World::with_seed(7).unwrap();
        world.set_pointer(Vec2::new(0.5, 0.5));
        world.step().unwrap();
        world.step().unwrap();
        let summary = SceneInspector::summary(&world);
        assert_eq!(summary.tick, 2);
        assert_eq!(summary.pointer, [0.5, 0.5]);
        assert!(summary.airplane[1] > 100.0);
        assert_eq!(summary.state_hash, world.state_hash());
    }

    #[test]
    fn inspect_node_reports_depth_and_world_position() {
        let world = World::with_seed(1).unwrap();
        let info = SceneInspector::find_node(&world, "propeller").unwrap();
        assert_eq!(info.depth, 1);
        assert_eq!(info.children, 2);
        assert_eq!(info.vertices, Some(8));
        // 60 units forward inside a quarter-scale airplane at y=100.
        assert!((info.world_position[0] - 15.0).abs() < 1e-4);
        assert!((info.world_position[1] - 100.0).abs() < 1e-4);
    }

    #[test]
    fn inspect_node_not_found() {
        let world = World::with_seed(1).unwrap();
        let missing = NodeId(u32::MAX);
        assert!(SceneInspector::inspect_node(&world, missing).is_none());
        assert!(SceneInspector::find_node(&world, "no such node").is_none());
    }

    #[test]
    fn list_nodes_covers_attached_graph() {
        let world = World::with_seed(1).unwrap();
        let nodes = SceneInspector::list_nodes(&world);
        assert_eq!(nodes.len(), world.scene().node_count());
        assert_eq!(nodes.iter().filter(|n| n.depth == 0).count(), 3);
        assert_eq!(nodes[0].name, "airplane");
    }

    #[test]
    fn summary_serializes_to_json() {
        let world = World::with_seed(3).unwrap();
        let json = serde_json::to_value(SceneInspector::summary(&world)).unwrap();
        assert_eq!(json["seed"], 3);
        assert_eq!(json["tick"], 0);
        assert!(json["airplane"].is_array());
    }

    #[test]
    fn summary_display() {
        let world = World::with_seed(3).unwrap();
        let s = SceneInspector::summary(&world).to_string();
        assert!(s.contains("tick=0"));
        assert!(s.contains("State hash:"));
    }
}
