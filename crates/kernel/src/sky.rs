use crate::rng::SplitMix64;
use aviator_common::{NodeId, Transform, palette};
use aviator_scene::{Material, MaterialId, Mesh, MeshId, SceneError, SceneGraph};
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, TAU};

const CUBE_SIZE: f32 = 20.0;

/// Geometry and material shared by every cloud cube.
#[derive(Debug, Clone, Copy)]
struct CloudParts {
    cube: MeshId,
    material: MaterialId,
}

/// Build one cloud: a loose row of three to five tumbled cubes.
fn build_cloud(
    scene: &mut SceneGraph,
    parts: CloudParts,
    rng: &mut SplitMix64,
    index: u32,
) -> Result<NodeId, SceneError> {
    let cloud = scene.add_group(format!("cloud_{index}"), Transform::default());
    let blocks = rng.below(3, 3);
    for i in 0..blocks {
        let position = Vec3::new(
            i as f32 * 15.0,
            rng.next_f32() * 10.0,
            rng.next_f32() * 10.0,
        );
        let rotation = Vec3::new(0.0, rng.next_f32() * TAU, rng.next_f32() * TAU);
        let scale = 0.1 + rng.next_f32() * 0.9;
        let block = scene.add_mesh(
            format!("cloud_{index}_block_{i}"),
            parts.cube,
            parts.material,
            Transform::from_position(position)
                .with_rotation(rotation)
                .with_uniform_scale(scale),
        )?;
        scene.attach(cloud, block)?;
    }
    Ok(cloud)
}

/// Ring of clouds rotating around the sea's axis.
#[derive(Debug, Clone)]
pub struct Sky {
    pub node: NodeId,
    clouds: Vec<NodeId>,
}

impl Sky {
    /// Spread `cloud_count` clouds evenly around the ring at random heights and depths.
    pub fn build(
        scene: &mut SceneGraph,
        rng: &mut SplitMix64,
        cloud_count: u32,
    ) -> Result<Self, SceneError> {
        let parts = CloudParts {
            cube: scene.insert_mesh(Mesh::cuboid(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE)),
            material: scene.insert_material(Material::flat(palette::WHITE)),
        };
        let sky = scene.add_group(
            "sky",
            Transform::from_position(Vec3::new(0.0, -crate::sea::SEA_RADIUS, 0.0)),
        );
        scene.add_to_root(sky)?;

        let step_angle = TAU / cloud_count as f32;
        let mut clouds = Vec::with_capacity(cloud_count as usize);
        for i in 0..cloud_count {
            let cloud = build_cloud(scene, parts, rng, i)?;
            let a = step_angle * i as f32;
            let h = 750.0 + rng.next_f32() * 200.0;
            let z = -400.0 - rng.next_f32() * 400.0;
            let s = 1.0 + rng.next_f32() * 2.0;
            if let Some(t) = scene.transform_mut(cloud) {
                *t = Transform::from_position(Vec3::new(a.cos() * h, a.sin() * h, z))
                    .with_rotation(Vec3::new(0.0, 0.0, a + FRAC_PI_2))
                    .with_uniform_scale(s);
            }
            scene.attach(sky, cloud)?;
            clouds.push(cloud);
        }
        tracing::debug!(clouds = clouds.len(), "sky built");
        Ok(Self { node: sky, clouds })
    }

    pub fn clouds(&self) -> &[NodeId] {
        &self.clouds
    }

    pub fn rotate(&self, scene: &mut SceneGraph, delta: f32) -> Result<(), SceneError> {
        let t = scene
            .transform_mut(self.node)
            .ok_or(SceneError::NodeNotFound(self.node))?;
        t.rotation.z += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sky(count: u32) -> (SceneGraph, Sky) {
        let mut scene = SceneGraph::new();
        let mut rng = SplitMix64::new(11);
        let sky = Sky::build(&mut scene, &mut rng, count).unwrap();
        (scene, sky)
    }

    #[test]
    fn builds_requested_cloud_count() {
        let (scene, sky) = sky(20);
        assert_eq!(sky.clouds().len(), 20);
        assert_eq!(scene.node(sky.node).unwrap().children().len(), 20);
    }

    #[test]
    fn clouds_have_three_to_five_blocks() {
        let (scene, sky) = sky(20);
        for &cloud in sky.clouds() {
            let n = scene.node(cloud).unwrap().children().len();
            assert!((3..=5).contains(&n), "cloud has {n} blocks");
        }
    }

    #[test]
    fn clouds_sit_on_the_ring() {
        let (scene, sky) = sky(20);
        for (i, &cloud) in sky.clouds().iter().enumerate() {
            let t = scene.transform(cloud).unwrap();
            let radius = t.position.truncate().length();
            assert!((749.9..=950.1).contains(&radius), "cloud {i} at {radius}");
            assert!((-800.0..=-400.0).contains(&t.position.z));
            assert!((1.0..=3.0).contains(&t.scale.x));
            let a = TAU / 20.0 * i as f32;
            assert!((t.rotation.z - (a + FRAC_PI_2)).abs() < 1e-5);
        }
    }

    #[test]
    fn cloud_blocks_share_geometry() {
        let (scene, _) = sky(5);
        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.materials().len(), 1);
    }
}
