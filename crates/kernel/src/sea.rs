use crate::rng::SplitMix64;
use aviator_common::{NodeId, Transform, palette, wrap_angle};
use aviator_scene::{Material, Mesh, SceneError, SceneGraph};
use glam::Vec3;
use std::f32::consts::TAU;

pub const SEA_RADIUS: f32 = 600.0;
pub const SEA_LENGTH: f32 = 800.0;
const RADIAL_SEGMENTS: u32 = 40;
const LENGTH_SEGMENTS: u32 = 10;

/// Oscillation state of one sea vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub rest: Vec3,
    /// Current phase in `[0, 2π)`.
    pub angle: f32,
    pub amplitude: f32,
    /// Phase increment per step.
    pub speed: f32,
}

impl Wave {
    /// Position displayed for the current phase.
    pub fn offset_position(&self) -> Vec3 {
        self.rest
            + Vec3::new(
                self.angle.cos() * self.amplitude,
                self.angle.sin() * self.amplitude,
                0.0,
            )
    }

    pub fn advance(&mut self) {
        self.angle = wrap_angle(self.angle + self.speed);
    }
}

/// The rotating sea cylinder and its per-vertex waves.
#[derive(Debug, Clone)]
pub struct Sea {
    pub node: NodeId,
    waves: Vec<Wave>,
}

impl Sea {
    /// Build the sea mesh, attach it at the scene root and seed one wave per vertex.
    pub fn build(scene: &mut SceneGraph, rng: &mut SplitMix64) -> Result<Self, SceneError> {
        let mesh = Mesh::cylinder(
            SEA_RADIUS,
            SEA_RADIUS,
            SEA_LENGTH,
            RADIAL_SEGMENTS,
            LENGTH_SEGMENTS,
        );
        let waves: Vec<Wave> = mesh
            .positions()
            .iter()
            .map(|&rest| Wave {
                rest,
                angle: rng.next_f32() * TAU,
                amplitude: rng.range(5.0, 20.0),
                speed: rng.range(0.016, 0.048),
            })
            .collect();

        let mesh = scene.insert_mesh(mesh);
        let material = scene.insert_material(Material::flat(palette::BLUE).with_opacity(0.6));
        let node = scene.add_mesh(
            "sea",
            mesh,
            material,
            Transform::from_position(Vec3::new(0.0, -SEA_RADIUS, 0.0)),
        )?;
        scene.add_to_root(node)?;
        tracing::debug!(vertices = waves.len(), "sea built");
        Ok(Self { node, waves })
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Write the current wave offsets into the mesh, then advance every phase.
    pub fn move_waves(&mut self, scene: &mut SceneGraph) -> Result<(), SceneError> {
        let waves = &mut self.waves;
        scene.mesh_mut(self.node)?.update_positions(|positions| {
            for (p, wave) in positions.iter_mut().zip(waves.iter_mut()) {
                *p = wave.offset_position();
                wave.advance();
            }
        });
        Ok(())
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

    fn sea(seed: u64) -> (SceneGraph, Sea) {
        let mut scene = SceneGraph::new();
        let mut rng = SplitMix64::new(seed);
        let sea = Sea::build(&mut scene, &mut rng).unwrap();
        (scene, sea)
    }

    #[test]
    fn one_wave_per_vertex_within_ranges() {
        let (scene, sea) = sea(1);
        let vertices = scene.mesh(sea.node).unwrap().vertex_count();
        assert_eq!(sea.waves().len(), vertices);
        for w in sea.waves() {
            assert!((0.0..TAU).contains(&w.angle));
            assert!((5.0..=20.0).contains(&w.amplitude));
            assert!((0.016..=0.048).contains(&w.speed));
        }
    }

    #[test]
    fn sea_sits_below_origin_and_is_translucent() {
        let (scene, sea) = sea(1);
        let node = scene.node(sea.node).unwrap();
        assert_eq!(node.transform.position.y, -600.0);
        assert_eq!(scene.roots(), &[sea.node]);
        assert_eq!(scene.materials()[0].opacity, 0.6);
    }

    #[test]
    fn vertices_stay_within_amplitude_of_rest() {
        let (mut scene, mut sea) = sea(9);
        for _ in 0..50 {
            sea.move_waves(&mut scene).unwrap();
            let positions = scene.mesh(sea.node).unwrap().positions();
            for (p, w) in positions.iter().zip(sea.waves()) {
                assert!((*p - w.rest).length() <= w.amplitude + 1e-3);
                assert_eq!(p.z, w.rest.z);
            }
        }
    }

    #[test]
    fn phase_advance_is_additive_mod_tau() {
        let (mut scene, mut sea) = sea(3);
        let before: Vec<Wave> = sea.waves().to_vec();
        let steps = 500;
        for _ in 0..steps {
            sea.move_waves(&mut scene).unwrap();
        }
        for (w0, w) in before.iter().zip(sea.waves()) {
            let expected = w0.angle + steps as f32 * w0.speed;
            assert!((w.angle.cos() - expected.cos()).abs() < 1e-3);
            assert!((w.angle.sin() - expected.sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn move_waves_bumps_mesh_revision() {
        let (mut scene, mut sea) = sea(4);
        let r0 = scene.mesh(sea.node).unwrap().revision();
        sea.move_waves(&mut scene).unwrap();
        assert_eq!(scene.mesh(sea.node).unwrap().revision(), r0 + 1);
    }
}
