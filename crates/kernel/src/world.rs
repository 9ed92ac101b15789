use crate::airplane::Airplane;
use crate::config::SimConfig;
use crate::environment;
use crate::rng::SplitMix64;
use crate::sea::Sea;
use crate::sky::Sky;
use aviator_input::{Action, Pointer};
use aviator_scene::{PerspectiveCamera, SceneError, SceneGraph};
use glam::Vec2;

/// The whole application state: scene, camera, animated models and input.
///
/// Hosts own one `World`, feed it `Action`s, call `step` once per animation
/// frame and hand `scene()` and `camera()` to a renderer. Given the same
/// config and action sequence, two worlds stay bit-identical.
#[derive(Debug, Clone)]
pub struct World {
    config: SimConfig,
    scene: SceneGraph,
    camera: PerspectiveCamera,
    sea: Sea,
    sky: Sky,
    airplane: Airplane,
    pointer: Pointer,
    tick: u64,
}

impl World {
    /// Build the scene for the given config.
    pub fn new(config: SimConfig) -> Result<Self, SceneError> {
        let mut rng = SplitMix64::new(config.seed);
        let mut scene = SceneGraph::new();
        environment::install_lights(&mut scene);
        let airplane = Airplane::build(&mut scene)?;
        let sea = Sea::build(&mut scene, &mut rng)?;
        let sky = Sky::build(&mut scene, &mut rng, config.cloud_count)?;

        tracing::info!(
            seed = config.seed,
            nodes = scene.node_count(),
            meshes = scene.meshes().len(),
            "world created"
        );

        Ok(Self {
            config,
            scene,
            camera: PerspectiveCamera::default(),
            sea,
            sky,
            airplane,
            pointer: Pointer::CENTER,
            tick: 0,
        })
    }

    /// Default config with a specific seed.
    pub fn with_seed(seed: u64) -> Result<Self, SceneError> {
        Self::new(SimConfig {
            seed,
            ..SimConfig::default()
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn sea(&self) -> &Sea {
        &self.sea
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn airplane(&self) -> &Airplane {
        &self.airplane
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer.position()
    }

    /// Steps taken so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Store a new pointer position, clamped into `[-1, 1]²`.
    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = Pointer::clamped(pointer);
    }

    /// Recompute the camera aspect ratio for a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        let aspect = self.camera.aspect;
        tracing::debug!(width, height, aspect, "viewport resized");
    }

    /// Consume the actions that concern the scene; others are ignored.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::PointerMoved(p) => self.set_pointer(p),
            Action::Resized { width, height } => self.resize(width, height),
            Action::ToggleHud | Action::Quit | Action::Noop => {}
        }
    }

    /// Advance the animation by one frame.
    pub fn step(&mut self) -> Result<(), SceneError> {
        let sea_speed = self.config.sea_rotation_speed;
        let sky_speed = self.config.sky_rotation_speed;
        self.sea.rotate(&mut self.scene, sea_speed)?;
        self.sea.move_waves(&mut self.scene)?;
        self.sky.rotate(&mut self.scene, sky_speed)?;
        self.airplane
            .update(&mut self.scene, self.pointer.position(), &self.config)?;
        self.tick += 1;
        tracing::trace!(tick = self.tick, "stepped");
        Ok(())
    }

    /// Deterministic FNV-1a hash over every node transform and the sea vertices.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                h ^= b as u64;
                h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&self.tick.to_le_bytes());
        self.scene.visit(|_, node, _, _| {
            let t = &node.transform;
            for v in [t.position, t.rotation, t.scale] {
                for c in v.to_array() {
                    mix(&c.to_le_bytes());
                }
            }
        });
        if let Ok(mesh) = self.scene.mesh(self.sea.node) {
            for p in mesh.positions() {
                for c in p.to_array() {
                    mix(&c.to_le_bytes());
                }
            }
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_starts_at_tick_zero() {
        let w = World::with_seed(1).unwrap();
        assert_eq!(w.tick(), 0);
        assert_eq!(w.pointer(), Vec2::ZERO);
        assert_eq!(w.scene().roots().len(), 3);
    }

    #[test]
    fn step_increments_tick() {
        let mut w = World::with_seed(1).unwrap();
        w.step().unwrap();
        w.step().unwrap();
        w.step().unwrap();
        assert_eq!(w.tick(), 3);
    }

    #[test]
    fn sea_and_sky_rotate_every_step() {
        let mut w = World::with_seed(1).unwrap();
        for _ in 0..10 {
            w.step().unwrap();
        }
        let sea = w.scene().transform(w.sea().node).unwrap().rotation.z;
        let sky = w.scene().transform(w.sky().node).unwrap().rotation.z;
        assert!((sea - 0.05).abs() < 1e-5);
        assert!((sky - 0.1).abs() < 1e-5);
    }

    #[test]
    fn same_seed_and_input_replay_identically() {
        let mut w1 = World::with_seed(42).unwrap();
        let mut w2 = World::with_seed(42).unwrap();
        assert_eq!(w1.state_hash(), w2.state_hash());
        for i in 0..120 {
            let p = Vec2::new((i as f32 * 0.05).sin(), (i as f32 * 0.03).cos());
            w1.apply(Action::PointerMoved(p));
            w2.apply(Action::PointerMoved(p));
            w1.step().unwrap();
            w2.step().unwrap();
        }
        assert_eq!(w1.state_hash(), w2.state_hash());
    }

    #[test]
    fn different_seeds_diverge() {
        let w1 = World::with_seed(1).unwrap();
        let w2 = World::with_seed(2).unwrap();
        assert_ne!(w1.state_hash(), w2.state_hash());
    }

    #[test]
    fn pointer_is_clamped() {
        let mut w = World::with_seed(1).unwrap();
        w.apply(Action::PointerMoved(Vec2::new(3.0, -7.0)));
        assert_eq!(w.pointer(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn pointer_drives_airplane() {
        let mut w = World::with_seed(5).unwrap();
        w.set_pointer(Vec2::new(-1.0, -1.0));
        for _ in 0..300 {
            w.step().unwrap();
        }
        let p = w.airplane().position(w.scene()).unwrap();
        assert!((p.x + 100.0).abs() < 1e-2);
        assert!((p.y - 25.0).abs() < 1e-2);
    }

    #[test]
    fn resize_updates_camera_and_ignores_host_actions() {
        let mut w = World::with_seed(1).unwrap();
        w.apply(Action::Resized {
            width: 1000,
            height: 500,
        });
        assert_eq!(w.camera().aspect, 2.0);
        let before = w.state_hash();
        w.apply(Action::ToggleHud);
        w.apply(Action::Noop);
        assert_eq!(w.state_hash(), before);
    }

    #[test]
    fn config_cloud_count_is_honoured() {
        let w = World::new(SimConfig {
            cloud_count: 7,
            ..SimConfig::default()
        })
        .unwrap();
        assert_eq!(w.sky().clouds().len(), 7);
    }

    #[test]
    fn unvalidated_travel_bounds_do_not_panic() {
        let mut w = World::new(SimConfig {
            travel_x: [f32::NAN, 100.0],
            pointer_range: [f32::NEG_INFINITY, f32::INFINITY],
            ..SimConfig::default()
        })
        .unwrap();
        w.set_pointer(Vec2::new(0.5, 0.5));
        w.step().unwrap();
        let p = w.airplane().position(w.scene()).unwrap();
        assert!(p.y.is_finite());
    }
}
