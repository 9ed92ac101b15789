use crate::config::SimConfig;
use crate::pilot::Pilot;
use aviator_common::{NodeId, Transform, ease_toward, normalize, palette};
use aviator_scene::{Material, MaterialId, Mesh, SceneError, SceneGraph};
use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Resting height before the pointer moves.
pub const START_HEIGHT: f32 = 100.0;
const SCALE: f32 = 0.25;

/// The airplane model plus the nodes its animation drives.
#[derive(Debug, Clone)]
pub struct Airplane {
    pub node: NodeId,
    pub propeller: NodeId,
    pub pilot: Pilot,
}

/// Taper the back of a box: pull its four `-x` corners by the given offsets.
fn taper_back(mesh: Mesh, top: (f32, f32), bottom: (f32, f32)) -> Mesh {
    mesh.displace(4, Vec3::new(0.0, top.0, top.1))
        .displace(5, Vec3::new(0.0, top.0, -top.1))
        .displace(6, Vec3::new(0.0, bottom.0, bottom.1))
        .displace(7, Vec3::new(0.0, bottom.0, -bottom.1))
}

impl Airplane {
    /// Build the airplane, attach it at the scene root, scaled down and lifted.
    pub fn build(scene: &mut SceneGraph) -> Result<Self, SceneError> {
        let red = scene.insert_material(Material::flat(palette::RED));
        let white = scene.insert_material(Material::flat(palette::WHITE));
        let brown = scene.insert_material(Material::flat(palette::BROWN));
        let brown_dark = scene.insert_material(Material::flat(palette::BROWN_DARK));
        let glass = scene.insert_material(Material::flat(palette::WHITE).with_opacity(0.3));

        let plane = scene.add_group(
            "airplane",
            Transform::from_position(Vec3::new(0.0, START_HEIGHT, 0.0)).with_uniform_scale(SCALE),
        );
        scene.add_to_root(plane)?;

        let part = |scene: &mut SceneGraph,
                    name: &str,
                    mesh: Mesh,
                    material: MaterialId,
                    transform: Transform|
         -> Result<NodeId, SceneError> {
            let mesh = scene.insert_mesh(mesh);
            let node = scene.add_mesh(name, mesh, material, transform)?;
            scene.attach(plane, node)?;
            Ok(node)
        };

        part(
            scene,
            "cockpit",
            taper_back(Mesh::cuboid(80.0, 50.0, 50.0), (-10.0, 20.0), (30.0, 20.0)),
            red,
            Transform::default(),
        )?;
        part(
            scene,
            "engine",
            Mesh::cuboid(20.0, 50.0, 50.0),
            white,
            Transform::from_position(Vec3::new(40.0, 0.0, 0.0)),
        )?;
        part(
            scene,
            "tail",
            Mesh::cuboid(15.0, 20.0, 5.0),
            red,
            Transform::from_position(Vec3::new(-35.0, 25.0, 0.0)),
        )?;
        part(
            scene,
            "wing",
            Mesh::cuboid(30.0, 5.0, 120.0),
            red,
            Transform::from_position(Vec3::new(0.0, 15.0, 0.0)),
        )?;
        part(
            scene,
            "windshield",
            Mesh::cuboid(3.0, 15.0, 20.0),
            glass,
            Transform::from_position(Vec3::new(5.0, 27.0, 0.0)),
        )?;

        let propeller = part(
            scene,
            "propeller",
            taper_back(Mesh::cuboid(20.0, 10.0, 10.0), (-5.0, 5.0), (5.0, 5.0)),
            brown,
            Transform::from_position(Vec3::new(60.0, 0.0, 0.0)),
        )?;
        let blade_mesh = scene.insert_mesh(Mesh::cuboid(1.0, 80.0, 10.0));
        for (name, rx) in [("blade_1", 0.0), ("blade_2", FRAC_PI_2)] {
            let blade = scene.add_mesh(
                name,
                blade_mesh,
                brown_dark,
                Transform::from_position(Vec3::new(8.0, 0.0, 0.0))
                    .with_rotation(Vec3::new(rx, 0.0, 0.0)),
            )?;
            scene.attach(propeller, blade)?;
        }

        let guard_mesh = scene.insert_mesh(Mesh::cuboid(30.0, 15.0, 10.0));
        let tyre_mesh = scene.insert_mesh(Mesh::cuboid(24.0, 24.0, 4.0));
        let axle_mesh = scene.insert_mesh(Mesh::cuboid(10.0, 10.0, 6.0));
        for (side, z) in [("r", 25.0), ("l", -25.0)] {
            let guard = scene.add_mesh(
                format!("wheel_guard_{side}"),
                guard_mesh,
                red,
                Transform::from_position(Vec3::new(25.0, -20.0, z)),
            )?;
            scene.attach(plane, guard)?;
            let tyre = scene.add_mesh(
                format!("tyre_{side}"),
                tyre_mesh,
                brown_dark,
                Transform::from_position(Vec3::new(25.0, -28.0, z)),
            )?;
            let axle = scene.add_mesh(
                format!("axle_{side}"),
                axle_mesh,
                brown,
                Transform::default(),
            )?;
            scene.attach(tyre, axle)?;
            scene.attach(plane, tyre)?;
        }
        let rear_tyre = scene.add_mesh(
            "tyre_rear",
            tyre_mesh,
            brown_dark,
            Transform::from_position(Vec3::new(-35.0, -5.0, 0.0)).with_uniform_scale(0.5),
        )?;
        let rear_axle = scene.add_mesh("axle_rear", axle_mesh, brown, Transform::default())?;
        scene.attach(rear_tyre, rear_axle)?;
        scene.attach(plane, rear_tyre)?;

        part(
            scene,
            "suspension",
            Mesh::cuboid(4.0, 20.0, 4.0).translate(Vec3::new(0.0, 10.0, 0.0)),
            red,
            Transform::from_position(Vec3::new(-35.0, -5.0, 0.0))
                .with_rotation(Vec3::new(0.0, 0.0, -0.3)),
        )?;

        let pilot = Pilot::build(scene)?;
        if let Some(t) = scene.transform_mut(pilot.node) {
            t.position = Vec3::new(-10.0, 27.0, 0.0);
        }
        scene.attach(plane, pilot.node)?;

        tracing::debug!(node = %plane, "airplane built");
        Ok(Self {
            node: plane,
            propeller,
            pilot,
        })
    }

    /// Where the pointer asks the airplane to be.
    pub fn target(pointer: Vec2, config: &SimConfig) -> Vec2 {
        let [pmin, pmax] = config.pointer_range;
        let [xmin, xmax] = config.travel_x;
        let [ymin, ymax] = config.travel_y;
        Vec2::new(
            normalize(pointer.x, pmin, pmax, xmin, xmax),
            normalize(pointer.y, pmin, pmax, ymin, ymax),
        )
    }

    /// One step of flight: ease toward the pointer target, bank by the
    /// remaining vertical distance, spin the propeller, sway the pilot's hair.
    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        pointer: Vec2,
        config: &SimConfig,
    ) -> Result<(), SceneError> {
        let target = Self::target(pointer, config);
        let t = scene
            .transform_mut(self.node)
            .ok_or(SceneError::NodeNotFound(self.node))?;
        t.position.x = ease_toward(t.position.x, target.x, config.ease_factor);
        t.position.y = ease_toward(t.position.y, target.y, config.ease_factor);
        t.rotation.z = (target.y - t.position.y) * config.roll_factor;
        t.rotation.x = (t.position.y - target.y) * config.pitch_factor;

        let prop = scene
            .transform_mut(self.propeller)
            .ok_or(SceneError::NodeNotFound(self.propeller))?;
        prop.rotation.x = aviator_common::wrap_angle(prop.rotation.x + config.propeller_speed);

        self.pilot.update_hairs(scene, config.hair_speed)
    }

    pub fn position(&self, scene: &SceneGraph) -> Option<Vec3> {
        scene.transform(self.node).map(|t| t.position)
    }
}
