use aviator_common::{NodeId, Transform, palette};
use aviator_scene::{Material, Mesh, SceneError, SceneGraph};
use glam::Vec3;

const TOP_HAIRS: u32 = 12;

/// The pilot's head and body, with animated hair.
#[derive(Debug, Clone)]
pub struct Pilot {
    pub node: NodeId,
    hairs_top: Vec<NodeId>,
    angle_hairs: f32,
}

impl Pilot {
    /// Build the pilot as a detached group; the caller attaches it.
    pub fn build(scene: &mut SceneGraph) -> Result<Self, SceneError> {
        let brown = scene.insert_material(Material::flat(palette::BROWN));
        let skin = scene.insert_material(Material::flat(palette::PINK));
        let hair_mat = scene.insert_material(Material::flat(palette::BROWN));

        let pilot = scene.add_group("pilot", Transform::default());

        let body_mesh = scene.insert_mesh(Mesh::cuboid(15.0, 15.0, 15.0));
        let body = scene.add_mesh(
            "pilot_body",
            body_mesh,
            brown,
            Transform::from_position(Vec3::new(2.0, -12.0, 0.0)),
        )?;
        scene.attach(pilot, body)?;

        let face_mesh = scene.insert_mesh(Mesh::cuboid(10.0, 10.0, 10.0));
        let face = scene.add_mesh("pilot_face", face_mesh, skin, Transform::default())?;
        scene.attach(pilot, face)?;

        // Hair pivots at its base so vertical scaling grows it upward.
        let hair_shape = Mesh::cuboid(4.0, 4.0, 4.0).translate(Vec3::new(0.0, 2.0, 0.0));
        let hair_mesh = scene.insert_mesh(hair_shape);
        let hairs = scene.add_group(
            "pilot_hairs",
            Transform::from_position(Vec3::new(-5.0, 5.0, 0.0)),
        );
        let top = scene.add_group("pilot_hairs_top", Transform::default());
        let mut hairs_top = Vec::with_capacity(TOP_HAIRS as usize);
        for i in 0..TOP_HAIRS {
            let col = (i % 3) as f32;
            let row = (i / 3) as f32;
            let hair = scene.add_mesh(
                format!("pilot_hair_{i}"),
                hair_mesh,
                hair_mat,
                Transform::from_position(Vec3::new(-4.0 + col * 4.0, 0.0, -4.0 + row * 4.0)),
            )?;
            scene.attach(top, hair)?;
            hairs_top.push(hair);
        }
        scene.attach(hairs, top)?;

        let side_shape = Mesh::cuboid(12.0, 4.0, 2.0).translate(Vec3::new(-6.0, 0.0, 0.0));
        let side_mesh = scene.insert_mesh(side_shape);
        for (name, z) in [("pilot_hair_side_r", 6.0), ("pilot_hair_side_l", -6.0)] {
            let side = scene.add_mesh(
                name,
                side_mesh,
                hair_mat,
                Transform::from_position(Vec3::new(8.0, -2.0, z)),
            )?;
            scene.attach(hairs, side)?;
        }

        let back_mesh = scene.insert_mesh(Mesh::cuboid(2.0, 8.0, 10.0));
        let back = scene.add_mesh(
            "pilot_hair_back",
            back_mesh,
            hair_mat,
            Transform::from_position(Vec3::new(-1.0, -4.0, 0.0)),
        )?;
        scene.attach(hairs, back)?;
        scene.attach(pilot, hairs)?;

        let glass_mesh = scene.insert_mesh(Mesh::cuboid(5.0, 5.0, 5.0));
        for (name, z) in [("pilot_glass_r", 3.0), ("pilot_glass_l", -3.0)] {
            let glass = scene.add_mesh(
                name,
                glass_mesh,
                hair_mat,
                Transform::from_position(Vec3::new(6.0, 0.0, z)),
            )?;
            scene.attach(pilot, glass)?;
        }
        let bridge_mesh = scene.insert_mesh(Mesh::cuboid(11.0, 1.0, 11.0));
        let bridge = scene.add_mesh(
            "pilot_glass_bridge",
            bridge_mesh,
            hair_mat,
            Transform::default(),
        )?;
        scene.attach(pilot, bridge)?;

        let ear_mesh = scene.insert_mesh(Mesh::cuboid(2.0, 3.0, 2.0));
        for (name, z) in [("pilot_ear_l", -6.0), ("pilot_ear_r", 6.0)] {
            let ear = scene.add_mesh(
                name,
                ear_mesh,
                skin,
                Transform::from_position(Vec3::new(0.0, 0.0, z)),
            )?;
            scene.attach(pilot, ear)?;
        }

        Ok(Self {
            node: pilot,
            hairs_top,
            angle_hairs: 0.0,
        })
    }

    pub fn hairs_top(&self) -> &[NodeId] {
        &self.hairs_top
    }

    pub fn angle_hairs(&self) -> f32 {
        self.angle_hairs
    }

    /// Sway the top hairs: each one's height follows a cosine offset by its index.
    pub fn update_hairs(&mut self, scene: &mut SceneGraph, speed: f32) -> Result<(), SceneError> {
        for (i, &hair) in self.hairs_top.iter().enumerate() {
            let t = scene
                .transform_mut(hair)
                .ok_or(SceneError::NodeNotFound(hair))?;
            t.scale.y = 0.75 + (self.angle_hairs + i as f32 / 3.0).cos() * 0.25;
        }
        self.angle_hairs = aviator_common::wrap_angle(self.angle_hairs + speed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pilot_has_twelve_top_hairs() {
        let mut scene = SceneGraph::new();
        let pilot = Pilot::build(&mut scene).unwrap();
        assert_eq!(pilot.hairs_top().len(), 12);
        assert!(scene.roots().is_empty(), "pilot is built detached");
        let hair = scene.transform(pilot.hairs_top()[11]).unwrap();
        assert_eq!(hair.position, Vec3::new(4.0, 0.0, 8.0));
    }

    #[test]
    fn hair_scale_stays_between_half_and_full() {
        let mut scene = SceneGraph::new();
        let mut pilot = Pilot::build(&mut scene).unwrap();
        for _ in 0..100 {
            pilot.update_hairs(&mut scene, 0.16).unwrap();
            for &h in pilot.hairs_top() {
                let s = scene.transform(h).unwrap().scale.y;
                assert!((0.5 - 1e-6..=1.0 + 1e-6).contains(&s));
            }
        }
    }

    #[test]
    fn first_hair_update_uses_initial_phase() {
        let mut scene = SceneGraph::new();
        let mut pilot = Pilot::build(&mut scene).unwrap();
        pilot.update_hairs(&mut scene, 0.16).unwrap();
        let first = scene.transform(pilot.hairs_top()[0]).unwrap().scale.y;
        assert!((first - 1.0).abs() < 1e-6);
        assert!((pilot.angle_hairs() - 0.16).abs() < 1e-6);
    }
}
