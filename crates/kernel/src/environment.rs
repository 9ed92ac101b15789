use aviator_common::{Color, palette};
use aviator_scene::{Fog, Light, SceneGraph};
use glam::Vec3;

/// Install the hemisphere, sun and ambient lights plus the distance haze.
pub fn install_lights(scene: &mut SceneGraph) {
    scene.add_light(Light::Hemisphere {
        sky: Color::hex(0xaaaaaa),
        ground: Color::BLACK,
        intensity: 0.9,
    });
    scene.add_light(Light::Directional {
        position: Vec3::new(150.0, 350.0, 350.0),
        color: Color::WHITE,
        intensity: 0.9,
    });
    scene.add_light(Light::Ambient {
        color: Color::hex(0xdc8874),
        intensity: 0.5,
    });
    scene.fog = Some(Fog {
        color: palette::HAZE,
        near: 100.0,
        far: 950.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_lights_and_fog() {
        let mut scene = SceneGraph::new();
        install_lights(&mut scene);
        let kinds: Vec<_> = scene.lights.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, ["hemisphere", "directional", "ambient"]);
        let fog = scene.fog.unwrap();
        assert_eq!((fog.near, fog.far), (100.0, 950.0));
    }
}
