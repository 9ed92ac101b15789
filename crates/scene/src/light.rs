use aviator_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A light source attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    /// Gradient from `ground` (facing down) to `sky` (facing up).
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    /// Parallel rays shining from `position` toward the origin.
    Directional {
        position: Vec3,
        color: Color,
        intensity: f32,
    },
    /// Uniform light on every surface.
    Ambient { color: Color, intensity: f32 },
}

impl Light {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hemisphere { .. } => "hemisphere",
            Self::Directional { .. } => "directional",
            Self::Ambient { .. } => "ambient",
        }
    }

    /// Unit vector pointing from the surface toward the light, if directional.
    pub fn direction(&self) -> Option<Vec3> {
        match self {
            Self::Directional { position, .. } => Some(position.try_normalize().unwrap_or(Vec3::Y)),
            _ => None,
        }
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_direction_is_unit() {
        let light = Light::Directional {
            position: Vec3::new(150.0, 350.0, 350.0),
            color: Color::WHITE,
            intensity: 0.9,
        };
        let dir = light.direction().unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(light.kind(), "directional");
    }
}
