use aviator_common::Color;
use serde::{Deserialize, Serialize};

/// Surface description: a single colour, optional translucency.
///
/// Every surface is flat-shaded; the face normal comes from the triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
}

impl Material {
    /// Opaque.
    pub fn flat(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviator_common::palette;

    #[test]
    fn opacity_marks_translucency() {
        let sea = Material::flat(palette::BLUE).with_opacity(0.6);
        assert!(sea.is_translucent());
        assert!(!Material::flat(palette::RED).is_translucent());
        assert_eq!(Material::flat(palette::RED).with_opacity(3.0).opacity, 1.0);
    }
}
