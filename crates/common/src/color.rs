use serde::{Deserialize, Serialize};

/// RGB colour with components in `[0, 1]`, as written in hex (sRGB-encoded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn with_alpha(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }

    /// Decode sRGB-encoded channels into linear light.
    pub fn to_linear(self) -> Self {
        let f = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }

    /// `#rrggbb` form, rounding each channel.
    pub fn to_hex_string(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// The low-poly scene palette.
pub mod palette {
    use super::Color;

    pub const RED: Color = Color::hex(0xf25346);
    pub const WHITE: Color = Color::hex(0xd8d0d1);
    pub const BROWN: Color = Color::hex(0x59332e);
    pub const PINK: Color = Color::hex(0xf5986e);
    pub const BROWN_DARK: Color = Color::hex(0x23190f);
    pub const BLUE: Color = Color::hex(0x68c3c0);
    /// Fog and clear colour.
    pub const HAZE: Color = Color::hex(0xf7d9aa);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        let c = Color::hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn linear_keeps_black_and_white() {
        assert_eq!(Color::BLACK.to_linear(), Color::BLACK);
        let w = Color::WHITE.to_linear();
        assert!((w.r - 1.0).abs() < 1e-6);
        let mid = Color::rgb(0.5, 0.5, 0.5).to_linear();
        assert!((mid.g - 0.214).abs() < 1e-3);
    }

    #[test]
    fn hex_string_round_trips_palette() {
        assert_eq!(palette::RED.to_hex_string(), "#f25346");
        assert_eq!(palette::BLUE.to_hex_string(), "#68c3c0");
    }
}
