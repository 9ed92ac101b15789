use glam::Vec2;

/// Normalized pointer position: x grows rightward, y grows upward, both in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer(pub Vec2);

impl Pointer {
    pub const CENTER: Self = Self(Vec2::ZERO);

    /// Map a cursor position in window pixels (origin top-left, y down).
    ///
    /// A zero-sized viewport yields the centre.
    pub fn from_cursor(x: f64, y: f64, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            tracing::trace!("pointer event on empty viewport");
            return Self::CENTER;
        }
        let tx = -1.0 + (x / width as f64) * 2.0;
        let ty = 1.0 - (y / height as f64) * 2.0;
        Self::clamped(Vec2::new(tx as f32, ty as f32))
    }

    /// Clamp an arbitrary pair into the unit square.
    pub fn clamped(v: Vec2) -> Self {
        Self(v.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)))
    }

    pub fn position(self) -> Vec2 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_centre() {
        let at = |x, y| Pointer::from_cursor(x, y, 800, 600).0;
        assert_eq!(at(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(at(800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(at(400.0, 300.0), Vec2::ZERO);
    }

    #[test]
    fn y_is_inverted() {
        let upper = Pointer::from_cursor(400.0, 100.0, 800, 600);
        assert!(upper.0.y > 0.0);
    }

    #[test]
    fn outside_window_is_clamped() {
        let p = Pointer::from_cursor(-50.0, 900.0, 800, 600);
        assert_eq!(p.0, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn empty_viewport_is_centre() {
        assert_eq!(Pointer::from_cursor(10.0, 10.0, 0, 600), Pointer::CENTER);
    }
}
