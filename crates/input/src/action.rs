use glam::Vec2;

/// A high-level action any host (window, headless driver, test) can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pointer moved; coordinates already normalized to `[-1, 1]²`.
    PointerMoved(Vec2),
    /// Output surface changed size, in physical pixels.
    Resized { width: u32, height: u32 },
    /// Show or hide the diagnostic overlay.
    ToggleHud,
    /// Leave the application.
    Quit,
    /// Input that maps to nothing.
    Noop,
}
