use glam::Vec2;

/// World-space viewport dimensions, in game units.
///
/// The host reports its canvas size here; zones relayout against it and
/// ruled spawns place entities inside it. Resizing mid-session is safe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn set(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Center of the viewport.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Convert a fractional position (0..1 on both axes) to world space.
    pub fn at(&self, fx: f32, fy: f32) -> Vec2 {
        Vec2::new(fx * self.width, fy * self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
