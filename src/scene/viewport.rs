use crate::foundation::core::{Affine, Point, Vec2};
use crate::foundation::error::{PuppetryError, PuppetryResult};

/// Editor pan/zoom: `screen = pan + world * scale`.
///
/// Live UI state; it is not part of the persisted document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pan: Vec2,
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Create a validated viewport (`scale` finite and `> 0`).
    pub fn new(pan: Vec2, scale: f64) -> PuppetryResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PuppetryError::validation("viewport scale must be > 0"));
        }
        Ok(Self { pan, scale })
    }

    /// Screen-space offset of the world origin.
    pub fn pan(self) -> Vec2 {
        self.pan
    }

    /// Zoom factor.
    pub fn scale(self) -> f64 {
        self.scale
    }

    /// World-to-screen transform.
    pub fn transform(self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale)
    }

    /// Map a world point to the screen.
    pub fn world_to_screen(self, p: Point) -> Point {
        Point::new(self.pan.x + p.x * self.scale, self.pan.y + p.y * self.scale)
    }

    /// Map a screen point back to world coordinates.
    pub fn screen_to_world(self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.scale, (p.y - self.pan.y) / self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/viewport.rs"]
mod tests;
