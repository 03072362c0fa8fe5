use crate::foundation::error::{PuppetryError, PuppetryResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index on the document timeline.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Frame `0`.
    pub const ZERO: Self = Self(0);

    /// Add `frames` with saturating arithmetic.
    pub fn saturating_add(self, frames: u64) -> Self {
        Self(self.0.saturating_add(frames))
    }
}

/// Timeline playback rate in frames per second.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fps(f64);

impl Fps {
    /// 24 frames per second.
    pub const FILM: Self = Self(24.0);

    /// Create a validated frame rate (finite and `> 0`).
    pub fn new(fps: f64) -> PuppetryResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(PuppetryError::validation("fps must be a finite number > 0"));
        }
        Ok(Self(fps))
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 / self.0
    }

    /// Whole frames contained in `elapsed_ms` (floor semantics, negative input yields 0).
    pub fn whole_frames_in_ms(self, elapsed_ms: f64) -> u64 {
        (elapsed_ms * self.0 / 1000.0).floor().max(0.0) as u64
    }
}

impl TryFrom<f64> for Fps {
    type Error = PuppetryError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Fps> for f64 {
    fn from(value: Fps) -> Self {
        value.0
    }
}

/// Width/height pair in world units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size2 {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size2 {
    /// Build a size from its components.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The rectangle `(0, 0) .. (width, height)`.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Return `true` when both sides are finite and strictly positive.
    pub fn is_positive(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
