//! Nose-to-cursor mapping for pointer mode.

use crate::calibrate::Baseline;
use crate::geometry::Point;

/// Side length of the face box the nose moves the cursor within.
pub const FACE_BOX: f32 = 0.3;
/// Gain applied around the screen center.
pub const SENSITIVITY: f32 = 1.5;
/// Output smoothing factor; higher follows the nose faster.
pub const SMOOTHING: f32 = 0.3;

/// Maps nose position to a normalized screen coordinate.
///
/// The neutral position is learned over the calibration window, then head
/// movement inside a [`FACE_BOX`]-sized region pans the cursor across the
/// whole screen. Coordinates are expected pre-mirrored, so moving the head
/// right moves the cursor right.
#[derive(Debug, Default)]
pub struct PointerMapper {
    center_x: Baseline,
    center_y: Baseline,
    smoothed: Option<(f32, f32)>,
}

impl PointerMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        self.center_x.is_calibrated() && self.center_y.is_calibrated()
    }

    /// Feed one frame's nose position; yields a cursor position in
    /// `[0, 1] x [0, 1]` once calibrated.
    pub fn update(&mut self, nose: Point) -> Option<(f32, f32)> {
        if !self.is_calibrated() {
            self.center_x.update(nose.x);
            self.center_y.update(nose.y);
            return None;
        }

        let rel_x = ((nose.x - self.center_x.value()) / FACE_BOX).clamp(-1.0, 1.0);
        let rel_y = ((nose.y - self.center_y.value()) / FACE_BOX).clamp(-1.0, 1.0);

        let target_x = rel_x.mul_add(0.5 * SENSITIVITY, 0.5).clamp(0.0, 1.0);
        let target_y = rel_y.mul_add(0.5 * SENSITIVITY, 0.5).clamp(0.0, 1.0);

        let (x, y) = match self.smoothed {
            Some((px, py)) => (
                (target_x - px).mul_add(SMOOTHING, px),
                (target_y - py).mul_add(SMOOTHING, py),
            ),
            None => (target_x, target_y),
        };
        self.smoothed = Some((x, y));
        Some((x, y))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
