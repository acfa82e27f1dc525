//! Head-turn detection for desktop switching.

use std::time::{Duration, Instant};

/// Horizontal nose displacement that fires a turn.
pub const TURN_RANGE: f32 = 0.15;
/// Displacement below which the head counts as recentered.
pub const RESET_RANGE: f32 = 0.08;

const COOLDOWN: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Detects deliberate head turns from the nose x coordinate.
///
/// The first frame captures the neutral center. A turn past [`TURN_RANGE`]
/// fires once and latches that direction; the same direction cannot fire
/// again until the head comes back within [`RESET_RANGE`]. A swing through
/// to the other side fires the opposite direction without recentering. A
/// cooldown guards against re-trigger during fast movement.
#[derive(Debug, Default)]
pub struct HeadTurnDetector {
    center_x: Option<f32>,
    latched: Option<TurnDirection>,
    last_fired: Option<Instant>,
}

impl HeadTurnDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current displacement from center, 0 before the center is known.
    #[must_use]
    pub fn displacement(&self, nose_x: f32) -> f32 {
        self.center_x.map_or(0.0, |center| nose_x - center)
    }

    /// Feed one frame's nose x coordinate.
    pub fn update(&mut self, nose_x: f32, now: Instant) -> Option<TurnDirection> {
        let Some(center) = self.center_x else {
            self.center_x = Some(nose_x);
            return None;
        };
        let delta = nose_x - center;

        if delta.abs() < RESET_RANGE {
            self.latched = None;
            return None;
        }
        if delta.abs() < TURN_RANGE {
            return None;
        }
        // Mirrored camera: nose moving +x on screen is a turn to the left.
        let direction = if delta > 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        };
        if self.latched == Some(direction) {
            return None;
        }
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < COOLDOWN {
                return None;
            }
        }

        self.latched = Some(direction);
        self.last_fired = Some(now);
        tracing::debug!(?direction, delta, "Head turn detected");
        Some(direction)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_sets_center_without_firing() {
        let mut detector = HeadTurnDetector::new();
        assert_eq!(detector.update(0.5, Instant::now()), None);
        assert!((detector.displacement(0.6) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn turn_past_range_fires_once() {
        let mut detector = HeadTurnDetector::new();
        let t0 = Instant::now();
        detector.update(0.5, t0);
        assert_eq!(detector.update(0.7, t0), Some(TurnDirection::Left));
        // Still displaced: latched, no refire.
        assert_eq!(detector.update(0.72, t0 + Duration::from_secs(3)), None);
    }

    #[test]
    fn recentering_rearms_after_cooldown() {
        let mut detector = HeadTurnDetector::new();
        let t0 = Instant::now();
        detector.update(0.5, t0);
        detector.update(0.7, t0);

        // Back within the reset band unlatches.
        assert_eq!(detector.update(0.52, t0 + Duration::from_secs(2)), None);
        assert_eq!(
            detector.update(0.3, t0 + Duration::from_secs(4)),
            Some(TurnDirection::Right)
        );
    }

    #[test]
    fn cooldown_blocks_rapid_refire() {
        let mut detector = HeadTurnDetector::new();
        let t0 = Instant::now();
        detector.update(0.5, t0);
        detector.update(0.7, t0);
        detector.update(0.5, t0 + Duration::from_millis(100));
        // Recentered but still inside the cooldown window.
        assert_eq!(detector.update(0.3, t0 + Duration::from_millis(200)), None);
    }

    #[test]
    fn opposite_swing_fires_without_recentering() {
        let mut detector = HeadTurnDetector::new();
        let t0 = Instant::now();
        detector.update(0.5, t0);
        assert_eq!(detector.update(0.7, t0), Some(TurnDirection::Left));
        // Swings straight through to the other side: the latch only blocks
        // a repeat of the same direction.
        assert_eq!(
            detector.update(0.3, t0 + Duration::from_secs(2)),
            Some(TurnDirection::Right)
        );
    }

    #[test]
    fn partial_displacement_does_not_fire() {
        let mut detector = HeadTurnDetector::new();
        let t0 = Instant::now();
        detector.update(0.5, t0);
        assert_eq!(detector.update(0.6, t0), None);
    }
}
