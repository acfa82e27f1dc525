//! Eye-driven gestures: wide eyes and winks.

use std::time::{Duration, Instant};

use crate::calibrate::Baseline;

/// Average-EAR ratio above the baseline that counts as wide eyes.
pub const WIDE_EYES_RATIO: f32 = 1.25;

const WIDE_EYES_COOLDOWN: Duration = Duration::from_millis(1500);

/// EAR below this is a closed eye.
pub const WINK_CLOSED_EAR: f32 = 0.28;
/// The open eye must exceed the closed threshold by this margin.
pub const WINK_EYE_DIFF: f32 = 0.12;
/// Winks are ignored while the head is rotated this far off the eye axis.
pub const WINK_ROTATION_LIMIT: f32 = 0.02;

const WINK_COOLDOWN: Duration = Duration::from_millis(800);

/// Detects deliberate eye widening against the calibrated baseline.
#[derive(Debug, Default)]
pub struct WideEyesDetector {
    baseline: Baseline,
    last_fired: Option<Instant>,
}

impl WideEyesDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the average EAR of both eyes for one frame.
    pub fn update(&mut self, avg_ear: f32, now: Instant) -> bool {
        self.baseline.update(avg_ear);
        if self.baseline.ratio(avg_ear) <= WIDE_EYES_RATIO {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < WIDE_EYES_COOLDOWN {
                return false;
            }
        }
        self.last_fired = Some(now);
        tracing::debug!(avg_ear, "Wide eyes detected");
        true
    }

    pub fn reset(&mut self) {
        self.baseline.reset();
        self.last_fired = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinkSide {
    Left,
    Right,
}

/// Detects single-eye winks, filtering out head rotation.
///
/// A turned head narrows the camera-far eye enough to fake a wink, so
/// detection is suppressed whenever the nose sits off the midpoint of the
/// eye axis.
#[derive(Debug, Default)]
pub struct WinkDetector {
    last_left: Option<Instant>,
    last_right: Option<Instant>,
}

impl WinkDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's per-eye EARs and the nose offset from the eye-axis
    /// midpoint.
    pub fn update(
        &mut self,
        left_ear: f32,
        right_ear: f32,
        head_rotation: f32,
        now: Instant,
    ) -> Option<WinkSide> {
        if head_rotation.abs() > WINK_ROTATION_LIMIT {
            return None;
        }

        let open_floor = WINK_CLOSED_EAR + WINK_EYE_DIFF;
        let side = if left_ear < WINK_CLOSED_EAR && right_ear > open_floor {
            WinkSide::Left
        } else if right_ear < WINK_CLOSED_EAR && left_ear > open_floor {
            WinkSide::Right
        } else {
            return None;
        };

        let last = match side {
            WinkSide::Left => &mut self.last_left,
            WinkSide::Right => &mut self.last_right,
        };
        if let Some(at) = *last {
            if now.duration_since(at) < WINK_COOLDOWN {
                return None;
            }
        }
        *last = Some(now);
        tracing::debug!(?side, "Wink detected");
        Some(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::CALIBRATION_FRAMES;

    fn calibrated_wide_eyes(ear: f32) -> WideEyesDetector {
        let mut detector = WideEyesDetector::new();
        let t0 = Instant::now();
        for _ in 0..CALIBRATION_FRAMES {
            assert!(!detector.update(ear, t0));
        }
        detector
    }

    #[test]
    fn wide_eyes_needs_calibration_first() {
        let mut detector = WideEyesDetector::new();
        // Huge EAR during calibration must not fire.
        assert!(!detector.update(0.9, Instant::now()));
    }

    #[test]
    fn wide_eyes_fires_above_ratio() {
        let mut detector = calibrated_wide_eyes(0.3);
        let now = Instant::now();
        assert!(!detector.update(0.35, now));
        assert!(detector.update(0.42, now));
    }

    #[test]
    fn wide_eyes_respects_cooldown() {
        let mut detector = calibrated_wide_eyes(0.3);
        let t0 = Instant::now();
        assert!(detector.update(0.42, t0));
        assert!(!detector.update(0.42, t0 + Duration::from_millis(500)));
        assert!(detector.update(0.42, t0 + Duration::from_secs(2)));
    }

    #[test]
    fn left_wink_detected() {
        let mut detector = WinkDetector::new();
        assert_eq!(
            detector.update(0.15, 0.45, 0.0, Instant::now()),
            Some(WinkSide::Left)
        );
    }

    #[test]
    fn blink_is_not_a_wink() {
        let mut detector = WinkDetector::new();
        assert_eq!(detector.update(0.15, 0.18, 0.0, Instant::now()), None);
    }

    #[test]
    fn narrow_open_eye_is_rejected() {
        // Open eye above the closed line but below the diff margin.
        let mut detector = WinkDetector::new();
        assert_eq!(detector.update(0.15, 0.35, 0.0, Instant::now()), None);
    }

    #[test]
    fn rotated_head_suppresses_winks() {
        let mut detector = WinkDetector::new();
        assert_eq!(detector.update(0.15, 0.45, 0.05, Instant::now()), None);
    }

    #[test]
    fn per_side_cooldowns_are_independent() {
        let mut detector = WinkDetector::new();
        let t0 = Instant::now();
        assert_eq!(detector.update(0.15, 0.45, 0.0, t0), Some(WinkSide::Left));
        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(detector.update(0.15, 0.45, 0.0, t1), None);
        assert_eq!(detector.update(0.45, 0.15, 0.0, t1), Some(WinkSide::Right));
        assert_eq!(
            detector.update(0.15, 0.45, 0.0, t0 + Duration::from_secs(1)),
            Some(WinkSide::Left)
        );
    }
}
