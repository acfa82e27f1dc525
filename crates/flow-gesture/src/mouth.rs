//! Mouth-open detection.

use std::time::{Duration, Instant};

use crate::calibrate::Baseline;
use crate::head::TURN_RANGE;

/// MAR ratio above the baseline that counts as an open mouth.
pub const MOUTH_OPEN_RATIO: f32 = 1.4;

// A turned head stretches the visible mouth outline and inflates the MAR.
const HEAD_SUPPRESS_FRACTION: f32 = 0.7;

const COOLDOWN: Duration = Duration::from_millis(1500);

/// Detects a deliberately opened mouth against the calibrated baseline.
#[derive(Debug, Default)]
pub struct MouthOpenDetector {
    baseline: Baseline,
    last_fired: Option<Instant>,
}

impl MouthOpenDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's MAR and the current head displacement.
    pub fn update(&mut self, mar: f32, head_displacement: f32, now: Instant) -> bool {
        self.baseline.update(mar);
        if head_displacement.abs() > HEAD_SUPPRESS_FRACTION * TURN_RANGE {
            return false;
        }
        if self.baseline.ratio(mar) <= MOUTH_OPEN_RATIO {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now.duration_since(last) < COOLDOWN {
                return false;
            }
        }
        self.last_fired = Some(now);
        tracing::debug!(mar, "Mouth open detected");
        true
    }

    pub fn reset(&mut self) {
        self.baseline.reset();
        self.last_fired = None;
    }
}
