//! Baseline calibration.
//!
//! Every ratio detector compares against a per-user baseline learned in the
//! first seconds of a session rather than a fixed constant.

/// Frames absorbed before a baseline freezes.
pub const CALIBRATION_FRAMES: u32 = 30;

const BLEND: f32 = 0.1;

/// Exponential-moving-average baseline for a scalar ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline {
    value: f32,
    frames: u32,
}

impl Baseline {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0.0,
            frames: 0,
        }
    }

    /// Feed one sample. The first seeds the baseline; later samples blend in
    /// until [`CALIBRATION_FRAMES`] have been absorbed, after which samples
    /// are ignored.
    pub fn update(&mut self, sample: f32) {
        if self.frames >= CALIBRATION_FRAMES {
            return;
        }
        if self.frames == 0 {
            self.value = sample;
        } else {
            self.value = (1.0 - BLEND).mul_add(self.value, BLEND * sample);
        }
        self.frames += 1;
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.frames >= CALIBRATION_FRAMES
    }

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Sample relative to the baseline; 0 until calibration completes or if
    /// the baseline is degenerate.
    #[must_use]
    pub fn ratio(&self, sample: f32) -> f32 {
        if !self.is_calibrated() || self.value <= f32::EPSILON {
            return 0.0;
        }
        sample / self.value
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_baseline() {
        let mut baseline = Baseline::new();
        baseline.update(0.3);
        assert!((baseline.value() - 0.3).abs() < 1e-6);
        assert!(!baseline.is_calibrated());
    }

    #[test]
    fn converges_toward_steady_input() {
        let mut baseline = Baseline::new();
        baseline.update(0.2);
        for _ in 0..CALIBRATION_FRAMES - 1 {
            baseline.update(0.3);
        }
        assert!(baseline.is_calibrated());
        assert!((baseline.value() - 0.3).abs() < 0.01);
    }

    #[test]
    fn freezes_after_calibration_window() {
        let mut baseline = Baseline::new();
        for _ in 0..CALIBRATION_FRAMES {
            baseline.update(0.3);
        }
        let frozen = baseline.value();
        baseline.update(5.0);
        assert!((baseline.value() - frozen).abs() < f32::EPSILON);
    }

    #[test]
    fn ratio_requires_calibration() {
        let mut baseline = Baseline::new();
        baseline.update(0.3);
        assert_eq!(baseline.ratio(0.6), 0.0);

        for _ in 0..CALIBRATION_FRAMES {
            baseline.update(0.3);
        }
        assert!((baseline.ratio(0.6) - 2.0).abs() < 0.01);
    }

    #[test]
    fn reset_starts_over() {
        let mut baseline = Baseline::new();
        for _ in 0..CALIBRATION_FRAMES {
            baseline.update(0.3);
        }
        baseline.reset();
        assert!(!baseline.is_calibrated());
        assert_eq!(baseline.value(), 0.0);
    }
}
