//! Gesture/pointer mode state machine.

use std::time::{Duration, Instant};

use crate::actions::GestureAction;
use crate::eyes::{WideEyesDetector, WinkDetector, WinkSide};
use crate::geometry::{eye_aspect_ratio, mouth_aspect_ratio, FrameLandmarks};
use crate::head::{HeadTurnDetector, TurnDirection};
use crate::mouth::MouthOpenDetector;
use crate::pointer::PointerMapper;

const TOGGLE_COOLDOWN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Head turns switch desktops, wide eyes open Mission Control.
    Gesture,
    /// The nose drives the cursor, winks click.
    Pointer,
}

/// Per-frame dispatcher wiring the detectors to the active mode.
///
/// Gesture mode: head turns switch desktops, wide eyes open Mission
/// Control, an open mouth or a left wink switches to pointer mode.
///// Pointer mode: the nose drives the cursor, a right wink clicks, a left
/// wink switches back. Entering a mode recalibrates its detectors.
pub struct GestureController {
    mode: Mode,
    last_toggle: Option<Instant>,
    head: HeadTurnDetector,
    wide_eyes: WideEyesDetector,
    mouth: MouthOpenDetector,
    wink: WinkDetector,
    pointer: PointerMapper,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: Mode::Gesture,
            last_toggle: None,
            head: HeadTurnDetector::new(),
            wide_eyes: WideEyesDetector::new(),
            mouth: MouthOpenDetector::new(),
            wink: WinkDetector::new(),
            pointer: PointerMapper::new(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Process one frame of landmarks.
    pub fn update(&mut self, frame: &FrameLandmarks, now: Instant) -> Vec<GestureAction> {
        let (Some(left), Some(right), Some(mouth), Some(nose), Some(eye_center)) = (
            frame.left_eye(),
            frame.right_eye(),
            frame.mouth(),
            frame.nose(),
            frame.eye_center(),
        ) else {
            return Vec::new();
        };

        let left_ear = eye_aspect_ratio(&left);
        let right_ear = eye_aspect_ratio(&right);
        let mar = mouth_aspect_ratio(&mouth);
        let head_rotation = nose.x - eye_center.x;

        let mut actions = Vec::new();
        let wink = self.wink.update(left_ear, right_ear, head_rotation, now);

        if wink == Some(WinkSide::Left) {
            if self.toggle(now) {
                actions.push(GestureAction::ToggleMode);
            }
            return actions;
        }

        match self.mode {
            Mode::Gesture => {
                let displacement = self.head.displacement(nose.x);
                if let Some(direction) = self.head.update(nose.x, now) {
                    actions.push(match direction {
                        TurnDirection::Left => GestureAction::PrevDesktop,
                        TurnDirection::Right => GestureAction::NextDesktop,
                    });
                }
                if self.wide_eyes.update((left_ear + right_ear) / 2.0, now) {
                    actions.push(GestureAction::MissionControl);
                }
                if self.mouth.update(mar, displacement, now) && self.toggle(now) {
                    actions.push(GestureAction::ToggleMode);
                }
            }
            Mode::Pointer => {
                if let Some((x, y)) = self.pointer.update(nose) {
                    actions.push(GestureAction::MoveCursor { x, y });
                }
                if wink == Some(WinkSide::Right) {
                    actions.push(GestureAction::LeftClick);
                }
            }
        }
        actions
    }

    fn toggle(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_toggle {
            if now.duration_since(last) < TOGGLE_COOLDOWN {
                return false;
            }
        }
        self.last_toggle = Some(now);
        self.mode = match self.mode {
            Mode::Gesture => {
                self.pointer.reset();
                Mode::Pointer
            }
            Mode::Pointer => {
                self.head.reset();
                self.wide_eyes.reset();
                self.mouth.reset();
                Mode::Gesture
            }
        };
        tracing::info!(mode = ?self.mode, "Mode switched");
        true
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}
