//! Facial gesture detection.
//!
//! Consumes face-mesh landmarks (from any MediaPipe-compatible producer)
//! and turns them into desktop actions: head turns switch desktops, winks
//! click, the nose drives the cursor in pointer mode. All thresholds are
//! relative to per-user baselines calibrated at session start, and every
//! detector takes its timestamps as parameters so tests control the clock.

pub mod actions;
pub mod calibrate;
pub mod controller;
pub mod eyes;
pub mod geometry;
pub mod head;
pub mod mouth;
pub mod pointer;

pub use actions::{CommandTemplates, DesktopControl, GestureAction, ShellControl};
pub use calibrate::Baseline;
pub use controller::{GestureController, Mode};
pub use eyes::{WideEyesDetector, WinkDetector, WinkSide};
pub use geometry::{eye_aspect_ratio, mouth_aspect_ratio, FrameLandmarks, Point};
pub use head::{HeadTurnDetector, TurnDirection};
pub use mouth::MouthOpenDetector;
pub use pointer::PointerMapper;
