//! Camera and hand-tracking collaborators
//!
//! The game never decodes camera frames or runs landmark inference itself.
//! It consumes them through [`CameraSource`] and [`GestureTracker`] and only
//! reads the index fingertip out of each detection.

pub mod assign;
pub mod smoother;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Mode;

pub use assign::assign_hands;
pub use smoother::{PointerSmoother, PointerTrail, TrailPoint};

/// Landmark index of the index fingertip in a 21-point hand model
pub const INDEX_FINGER_TIP: usize = 8;

/// Number of landmarks in a full hand detection
pub const HAND_LANDMARKS: usize = 21;

/// One landmark in normalized camera coordinates (0..1 on each axis)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// One detected hand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub landmarks: Vec<Landmark>,
}

impl HandDetection {
    /// Detection with only the fingertip filled in, every other landmark at the origin
    pub fn from_fingertip(tip: Landmark) -> Self {
        let mut landmarks = vec![Landmark::default(); HAND_LANDMARKS];
        landmarks[INDEX_FINGER_TIP] = tip;
        Self { landmarks }
    }

    pub fn index_tip(&self) -> Option<Landmark> {
        self.landmarks.get(INDEX_FINGER_TIP).copied()
    }
}

/// A captured camera frame. Pixel layout is the tracker's business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }
}

/// Live camera feed
pub trait CameraSource {
    /// Device was opened successfully
    fn is_opened(&self) -> bool {
        true
    }
    /// Next frame, or `None` when the read failed (the tick is skipped)
    fn read(&mut self) -> Option<Frame>;
    /// Release the device
    fn release(&mut self);
}

/// Hand-landmark inference.
///
/// Failures and empty frames yield an empty list, never an error.
pub trait GestureTracker {
    /// Apply the mode's settings before the first frame.
    ///
    /// An error here means the model could not be loaded.
    fn configure(&mut self, _config: &TrackerConfig) -> Result<(), String> {
        Ok(())
    }
    fn detect(&mut self, frame: &Frame) -> Vec<HandDetection>;
    fn close(&mut self);
}

/// Parameters handed to the tracker when it is opened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub max_hands: usize,
    pub detection_confidence: f32,
    pub tracking_confidence: f32,
}

impl TrackerConfig {
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            max_hands: mode.player_count(),
            detection_confidence: 0.4,
            tracking_confidence: 0.4,
        }
    }
}

/// Affine camera-to-play-field mapping (`play_dim / camera_dim` per axis)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMapping {
    pub camera: Vec2,
    pub scale: Vec2,
    pub mirror: bool,
}

impl FieldMapping {
    pub fn new(camera_width: u32, camera_height: u32, play: Vec2, mirror: bool) -> Self {
        let camera = Vec2::new(camera_width.max(1) as f32, camera_height.max(1) as f32);
        Self {
            camera,
            scale: play / camera,
            mirror,
        }
    }

    /// Play-field position of a normalized landmark
    pub fn map(&self, landmark: Landmark) -> Vec2 {
        let x = if self.mirror { 1.0 - landmark.x } else { landmark.x };
        Vec2::new(x, landmark.y) * self.camera * self.scale
    }

    /// Fingertips of up to `max_hands` detections, in detection order
    pub fn fingertips(&self, detections: &[HandDetection], max_hands: usize) -> Vec<Vec2> {
        detections
            .iter()
            .take(max_hands)
            .filter_map(HandDetection::index_tip)
            .map(|tip| self.map(tip))
            .collect()
    }
}
