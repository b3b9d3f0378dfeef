//! Player settings and preferences
//!
//! Persisted as JSON next to the game, separate from tuning and score history.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play field ===
    /// Play-field width in pixels
    pub play_width: f32,
    /// Play-field height in pixels
    pub play_height: f32,
    /// Mirror camera input horizontally (selfie view)
    pub mirror_camera: bool,
    /// Simulation ticks per second
    pub tick_rate_hz: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Assets ===
    pub sprite_dir: PathBuf,
    /// Sound folders, first existing one wins
    pub sound_dirs: Vec<PathBuf>,
    /// Score history file
    pub score_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            play_width: 1280.0,
            play_height: 720.0,
            mirror_camera: true,
            tick_rate_hz: 20,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            sprite_dir: PathBuf::from("assets/images"),
            sound_dirs: vec![
                PathBuf::from("assets/sounds"),
                PathBuf::from("ninja_fruit_sounds"),
            ],
            score_file: PathBuf::from("game_data.json"),
        }
    }
}

impl Settings {
    /// Duration of one tick in milliseconds
    pub fn tick_ms(&self) -> u64 {
        1000 / u64::from(self.tick_rate_hz.max(1))
    }

    /// Effective sfx volume (respects mute)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    pub fn load(path: &Path) -> Self {
        persistence::load_json_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::save_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.tick_ms(), 50);
        assert!((s.effective_volume() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_mute_silences() {
        let s = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(s.effective_volume(), 0.0);
    }

    #[test]
    fn test_settings_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("hand_slice_settings_{}", std::process::id()))
            .join("settings.json");
        let s = Settings {
            play_width: 800.0,
            tick_rate_hz: 30,
            ..Default::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path), s);
        let _ = std::fs::remove_file(&path);
    }
}
