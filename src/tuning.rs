//! Data-driven game balance
//!
//! Every number that shapes a round (pool sizes, spawn ranges, fall speed,
//! pointer smoothing, timers) lives here so it can be tweaked from JSON
//! without touching the simulation.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PersistenceError;
use crate::persistence;

/// Solo or two-player duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Solo,
    Duel,
}

impl Mode {
    pub fn player_count(self) -> usize {
        match self {
            Mode::Solo => 1,
            Mode::Duel => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Solo => "solo",
            Mode::Duel => "duel",
        }
    }
}

/// Fall speed range `[min_base + level * min_per_level, max_base + level * max_per_level]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min_base: f32,
    pub max_base: f32,
    pub min_per_level: f32,
    pub max_per_level: f32,
}

impl SpeedRange {
    pub fn bounds(&self, level: u32) -> (f32, f32) {
        let level = level as f32;
        let lo = self.min_base + level * self.min_per_level;
        let hi = self.max_base + level * self.max_per_level;
        (lo, hi.max(lo))
    }
}

/// Pointer smoothing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingProfile {
    /// Moving-average window (frames)
    pub window: usize,
    /// Weight of the previously emitted pointer in the blend
    pub previous_weight: f32,
}

/// Per-mode balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTuning {
    /// Pool target is `min(base_count + level, max_objects)`
    pub base_count: usize,
    pub max_objects: usize,
    /// Spawn height above the top edge
    pub spawn_height_min: u32,
    pub spawn_height_max: u32,
    pub speed: SpeedRange,
    pub smoothing: SmoothingProfile,
    /// Objects are discarded once their top passes `height + despawn_margin`
    pub despawn_margin: f32,
}

impl ModeTuning {
    pub fn solo() -> Self {
        Self {
            base_count: 4,
            max_objects: 5,
            spawn_height_min: 100,
            spawn_height_max: 800,
            speed: SpeedRange {
                min_base: 6.0,
                max_base: 9.0,
                min_per_level: 1.0,
                max_per_level: 1.0,
            },
            smoothing: SmoothingProfile {
                window: 4,
                previous_weight: 0.5,
            },
            despawn_margin: 0.0,
        }
    }

    pub fn duel() -> Self {
        Self {
            base_count: 7,
            max_objects: 18,
            spawn_height_min: 80,
            spawn_height_max: 600,
            speed: SpeedRange {
                min_base: 5.0,
                max_base: 9.0,
                min_per_level: 0.6,
                max_per_level: 1.0,
            },
            smoothing: SmoothingProfile {
                window: 5,
                previous_weight: 0.45,
            },
            despawn_margin: 50.0,
        }
    }

    pub fn target_count(&self, level: u32) -> usize {
        (self.base_count + level as usize).min(self.max_objects)
    }
}

/// Fields present in a mode block; the rest keep that mode's defaults.
///
/// `speed` and `smoothing` are replaced as a whole.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModeOverrides {
    base_count: Option<usize>,
    max_objects: Option<usize>,
    spawn_height_min: Option<u32>,
    spawn_height_max: Option<u32>,
    speed: Option<SpeedRange>,
    smoothing: Option<SmoothingProfile>,
    despawn_margin: Option<f32>,
}

impl ModeOverrides {
    fn apply(self, base: ModeTuning) -> ModeTuning {
        ModeTuning {
            base_count: self.base_count.unwrap_or(base.base_count),
            max_objects: self.max_objects.unwrap_or(base.max_objects),
            spawn_height_min: self.spawn_height_min.unwrap_or(base.spawn_height_min),
            spawn_height_max: self.spawn_height_max.unwrap_or(base.spawn_height_max),
            speed: self.speed.unwrap_or(base.speed),
            smoothing: self.smoothing.unwrap_or(base.smoothing),
            despawn_margin: self.despawn_margin.unwrap_or(base.despawn_margin),
        }
    }
}

fn solo_block<'de, D: Deserializer<'de>>(d: D) -> Result<ModeTuning, D::Error> {
    ModeOverrides::deserialize(d).map(|o| o.apply(ModeTuning::solo()))
}

fn duel_block<'de, D: Deserializer<'de>>(d: D) -> Result<ModeTuning, D::Error> {
    ModeOverrides::deserialize(d).map(|o| o.apply(ModeTuning::duel()))
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    #[serde(deserialize_with = "solo_block")]
    pub solo: ModeTuning,
    #[serde(deserialize_with = "duel_block")]
    pub duel: ModeTuning,
    /// Sprite edge length range (pixels)
    pub size_min: u32,
    pub size_max: u32,
    /// Combined score interval between level-ups
    pub level_up_every: u32,
    /// Solo missed-object ceiling
    pub max_missed: u32,
    /// Length of the GAME OVER banner before the summary card
    pub banner_ms: u64,
    /// Pointer trail window for rendering
    pub trail_ms: u64,
    pub trail_capacity: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            solo: ModeTuning::solo(),
            duel: ModeTuning::duel(),
            size_min: 70,
            size_max: 120,
            level_up_every: 30,
            max_missed: 10,
            banner_ms: 2000,
            trail_ms: 250,
            trail_capacity: 16,
        }
    }
}

impl Tuning {
    pub fn mode(&self, mode: Mode) -> &ModeTuning {
        match mode {
            Mode::Solo => &self.solo,
            Mode::Duel => &self.duel,
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
    fn test_target_count_caps() {
        let t = Tuning::default();
        assert_eq!(t.solo.target_count(1), 5);
        assert_eq!(t.solo.target_count(40), 5);
        assert_eq!(t.duel.target_count(1), 8);
        assert_eq!(t.duel.target_count(11), 18);
        assert_eq!(t.duel.target_count(30), 18);
    }

    #[test]
    fn test_speed_scaling() {
        let t = Tuning::default();
        assert_eq!(t.solo.speed.bounds(1), (7.0, 10.0));
        let (lo, hi) = t.duel.speed.bounds(5);
        assert!((lo - 8.0).abs() < 1e-5);
        assert!((hi - 14.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: Tuning = serde_json::from_str(r#"{ "level_up_every": 10 }"#).unwrap();
        assert_eq!(t.level_up_every, 10);
        assert_eq!(t.max_missed, 10);
        assert_eq!(t.duel, ModeTuning::duel());
    }

    #[test]
    fn test_partial_mode_block_keeps_that_modes_defaults() {
        let t: Tuning = serde_json::from_str(
            r#"{ "duel": { "max_objects": 12 }, "solo": { "despawn_margin": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(t.duel.max_objects, 12);
        assert_eq!(t.duel.base_count, 7);
        assert_eq!(t.duel.smoothing, ModeTuning::duel().smoothing);
        assert_eq!(t.solo.despawn_margin, 5.0);
        assert_eq!(t.solo.max_objects, 5);
        assert_eq!(t.level_up_every, 30);
    }

    #[test]
    fn test_saved_tuning_reloads() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        let t: Tuning = serde_json::from_str(&json).unwrap();
        assert_eq!(t, Tuning::default());
    }
}
