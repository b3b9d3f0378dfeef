//! Object spawning and pool maintenance
//!
//! Solo objects drop anywhere across the field. Duel objects are biased into
//! the half of each player still standing so that an eliminated player's
//! side goes quiet.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{FallingObject, PlayerId, SessionState};
use crate::catalog::Catalog;
use crate::tuning::Mode;

/// Horizontal spawn region in a duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Right,
    Full,
}

/// Solo margins: x is drawn from `[SOLO_LEFT_MARGIN, width - SOLO_RIGHT_MARGIN]`
pub const SOLO_LEFT_MARGIN: i32 = 100;
pub const SOLO_RIGHT_MARGIN: i32 = 150;

/// Integer x ranges (inclusive) of the duel lanes for a given field width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneBounds {
    pub left: (i32, i32),
    pub right: (i32, i32),
    pub full: (i32, i32),
}

impl LaneBounds {
    pub fn for_width(width: f32) -> Self {
        let w = width as i32;
        let half = w / 2;
        let left = (60, (half - 120).max(120));
        let right = ((half + 40).min(w - 300), w - 120);
        Self {
            left,
            right,
            full: (left.0, right.1),
        }
    }

    pub fn range(&self, lane: Lane) -> (i32, i32) {
        match lane {
            Lane::Left => self.left,
            Lane::Right => self.right,
            Lane::Full => self.full,
        }
    }
}

/// Pick a lane from who is still alive
pub fn choose_lane<R: Rng + ?Sized>(alive: [bool; 2], rng: &mut R) -> Lane {
    match alive {
        [true, true] => {
            if rng.random_bool(0.5) {
                Lane::Left
            } else {
                Lane::Right
            }
        }
        [true, false] => Lane::Left,
        [false, true] => Lane::Right,
        [false, false] => Lane::Full,
    }
}

/// Uniform integer in `[lo, hi]`, collapsing an inverted range to `lo`
fn sample_i32<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    rng.random_range(lo..=hi.max(lo))
}

/// Create one new object above the visible area
pub fn spawn_object(state: &mut SessionState, catalog: &mut Catalog) -> FallingObject {
    let tuning = state.mode_tuning();
    let (speed_lo, speed_hi) = tuning.speed.bounds(state.level);
    let (h_min, h_max) = (tuning.spawn_height_min, tuning.spawn_height_max);
    let (size_min, size_max) = (state.tuning.size_min, state.tuning.size_max);
    let alive = [
        state.is_alive(PlayerId::One),
        state.is_alive(PlayerId::Two),
    ];
    let (x_lo, x_hi) = match state.mode {
        Mode::Solo => (SOLO_LEFT_MARGIN, state.width as i32 - SOLO_RIGHT_MARGIN),
        Mode::Duel => {
            let lane = choose_lane(alive, &mut state.rng);
            LaneBounds::for_width(state.width).range(lane)
        }
    };

    let rng = &mut state.rng;
    let sprite = catalog.pick(rng);
    let size = rng.random_range(size_min..=size_max.max(size_min));
    let x = sample_i32(rng, x_lo, x_hi) as f32;
    let y = -(rng.random_range(h_min..=h_max.max(h_min)) as f32);
    let fall_speed = rng.random_range(speed_lo..=speed_hi);

    let extent = catalog
        .resize(sprite, size)
        .map(|b| Vec2::new(b.width as f32, b.height as f32))
        .unwrap_or(Vec2::splat(size as f32));

    FallingObject::new(
        sprite,
        catalog.is_hazard(sprite),
        Vec2::new(x, y),
        extent,
        fall_speed,
    )
}

/// Top the pool up to the level target, then replace every inert slot in place.
///
/// Returns how many objects were created.
pub fn refill(state: &mut SessionState, catalog: &mut Catalog) -> usize {
    let target = state.target_count();
    let mut created = 0;

    while state.objects.len() < target {
        let obj = spawn_object(state, catalog);
        state.objects.push(obj);
        created += 1;
    }

    for i in 0..state.objects.len() {
        if state.objects[i].is_inert() {
            state.objects[i] = spawn_object(state, catalog);
            created += 1;
        }
    }

    created
}
