//! Fixed-rate simulation tick
//!
//! One call per camera frame: phase timers, pointer tracking, slicing,
//! falling, miss accounting, then pool refill.

use glam::Vec2;

use super::slice::apply_slices;
use super::spawn;
use super::state::{GameEvent, GamePhase, PlayerId, SessionState};
use crate::catalog::Catalog;
use crate::tracking::assign_hands;
use crate::tuning::Mode;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Monotonic frame-clock time (ms)
    pub now_ms: u64,
    /// Fingertips detected this frame, already mapped into the play field,
    /// in detection order
    pub hands: Vec<Vec2>,
    /// Restart request (honoured only once the round is over)
    pub restart: bool,
}

/// Advance the session by one tick
pub fn tick(state: &mut SessionState, input: &TickInput, catalog: &mut Catalog) {
    let now = input.now_ms;
    state.events.clear();

    if input.restart {
        if state.game_over() {
            state.restart(catalog, now);
        } else {
            log::debug!("Restart ignored while the round is running");
        }
    }

    if state.phase == GamePhase::GameOverBanner
        && now.saturating_sub(state.phase_entered_ms) >= state.tuning.banner_ms
    {
        state.enter_phase(GamePhase::GameOverSummary, now);
    }

    if state.phase == GamePhase::Running {
        match state.mode {
            Mode::Solo => track_solo(state, &input.hands, now),
            Mode::Duel => track_duel(state, &input.hands, now),
        }
    }

    advance_objects(state, now);
    spawn::refill(state, catalog);

    for player in &mut state.players {
        player.trail.prune(now);
    }
}

/// Solo: each fresh hand is smoothed and slices immediately. The very first
/// sample after a reset only seeds the smoother.
fn track_solo(state: &mut SessionState, hands: &[Vec2], now: u64) {
    for &raw in hands {
        let player = &mut state.players[PlayerId::One.index()];
        let primed = player.pointer.is_some();
        let pointer = player.track(raw, now);
        if primed {
            apply_slices(state, [Some(pointer), None], now);
        }
        if state.game_over() {
            break;
        }
    }
}

/// Duel: hands are split by screen half, then every living player slices
/// with their latest pointer, fresh or not.
fn track_duel(state: &mut SessionState, hands: &[Vec2], now: u64) {
    let alive = PlayerId::ALL.map(|id| state.is_alive(id));
    let assigned = assign_hands(hands, state.midline(), alive);

    for id in PlayerId::ALL {
        if let Some(raw) = assigned[id.index()] {
            state.players[id.index()].track(raw, now);
        }
    }

    let pointers = PlayerId::ALL.map(|id| {
        state
            .player(id)
            .filter(|p| p.alive)
            .and_then(|p| p.pointer)
    });
    apply_slices(state, pointers, now);
}

/// Move live objects down and retire the ones past the bottom.
///
/// Solo counts a missed safe object once; hazards fall away for free.
/// Counting stops at the miss ceiling and whenever the round is over.
fn advance_objects(state: &mut SessionState, now: u64) {
    let bottom = state.height + state.mode_tuning().despawn_margin;
    let max_missed = state.tuning.max_missed;
    let mut counting = state.mode == Mode::Solo && state.phase == GamePhase::Running;
    let mut ceiling_hit = false;

    for obj in state.objects.iter_mut().filter(|o| o.is_live()) {
        obj.pos.y += obj.fall_speed;
        if obj.pos.y <= bottom || obj.counted {
            continue;
        }
        obj.alive = false;
        obj.counted = true;

        if counting && !obj.is_hazard {
            state.missed += 1;
            state.events.push(GameEvent::Missed {
                missed: state.missed,
            });
            if state.missed >= max_missed {
                counting = false;
                ceiling_hit = true;
            }
        }
    }

    if ceiling_hit {
        log::info!("Missed {} objects, round over", state.missed);
        state.enter_phase(GamePhase::GameOverBanner, now);
    }
}
