//! Slice resolution
//!
//! Tests pointers against live objects and applies what a hit means:
//! points and level-ups for safe objects, elimination or game over for
//! hazards.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, PlayerId, SessionState};
use crate::tuning::Mode;

/// Slice every live object under an active pointer.
///
/// Objects are visited in pool order and players in id order, so when both
/// pointers cover the same object player one claims it. Nothing happens once
/// the round is over, including later in the same call.
///
/// Returns the number of objects cut.
pub fn apply_slices(state: &mut SessionState, pointers: [Option<Vec2>; 2], now_ms: u64) -> usize {
    let mut cuts = 0;

    for i in 0..state.objects.len() {
        if state.game_over() {
            break;
        }
        if !state.objects[i].is_live() {
            continue;
        }

        let hitter = PlayerId::ALL.into_iter().find(|&id| {
            state.is_alive(id)
                && pointers[id.index()].is_some_and(|p| state.objects[i].hit_by(p))
        });
        let Some(player) = hitter else {
            continue;
        };

        state.objects[i].cut = true;
        cuts += 1;
        if state.objects[i].is_hazard {
            hazard_hit(state, player, now_ms);
        } else {
            safe_hit(state, player);
        }
    }

    cuts
}

fn safe_hit(state: &mut SessionState, player: PlayerId) {
    state.players[player.index()].score += 1;
    state.events.push(GameEvent::Sliced { player });

    let every = state.tuning.level_up_every;
    let total = state.total_score();
    if every > 0 && total % every == 0 {
        state.level += 1;
        state.events.push(GameEvent::LevelUp { level: state.level });
        log::info!("Level up! {} (total score {})", state.level, total);
    }
}

fn hazard_hit(state: &mut SessionState, player: PlayerId, now_ms: u64) {
    state.events.push(GameEvent::HazardHit { player });

    match state.mode {
        Mode::Solo => {
            log::info!("Hazard sliced, round over at score {}", state.total_score());
            state.enter_phase(GamePhase::GameOverBanner, now_ms);
        }
        Mode::Duel => {
            state.players[player.index()].eliminate();
            state.events.push(GameEvent::Eliminated { player });
            log::info!("Player {} eliminated", player.index() + 1);
            if !state.is_alive(player.other()) {
                state.enter_phase(GamePhase::GameOverBanner, now_ms);
            }
        }
    }
}
