//! Read-only view of a session for whoever draws it

use glam::Vec2;
use serde::Serialize;

use super::state::{GamePhase, PlayerId, SessionState};
use crate::catalog::SpriteId;
use crate::tracking::TrailPoint;
use crate::tuning::Mode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectView {
    pub sprite: SpriteId,
    pub pos: Vec2,
    pub extent: Vec2,
    pub is_hazard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub alive: bool,
    pub score: u32,
    pub pointer: Option<Vec2>,
    /// Pointer came from a detection in this frame (vs. held over)
    pub fresh: bool,
    pub trail: Vec<TrailPoint>,
}

/// Everything a frame needs: live objects, scores, pointers and trails,
/// and what overlay to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub phase: GamePhase,
    pub level: u32,
    pub missed: u32,
    pub max_missed: u32,
    pub objects: Vec<ObjectView>,
    pub players: Vec<PlayerView>,
    /// Time left on the GAME OVER banner
    pub banner_remaining_ms: Option<u64>,
    /// Duel divider x
    pub midline: Option<f32>,
}

pub fn snapshot(state: &SessionState, now_ms: u64) -> Snapshot {
    let objects = state
        .objects
        .iter()
        .filter(|o| o.is_live())
        .map(|o| ObjectView {
            sprite: o.sprite,
            pos: o.pos,
            extent: o.extent,
            is_hazard: o.is_hazard,
        })
        .collect();

    let players = PlayerId::ALL
        .into_iter()
        .zip(&state.players)
        .map(|(id, p)| PlayerView {
            id,
            alive: p.alive,
            score: p.score,
            pointer: p.pointer,
            fresh: p.last_seen_ms == Some(now_ms),
            trail: p.trail.points(),
        })
        .collect();

    let banner_remaining_ms = (state.phase == GamePhase::GameOverBanner).then(|| {
        let elapsed = now_ms.saturating_sub(state.phase_entered_ms);
        state.tuning.banner_ms.saturating_sub(elapsed)
    });

    Snapshot {
        mode: state.mode,
        phase: state.phase,
        level: state.level,
        missed: state.missed,
        max_missed: state.tuning.max_missed,
        objects,
        players,
        banner_remaining_ms,
        midline: (state.mode == Mode::Duel).then(|| state.midline()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Bitmap, Catalog, SpriteAsset};
    use crate::tuning::Tuning;

    fn state(mode: Mode) -> SessionState {
        let mut cat = Catalog::from_assets(vec![SpriteAsset::new(
            "lime.png",
            Bitmap::filled(4, 4, [0, 200, 0, 255]),
        )])
        .unwrap();
        SessionState::new(mode, Tuning::default(), Vec2::new(1280.0, 720.0), 2, &mut cat, 0)
    }

    #[test]
    fn test_snapshot_hides_cut_objects() {
        let mut s = state(Mode::Solo);
        s.objects[0].cut = true;
        let snap = snapshot(&s, 0);
        assert_eq!(snap.objects.len(), 4);
        assert_eq!(snap.midline, None);
        assert_eq!(snap.max_missed, 10);
    }

    #[test]
    fn test_snapshot_pointer_freshness() {
        let mut s = state(Mode::Duel);
        s.players[1].track(Vec2::new(900.0, 300.0), 100);
        let now = snapshot(&s, 100);
        assert!(now.players[1].fresh);
        assert!(!now.players[0].fresh);
        assert_eq!(now.players[1].trail.len(), 1);
        assert_eq!(now.midline, Some(640.0));

        let later = snapshot(&s, 150);
        assert!(!later.players[1].fresh);
        assert_eq!(later.players[1].pointer, Some(Vec2::new(900.0, 300.0)));
    }

    #[test]
    fn test_banner_countdown() {
        let mut s = state(Mode::Solo);
        assert_eq!(snapshot(&s, 0).banner_remaining_ms, None);
        s.enter_phase(GamePhase::GameOverBanner, 1000);
        assert_eq!(snapshot(&s, 1500).banner_remaining_ms, Some(1500));
        assert_eq!(snapshot(&s, 9000).banner_remaining_ms, Some(0));
    }
}
