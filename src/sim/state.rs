//! Session state and core simulation types
//!
//! Everything a round needs lives in one owned [`SessionState`] that `tick`
//! mutates. There are no globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::point_in_box;
use super::spawn;
use crate::catalog::{Catalog, SpriteId};
use crate::highscores::RoundSummary;
use crate::tracking::{PointerSmoother, PointerTrail};
use crate::tuning::{Mode, ModeTuning, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Round over, big GAME OVER text (timed)
    GameOverBanner,
    /// Round over, score card with restart/menu/save choices
    GameOverSummary,
}

impl GamePhase {
    pub fn is_game_over(self) -> bool {
        !matches!(self, GamePhase::Running)
    }
}

/// Which player. Solo only ever uses `One`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// A falling sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub sprite: SpriteId,
    pub is_hazard: bool,
    /// Top-left corner
    pub pos: Vec2,
    /// Rendered size
    pub extent: Vec2,
    /// Pixels per tick
    pub fall_speed: f32,
    pub alive: bool,
    pub cut: bool,
    /// Already passed the bottom edge and been accounted for
    pub counted: bool,
}

impl FallingObject {
    pub fn new(sprite: SpriteId, is_hazard: bool, pos: Vec2, extent: Vec2, fall_speed: f32) -> Self {
        Self {
            sprite,
            is_hazard,
            pos,
            extent,
            fall_speed,
            alive: true,
            cut: false,
            counted: false,
        }
    }

    /// Can still be sliced
    pub fn is_live(&self) -> bool {
        self.alive && !self.cut
    }

    /// Due for replacement
    pub fn is_inert(&self) -> bool {
        !self.is_live()
    }

    /// Pointer strictly inside the bounding box
    pub fn hit_by(&self, pointer: Vec2) -> bool {
        point_in_box(pointer, self.pos, self.extent)
    }
}

/// Per-player state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub alive: bool,
    pub score: u32,
    pub smoother: PointerSmoother,
    /// Last emitted pointer; duel keeps slicing with it when the hand is lost
    pub pointer: Option<Vec2>,
    /// Frame-clock time of the last fresh detection
    pub last_seen_ms: Option<u64>,
    pub trail: PointerTrail,
}

impl PlayerState {
    pub fn new(tuning: &Tuning, mode: Mode) -> Self {
        Self {
            alive: true,
            score: 0,
            smoother: PointerSmoother::new(tuning.mode(mode).smoothing),
            pointer: None,
            last_seen_ms: None,
            trail: PointerTrail::new(tuning.trail_capacity, tuning.trail_ms),
        }
    }

    /// Feed a raw hand point through the smoother
    pub fn track(&mut self, raw: Vec2, now_ms: u64) -> Vec2 {
        let p = self.smoother.update(raw);
        self.pointer = Some(p);
        self.last_seen_ms = Some(now_ms);
        self.trail.record(p, now_ms);
        p
    }

    pub fn eliminate(&mut self) {
        self.alive = false;
        self.pointer = None;
        self.last_seen_ms = None;
        self.smoother.reset();
        self.trail.clear();
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Safe object sliced
    Sliced { player: PlayerId },
    /// Hazard sliced
    HazardHit { player: PlayerId },
    /// Player knocked out of a duel
    Eliminated { player: PlayerId },
    LevelUp { level: u32 },
    /// Safe object fell off the bottom (solo)
    Missed { missed: u32 },
    PhaseChanged { phase: GamePhase },
    Restarted,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub mode: Mode,
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Play-field size
    pub width: f32,
    pub height: f32,
    /// Starts at 1, only goes up
    pub level: u32,
    pub phase: GamePhase,
    /// Frame-clock time the current phase was entered
    pub phase_entered_ms: u64,
    /// Safe objects missed (solo)
    pub missed: u32,
    pub players: Vec<PlayerState>,
    pub objects: Vec<FallingObject>,
    /// Events of the most recent tick
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl SessionState {
    /// Fresh session with a full initial pool
    pub fn new(
        mode: Mode,
        tuning: Tuning,
        play_size: Vec2,
        seed: u64,
        catalog: &mut Catalog,
        now_ms: u64,
    ) -> Self {
        let players = (0..mode.player_count())
            .map(|_| PlayerState::new(&tuning, mode))
            .collect();
        let mut state = Self {
            mode,
            tuning,
            seed,
            width: play_size.x,
            height: play_size.y,
            level: 1,
            phase: GamePhase::Running,
            phase_entered_ms: now_ms,
            missed: 0,
            players,
            objects: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        spawn::refill(&mut state, catalog);
        log::info!(
            "New {} session (seed {}), {} objects",
            mode.as_str(),
            seed,
            state.objects.len()
        );
        state
    }

    /// Reset counters, players and the pool; back to Running.
    ///
    /// The RNG keeps running so the next round differs from the last.
    pub fn restart(&mut self, catalog: &mut Catalog, now_ms: u64) {
        self.level = 1;
        self.missed = 0;
        self.players = (0..self.mode.player_count())
            .map(|_| PlayerState::new(&self.tuning, self.mode))
            .collect();
        self.objects.clear();
        self.events.clear();
        self.enter_phase(GamePhase::Running, now_ms);
        spawn::refill(self, catalog);
        self.events.push(GameEvent::Restarted);
        log::info!("Session restarted ({} objects)", self.objects.len());
    }

    pub fn mode_tuning(&self) -> &ModeTuning {
        self.tuning.mode(self.mode)
    }

    /// Pool size this level aims for
    pub fn target_count(&self) -> usize {
        self.mode_tuning().target_count(self.level)
    }

    pub fn game_over(&self) -> bool {
        self.phase.is_game_over()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id.index())
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(|p| p.alive)
    }

    /// Combined score that drives level-ups
    pub fn total_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }

    pub fn live_objects(&self) -> usize {
        self.objects.iter().filter(|o| o.is_live()).count()
    }

    /// Vertical line splitting the duel halves
    pub fn midline(&self) -> f32 {
        self.width / 2.0
    }

    pub fn enter_phase(&mut self, phase: GamePhase, now_ms: u64) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged { phase });
        }
        self.phase_entered_ms = now_ms;
    }

    /// Play field changed size (window resize)
    pub fn resize_field(&mut self, play_size: Vec2) {
        if play_size.x > 0.0 && play_size.y > 0.0 {
            self.width = play_size.x;
            self.height = play_size.y;
        }
    }

    /// End-of-round record, only once the round is over
    pub fn summary(&self) -> Option<RoundSummary> {
        if !self.game_over() {
            return None;
        }
        let score = |id: PlayerId| self.player(id).map_or(0, |p| p.score);
        Some(match self.mode {
            Mode::Solo => RoundSummary::solo(score(PlayerId::One), self.missed, self.level),
            Mode::Duel => {
                RoundSummary::duel(score(PlayerId::One), score(PlayerId::Two), self.level)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Bitmap, SpriteAsset};

    fn catalog() -> Catalog {
        Catalog::from_assets(vec![SpriteAsset::new(
            "kiwi.png",
            Bitmap::filled(8, 8, [0, 255, 0, 255]),
        )])
        .unwrap()
    }

    #[test]
    fn test_new_session_shape() {
        let mut cat = catalog();
        let solo = SessionState::new(
            Mode::Solo,
            Tuning::default(),
            Vec2::new(1280.0, 720.0),
            7,
            &mut cat,
            0,
        );
        assert_eq!(solo.players.len(), 1);
        assert_eq!(solo.objects.len(), 5);
        assert_eq!(solo.level, 1);
        assert_eq!(solo.phase, GamePhase::Running);
        assert!(solo.summary().is_none());

        let duel = SessionState::new(
            Mode::Duel,
            Tuning::default(),
            Vec2::new(1280.0, 720.0),
            7,
            &mut cat,
            0,
        );
        assert_eq!(duel.players.len(), 2);
        assert_eq!(duel.objects.len(), 8);
    }

    #[test]
    fn test_eliminate_clears_pointer() {
        let mut p = PlayerState::new(&Tuning::default(), Mode::Duel);
        p.track(Vec2::new(5.0, 5.0), 0);
        assert!(p.pointer.is_some());
        p.eliminate();
        assert!(!p.alive);
        assert!(p.pointer.is_none());
        assert!(p.trail.is_empty());
    }

    #[test]
    fn test_object_hit_is_strict() {
        let o = FallingObject::new(
            SpriteId(0),
            false,
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 20.0),
            5.0,
        );
        assert!(o.hit_by(Vec2::new(15.0, 15.0)));
        assert!(!o.hit_by(Vec2::new(10.0, 15.0)));
        assert!(!o.hit_by(Vec2::new(30.0, 15.0)));
    }

    #[test]
    fn test_enter_same_phase_emits_nothing() {
        let mut cat = catalog();
        let mut s = SessionState::new(
            Mode::Solo,
            Tuning::default(),
            Vec2::new(1280.0, 720.0),
            1,
            &mut cat,
            0,
        );
        s.enter_phase(GamePhase::Running, 10);
        assert!(s.events.is_empty());
        s.enter_phase(GamePhase::GameOverBanner, 20);
        assert_eq!(
            s.events,
            vec![GameEvent::PhaseChanged {
                phase: GamePhase::GameOverBanner
            }]
        );
        assert_eq!(s.phase_entered_ms, 20);
    }
}
