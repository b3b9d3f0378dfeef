//! Session runner
//!
//! Owns the collaborators (camera, tracker, audio, score sink) around one
//! [`SessionState`] and drives it one camera frame at a time.

use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::audio::{self, AudioSink};
use crate::catalog::Catalog;
use crate::error::ResourceInitError;
use crate::highscores::{RoundSummary, SummarySink};
use crate::settings::Settings;
use crate::sim::{GamePhase, SessionState, Snapshot, TickInput, snapshot, tick};
use crate::tracking::{CameraSource, FieldMapping, GestureTracker, TrackerConfig};
use crate::tuning::{Mode, Tuning};

/// Back-off after a failed camera read
pub const MISSED_FRAME_RETRY: Duration = Duration::from_millis(50);

/// Requests from the UI around the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Restart,
    SaveSummary,
    ReturnToMenu,
    Exit,
}

/// Source of UI commands, polled between ticks
pub trait CommandSource {
    fn poll(&mut self) -> Vec<SessionCommand>;
}

/// What the outer navigation should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Continue,
    ReturnToMenu,
    Exit,
}

/// External collaborators a session drives
pub struct Collaborators {
    pub camera: Box<dyn CameraSource>,
    pub tracker: Box<dyn GestureTracker>,
    pub audio: Box<dyn AudioSink>,
    pub scores: Box<dyn SummarySink>,
}

/// A running game session
pub struct Session {
    settings: Settings,
    catalog: Catalog,
    state: SessionState,
    parts: Collaborators,
    tracker_config: TrackerConfig,
    /// Built from the first frame's size, rebuilt when it changes
    mapping: Option<FieldMapping>,
    pending_restart: bool,
    summary_saved: bool,
    frames_skipped: u64,
    last_now_ms: u64,
    released: bool,
}

impl Session {
    pub fn new(
        mode: Mode,
        settings: Settings,
        tuning: Tuning,
        mut catalog: Catalog,
        mut parts: Collaborators,
        seed: u64,
    ) -> Result<Self, ResourceInitError> {
        if catalog.is_empty() {
            return Err(ResourceInitError::EmptyCatalog {
                dir: settings.sprite_dir.clone(),
            });
        }
        if !parts.camera.is_opened() {
            return Err(ResourceInitError::CameraUnavailable(
                "camera could not be opened".into(),
            ));
        }
        let tracker_config = TrackerConfig::for_mode(mode);
        if let Err(reason) = parts.tracker.configure(&tracker_config) {
            parts.camera.release();
            return Err(ResourceInitError::TrackerUnavailable(reason));
        }
        let play = Vec2::new(settings.play_width, settings.play_height);
        let state = SessionState::new(mode, tuning, play, seed, &mut catalog, 0);
        Ok(Self {
            settings,
            catalog,
            state,
            parts,
            tracker_config,
            mapping: None,
            pending_restart: false,
            summary_saved: false,
            frames_skipped: 0,
            last_now_ms: 0,
            released: false,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        self.tracker_config
    }

    /// Ticks skipped because the camera had no frame
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Current view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        snapshot(&self.state, self.last_now_ms)
    }

    /// End-of-round record, once the round is over
    pub fn summary(&self) -> Option<RoundSummary> {
        self.state.summary()
    }

    /// Window resized
    pub fn set_field_size(&mut self, play: Vec2) {
        self.state.resize_field(play);
        self.settings.play_width = self.state.width;
        self.settings.play_height = self.state.height;
        self.mapping = None;
    }

    /// Handle commands, then run one tick if the camera has a frame.
    ///
    /// `now_ms` is the monotonic frame clock.
    pub fn step(&mut self, now_ms: u64, commands: &[SessionCommand]) -> NavigationOutcome {
        if self.released {
            return NavigationOutcome::Exit;
        }

        for &cmd in commands {
            match cmd {
                SessionCommand::Restart => self.pending_restart = true,
                SessionCommand::SaveSummary => self.save_summary(),
                SessionCommand::ReturnToMenu => {
                    self.teardown();
                    return NavigationOutcome::ReturnToMenu;
                }
                SessionCommand::Exit => {
                    self.teardown();
                    return NavigationOutcome::Exit;
                }
            }
        }

        let Some(frame) = self.parts.camera.read() else {
            self.frames_skipped += 1;
            log::debug!("No camera frame at {} ms, tick skipped", now_ms);
            return NavigationOutcome::Continue;
        };

        let mapping = self.field_mapping(frame.width, frame.height);
        let detections = self.parts.tracker.detect(&frame);
        let hands = mapping.fingertips(&detections, self.tracker_config.max_hands);
        log::trace!("{} hand(s) at {} ms", hands.len(), now_ms);

        let restart = std::mem::take(&mut self.pending_restart);
        if restart && self.state.game_over() {
            self.summary_saved = false;
        }
        let input = TickInput {
            now_ms,
            hands,
            restart,
        };
        tick(&mut self.state, &input, &mut self.catalog);
        self.last_now_ms = now_ms;

        for cue in audio::cues(&self.state.events) {
            self.parts.audio.play(cue);
        }

        NavigationOutcome::Continue
    }

    /// Drive the session at the configured tick rate until navigation leaves it
    pub fn run(&mut self, commands: &mut dyn CommandSource) -> NavigationOutcome {
        let start = Instant::now();
        let tick_len = Duration::from_millis(self.settings.tick_ms());
        log::info!(
            "Running {} session at {} Hz",
            self.state.mode.as_str(),
            self.settings.tick_rate_hz
        );

        loop {
            let began = Instant::now();
            let skipped = self.frames_skipped;
            let now_ms = start.elapsed().as_millis() as u64;

            let outcome = self.step(now_ms, &commands.poll());
            if outcome != NavigationOutcome::Continue {
                return outcome;
            }

            if self.frames_skipped > skipped {
                thread::sleep(MISSED_FRAME_RETRY);
            } else if let Some(rest) = tick_len.checked_sub(began.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    /// Release camera and tracker. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.parts.camera.release();
        self.parts.tracker.close();
        self.released = true;
        log::info!("Session resources released");
    }

    fn save_summary(&mut self) {
        if self.summary_saved {
            log::debug!("Summary already saved for this round");
            return;
        }
        match self.state.summary() {
            Some(summary) => {
                self.parts.scores.record(&summary);
                self.summary_saved = true;
            }
            None => log::debug!("No summary while the round is running"),
        }
    }

    fn field_mapping(&mut self, width: u32, height: u32) -> FieldMapping {
        let play = Vec2::new(self.state.width, self.state.height);
        let camera = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        match self.mapping {
            Some(m) if m.camera == camera => m,
            _ => {
                let m = FieldMapping::new(width, height, play, self.settings.mirror_camera);
                log::debug!("Camera {}x{} mapped onto {:?}", width, height, play);
                self.mapping = Some(m);
                m
            }
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCue;
    use crate::catalog::{Bitmap, SpriteAsset};
    use crate::tracking::{Frame, HandDetection, Landmark};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Flags {
        camera_released: Rc<Cell<bool>>,
        tracker_closed: Rc<Cell<bool>>,
    }

    /// Camera that yields a frame unless told to drop the next read
    struct FakeCamera {
        misses: Rc<Cell<u32>>,
        flags: Flags,
    }

    struct DeadCamera;

    impl CameraSource for DeadCamera {
        fn is_opened(&self) -> bool {
            false
        }

        fn read(&mut self) -> Option<Frame> {
            None
        }

        fn release(&mut self) {}
    }

    impl CameraSource for FakeCamera {
        fn read(&mut self) -> Option<Frame> {
            if self.misses.get() > 0 {
                self.misses.set(self.misses.get() - 1);
                return None;
            }
            Some(Frame::new(640, 360, Vec::new()))
        }

        fn release(&mut self) {
            self.flags.camera_released.set(true);
        }
    }

    /// Tracker replaying queued detections
    struct FakeTracker {
        script: Rc<RefCell<VecDeque<Vec<HandDetection>>>>,
        flags: Flags,
    }

    impl GestureTracker for FakeTracker {
        fn detect(&mut self, _frame: &Frame) -> Vec<HandDetection> {
            self.script.borrow_mut().pop_front().unwrap_or_default()
        }

        fn close(&mut self) {
            self.flags.tracker_closed.set(true);
        }
    }

    /// Tracker whose model never loads
    struct BrokenTracker;

    impl GestureTracker for BrokenTracker {
        fn configure(&mut self, _config: &TrackerConfig) -> Result<(), String> {
            Err("model file missing".into())
        }

        fn detect(&mut self, _frame: &Frame) -> Vec<HandDetection> {
            Vec::new()
        }

        fn close(&mut self) {}
    }

    struct SharedCues(Rc<RefCell<Vec<AudioCue>>>);

    impl AudioSink for SharedCues {
        fn play(&mut self, cue: AudioCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    struct SharedSummaries(Rc<RefCell<Vec<RoundSummary>>>);

    impl SummarySink for SharedSummaries {
        fn record(&mut self, summary: &RoundSummary) {
            self.0.borrow_mut().push(*summary);
        }
    }

    struct Rig {
        session: Session,
        flags: Flags,
        misses: Rc<Cell<u32>>,
        script: Rc<RefCell<VecDeque<Vec<HandDetection>>>>,
        cues: Rc<RefCell<Vec<AudioCue>>>,
        summaries: Rc<RefCell<Vec<RoundSummary>>>,
    }

    fn rig(mode: Mode) -> Rig {
        let flags = Flags::default();
        let misses = Rc::new(Cell::new(0));
        let script = Rc::new(RefCell::new(VecDeque::new()));
        let cues = Rc::new(RefCell::new(Vec::new()));
        let summaries = Rc::new(RefCell::new(Vec::new()));
        let catalog = Catalog::from_assets(vec![SpriteAsset::new(
            "melon.png",
            Bitmap::filled(4, 4, [0, 160, 0, 255]),
        )])
        .unwrap();
        let parts = Collaborators {
            camera: Box::new(FakeCamera {
                misses: misses.clone(),
                flags: flags.clone(),
            }),
            tracker: Box::new(FakeTracker {
                script: script.clone(),
                flags: flags.clone(),
            }),
            audio: Box::new(SharedCues(cues.clone())),
            scores: Box::new(SharedSummaries(summaries.clone())),
        };
        let settings = Settings {
            mirror_camera: false,
            ..Settings::default()
        };
        let session = Session::new(mode, settings, Tuning::default(), catalog, parts, 77).unwrap();
        Rig {
            session,
            flags,
            misses,
            script,
            cues,
            summaries,
        }
    }

    /// Hand whose fingertip lands on `at` in the 1280x720 field
    fn hand(at: Vec2) -> HandDetection {
        HandDetection::from_fingertip(Landmark::new(at.x / 1280.0, at.y / 720.0))
    }

    fn parked(x: f32, y: f32, hazard: bool) -> crate::sim::FallingObject {
        crate::sim::FallingObject::new(
            crate::catalog::SpriteId(0),
            hazard,
            Vec2::new(x, y),
            Vec2::splat(40.0),
            0.0,
        )
    }

    #[test]
    fn test_missing_frame_skips_tick() {
        let mut r = rig(Mode::Solo);
        let before = r.session.state().objects.clone();
        r.misses.set(1);
        assert_eq!(r.session.step(50, &[]), NavigationOutcome::Continue);
        assert_eq!(r.session.frames_skipped(), 1);
        assert_eq!(r.session.state().objects, before);

        r.session.step(100, &[]);
        assert_ne!(r.session.state().objects, before);
    }

    #[test]
    fn test_slice_forwards_cue() {
        let mut r = rig(Mode::Solo);
        let spot = Vec2::new(50.0, 400.0);
        r.script.borrow_mut().extend([vec![hand(spot)], vec![hand(spot)]]);
        r.session.step(0, &[]);
        r.session.state.objects[0] = parked(30.0, 380.0, false);
        r.session.step(50, &[]);
        assert_eq!(r.session.state().players[0].score, 1);
        assert_eq!(*r.cues.borrow(), vec![AudioCue::Slash]);
    }

    #[test]
    fn test_extra_hands_are_dropped_in_solo() {
        let mut r = rig(Mode::Solo);
        assert_eq!(r.session.tracker_config().max_hands, 1);
        let first = Vec2::new(50.0, 400.0);
        let second = Vec2::new(1200.0, 100.0);
        r.script.borrow_mut().push_back(vec![hand(first), hand(second)]);
        r.session.step(0, &[]);
        let pointer = r.session.state().players[0].pointer.unwrap();
        assert!((pointer - first).length() < 1e-3);
    }

    #[test]
    fn test_save_summary_once_per_round() {
        let mut r = rig(Mode::Duel);
        r.session.step(0, &[SessionCommand::SaveSummary]);
        assert!(r.summaries.borrow().is_empty());

        r.session.state.players[0].score = 4;
        r.session.state.players[0].eliminate();
        r.session.state.players[1].eliminate();
        r.session.state.enter_phase(GamePhase::GameOverBanner, 0);
        r.session
            .step(50, &[SessionCommand::SaveSummary, SessionCommand::SaveSummary]);
        assert_eq!(
            *r.summaries.borrow(),
            vec![RoundSummary::duel(4, 0, 1)]
        );

        r.session.step(100, &[SessionCommand::Restart]);
        assert_eq!(r.session.phase(), GamePhase::Running);
        assert_eq!(r.session.state().total_score(), 0);
    }

    #[test]
    fn test_exit_releases_resources() {
        let mut r = rig(Mode::Solo);
        assert_eq!(
            r.session.step(0, &[SessionCommand::Exit]),
            NavigationOutcome::Exit
        );
        assert!(r.flags.camera_released.get());
        assert!(r.flags.tracker_closed.get());
        assert!(r.session.is_released());
        assert_eq!(r.session.step(50, &[]), NavigationOutcome::Exit);
    }

    #[test]
    fn test_return_to_menu_releases_resources() {
        let mut r = rig(Mode::Duel);
        assert_eq!(
            r.session.step(0, &[SessionCommand::ReturnToMenu]),
            NavigationOutcome::ReturnToMenu
        );
        assert!(r.flags.camera_released.get());
    }

    #[test]
    fn test_drop_releases_resources() {
        let r = rig(Mode::Solo);
        let flags = r.flags.clone();
        drop(r);
        assert!(flags.camera_released.get());
        assert!(flags.tracker_closed.get());
    }

    #[test]
    fn test_unopened_camera_is_fatal() {
        let catalog = Catalog::from_assets(vec![SpriteAsset::new(
            "fig.png",
            Bitmap::filled(4, 4, [120, 40, 90, 255]),
        )])
        .unwrap();
        let parts = Collaborators {
            camera: Box::new(DeadCamera),
            tracker: Box::new(FakeTracker {
                script: Rc::default(),
                flags: Flags::default(),
            }),
            audio: Box::new(Vec::<AudioCue>::new()),
            scores: Box::new(Vec::<RoundSummary>::new()),
        };
        let result = Session::new(
            Mode::Solo,
            Settings::default(),
            Tuning::default(),
            catalog,
            parts,
            1,
        );
        assert!(matches!(result, Err(ResourceInitError::CameraUnavailable(_))));
    }

    #[test]
    fn test_tracker_failure_releases_camera() {
        let catalog = Catalog::from_assets(vec![SpriteAsset::new(
            "fig.png",
            Bitmap::filled(4, 4, [120, 40, 90, 255]),
        )])
        .unwrap();
        let flags = Flags::default();
        let parts = Collaborators {
            camera: Box::new(FakeCamera {
                misses: Rc::default(),
                flags: flags.clone(),
            }),
            tracker: Box::new(BrokenTracker),
            audio: Box::new(Vec::<AudioCue>::new()),
            scores: Box::new(Vec::<RoundSummary>::new()),
        };
        let result = Session::new(
            Mode::Duel,
            Settings::default(),
            Tuning::default(),
            catalog,
            parts,
            1,
        );
        assert!(matches!(result, Err(ResourceInitError::TrackerUnavailable(_))));
        assert!(flags.camera_released.get());
    }

    #[test]
    fn test_resize_rebuilds_mapping() {
        let mut r = rig(Mode::Solo);
        r.session.set_field_size(Vec2::new(640.0, 360.0));
        r.script
            .borrow_mut()
            .push_back(vec![HandDetection::from_fingertip(Landmark::new(0.5, 0.5))]);
        r.session.step(0, &[]);
        let pointer = r.session.state().players[0].pointer.unwrap();
        assert!((pointer - Vec2::new(320.0, 180.0)).length() < 1e-3);
        assert_eq!(r.session.snapshot().players[0].pointer, Some(pointer));
    }
}
