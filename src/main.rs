//! Hand Slice headless demo
//!
//! Runs a session end to end with a scripted camera and tracker: a fingertip
//! sweeps across the field while sprites from the sprite folder fall. Prints
//! the round summary as JSON when the session exits.
//!
//! Usage: `hand-slice [solo|duel] [seed]`

use std::path::Path;
use std::process;

use hand_slice::audio::{AudioBackend, SoundBank};
use hand_slice::catalog::{Bitmap, PngDecoder, SpriteAsset};
use hand_slice::highscores::{self, ScoreFile};
use hand_slice::session::{Collaborators, CommandSource, Session, SessionCommand};
use hand_slice::tracking::{CameraSource, Frame, GestureTracker, HandDetection, Landmark};
use hand_slice::{Catalog, Mode, ResourceInitError, Settings, Tuning};

const SETTINGS_FILE: &str = "settings.json";
const TUNING_FILE: &str = "tuning.json";

/// Ticks before the demo exits on its own (one minute at 20 Hz)
const DEMO_TICKS: u32 = 1200;

const CAMERA_WIDTH: u32 = 640;
const CAMERA_HEIGHT: u32 = 360;

/// Camera stand-in producing blank frames
struct ScriptedCamera {
    frames: u32,
}

impl CameraSource for ScriptedCamera {
    fn read(&mut self) -> Option<Frame> {
        self.frames += 1;
        // drop every 50th read to exercise the skip path
        if self.frames % 50 == 0 {
            return None;
        }
        Some(Frame::new(CAMERA_WIDTH, CAMERA_HEIGHT, Vec::new()))
    }

    fn release(&mut self) {
        log::info!("Camera released after {} reads", self.frames);
    }
}

/// Tracker stand-in: one fingertip per player tracing a Lissajous curve in
/// that player's half of the frame
struct ScriptedTracker {
    hands: usize,
    t: f32,
}

impl GestureTracker for ScriptedTracker {
    fn detect(&mut self, _frame: &Frame) -> Vec<HandDetection> {
        self.t += 1.0;
        let width = 1.0 / self.hands as f32;
        (0..self.hands)
            .map(|i| {
                let phase = self.t * 0.15 + i as f32 * 1.7;
                let x = width * (i as f32 + 0.5 + 0.45 * phase.sin());
                let y = 0.5 + 0.35 * (self.t * 0.11 + i as f32).cos();
                HandDetection::from_fingertip(Landmark::new(x, y))
            })
            .collect()
    }

    fn close(&mut self) {
        log::info!("Tracker closed");
    }
}

/// Logs instead of playing
struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_file(&mut self, path: &Path, volume: f32) {
        log::debug!("play {} at {:.2}", path.display(), volume);
    }
}

/// Asks to save every second and exits after the demo budget
struct DemoCommands {
    polls: u32,
}

impl CommandSource for DemoCommands {
    fn poll(&mut self) -> Vec<SessionCommand> {
        self.polls += 1;
        if self.polls >= DEMO_TICKS {
            vec![SessionCommand::Exit]
        } else if self.polls % 20 == 0 {
            vec![SessionCommand::SaveSummary]
        } else {
            Vec::new()
        }
    }
}

/// Sprites from the configured folder, or flat placeholders when it has none
fn load_catalog(dir: &Path) -> Result<Catalog, ResourceInitError> {
    match Catalog::load(dir, &PngDecoder) {
        Ok(catalog) => Ok(catalog),
        Err(e @ (ResourceInitError::EmptyCatalog { .. } | ResourceInitError::SpriteDir { .. })) => {
            log::warn!("{}, using placeholder sprites", e);
            placeholder_catalog()
        }
        Err(e) => Err(e),
    }
}

fn placeholder_catalog() -> Result<Catalog, ResourceInitError> {
    Catalog::from_assets(vec![
        SpriteAsset::new("apple.png", Bitmap::filled(64, 64, [220, 30, 30, 255])),
        SpriteAsset::new("banana.png", Bitmap::filled(64, 64, [240, 220, 60, 255])),
        SpriteAsset::new("kiwi.png", Bitmap::filled(64, 64, [110, 160, 40, 255])),
        SpriteAsset::new("watermelon.png", Bitmap::filled(64, 64, [40, 150, 60, 255])),
        SpriteAsset::new("bomb.png", Bitmap::filled(64, 64, [20, 20, 20, 255])),
    ])
}

fn parse_args() -> (Mode, u64) {
    let mut args = std::env::args().skip(1);
    let mode = match args.next().as_deref() {
        Some("duel") => Mode::Duel,
        Some("solo") | None => Mode::Solo,
        Some(other) => {
            log::warn!("Unknown mode '{}', playing solo", other);
            Mode::Solo
        }
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(highscores::unix_ms);
    (mode, seed)
}

fn run() -> Result<(), ResourceInitError> {
    let (mode, seed) = parse_args();
    let settings = Settings::load(Path::new(SETTINGS_FILE));
    let tuning = Tuning::load(Path::new(TUNING_FILE));
    let catalog = load_catalog(&settings.sprite_dir)?;

    let parts = Collaborators {
        camera: Box::new(ScriptedCamera { frames: 0 }),
        tracker: Box::new(ScriptedTracker {
            hands: mode.player_count(),
            t: 0.0,
        }),
        audio: Box::new(SoundBank::from_settings(&settings, LogBackend)),
        scores: Box::new(ScoreFile::open(settings.score_file.clone())),
    };

    let mut session = Session::new(mode, settings, tuning, catalog, parts, seed)?;
    let outcome = session.run(&mut DemoCommands { polls: 0 });
    log::info!("Session ended: {:?}", outcome);

    let snapshot = session.snapshot();
    let report = serde_json::json!({
        "seed": seed,
        "phase": snapshot.phase,
        "level": snapshot.level,
        "missed": snapshot.missed,
        "scores": snapshot.players.iter().map(|p| p.score).collect::<Vec<_>>(),
        "summary": session.summary(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode report: {}", e),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Hand Slice (headless demo) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        process::exit(1);
    }
}
