//! Hand Slice - a camera-controlled fruit slicing game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, slicing, session phases)
//! - `tracking`: Camera/tracker collaborators and pointer smoothing
//! - `catalog`: Sprite catalog and resize cache
//! - `session`: Runner wiring the collaborators to the simulation
//! - `audio`: Sound cues
//! - `highscores`: Round summaries and leaderboards
//! - `persistence`: JSON load/save
//! - `settings`, `tuning`: Player preferences and data-driven game balance

pub mod audio;
pub mod catalog;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tracking;
pub mod tuning;

pub use catalog::Catalog;
pub use error::{PersistenceError, ResizeError, ResourceInitError};
pub use highscores::{RoundSummary, ScoreFile, ScoreHistory};
pub use session::{NavigationOutcome, Session, SessionCommand};
pub use settings::Settings;
pub use tuning::{Mode, Tuning};
