//! Error types
//!
//! Only resource initialisation and persistence can fail. Everything that
//! happens inside a tick (elimination, level-up, game over) is an ordinary
//! state transition, and transient frame problems are absorbed by skipping
//! the tick.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised before a session starts
#[derive(Debug, Error)]
pub enum ResourceInitError {
    #[error("no sprites found in {}", dir.display())]
    EmptyCatalog { dir: PathBuf },
    #[error("cannot read sprite directory {}", dir.display())]
    SpriteDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("hand tracker unavailable: {0}")]
    TrackerUnavailable(String),
}

/// Bitmap resampling failure (always recovered by the catalog)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResizeError {
    #[error("target size {width}x{height} is empty")]
    EmptyTarget { width: u32, height: u32 },
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    MalformedSource { expected: usize, actual: usize },
}

/// JSON file load/save failure
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json in {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
