//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per camera frame, driven by the frame clock passed in
//! - Seeded RNG only
//! - Stable iteration order (pool order, then player order)
//! - No camera, tracker, audio or file dependencies

pub mod collision;
pub mod slice;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::point_in_box;
pub use slice::apply_slices;
pub use snapshot::{ObjectView, PlayerView, Snapshot, snapshot};
pub use spawn::{Lane, LaneBounds, choose_lane, refill, spawn_object};
pub use state::{FallingObject, GameEvent, GamePhase, PlayerId, PlayerState, SessionState};
pub use tick::{TickInput, tick};
