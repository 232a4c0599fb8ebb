//! Grid Blast - a 9x9 block placement puzzle
//!
//! Core modules:
//! - `sim`: Game engine (board, shapes, scoring, animation ticks)
//! - `modes`: Per-mode catalogue composition and difficulty ramp
//! - `persistence`: Key-value store abstraction, snapshots, legacy migration
//! - `platform`: Browser storage and startup glue (wasm32 only)
//! - `session`: Host-facing game lifecycle and tick cadence

pub mod error;
pub mod highscores;
pub mod modes;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{GameError, GameResult};
pub use highscores::HighScore;
pub use modes::GameMode;
pub use persistence::{KeyValueStore, MemoryStore, SharedStore};
pub use session::GameSession;
pub use settings::{CorruptSnapshotPolicy, Settings};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Board is BOARD_SIZE x BOARD_SIZE cells
    pub const BOARD_SIZE: usize = 9;
    /// Sectors are SECTOR_SIZE x SECTOR_SIZE cells, non-overlapping
    pub const SECTOR_SIZE: usize = 3;
    /// Number of next-shape slots
    pub const SLOT_COUNT: usize = 3;

    /// Host tick cadence in milliseconds
    pub const TICK_INTERVAL_MS: u32 = 10;
    /// Maximum ticks run for a single `advance` call
    pub const MAX_CATCH_UP_TICKS: u32 = 8;

    /// Animation counters run up to this value
    pub const ANIMATION_DONE: i32 = 100;
    /// Clear animation progress per tick
    pub const CLEAR_ANIMATION_STEP: i32 = 10;
    /// Clear animation delay per unit of Manhattan distance from the wipe anchor
    pub const CLEAR_STAGGER: i32 = 37;
    /// Pick animation progress per tick
    pub const PICK_ANIMATION_STEP: u32 = 5;
    /// Intro animation starts below zero so the board waits before growing in
    pub const INTRO_ANIMATION_START: i32 = -40;
    /// Intro animation progress per tick
    pub const INTRO_ANIMATION_STEP: i32 = 4;

    /// Points per cleared line or sector on top of the cleared cells
    pub const POINTS_PER_ELIMINATION: u64 = 9;
    /// Fraction of the score awarded when the board is cleared completely
    pub const PERFECT_CLEAR_RATIO: f64 = 0.2;
    /// Flat bonus for clearing the board completely
    pub const PERFECT_CLEAR_FLAT: u64 = 10;
}

/// Whether a position lies on the board
#[inline]
pub fn on_board(pos: IVec2) -> bool {
    let size = consts::BOARD_SIZE as i32;
    (0..size).contains(&pos.x) && (0..size).contains(&pos.y)
}

/// Storage key for a mode-namespaced entry, e.g. `default_store`
#[inline]
pub fn namespaced_key(mode: &str, key: &str) -> String {
    format!("{mode}_{key}")
}
