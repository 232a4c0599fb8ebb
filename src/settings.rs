//! Host settings and preferences
//!
//! Persisted separately from game snapshots under `gameSettings`. Fields
//! missing from the stored JSON keep their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_CATCH_UP_TICKS, TICK_INTERVAL_MS};
use crate::persistence::KeyValueStore;

/// What to do when a stored snapshot cannot be restored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CorruptSnapshotPolicy {
    /// Report the error to the host
    #[default]
    FailFast,
    /// Log it and start a fresh game in the same mode
    NewGame,
}

impl CorruptSnapshotPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptSnapshotPolicy::FailFast => "FailFast",
            CorruptSnapshotPolicy::NewGame => "NewGame",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "failfast" | "fail" => Some(CorruptSnapshotPolicy::FailFast),
            "newgame" | "new" => Some(CorruptSnapshotPolicy::NewGame),
            _ => None,
        }
    }
}

/// Host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Vertical gap in pixels between the pointer and a dragged shape
    pub dragging_offset: u32,
    /// Milliseconds per engine tick
    pub tick_interval_ms: u32,
    /// Ticks run at most per `advance` call, the rest of a long gap is dropped
    pub max_catch_up_ticks: u32,
    /// Snapshot recovery behavior
    pub on_corrupt_snapshot: CorruptSnapshotPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dragging_offset: 32,
            tick_interval_ms: TICK_INTERVAL_MS,
            max_catch_up_ticks: MAX_CATCH_UP_TICKS,
            on_corrupt_snapshot: CorruptSnapshotPolicy::FailFast,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "gameSettings";

    /// Load settings; falls back to defaults when missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(Self::STORAGE_KEY) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {e}");
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    /// Update the dragging offset and persist right away
    pub fn set_dragging_offset(&mut self, store: &dyn KeyValueStore, value: u32) {
        self.dragging_offset = value;
        self.save(store);
    }

    /// Zero cadence values would stall the tick loop
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = defaults.tick_interval_ms;
        }
        if self.max_catch_up_ticks == 0 {
            self.max_catch_up_ticks = defaults.max_catch_up_ticks;
        }
        self
    }
}
