//! Browser entry points
//!
//! `init` runs on module load and sets up logging. `WebSession` exposes a
//! `GameSession` over `localStorage` to the JS host; board coordinates are
//! already translated from pointer positions on the JS side.

use std::rc::Rc;

use glam::IVec2;
use wasm_bindgen::prelude::*;

use super::storage::LocalStorage;
use crate::persistence::{MemoryStore, SharedStore};
use crate::session::GameSession;
use crate::sim::{Game, GameEvent, SlotStatus};

/// Install the panic hook and console logger when the module loads
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS handle to one game session
#[wasm_bindgen]
pub struct WebSession {
    inner: GameSession,
    /// Set when a `GameEnded` event was drained, cleared by `take_game_ended`
    game_ended: bool,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSession {
        let store: SharedStore = match LocalStorage::open() {
            Some(storage) => Rc::new(storage),
            None => {
                log::warn!("localStorage unavailable, progress will not be kept");
                Rc::new(MemoryStore::new())
            }
        };
        WebSession {
            inner: GameSession::new(store),
            game_ended: false,
        }
    }

    /// Continue or start a game in mode `name`
    #[wasm_bindgen(js_name = loadGame)]
    pub fn load_game(&mut self, name: &str) -> Result<(), JsValue> {
        self.game_ended = false;
        self.inner.load_game(name).map(|_| ()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self, name: &str) -> Result<(), JsValue> {
        self.game_ended = false;
        self.inner.new_game(name).map(|_| ()).map_err(to_js)
    }

    /// Feed elapsed milliseconds from `requestAnimationFrame`
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        let ticks = self.inner.advance(elapsed_ms);
        self.collect_events();
        ticks
    }

    #[wasm_bindgen(js_name = startDrag)]
    pub fn start_drag(&mut self, slot: usize) {
        self.with_game(|game| game.set_dragging_shape(slot));
    }

    /// Preview the dragged shape; false when it does not fit there
    pub fn preview(&mut self, slot: usize, x: i32, y: i32) -> bool {
        self.with_game(|game| {
            game.slots.get(slot).is_some_and(|s| s.shape.is_some())
                && game.mark_dragging_shape(slot, IVec2::new(x, y))
        })
        .unwrap_or(false)
    }

    /// Drop the dragged shape; returns the number of cells placed
    pub fn place(&mut self, slot: usize, x: i32, y: i32) -> usize {
        let placed = self
            .with_game(|game| {
                if game.slots.get(slot).is_some_and(|s| s.shape.is_some()) {
                    game.place_dragging(slot, IVec2::new(x, y))
                } else {
                    game.release_dragging_shape();
                    0
                }
            })
            .unwrap_or(0);
        self.collect_events();
        placed
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.with_game(|game| {
            game.reset_markings();
            game.release_dragging_shape();
        });
    }

    /// `"empty" | "disabled" | "warning" | "ready"`
    #[wasm_bindgen(js_name = slotStatus)]
    pub fn slot_status(&self, slot: usize) -> String {
        let status = match self.inner.game() {
            Some(game) if slot < game.slots.len() => game.slot_status(slot),
            _ => SlotStatus::Empty,
        };
        format!("{status:?}").to_lowercase()
    }

    pub fn score(&self) -> f64 {
        self.inner.game().map_or(0.0, |g| g.score() as f64)
    }

    #[wasm_bindgen(js_name = highScore)]
    pub fn high_score(&self) -> f64 {
        self.inner.game().map_or(0.0, |g| g.high_score() as f64)
    }

    #[wasm_bindgen(js_name = stateProgress)]
    pub fn state_progress(&self) -> f64 {
        self.inner.game().map_or(0.0, |g| g.state_progress() as f64)
    }

    #[wasm_bindgen(js_name = draggingOffset)]
    pub fn dragging_offset(&self) -> u32 {
        self.inner.settings().dragging_offset
    }

    /// Current snapshot as JSON for rendering
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let Some(game) = self.inner.game() else {
            return Ok(String::from("null"));
        };
        game.snapshot_json().map_err(to_js)
    }

    /// True once after the current game ended
    #[wasm_bindgen(js_name = takeGameEnded)]
    pub fn take_game_ended(&mut self) -> bool {
        std::mem::take(&mut self.game_ended)
    }
}

impl Default for WebSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSession {
    fn with_game<T>(&mut self, f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        self.inner.game_mut().map(f)
    }

    fn collect_events(&mut self) {
        for event in self.inner.drain_events() {
            log::debug!("{event:?}");
            if matches!(event, GameEvent::GameEnded { .. }) {
                self.game_ended = true;
            }
        }
    }
}
