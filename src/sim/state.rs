//! Game state and core engine operations
//!
//! `Game` owns the board, the three next-shape slots, score, streak and high
//! score. It is created fresh or restored from a `StoredGame`, and replaced
//! wholesale on new game or mode switch.

use std::fmt;

use glam::IVec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::catalogue::{Catalogue, ShapePool};
use super::shape::Shape;
use crate::consts::*;
use crate::error::{GameError, GameResult};
use crate::highscores::HighScore;
use crate::modes::GameMode;
use crate::on_board;
use crate::persistence::{SharedStore, StoredGame};

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Shapes can still be placed
    Active,
    /// Nothing fits any more; terminal for this instance
    Ended,
}

/// One of the three next-shape holders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// `None` once placed, until the next refill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub is_dragging: bool,
    /// Slot-to-cursor animation, 1..=100 while dragging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pick_animation: Option<u32>,
    /// Position among the slots (0..3)
    #[serde(default)]
    pub index: usize,
}

impl Slot {
    pub fn empty(index: usize) -> Self {
        Self {
            shape: None,
            is_dragging: false,
            pick_animation: None,
            index,
        }
    }

    pub fn with_shape(index: usize, shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..Self::empty(index)
        }
    }

    fn release(&mut self) {
        self.is_dragging = false;
        self.pick_animation = None;
    }
}

/// How a slot's shape relates to the current board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Already placed
    Empty,
    /// Fits nowhere, or the game is over
    Disabled,
    /// Fits, but only on cells the current preview needs
    Warning,
    Ready,
}

/// Things that happened since the host last drained events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A shape was committed to the board
    Placed { slot: usize, cells: usize },
    /// Groups cleared by the last placement
    Cleared {
        eliminations: u32,
        cells: u32,
        streak: u32,
    },
    /// The board was emptied completely
    PerfectClear { bonus: u64 },
    /// Score passed the stored high score, once per game
    NewHighScore { score: u64 },
    /// All three slots were refilled
    Refilled,
    /// Active -> Ended, emitted once per game
    GameEnded { high_score: bool },
}

/// The game aggregate
pub struct Game {
    pub(super) mode: GameMode,
    /// Playing field
    pub board: Board,
    /// Next shapes, position == `Slot::index`
    pub slots: [Slot; SLOT_COUNT],
    pub(super) score: u64,
    /// Consecutive placements that cleared something
    pub(super) streak_multiplier: u32,
    pub(super) high_score: HighScore,
    /// This game's score has reached the stored high score
    record_reached: bool,
    pub(super) is_high_score: bool,
    pub(super) phase: GamePhase,
    /// Bumped on every state change, hosts redraw when it moves
    pub(super) state_progress: u64,
    /// Board intro animation, negative while waiting
    pub(super) intro_progress: i32,
    pool: ShapePool,
    rng: Pcg32,
    pub(super) store: SharedStore,
    events: Vec<GameEvent>,
    debug_cursor: usize,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("mode", &self.mode)
            .field("score", &self.score)
            .field("streak_multiplier", &self.streak_multiplier)
            .field("high_score", &self.high_score)
            .field("phase", &self.phase)
            .field("state_progress", &self.state_progress)
            .finish_non_exhaustive()
    }
}

impl Game {
    fn blank(mode: GameMode, catalogue: &Catalogue, store: SharedStore, seed: u64) -> Self {
        let high_score = HighScore::load(store.as_ref(), mode);
        Self {
            mode,
            board: Board::new(),
            slots: std::array::from_fn(Slot::empty),
            score: 0,
            streak_multiplier: 0,
            high_score,
            record_reached: false,
            is_high_score: false,
            phase: GamePhase::Active,
            state_progress: 0,
            intro_progress: INTRO_ANIMATION_START,
            pool: mode.shape_pool(catalogue),
            rng: Pcg32::seed_from_u64(seed),
            store,
            events: Vec::new(),
            debug_cursor: 0,
        }
    }

    /// Fresh game: empty board, slots filled by the mode's policy
    pub fn new(mode: GameMode, catalogue: &Catalogue, store: SharedStore, seed: u64) -> Self {
        let mut game = Self::blank(mode, catalogue, store, seed);
        game.refill_shapes();
        game.events.clear();
        log::info!("New '{mode}' game (high score {})", game.high_score.best);
        game
    }

    /// Continue from a snapshot. Drag state is not restored.
    pub fn restore(
        mode: GameMode,
        catalogue: &Catalogue,
        store: SharedStore,
        stored: StoredGame,
        seed: u64,
    ) -> GameResult<Self> {
        stored.validate().map_err(|reason| GameError::CorruptSnapshot {
            key: StoredGame::storage_key(mode),
            reason,
        })?;

        let mut game = Self::blank(mode, catalogue, store, seed);
        game.board = stored.game_field;
        game.slots = stored.next_shapes;
        for (index, slot) in game.slots.iter_mut().enumerate() {
            slot.release();
            slot.index = index;
        }
        game.score = stored.score;
        game.streak_multiplier = stored.streak_multiplier;
        // The high score is saved eagerly, so a game at the record set it itself
        game.record_reached = game.score > 0 && game.score >= game.high_score.best;
        if stored.game_ended {
            game.phase = GamePhase::Ended;
            game.is_high_score = game.record_reached;
        }
        log::info!(
            "Restored '{mode}' game at score {} ({})",
            game.score,
            if stored.game_ended { "ended" } else { "active" }
        );
        Ok(game)
    }

    /// Snapshot of everything `restore` needs
    pub fn snapshot(&self) -> StoredGame {
        StoredGame {
            score: self.score,
            game_field: self.board.clone(),
            next_shapes: self.slots.clone(),
            game_ended: self.is_ended(),
            streak_multiplier: self.streak_multiplier,
        }
    }

    /// Snapshot in its stored JSON form, for hosts that render from it
    pub fn snapshot_json(&self) -> GameResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Persist the snapshot under this mode's key
    pub fn store_game(&self) {
        self.snapshot().save(self.store.as_ref(), self.mode);
    }

    // === Accessors ===

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn streak_multiplier(&self) -> u32 {
        self.streak_multiplier
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best
    }

    /// Whether the ended game beat the high score it started with
    pub fn is_high_score(&self) -> bool {
        self.is_high_score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    pub fn state_progress(&self) -> u64 {
        self.state_progress
    }

    pub fn intro_progress(&self) -> i32 {
        self.intro_progress
    }

    pub fn pool(&self) -> &ShapePool {
        &self.pool
    }

    /// Take the events gathered since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn bump(&mut self) {
        self.state_progress += 1;
    }

    // === Shapes ===

    /// Draw three new shapes within the mode's limits for the current score,
    /// then shuffle the slots. With a retry limit, a draw where nothing fits
    /// is redrawn up to that many times before it is accepted.
    pub fn refill_shapes(&mut self) {
        let limits = self.mode.dimension_limits(self.score);
        let retries = self.mode.spawn_retry_limit().unwrap_or(0);
        let mut attempt = 0;
        loop {
            for (index, limit) in limits.iter().enumerate() {
                let shape = self.pool.choose(*limit, &mut self.rng).cloned();
                self.slots[index] = Slot {
                    shape,
                    ..Slot::empty(index)
                };
            }
            self.slots.shuffle(&mut self.rng);
            for (index, slot) in self.slots.iter_mut().enumerate() {
                slot.index = index;
            }

            if attempt >= retries || self.can_drop_any_next_shape() {
                break;
            }
            attempt += 1;
            log::debug!("Dead draw, redrawing ({attempt}/{retries})");
        }
        self.events.push(GameEvent::Refilled);
        self.bump();
    }

    /// Fill the slots with the next three pool shapes in order, wrapping.
    /// For walking through every shape while debugging.
    pub fn debug_next_shapes(&mut self) {
        for index in 0..SLOT_COUNT {
            let shape = self.pool.nth_wrapping(self.debug_cursor + index).cloned();
            self.slots[index] = Slot {
                shape,
                ..Slot::empty(index)
            };
        }
        self.debug_cursor += SLOT_COUNT;
        if self.debug_cursor >= self.pool.len() {
            self.debug_cursor = 0;
        }
        self.bump();
    }

    /// Put specific shapes into the slots
    pub fn set_next_shapes(&mut self, shapes: [Option<Shape>; SLOT_COUNT]) {
        for (index, shape) in shapes.into_iter().enumerate() {
            self.slots[index] = Slot {
                shape,
                ..Slot::empty(index)
            };
        }
        self.bump();
    }

    /// Whether `shape` fits anywhere. With `include_marked`, cells about to
    /// clear count as free and previewed cells count as taken.
    pub fn shape_can_be_placed(&self, shape: &Shape, include_marked: bool) -> bool {
        self.board.fits_anywhere(shape, include_marked)
    }

    /// Whether any slot's shape fits anywhere
    pub fn can_drop_any_next_shape(&self) -> bool {
        self.slots
            .iter()
            .filter_map(|s| s.shape.as_ref())
            .any(|shape| self.shape_can_be_placed(shape, false))
    }

    /// Placeability of a slot for display
    pub fn slot_status(&self, slot: usize) -> SlotStatus {
        let Some(shape) = &self.slots[slot].shape else {
            return SlotStatus::Empty;
        };
        if self.is_ended() || !self.shape_can_be_placed(shape, false) {
            SlotStatus::Disabled
        } else if !self.shape_can_be_placed(shape, true) {
            SlotStatus::Warning
        } else {
            SlotStatus::Ready
        }
    }

    // === Dragging ===

    /// The slot being dragged, if any.
    ///
    /// # Panics
    /// If the dragging slot holds no shape.
    pub fn dragging_shape(&self) -> Option<&Slot> {
        let slot = self.slots.iter().find(|s| s.is_dragging)?;
        if slot.shape.is_none() {
            panic!("slot {} is dragging without a shape", slot.index);
        }
        Some(slot)
    }

    /// Start dragging a slot. Ignored for empty slots, shapes that fit
    /// nowhere, and ended games.
    pub fn set_dragging_shape(&mut self, index: usize) {
        let Some(shape) = self.slots.get(index).and_then(|s| s.shape.as_ref()) else {
            return;
        };
        if self.is_ended() || !self.shape_can_be_placed(shape, false) {
            return;
        }
        for slot in &mut self.slots {
            slot.release();
        }
        let slot = &mut self.slots[index];
        slot.is_dragging = true;
        slot.pick_animation = Some(1);
        self.bump();
    }

    /// Stop dragging; the shape stays in its slot
    pub fn release_dragging_shape(&mut self) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_dragging) {
            slot.release();
            self.bump();
        }
    }

    fn slot_shape(&self, slot: usize) -> &Shape {
        match self.slots.get(slot) {
            Some(Slot { shape: Some(shape), .. }) => shape,
            Some(_) => panic!("slot {slot} has no shape to drag"),
            None => panic!("slot {slot} out of range (0..{SLOT_COUNT})"),
        }
    }

    /// Preview `slot`'s shape at `position`: marks the cells it would cover
    /// and highlights groups it would complete. Returns whether it fits.
    ///
    /// # Panics
    /// If `slot` is not below `SLOT_COUNT` or the slot holds no shape.
    pub fn mark_dragging_shape(&mut self, slot: usize, position: IVec2) -> bool {
        self.board.reset_markings();
        let shape = self.slot_shape(slot);
        let fits = on_board(position) && self.board.can_drop(shape, position, false);
        if fits {
            let shape = shape.clone();
            self.board.mark(&shape, position);
            self.board.check_elimination_marking();
        }
        self.bump();
        fits
    }

    /// Drop `slot`'s shape at `position`. Returns the number of cells placed;
    /// an illegal position or an ended game leaves everything as it was and
    /// returns 0. Either way the slot is no longer dragging and the preview
    /// is gone.
    ///
    /// # Panics
    /// If `slot` is not below `SLOT_COUNT` or the slot holds no shape.
    pub fn place_dragging(&mut self, slot: usize, position: IVec2) -> usize {
        self.board.reset_markings();
        let legal = !self.is_ended()
            && on_board(position)
            && self.board.can_drop(self.slot_shape(slot), position, false);
        self.slots[slot].release();
        if !legal {
            log::trace!("Ignoring drop of slot {slot} at {position}");
            self.bump();
            return 0;
        }

        let Some(shape) = self.slots[slot].shape.take() else {
            return 0;
        };
        let placed = self.board.place(&shape, position);
        self.events.push(GameEvent::Placed {
            slot,
            cells: placed,
        });
        self.perform_checks_after_placed(placed);
        self.bump();
        placed
    }

    // === Scoring ===

    /// Clear completed groups, score the placement, refill, detect game end
    /// and persist
    fn perform_checks_after_placed(&mut self, placed: usize) {
        let eliminations = self.board.check_elimination_marking();
        let eliminated = self.board.eliminate_highlighted();

        let mut increase =
            placed as u64 + eliminated as u64 + eliminations as u64 * POINTS_PER_ELIMINATION;
        if eliminations > 1 {
            increase *= (self.streak_multiplier + eliminations) as u64;
        }
        self.add_to_score(increase);

        if eliminations == 0 {
            self.streak_multiplier = 0;
        } else {
            self.streak_multiplier += 1;
            self.events.push(GameEvent::Cleared {
                eliminations,
                cells: eliminated,
                streak: self.streak_multiplier,
            });
        }

        if self.board.is_empty() {
            let bonus = (self.score as f64 * PERFECT_CLEAR_RATIO).ceil() as u64 + PERFECT_CLEAR_FLAT;
            self.add_to_score(bonus);
            self.events.push(GameEvent::PerfectClear { bonus });
        }

        if self.slots.iter().all(|s| s.shape.is_none()) {
            self.refill_shapes();
        }

        if !self.can_drop_any_next_shape() {
            self.end_game();
        }
        self.store_game();
    }

    /// Add points, raising and persisting the high score as soon as it is
    /// passed. `NewHighScore` is emitted the first time per game.
    pub fn add_to_score(&mut self, points: u64) {
        self.score += points;
        if self.high_score.record(self.score) {
            self.high_score.save(self.store.as_ref(), self.mode);
            if !self.record_reached {
                self.record_reached = true;
                self.events.push(GameEvent::NewHighScore { score: self.score });
            }
        }
    }

    /// Finish the game. Only the first call has an effect.
    pub fn end_game(&mut self) {
        if self.is_ended() {
            return;
        }
        self.is_high_score = self.record_reached;
        self.phase = GamePhase::Ended;
        self.events.push(GameEvent::GameEnded {
            high_score: self.is_high_score,
        });
        log::info!(
            "'{}' game over at {} points{}",
            self.mode,
            self.score,
            if self.is_high_score { " (new high score)" } else { "" }
        );
        self.bump();
    }

    /// Clear preview and highlight flags
    pub fn reset_markings(&mut self) {
        self.board.reset_markings();
        self.bump();
    }
}
