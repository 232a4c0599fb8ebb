//! Host-facing game lifecycle
//!
//! A `GameSession` owns the store handle, settings and catalogue, and holds at
//! most one `Game`. It resolves mode names, runs the legacy key migration
//! before the first load, and turns elapsed wall time into fixed ticks.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::GameResult;
use crate::modes::GameMode;
use crate::persistence::{SharedStore, StoredGame, migrate_legacy_keys};
use crate::settings::{CorruptSnapshotPolicy, Settings};
use crate::sim::{Catalogue, Game, GameEvent, tick};

/// One player's session
pub struct GameSession {
    store: SharedStore,
    settings: Settings,
    catalogue: Catalogue,
    game: Option<Game>,
    /// Seeds each new game
    rng: Pcg32,
    /// Milliseconds not yet consumed by ticks
    accumulator: f64,
    migrated: bool,
}

impl GameSession {
    /// Session with a random seed
    pub fn new(store: SharedStore) -> Self {
        Self::with_seed(store, rand::random())
    }

    /// Session whose games are reproducible from `seed`
    pub fn with_seed(store: SharedStore, seed: u64) -> Self {
        let settings = Settings::load(store.as_ref());
        log::info!("Session started with seed {seed}");
        Self {
            store,
            settings,
            catalogue: Catalogue::standard(),
            game: None,
            rng: Pcg32::seed_from_u64(seed),
            accumulator: 0.0,
            migrated: false,
        }
    }

    fn migrate_once(&mut self) {
        if !self.migrated {
            migrate_legacy_keys(self.store.as_ref());
            self.migrated = true;
        }
    }

    /// Continue the stored game of mode `name`, or start one if nothing is
    /// stored. A snapshot that cannot be restored follows
    /// `Settings::on_corrupt_snapshot`.
    pub fn load_game(&mut self, name: &str) -> GameResult<&mut Game> {
        self.migrate_once();
        let mode = GameMode::from_name(name)?;
        let seed = self.rng.random();

        let restored = StoredGame::load(self.store.as_ref(), mode).and_then(|stored| {
            stored
                .map(|s| Game::restore(mode, &self.catalogue, self.store.clone(), s, seed))
                .transpose()
        });
        let game = match restored {
            Ok(Some(game)) => game,
            Ok(None) => Game::new(mode, &self.catalogue, self.store.clone(), seed),
            Err(e) => match self.settings.on_corrupt_snapshot {
                CorruptSnapshotPolicy::FailFast => {
                    log::error!("Cannot restore '{mode}' game: {e}");
                    return Err(e);
                }
                CorruptSnapshotPolicy::NewGame => {
                    log::warn!("Discarding unreadable '{mode}' game: {e}");
                    let game = Game::new(mode, &self.catalogue, self.store.clone(), seed);
                    game.store_game();
                    game
                }
            },
        };
        Ok(self.install(game))
    }

    /// Replace the current game with a fresh one in mode `name` and store it
    pub fn new_game(&mut self, name: &str) -> GameResult<&mut Game> {
        self.migrate_once();
        let mode = GameMode::from_name(name)?;
        let game = Game::new(mode, &self.catalogue, self.store.clone(), self.rng.random());
        game.store_game();
        Ok(self.install(game))
    }

    fn install(&mut self, game: Game) -> &mut Game {
        self.accumulator = 0.0;
        self.game.insert(game)
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut Game> {
        self.game.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.game.is_some()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the settings
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(self.store.as_ref());
    }

    /// Run the ticks `elapsed_ms` of wall time is worth, at most
    /// `max_catch_up_ticks` of them. Time beyond that is dropped. Nothing
    /// runs before a game is loaded. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        let Some(game) = self.game.as_mut() else {
            return 0;
        };
        let interval = f64::from(self.settings.tick_interval_ms.max(1));
        self.accumulator += elapsed_ms.max(0.0);

        let mut substeps = 0;
        while self.accumulator >= interval && substeps < self.settings.max_catch_up_ticks {
            tick(game);
            self.accumulator -= interval;
            substeps += 1;
        }
        if self.accumulator >= interval {
            log::debug!("Dropping {:.0} ms of backlog", self.accumulator);
            self.accumulator %= interval;
        }
        substeps
    }

    /// Events of the current game since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.game
            .as_mut()
            .map(Game::drain_events)
            .unwrap_or_default()
    }
}
