//! Grid Blast entry point
//!
//! Natively this autoplays one game with a greedy bot over an in-memory
//! store: `grid-blast [mode] [seed]`. The browser build starts from
//! `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::rc::Rc;

    use glam::IVec2;
    use grid_blast::consts::{BOARD_SIZE, TICK_INTERVAL_MS};
    use grid_blast::sim::{Game, GameEvent};
    use grid_blast::{GameResult, GameSession, MemoryStore};

    /// Safety stop for games that never end
    const MAX_MOVES: u32 = 10_000;

    /// Best (slot, position) by cells cleared, then by how low and left it sits
    fn best_move(game: &Game) -> Option<(usize, IVec2)> {
        let size = BOARD_SIZE as i32;
        let mut best: Option<((u32, i32), usize, IVec2)> = None;
        for (index, slot) in game.slots.iter().enumerate() {
            let Some(shape) = &slot.shape else {
                continue;
            };
            for x in 0..=size - shape.width() {
                for y in 0..=size - shape.height() {
                    let pos = IVec2::new(x, y);
                    if !game.board.can_drop(shape, pos, false) {
                        continue;
                    }
                    let mut board = game.board.clone();
                    board.place(shape, pos);
                    let cleared = board.check_elimination_marking();
                    let rank = (cleared, -(x + y));
                    if best.as_ref().is_none_or(|(r, _, _)| rank > *r) {
                        best = Some((rank, index, pos));
                    }
                }
            }
        }
        best.map(|(_, slot, pos)| (slot, pos))
    }

    pub fn run(mode: &str, seed: Option<u64>) -> GameResult<u64> {
        let store = Rc::new(MemoryStore::new());
        let mut session = match seed {
            Some(seed) => GameSession::with_seed(store.clone(), seed),
            None => GameSession::new(store.clone()),
        };
        session.load_game(mode)?;

        let mut moves = 0;
        while moves < MAX_MOVES {
            let Some(game) = session.game_mut() else {
                break;
            };
            if game.is_ended() {
                break;
            }
            let Some((slot, pos)) = best_move(game) else {
                game.end_game();
                break;
            };
            game.set_dragging_shape(slot);
            game.mark_dragging_shape(slot, pos);
            game.place_dragging(slot, pos);
            moves += 1;

            // Let clear animations finish between moves
            for _ in 0..50 {
                session.advance(f64::from(TICK_INTERVAL_MS));
            }
            for event in session.drain_events() {
                match event {
                    GameEvent::Cleared {
                        eliminations,
                        streak,
                        ..
                    } => log::info!("Cleared {eliminations} groups (streak {streak})"),
                    GameEvent::PerfectClear { bonus } => log::info!("Perfect clear, +{bonus}"),
                    GameEvent::NewHighScore { score } => log::info!("New high score {score}"),
                    GameEvent::GameEnded { .. } => log::info!("Game ended after {moves} moves"),
                    other => log::debug!("{other:?}"),
                }
            }
        }

        let score = session.game().map_or(0, Game::score);
        log::info!("Stored keys: {:?}", store.keys());
        Ok(score)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| String::from("default"));
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => Some(seed),
        Some(Err(e)) => {
            eprintln!("Invalid seed: {e}");
            std::process::exit(2);
        }
        None => None,
    };

    log::info!("Grid Blast (native) autoplaying '{mode}'");
    match autoplay::run(&mode, seed) {
        Ok(score) => println!("Final score: {score}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
