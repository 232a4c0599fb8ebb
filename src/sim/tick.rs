//! Fixed timestep animation tick
//!
//! Advances clear fades, the pick animation of the dragged slot and the
//! board intro. Gameplay itself only changes through the `Game` operations.

use super::state::Game;
use crate::consts::*;

/// What a single tick changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Anything moved; hosts redraw
    pub changed: bool,
    /// Fades that reached the end and were reset
    pub cells_finished: u32,
}

/// Advance all running animations by one step
pub fn tick(game: &mut Game) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    for cell in game.board.cells_mut().filter(|c| c.removed) {
        let progress = cell.animation_progress.unwrap_or(0);
        let next = (progress + CLEAR_ANIMATION_STEP).min(ANIMATION_DONE);
        if next >= ANIMATION_DONE {
            cell.reset();
            outcome.cells_finished += 1;
        } else {
            cell.animation_progress = Some(next);
        }
        outcome.changed = true;
    }

    // Pick animation
    for slot in game.slots.iter_mut().filter(|s| s.is_dragging) {
        if let Some(progress) = slot.pick_animation.filter(|p| *p < ANIMATION_DONE as u32) {
            slot.pick_animation = Some((progress + PICK_ANIMATION_STEP).min(ANIMATION_DONE as u32));
            outcome.changed = true;
        }
    }

    if game.intro_progress < ANIMATION_DONE {
        game.intro_progress = (game.intro_progress + INTRO_ANIMATION_STEP).min(ANIMATION_DONE);
        outcome.changed = true;
    }

    if outcome.cells_finished > 0 {
        log::trace!("{} cells finished clearing", outcome.cells_finished);
        game.store_game();
    }
    if outcome.changed {
        game.bump();
    }
    outcome
}
