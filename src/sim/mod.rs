//! Deterministic game engine
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only
//! - Fixed timestep animations
//! - Persistence only through the injected store
//! - No rendering or platform dependencies

pub mod board;
pub mod catalogue;
pub mod shape;
pub mod state;
pub mod tick;

pub use board::{Board, Cell};
pub use catalogue::{Catalogue, ShapeFamily, ShapePool, SlotLimit};
pub use shape::{Axis, Field, MirrorMode, Rotation, Shape, ShapeId, ShapeIdGen, transform};
pub use state::{Game, GameEvent, GamePhase, Slot, SlotStatus};
pub use tick::{TickOutcome, tick};
