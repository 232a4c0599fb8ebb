//! Game modes
//!
//! A mode decides which shapes are in play, how large the shapes offered in
//! each slot may be at the current score, and whether a dead draw is redrawn.
//! The mode name doubles as the persistence namespace.

use std::fmt;
use std::str::FromStr;

use crate::consts::SLOT_COUNT;
use crate::error::{GameError, GameResult};
use crate::sim::{Catalogue, ShapeFamily, ShapePool, SlotLimit};

/// Per-slot dimension bounds for one refill
pub type DimensionLimits = [SlotLimit; SLOT_COUNT];

/// Shapes Extreme adds to the standard set
const EXTREME_EXTRA: [ShapeFamily; 6] = [
    ShapeFamily::Stair,
    ShapeFamily::LEdge,
    ShapeFamily::Rectangle,
    ShapeFamily::BigCShape,
    ShapeFamily::BigSquare,
    ShapeFamily::ExtremeSquare,
];

/// The only shapes Mode4 plays with
const MODE4_SET: [ShapeFamily; 5] = [
    ShapeFamily::Stick4,
    ShapeFamily::MediumL,
    ShapeFamily::Square2,
    ShapeFamily::SShape,
    ShapeFamily::SmallT,
];

/// Known game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// Standard shapes, limits loosen at 200/500/1000 points
    #[default]
    Default,
    /// Only small shapes
    Baby,
    /// Extra large shapes with minimum sizes, dead draws are redrawn
    Extreme,
    /// Small fixed set in a tight size band
    Mode4,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Default,
        GameMode::Baby,
        GameMode::Extreme,
        GameMode::Mode4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Default => "default",
            GameMode::Baby => "baby",
            GameMode::Extreme => "extreme",
            GameMode::Mode4 => "mode4",
        }
    }

    /// Resolve a mode by its exact name. Unknown names are a configuration
    /// error, never silently mapped to a default.
    pub fn from_name(name: &str) -> GameResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or_else(|| GameError::UnknownMode(name.to_string()))
    }

    /// Adjust a pool holding the standard set to this mode's shapes
    pub fn init(&self, pool: &mut ShapePool, catalogue: &Catalogue) {
        match self {
            GameMode::Default | GameMode::Baby => {}
            GameMode::Extreme => pool.extend(catalogue.shapes_of(&EXTREME_EXTRA)),
            GameMode::Mode4 => pool.replace(catalogue.shapes_of(&MODE4_SET)),
        }
        log::debug!(
            "Mode '{}' plays {} shapes, dimensions {:?}",
            self.as_str(),
            pool.len(),
            pool.dimensions()
        );
    }

    /// Fresh pool for a new game in this mode
    pub fn shape_pool(&self, catalogue: &Catalogue) -> ShapePool {
        let mut pool = ShapePool::new(catalogue.default_set());
        self.init(&mut pool, catalogue);
        pool
    }

    /// Dimension bounds for the three slots at the given score
    pub fn dimension_limits(&self, score: u64) -> DimensionLimits {
        match self {
            GameMode::Default => {
                // The last slot can always hold any shape
                let (first, second) = match score {
                    0..200 => (3.5, 5.5),
                    200..500 => (5.0, 8.0),
                    500..1000 => (5.5, 8.0),
                    _ => (8.0, 8.0),
                };
                [
                    SlotLimit::at_most(first),
                    SlotLimit::at_most(second),
                    SlotLimit::at_most(8.0),
                ]
            }
            GameMode::Baby => [SlotLimit::at_most(4.0); SLOT_COUNT],
            GameMode::Extreme => {
                let (first_min, second_min) = match score {
                    0..100 => (4.0, 4.0),
                    100..500 => (4.0, 5.0),
                    _ => (5.0, 5.0),
                };
                [
                    SlotLimit::between(first_min, 8.0),
                    SlotLimit::between(second_min, 8.0),
                    SlotLimit::between(5.0, 10.0),
                ]
            }
            GameMode::Mode4 => [SlotLimit::between(4.0, 6.5); SLOT_COUNT],
        }
    }

    /// How often a draw with no placeable shape is redrawn
    pub fn spawn_retry_limit(&self) -> Option<u32> {
        match self {
            GameMode::Default | GameMode::Baby => None,
            GameMode::Extreme => Some(3),
            GameMode::Mode4 => Some(1),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: [u64; 11] = [0, 99, 100, 199, 200, 499, 500, 999, 1000, 5000, 1_000_000];

    #[test]
    fn test_names_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_name(mode.as_str()).unwrap(), mode);
            assert_eq!(mode.to_string().parse::<GameMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let err = GameMode::from_name("Default").unwrap_err();
        assert!(matches!(err, GameError::UnknownMode(ref name) if name == "Default"));
        assert!(GameMode::from_name("baby_mode").is_err());
        assert!(GameMode::from_name("").is_err());
    }

    #[test]
    fn test_default_ramp() {
        let limits = |score| GameMode::Default.dimension_limits(score).map(|l| l.max);
        assert_eq!(limits(0), [3.5, 5.5, 8.0]);
        assert_eq!(limits(199), [3.5, 5.5, 8.0]);
        assert_eq!(limits(200), [5.0, 8.0, 8.0]);
        assert_eq!(limits(500), [5.5, 8.0, 8.0]);
        assert_eq!(limits(1000), [8.0, 8.0, 8.0]);
        assert!(GameMode::Default.dimension_limits(0).iter().all(|l| l.min.is_none()));
    }

    #[test]
    fn test_extreme_minimums_tighten() {
        let mins = |score| GameMode::Extreme.dimension_limits(score).map(|l| l.min);
        assert_eq!(mins(50), [Some(4.0), Some(4.0), Some(5.0)]);
        assert_eq!(mins(100), [Some(4.0), Some(5.0), Some(5.0)]);
        assert_eq!(mins(500), [Some(5.0), Some(5.0), Some(5.0)]);
        assert_eq!(GameMode::Extreme.dimension_limits(0)[2].max, 10.0);
    }

    #[test]
    fn test_pools_per_mode() {
        let catalogue = Catalogue::standard();
        let default_len = catalogue.default_set().len();
        assert_eq!(GameMode::Default.shape_pool(&catalogue).len(), default_len);
        assert_eq!(GameMode::Baby.shape_pool(&catalogue).len(), default_len);
        let extreme = GameMode::Extreme.shape_pool(&catalogue);
        assert!(extreme.len() > default_len);
        assert_eq!(extreme.dimensions().last(), Some(&10.0));
        let mode4 = GameMode::Mode4.shape_pool(&catalogue);
        assert_eq!(mode4.dimensions(), vec![4.0, 5.5, 6.5]);
    }

    #[test]
    fn test_every_declared_limit_has_shapes() {
        let catalogue = Catalogue::standard();
        for mode in GameMode::ALL {
            let pool = mode.shape_pool(&catalogue);
            for score in SCORES {
                for (slot, limit) in mode.dimension_limits(score).iter().enumerate() {
                    assert!(
                        !pool.eligible(*limit).is_empty(),
                        "{mode} slot {slot} at score {score} has no shapes"
                    );
                }
            }
        }
    }

    #[test]
    fn test_retry_limits() {
        assert_eq!(GameMode::Default.spawn_retry_limit(), None);
        assert_eq!(GameMode::Baby.spawn_retry_limit(), None);
        assert_eq!(GameMode::Extreme.spawn_retry_limit(), Some(3));
        assert_eq!(GameMode::Mode4.spawn_retry_limit(), Some(1));
    }
}
