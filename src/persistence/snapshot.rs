//! Persisted game snapshot
//!
//! One snapshot per mode under `<mode>_store`:
//! `{ score, gameField: Cell[9][9], nextShapes: Slot[3], gameEnded, streakMultiplier }`

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::consts::SLOT_COUNT;
use crate::error::{GameError, GameResult};
use crate::modes::GameMode;
use crate::namespaced_key;
use crate::sim::{Board, Slot};

/// Everything needed to continue a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub score: u64,
    pub game_field: Board,
    pub next_shapes: [Slot; SLOT_COUNT],
    pub game_ended: bool,
    /// Missing in snapshots written before streaks existed
    #[serde(default)]
    pub streak_multiplier: u32,
}

impl StoredGame {
    const KEY: &'static str = "store";

    /// Storage key for this mode's snapshot
    pub fn storage_key(mode: GameMode) -> String {
        namespaced_key(mode.as_str(), Self::KEY)
    }

    /// Read this mode's snapshot. `Ok(None)` when nothing is stored; unparsable
    /// or inconsistent data is `CorruptSnapshot`.
    pub fn load(store: &dyn KeyValueStore, mode: GameMode) -> GameResult<Option<Self>> {
        let key = Self::storage_key(mode);
        let Some(json) = store.get(&key) else {
            return Ok(None);
        };
        let corrupt = |reason: String| GameError::CorruptSnapshot {
            key: key.clone(),
            reason,
        };
        let stored: StoredGame = serde_json::from_str(&json).map_err(|e| corrupt(e.to_string()))?;
        stored.validate().map_err(corrupt)?;
        Ok(Some(stored))
    }

    /// Write this snapshot under the mode's key
    pub fn save(&self, store: &dyn KeyValueStore, mode: GameMode) {
        match serde_json::to_string(self) {
            Ok(json) => {
                store.set(&Self::storage_key(mode), &json);
                log::trace!("Game stored ({} bytes)", json.len());
            }
            Err(e) => log::warn!("Failed to serialize game: {e}"),
        }
    }

    /// Consistency checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        self.game_field.validate()?;
        for (i, slot) in self.next_shapes.iter().enumerate() {
            if let Some(shape) = &slot.shape {
                if !shape.is_well_formed() {
                    return Err(format!("slot {i} holds a malformed shape"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::Shape;
    use glam::IVec2;

    fn sample() -> StoredGame {
        let mut board = Board::new();
        board.place(&Shape::from_rows(0, &["##"]), IVec2::new(2, 5));
        StoredGame {
            score: 57,
            game_field: board,
            next_shapes: [
                Slot::with_shape(0, Shape::from_rows(4, &["#", "#"])),
                Slot::empty(1),
                Slot::with_shape(2, Shape::from_rows(9, &["##", "#."])),
            ],
            game_ended: false,
            streak_multiplier: 2,
        }
    }

    #[test]
    fn test_json_layout() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["score"], 57);
        assert_eq!(json["streakMultiplier"], 2);
        assert_eq!(json["gameEnded"], false);
        assert_eq!(json["gameField"].as_array().unwrap().len(), 9);
        assert_eq!(json["gameField"][2][5]["placed"], true);
        assert_eq!(json["gameField"][2][5]["x"], 2);
        assert!(json["gameField"][0][0].get("animationProgress").is_none());
        assert_eq!(json["nextShapes"][0]["isDragging"], false);
        assert_eq!(json["nextShapes"][0]["shape"]["fields"][1]["y"], 1);
        assert!(json["nextShapes"][1].get("shape").is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let stored = sample();
        stored.save(&store, GameMode::Baby);
        assert!(store.get("baby_store").is_some());
        assert_eq!(StoredGame::load(&store, GameMode::Baby).unwrap(), Some(stored));
        assert_eq!(StoredGame::load(&store, GameMode::Default).unwrap(), None);
    }

    #[test]
    fn test_missing_streak_defaults_to_zero() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("streakMultiplier");
        let stored: StoredGame = serde_json::from_value(json).unwrap();
        assert_eq!(stored.streak_multiplier, 0);
    }

    #[test]
    fn test_malformed_json_is_corrupt() {
        let store = MemoryStore::new();
        store.set("default_store", "{\"score\": 1, \"gameField\": [");
        let err = StoredGame::load(&store, GameMode::Default).unwrap_err();
        assert!(matches!(err, GameError::CorruptSnapshot { ref key, .. } if key == "default_store"));
    }

    #[test]
    fn test_wrong_board_size_is_corrupt() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["gameField"].as_array_mut().unwrap().pop();
        let store = MemoryStore::new();
        store.set("default_store", &json.to_string());
        assert!(StoredGame::load(&store, GameMode::Default).is_err());
    }

    #[test]
    fn test_inconsistent_cells_are_corrupt() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["gameField"][2][5]["removed"] = true.into();
        let store = MemoryStore::new();
        store.set("default_store", &json.to_string());
        assert!(StoredGame::load(&store, GameMode::Default).is_err());

        let mut json = serde_json::to_value(sample()).unwrap();
        json["gameField"][3][3]["x"] = 4.into();
        store.set("default_store", &json.to_string());
        assert!(StoredGame::load(&store, GameMode::Default).is_err());
    }

    #[test]
    fn test_malformed_shape_is_corrupt() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["nextShapes"][0]["shape"]["width"] = 0.into();
        let store = MemoryStore::new();
        store.set("default_store", &json.to_string());
        assert!(StoredGame::load(&store, GameMode::Default).is_err());
    }
}
