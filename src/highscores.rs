//! Per-mode high score
//!
//! Persisted as a decimal string under `<mode>_highScore`. Starting a new game
//! never resets it.

use crate::modes::GameMode;
use crate::namespaced_key;
use crate::persistence::KeyValueStore;

/// Best score reached in one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    const KEY: &'static str = "highScore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Storage key for a mode's high score
    pub fn storage_key(mode: GameMode) -> String {
        namespaced_key(mode.as_str(), Self::KEY)
    }

    /// Check if a score beats the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Take `score` as the new best if it qualifies. Returns whether it did.
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    /// Load a mode's high score. Missing or unreadable values count as 0.
    pub fn load(store: &dyn KeyValueStore, mode: GameMode) -> Self {
        let key = Self::storage_key(mode);
        let Some(raw) = store.get(&key) else {
            return Self::default();
        };
        match parse_score(&raw) {
            Some(best) => {
                log::debug!("Loaded high score {best} for '{mode}'");
                Self { best }
            }
            None => {
                log::warn!("Ignoring unreadable high score '{raw}' under '{key}'");
                Self::default()
            }
        }
    }

    /// Save as a decimal string
    pub fn save(&self, store: &dyn KeyValueStore, mode: GameMode) {
        store.set(&Self::storage_key(mode), &self.best.to_string());
    }
}

/// Integer prefix parse; tolerates values written as floats (`"120.0"`)
fn parse_score(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(score) = raw.parse::<u64>() {
        return Some(score);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_record_only_improvements() {
        let mut high = HighScore::new(100);
        assert!(!high.qualifies(100));
        assert!(!high.record(90));
        assert!(high.record(101));
        assert_eq!(high.best, 101);
    }

    #[test]
    fn test_save_load_per_mode() {
        let store = MemoryStore::new();
        HighScore::new(321).save(&store, GameMode::Extreme);
        assert_eq!(store.get("extreme_highScore").as_deref(), Some("321"));
        assert_eq!(HighScore::load(&store, GameMode::Extreme).best, 321);
        assert_eq!(HighScore::load(&store, GameMode::Default).best, 0);
    }

    #[test]
    fn test_unreadable_values() {
        let store = MemoryStore::new();
        store.set("baby_highScore", "not a number");
        assert_eq!(HighScore::load(&store, GameMode::Baby).best, 0);
        store.set("baby_highScore", " 88.0 ");
        assert_eq!(HighScore::load(&store, GameMode::Baby).best, 88);
        store.set("baby_highScore", "-5");
        assert_eq!(HighScore::load(&store, GameMode::Baby).best, 0);
    }
}
