//! Save/load persistence
//!
//! Features:
//! - Injected string key-value store (no ambient globals)
//! - Mode-namespaced JSON snapshots
//! - One-time migration of pre-namespace keys
//!
//! Writes are synchronous and best-effort: last write wins, failures are
//! logged and otherwise ignored.

pub mod migration;
pub mod snapshot;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub use migration::migrate_legacy_keys;
pub use snapshot::StoredGame;

/// Minimal string store the engine persists into
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Store handle shared between the session and its current game
pub type SharedStore = Rc<dyn KeyValueStore>;

/// In-process store, used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, sorted
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1");
        store.set("a", "2");
        store.set("b", "3");
        assert_eq!(store.get("a").as_deref(), Some("2"));
        assert_eq!(store.keys(), vec!["a", "b"]);
        store.remove("a");
        store.remove("missing");
        assert_eq!(store.get("a"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_shared_store_sees_writes() {
        let store = Rc::new(MemoryStore::new());
        let shared: SharedStore = store.clone();
        shared.set("default_highScore", "42");
        assert_eq!(store.get("default_highScore").as_deref(), Some("42"));
    }
}
