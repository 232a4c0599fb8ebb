//! `localStorage` backed key-value store

use web_sys::Storage;

use crate::persistence::KeyValueStore;

/// The page's `localStorage`
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// `None` when the page has no window or storage is disabled
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::warn!("Failed to write '{key}' to localStorage: {e:?}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::warn!("Failed to remove '{key}' from localStorage: {e:?}");
        }
    }
}
