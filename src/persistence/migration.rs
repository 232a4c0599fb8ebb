//! Legacy key migration
//!
//! Early releases stored a single game under `store` and `highScore`. Those
//! belong to the default mode; move them into its namespace and drop the
//! originals.

use super::KeyValueStore;
use crate::modes::GameMode;
use crate::namespaced_key;

/// Pre-namespace keys, in migration order
pub const LEGACY_KEYS: [&str; 2] = ["highScore", "store"];

/// Move legacy keys under `default_`. Only a complete legacy save (both
/// keys present) is moved; anything else is left untouched. Returns how many
/// keys moved; running it again is a no-op.
pub fn migrate_legacy_keys(store: &dyn KeyValueStore) -> usize {
    let values: Vec<(&str, String)> = LEGACY_KEYS
        .iter()
        .filter_map(|&key| store.get(key).map(|value| (key, value)))
        .collect();
    if values.len() != LEGACY_KEYS.len() {
        if !values.is_empty() {
            log::debug!("Incomplete legacy save, skipping migration");
        }
        return 0;
    }

    for (key, value) in &values {
        let target = namespaced_key(GameMode::Default.as_str(), key);
        store.set(&target, value);
        log::info!("Migrated legacy key '{key}' to '{target}'");
    }
    for (key, _) in &values {
        store.remove(key);
    }
    values.len()
}
