//! Persistence and environment helpers for the app shell.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use proxyscope_core::KeyValueStore;

/// Backend origin; the dashboard talks to a fixed local scheduler.
pub(crate) const API_BASE_URL: &str = "http://localhost:8000";

/// `localStorage` with values stored verbatim.
///
/// gloo's typed accessors JSON-encode every value, which would wrap the
/// thread count in quotes; the raw `Storage` keeps the stored format stable.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Err(err) = LocalStorage::raw().set_item(key, value) {
            console::warn!("failed to persist setting", key, err);
        }
    }
}
