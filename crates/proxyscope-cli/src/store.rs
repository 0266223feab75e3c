//! File-backed settings storage for the terminal front-end.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use proxyscope_core::KeyValueStore;

/// Stores every key in one JSON object on disk.
///
/// Reads tolerate a missing or corrupt file. Writes rewrite the whole file and
/// log failures instead of surfacing them.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read state file"
                );
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "ignoring unreadable state file"
            );
            BTreeMap::new()
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        fs::write(&self.path, text)
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn save(&self, key: &str, value: &str) {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.write_all(&entries) {
            tracing::warn!(
                path = %self.path.display(),
                key,
                error = %err,
                "failed to persist setting"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyscope_core::SettingsStore;
    use proxyscope_core::settings::{BLOCKLIST_KEY, THREADS_KEY};

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load(BLOCKLIST_KEY).is_none());
    }

    #[test]
    fn saves_round_trip_through_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");

        let mut settings = SettingsStore::load(Box::new(JsonFileStore::new(path.clone())));
        settings.add_blocked("us").expect("add");
        settings.add_blocked("cn").expect("add");

        let reopened = SettingsStore::load(Box::new(JsonFileStore::new(path.clone())));
        assert_eq!(reopened.blocklist().entries(), ["CN", "US"]);

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(raw.get(BLOCKLIST_KEY).map(String::as_str), Some(r#"["CN","US"]"#));
        assert!(!raw.contains_key(THREADS_KEY));
    }

    #[test]
    fn corrupt_file_falls_back_and_is_replaced_on_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ definitely not json").expect("write");

        let store = JsonFileStore::new(path);
        assert!(store.load(THREADS_KEY).is_none());
        store.save(THREADS_KEY, "75");
        assert_eq!(store.load(THREADS_KEY).as_deref(), Some("75"));
    }
}
