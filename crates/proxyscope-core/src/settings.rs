//! Locally persisted dashboard settings.
//!
//! # Design
//! - One explicitly constructed store owned by the session; no ambient globals.
//! - Values load once at construction and fall back to defaults when absent or
//!   corrupt. Corruption is never surfaced to the user.
//! - Every change is written through immediately as a full overwrite.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use thiserror::Error;

/// Storage key for the country blocklist (JSON array of uppercase strings).
pub const BLOCKLIST_KEY: &str = "proxyscope.blocked_countries";
/// Storage key for the validation thread count (stringified integer).
pub const THREADS_KEY: &str = "proxyscope.validation_threads";

/// Thread count used when nothing valid is stored.
pub const DEFAULT_THREADS: u32 = 50;
/// Thread counts a user may pick.
pub const THREAD_OPTIONS: [u32; 9] = [10, 20, 30, 40, 50, 75, 100, 150, 200];

/// Interval selected before the first status arrives.
pub const DEFAULT_INTERVAL_SECS: u32 = 15 * 60;
/// Intervals a user may pick, in seconds.
pub const INTERVAL_OPTIONS_SECS: [u32; 6] = [5 * 60, 10 * 60, 15 * 60, 30 * 60, 60 * 60, 120 * 60];

/// Key-value persistence used by [`SettingsStore`].
///
/// Implementations are fire-and-forget: write failures are theirs to log.
pub trait KeyValueStore {
    /// Raw stored value for `key`, if any.
    fn load(&self, key: &str) -> Option<String>;
    /// Overwrite the value for `key`.
    fn save(&self, key: &str, value: &str);
}

/// In-process [`KeyValueStore`] used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    /// Store pre-seeded with raw values.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            ),
            writes: Cell::new(0),
        }
    }

    /// Number of writes performed since construction.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) {
        (**self).save(key, value);
    }
}

/// Rejections when editing the blocklist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockListError {
    /// Input was blank after trimming.
    #[error("Please enter a country code or name.")]
    Empty,
    /// Entry already present.
    #[error("\"{0}\" is already in the blocklist.")]
    Duplicate(String),
}

/// Uppercase country codes or names hidden from the proxy table.
///
/// Kept sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockList {
    entries: Vec<String>,
}

impl BlockList {
    /// Build from arbitrary strings, normalising case and dropping blanks.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.as_ref().trim().to_uppercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    /// Parse a stored JSON array; anything unreadable yields an empty list.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(entries) => Self::from_entries(entries),
            Err(err) => {
                tracing::debug!(error = %err, "discarding unreadable stored blocklist");
                Self::default()
            }
        }
    }

    /// Serialized form written to storage.
    #[must_use]
    pub fn to_stored(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Whether `country` (any casing) is blocked.
    #[must_use]
    pub fn contains(&self, country: &str) -> bool {
        let needle = country.trim().to_uppercase();
        self.entries.binary_search(&needle).is_ok()
    }

    /// Add a user-entered country, returning the normalised entry.
    ///
    /// # Errors
    /// [`BlockListError::Empty`] for blank input, [`BlockListError::Duplicate`]
    /// when the entry is already listed.
    pub fn add(&mut self, input: &str) -> Result<String, BlockListError> {
        let entry = input.trim().to_uppercase();
        if entry.is_empty() {
            return Err(BlockListError::Empty);
        }
        match self.entries.binary_search(&entry) {
            Ok(_) => Err(BlockListError::Duplicate(entry)),
            Err(index) => {
                self.entries.insert(index, entry.clone());
                Ok(entry)
            }
        }
    }

    /// Remove an entry; returns whether anything changed.
    pub fn remove(&mut self, country: &str) -> bool {
        let needle = country.trim().to_uppercase();
        match self.entries.binary_search(&needle) {
            Ok(index) => {
                self.entries.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of blocked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Positive validation worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadCount(u32);

impl Default for ThreadCount {
    fn default() -> Self {
        Self(DEFAULT_THREADS)
    }
}

impl ThreadCount {
    /// `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Parse a stored stringified integer, defaulting on anything else.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<u32>().ok())
            .and_then(Self::new)
            .unwrap_or_default()
    }

    /// Raw count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether the count is one of [`THREAD_OPTIONS`].
    #[must_use]
    pub fn is_option(self) -> bool {
        THREAD_OPTIONS.contains(&self.0)
    }
}

/// Persisted blocklist and thread count with write-through saves.
pub struct SettingsStore {
    backend: Box<dyn KeyValueStore>,
    blocklist: BlockList,
    threads: ThreadCount,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("blocklist", &self.blocklist)
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Load both settings from `backend`, defaulting anything missing.
    #[must_use]
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let blocklist = BlockList::from_stored(backend.load(BLOCKLIST_KEY).as_deref());
        let threads = ThreadCount::from_stored(backend.load(THREADS_KEY).as_deref());
        Self {
            backend,
            blocklist,
            threads,
        }
    }

    /// Current blocklist.
    #[must_use]
    pub const fn blocklist(&self) -> &BlockList {
        &self.blocklist
    }

    /// Current thread count.
    #[must_use]
    pub const fn threads(&self) -> ThreadCount {
        self.threads
    }

    /// Add a blocklist entry and persist.
    ///
    /// # Errors
    /// See [`BlockList::add`]; nothing is written on error.
    pub fn add_blocked(&mut self, input: &str) -> Result<String, BlockListError> {
        let entry = self.blocklist.add(input)?;
        self.save_blocklist();
        Ok(entry)
    }

    /// Remove a blocklist entry and persist when it existed.
    pub fn remove_blocked(&mut self, country: &str) -> bool {
        let removed = self.blocklist.remove(country);
        if removed {
            self.save_blocklist();
        }
        removed
    }

    /// Replace the thread count, persisting only on change.
    pub fn set_threads(&mut self, threads: ThreadCount) -> bool {
        if self.threads == threads {
            return false;
        }
        self.threads = threads;
        self.backend.save(THREADS_KEY, &threads.get().to_string());
        true
    }

    fn save_blocklist(&self) {
        self.backend.save(BLOCKLIST_KEY, &self.blocklist.to_stored());
    }
}
