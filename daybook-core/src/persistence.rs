//! Key-value persistence for the event snapshot and the theme flag.
//!
//! Reads are forgiving: a missing, unreadable or malformed value loads as the
//! default (empty store, light theme) and the problem is logged. Writes
//! report their errors to the caller, who decides how loudly to surface them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::DaybookResult;
use crate::id::IdGenerator;
use crate::store::{EventMap, EventStore};
use crate::theme::Theme;

pub const EVENTS_KEY: &str = "calendarEvents";
pub const THEME_KEY: &str = "calendarDarkMode";

/// String values under string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileKeyValueStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{}.json.tmp", key));

        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> DaybookResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> DaybookResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Build a store from the persisted snapshot, falling back to an empty one.
pub fn load_events<K, G>(backend: &K, ids: G) -> EventStore<G>
where
    K: KeyValueStore + ?Sized,
    G: IdGenerator,
{
    let mut store = EventStore::with_ids(ids);

    let raw = match backend.get(EVENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("no saved events, starting empty");
            return store;
        }
        Err(e) => {
            warn!(error = %e, "could not read saved events, starting empty");
            return store;
        }
    };

    let map: EventMap = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "saved events are malformed, starting empty");
            return store;
        }
    };

    match store.restore(map) {
        Ok(()) => debug!(events = store.len(), "loaded saved events"),
        Err(e) => warn!(error = %e, "saved events break store rules, starting empty"),
    }
    store
}

/// Write the whole mapping under `EVENTS_KEY`.
pub fn save_events<K, G>(backend: &mut K, store: &EventStore<G>) -> DaybookResult<()>
where
    K: KeyValueStore + ?Sized,
    G: IdGenerator,
{
    let json = serde_json::to_string(store.buckets())?;
    backend.set(EVENTS_KEY, &json)
}

pub fn load_theme<K: KeyValueStore + ?Sized>(backend: &K) -> Theme {
    match backend.get(THEME_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "saved theme is malformed, using light");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!(error = %e, "could not read saved theme, using light");
            Theme::default()
        }
    }
}

pub fn save_theme<K: KeyValueStore + ?Sized>(backend: &mut K, theme: Theme) -> DaybookResult<()> {
    let json = serde_json::to_string(&theme)?;
    backend.set(THEME_KEY, &json)
}
