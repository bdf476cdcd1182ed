//! A calendar session: the event store plus the backend it persists to.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::date_key::DateKey;
use crate::error::{DaybookError, DaybookResult, StoreError};
use crate::event::{Event, EventChange, EventId};
use crate::export::{self, ExportFormat};
use crate::id::{ClockIds, IdGenerator};
use crate::persistence::{self, KeyValueStore};
use crate::store::EventStore;
use crate::theme::Theme;

/// The result of a mutation that went through.
///
/// The in-memory change stands even when writing the snapshot failed;
/// `persist_error` says whether it reached the backend.
#[derive(Debug)]
pub struct Committed<T> {
    pub value: T,
    pub persist_error: Option<DaybookError>,
}

impl<T> Committed<T> {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

pub struct Daybook<K, G = ClockIds> {
    store: EventStore<G>,
    backend: K,
}

impl<K: KeyValueStore> Daybook<K, ClockIds> {
    pub fn open_default(backend: K) -> Self {
        Self::open(backend, ClockIds::default())
    }
}

impl<K: KeyValueStore, G: IdGenerator> Daybook<K, G> {
    /// Load whatever the backend holds. Never fails: bad snapshots load empty.
    pub fn open(backend: K, ids: G) -> Self {
        let store = persistence::load_events(&backend, ids);
        Daybook { store, backend }
    }

    pub fn store(&self) -> &EventStore<G> {
        &self.store
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn upsert(
        &mut self,
        date_key: DateKey,
        change: EventChange,
    ) -> Result<Committed<Event>, StoreError> {
        let event = self.store.upsert(date_key, change)?;
        Ok(self.commit(event))
    }

    pub fn delete(&mut self, date_key: DateKey, id: EventId) -> Result<Committed<Event>, StoreError> {
        let event = self.store.delete(date_key, id)?;
        Ok(self.commit(event))
    }

    pub fn theme(&self) -> Theme {
        persistence::load_theme(&self.backend)
    }

    pub fn set_theme(&mut self, theme: Theme) -> DaybookResult<()> {
        persistence::save_theme(&mut self.backend, theme)
    }

    pub fn toggle_theme(&mut self) -> DaybookResult<Theme> {
        let theme = self.theme().toggle();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub fn export(&self, format: ExportFormat) -> DaybookResult<String> {
        export::render(self.store.buckets(), format)
    }

    /// Write an export named after `viewed` into `dir`.
    pub fn export_to_dir(
        &self,
        format: ExportFormat,
        dir: &Path,
        viewed: DateKey,
    ) -> DaybookResult<PathBuf> {
        export::write_to_dir(self.store.buckets(), format, dir, viewed)
    }

    fn commit<T>(&mut self, value: T) -> Committed<T> {
        let persist_error = persistence::save_events(&mut self.backend, &self.store)
            .inspect_err(|e| warn!(error = %e, "could not save events"))
            .err();
        Committed {
            value,
            persist_error,
        }
    }
}
