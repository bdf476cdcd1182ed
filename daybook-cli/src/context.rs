//! Everything a command needs: configuration, today's date and the open daybook.

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono_tz::Tz;
use daybook_core::config::DaybookConfig;
use daybook_core::persistence::FileKeyValueStore;
use daybook_core::{DateKey, Daybook, Event, EventId, StoreError};
use tracing::{debug, warn};

use crate::dates;

pub struct Context {
    pub config: DaybookConfig,
    pub zone: Tz,
    pub today: DateKey,
    pub daybook: Daybook<FileKeyValueStore>,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => DaybookConfig::load_from(path),
            None => DaybookConfig::load(),
        }
        .context("Could not load configuration")?;

        let zone = resolve_zone(&config)?;
        let today = DateKey::today(&zone);
        debug!(%zone, %today, data_dir = %config.data_path().display(), "starting");

        let daybook = Daybook::open_default(FileKeyValueStore::new(config.data_path()));

        Ok(Context {
            config,
            zone,
            today,
            daybook,
        })
    }

    /// Parse a day argument, defaulting to today.
    pub fn date(&self, input: Option<&str>) -> Result<DateKey> {
        match input {
            Some(s) => dates::parse_date(s, self.today),
            None => Ok(self.today),
        }
    }

    /// The event `id`, provided it is on `date_key`.
    pub fn event_on(&self, date_key: DateKey, id: EventId) -> Result<Event> {
        self.daybook
            .store()
            .list_by_date(date_key)
            .into_iter()
            .find(|event| event.id == id)
            .ok_or_else(|| StoreError::NotFound { date_key, id }.into())
    }
}

/// Configured zone, else the system zone, else UTC.
fn resolve_zone(config: &DaybookConfig) -> Result<Tz> {
    if let Some(zone) = config.time_zone()? {
        return Ok(zone);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Ok(name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(zone = %name, "unknown system time zone, using UTC");
            Tz::UTC
        })),
        Err(e) => {
            warn!(error = %e, "could not detect system time zone, using UTC");
            Ok(Tz::UTC)
        }
    }
}
