//! JSON document store for local state.
//!
//! Each key maps to one JSON array in the data directory. Reads never fail:
//! a missing or unreadable document yields an empty collection, and records
//! that do not deserialize are skipped one by one. Writes go to a temporary
//! file which is then renamed over the target.
//!
//! Records skipped on load are not lost on the next save: they are written
//! back verbatim after the current records. A document that is not a JSON
//! array at all is copied to `<file>.corrupt` before it is replaced.
//!
//! All I/O here is blocking `std::fs`. The documents are a few kilobytes and
//! are read once per command or fetch cycle, so async callers use the store
//! directly instead of hopping to a blocking thread.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{DaybookError, DaybookResult};
use crate::routine::Routine;
use crate::user_event::UserEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    UserEvents,
    Routines,
    FeedSources,
}

impl StoreKey {
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKey::UserEvents => "events_user.json",
            StoreKey::Routines => "routines.json",
            StoreKey::FeedSources => "ics_sources.json",
        }
    }
}

/// What is on disk for a key.
enum Document {
    Missing,
    Records(Vec<Value>),
    /// Present but unreadable or not a JSON array
    Corrupt,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn read_document(&self, key: StoreKey) -> Document {
        let path = self.path(key);

        if !path.exists() {
            return Document::Missing;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read store document");
                return Document::Corrupt;
            }
        };

        match serde_json::from_str(&content) {
            Ok(records) => Document::Records(records),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt store document, using empty collection");
                Document::Corrupt
            }
        }
    }

    /// Load every record for `key` that deserializes as `T`. Invalid records
    /// are logged and skipped.
    pub fn load<T>(&self, key: StoreKey) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        let Document::Records(records) = self.read_document(key) else {
            return Vec::new();
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(file = key.file_name(), index, error = %e, "skipping invalid store record");
                    None
                }
            })
            .collect()
    }

    /// Replace the collection for `key` with `records`.
    ///
    /// Records already on disk that `load` would skip are carried over
    /// unchanged. A corrupt document is backed up first; if the backup
    /// fails nothing is written.
    pub fn save<T>(&self, key: StoreKey, records: &[T]) -> DaybookResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut doc = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|e| DaybookError::Serialization(e.to_string()))?;

        match self.read_document(key) {
            Document::Missing => {}
            Document::Records(existing) => {
                let unreadable: Vec<Value> = existing
                    .into_iter()
                    .filter(|record| serde_json::from_value::<T>(record.clone()).is_err())
                    .collect();
                if !unreadable.is_empty() {
                    warn!(
                        file = key.file_name(),
                        count = unreadable.len(),
                        "keeping invalid store records as they are"
                    );
                }
                doc.extend(unreadable);
            }
            Document::Corrupt => self.back_up(key)?,
        }

        self.write_document(key, &doc)
    }

    fn back_up(&self, key: StoreKey) -> DaybookResult<()> {
        let path = self.path(key);
        let backup = self.dir.join(format!("{}.corrupt", key.file_name()));

        std::fs::copy(&path, &backup).map_err(|e| {
            DaybookError::Store(format!(
                "Refusing to replace {}: backup failed: {e}",
                path.display()
            ))
        })?;
        warn!(backup = %backup.display(), "backed up corrupt store document");
        Ok(())
    }

    fn write_document(&self, key: StoreKey, doc: &[Value]) -> DaybookResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path(key);
        let temp = self.dir.join(format!("{}.tmp", key.file_name()));

        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| DaybookError::Serialization(e.to_string()))?;

        std::fs::write(&temp, content)
            .map_err(|e| DaybookError::Store(format!("Could not write {}: {e}", temp.display())))?;
        std::fs::rename(&temp, &path)
            .map_err(|e| DaybookError::Store(format!("Could not replace {}: {e}", path.display())))?;
        Ok(())
    }

    // TYPED COLLECTIONS:

    pub fn user_events(&self) -> Vec<UserEvent> {
        self.load(StoreKey::UserEvents)
    }

    pub fn save_user_events(&self, events: &[UserEvent]) -> DaybookResult<()> {
        self.save(StoreKey::UserEvents, events)
    }

    pub fn routines(&self) -> Vec<Routine> {
        self.load(StoreKey::Routines)
    }

    pub fn save_routines(&self, routines: &[Routine]) -> DaybookResult<()> {
        self.save(StoreKey::Routines, routines)
    }

    pub fn feed_sources(&self) -> Vec<String> {
        self.load(StoreKey::FeedSources)
    }

    pub fn save_feed_sources(&self, urls: &[String]) -> DaybookResult<()> {
        self.save(StoreKey::FeedSources, urls)
    }
}
