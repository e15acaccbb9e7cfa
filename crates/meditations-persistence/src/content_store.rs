//! Month-sharded meditation content store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use meditations_models::{MeditationItem, MeditationsDoc, MonthKey};
use tracing::{debug, warn};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Stores meditation items as one JSON document per calendar month:
/// ```text
/// content_dir/
/// └── meditations/
///     ├── 2025-09.json
///     └── 2025-10.json
/// ```
///
/// The same files are what the public `/meditations/{YYYY}-{MM}.json` path
/// serves. Every read-modify-write of a shard holds that shard's lock for
/// the whole cycle, and every write bumps the document's `revision`.
pub struct ContentStore {
    content_dir: PathBuf,
    shard_locks: Mutex<HashMap<MonthKey, Arc<Mutex<()>>>>,
}

impl ContentStore {
    /// Creates a new ContentStore rooted at `content_dir`.
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            shard_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the path of a month document.
    pub fn month_path(&self, key: MonthKey) -> PathBuf {
        self.content_dir.join("meditations").join(key.file_name())
    }

    fn shard_lock(&self, key: MonthKey) -> Arc<Mutex<()>> {
        let mut locks = self
            .shard_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(key).or_default())
    }

    /// Reads a month document strictly: `None` if the file doesn't exist,
    /// an error if it can't be read or parsed.
    pub fn load_month(&self, key: MonthKey) -> Result<Option<MeditationsDoc>> {
        read_json_optional(&self.month_path(key))
    }

    /// Reads a month document. Never fails: a missing or unreadable file
    /// reads as an empty document.
    pub fn read_month(&self, key: MonthKey) -> MeditationsDoc {
        match self.load_month(key) {
            Ok(Some(doc)) => doc,
            Ok(None) => MeditationsDoc::new(),
            Err(e) => {
                warn!(shard = %key, error = %e, "Unreadable month document, treating as empty");
                MeditationsDoc::new()
            }
        }
    }

    /// Reads a shard for modification. Unlike [`ContentStore::read_month`]
    /// an unreadable file is an error, so a write never replaces content it
    /// could not parse.
    fn load_for_write(&self, key: MonthKey) -> Result<MeditationsDoc> {
        Ok(self.load_month(key)?.unwrap_or_default())
    }

    fn write_month(&self, key: MonthKey, doc: &mut MeditationsDoc) -> Result<()> {
        doc.revision += 1;
        atomic_write_json(&self.month_path(key), doc)?;
        debug!(shard = %key, revision = doc.revision, items = doc.items.len(), "Month document written");
        Ok(())
    }

    fn item_month(item: &MeditationItem) -> Result<MonthKey> {
        item.month_key().ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "item {} has invalid day {:?}, expected YYYY-MM-DD",
                item.id, item.day
            ))
        })
    }

    /// Upserts into `key`'s document. Caller holds the shard lock.
    fn upsert_locked(
        &self,
        key: MonthKey,
        item: MeditationItem,
        expected_revision: Option<u64>,
    ) -> Result<MeditationsDoc> {
        let mut doc = self.load_for_write(key)?;
        if let Some(expected) = expected_revision {
            if expected != doc.revision {
                return Err(PersistenceError::Conflict {
                    shard: key.to_string(),
                    expected,
                    actual: doc.revision,
                });
            }
        }
        doc.upsert(item);
        self.write_month(key, &mut doc)?;
        Ok(doc)
    }

    /// Inserts or replaces an item in the month document derived from its day.
    ///
    /// An existing item with the same id keeps its position in the list.
    /// Returns the updated document.
    pub fn upsert_item(&self, item: MeditationItem) -> Result<MeditationsDoc> {
        self.upsert_item_checked(item, None)
    }

    /// Like [`ContentStore::upsert_item`], but fails with
    /// [`PersistenceError::Conflict`] if the document's revision is not
    /// `expected_revision`.
    pub fn upsert_item_checked(
        &self,
        item: MeditationItem,
        expected_revision: Option<u64>,
    ) -> Result<MeditationsDoc> {
        let key = Self::item_month(&item)?;
        let lock = self.shard_lock(key);
        let _guard = lock_shard(&lock);
        self.upsert_locked(key, item, expected_revision)
    }

    /// Saves an item whose day may have moved out of the `from` month.
    ///
    /// When the item now belongs to another month, it is written to the new
    /// month first and only then removed from `from`, so a failed write can
    /// leave a duplicate but never loses the item. `expected_revision` is
    /// checked against the new month. Both shards stay locked throughout.
    /// Returns the document that now holds the item.
    pub fn move_item(
        &self,
        item: MeditationItem,
        from: MonthKey,
        expected_revision: Option<u64>,
    ) -> Result<MeditationsDoc> {
        let to = Self::item_month(&item)?;
        if to == from {
            return self.upsert_item_checked(item, expected_revision);
        }

        // Fixed lock order so two opposite moves can't deadlock.
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let first_lock = self.shard_lock(first);
        let second_lock = self.shard_lock(second);
        let _first = lock_shard(&first_lock);
        let _second = lock_shard(&second_lock);

        let mut old = self.load_for_write(from)?;
        let id = item.id.clone();
        let doc = self.upsert_locked(to, item, expected_revision)?;
        if old.remove(&id) {
            self.write_month(from, &mut old)?;
            debug!(item = %id, from = %from, to = %to, "Item moved out of old month");
        }
        Ok(doc)
    }

    /// Removes an item from a month document.
    ///
    /// Deleting an id that isn't there leaves the document (and file) as is.
    pub fn delete_item(&self, id: &str, key: MonthKey) -> Result<MeditationsDoc> {
        let lock = self.shard_lock(key);
        let _guard = lock_shard(&lock);

        let mut doc = self.load_for_write(key)?;
        if doc.remove(id) {
            self.write_month(key, &mut doc)?;
        }
        Ok(doc)
    }
}

fn lock_shard(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
