//! User record persistence.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use meditations_models::User;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Manages persistence of users.
///
/// Each user is stored as an individual JSON file named after the Telegram
/// id, which keeps the id unique by construction:
/// ```text
/// base_path/
/// └── users/
///     ├── 123456789.json
///     └── 987654321.json
/// ```
pub struct UserStore {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    /// Creates a new UserStore with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the users directory.
    fn users_dir(&self) -> PathBuf {
        self.base_path.join("users")
    }

    /// Returns the path to a specific user file.
    fn user_path(&self, telegram_id: i64) -> PathBuf {
        self.users_dir().join(format!("{}.json", telegram_id))
    }

    /// Loads a user by Telegram id, `None` if there is no such user.
    pub fn get(&self, telegram_id: i64) -> Result<Option<User>> {
        read_json_optional(&self.user_path(telegram_id))
    }

    /// Saves a user, replacing any previous record for its Telegram id.
    pub fn save(&self, user: &User) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        atomic_write_json(&self.user_path(user.telegram_id), user)
    }

    /// Runs a read-modify-write on one user while holding the write lock.
    ///
    /// `f` receives the current record (or `None`) and may replace or edit it.
    /// If the slot holds a user afterwards, that user is persisted. Nothing
    /// is written when the slot is left empty.
    pub fn transact<T>(&self, telegram_id: i64, f: impl FnOnce(&mut Option<User>) -> T) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut slot = self.get(telegram_id)?;
        let out = f(&mut slot);

        if let Some(user) = &slot {
            if user.telegram_id != telegram_id {
                return Err(PersistenceError::InvalidData(format!(
                    "user record for {} carries telegram id {}",
                    telegram_id, user.telegram_id
                )));
            }
            atomic_write_json(&self.user_path(telegram_id), user)?;
        }
        Ok(out)
    }

    /// Counts stored users.
    pub fn count(&self) -> Result<usize> {
        let dir = self.users_dir();
        if !dir.exists() {
            return Ok(0);
        }
        let entries = fs::read_dir(&dir).map_err(|source| PersistenceError::ReadError {
            path: dir.clone(),
            source,
        })?;

        let mut count = 0;
        for entry in entries {
            let entry = entry.map_err(|source| PersistenceError::ReadError {
                path: dir.clone(),
                source,
            })?;
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
