//! Per-user favorites.

use std::sync::Arc;

use meditations_models::FavoriteAction;
use meditations_persistence::UserStore;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ServiceError};

/// Outcome of a favorites change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteUpdate {
    pub favorites: Vec<String>,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

/// Reads and edits favorites sets.
///
/// Edits go through [`UserStore::transact`], so concurrent requests for the
/// same user are applied one after the other.
pub struct FavoritesService {
    users: Arc<UserStore>,
}

impl FavoritesService {
    pub fn new(users: Arc<UserStore>) -> Self {
        Self { users }
    }

    /// Returns the favorites of a user; empty if the user is unknown.
    pub fn get_favorites(&self, telegram_id: i64) -> Result<Vec<String>> {
        Ok(self
            .users
            .get(telegram_id)?
            .map(|user| user.favorite_meditations)
            .unwrap_or_default())
    }

    /// Adds, removes or toggles one meditation id.
    ///
    /// # Errors
    /// [`ServiceError::UserNotFound`] if no user has this Telegram id.
    pub fn set_favorite(
        &self,
        telegram_id: i64,
        meditation_id: &str,
        action: FavoriteAction,
    ) -> Result<FavoriteUpdate> {
        let update = self.users.transact(telegram_id, |slot| {
            slot.as_mut().map(|user| {
                let is_favorite = user.apply_favorite(meditation_id, action);
                FavoriteUpdate {
                    favorites: user.favorite_meditations.clone(),
                    is_favorite,
                }
            })
        })?;

        let update = update.ok_or(ServiceError::UserNotFound(telegram_id))?;
        debug!(
            telegram_id,
            meditation_id,
            is_favorite = update.is_favorite,
            "Favorite updated"
        );
        Ok(update)
    }
}
