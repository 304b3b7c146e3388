//! Per-user watchlists stored in `watchlist.json`.

use crate::error::Result;
use crate::files::{load_document_lenient, save_document};
use catalog::MovieId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WATCHLIST_FILE: &str = "watchlist.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub movie_id: MovieId,
    pub title: String,
    pub added: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserWatchlist {
    #[serde(default)]
    movies: Vec<WatchlistItem>,
    updated: Option<DateTime<Utc>>,
}

pub struct Watchlist {
    path: PathBuf,
}

impl Watchlist {
    pub fn open(dir: &Path) -> Self {
        Self::new(dir.join(WATCHLIST_FILE))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_all(&self) -> Result<HashMap<String, UserWatchlist>> {
        load_document_lenient(&self.path)
    }

    fn save_all(&self, all: &HashMap<String, UserWatchlist>) -> Result<()> {
        save_document(&self.path, all)
    }

    /// Add a movie; returns false if it was already listed
    pub fn add(&self, user_id: &str, movie_id: MovieId, title: &str) -> Result<bool> {
        let mut all = self.load_all()?;
        let list = all.entry(user_id.to_string()).or_default();

        if list.movies.iter().any(|m| m.movie_id == movie_id) {
            return Ok(false);
        }

        let now = Utc::now();
        list.movies.push(WatchlistItem {
            movie_id,
            title: title.to_string(),
            added: now,
        });
        list.updated = Some(now);
        self.save_all(&all)?;

        info!(user_id, movie_id, "Added to watchlist");
        Ok(true)
    }

    /// Remove a movie; returns false if it was not listed
    pub fn remove(&self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        let mut all = self.load_all()?;
        let Some(list) = all.get_mut(user_id) else {
            return Ok(false);
        };

        let before = list.movies.len();
        list.movies.retain(|m| m.movie_id != movie_id);
        if list.movies.len() == before {
            return Ok(false);
        }
        list.updated = Some(Utc::now());
        self.save_all(&all)?;

        info!(user_id, movie_id, "Removed from watchlist");
        Ok(true)
    }

    /// Items in the order they were added
    pub fn list(&self, user_id: &str) -> Result<Vec<WatchlistItem>> {
        Ok(self
            .load_all()?
            .remove(user_id)
            .map(|l| l.movies)
            .unwrap_or_default())
    }

    pub fn contains(&self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        Ok(self.list(user_id)?.iter().any(|m| m.movie_id == movie_id))
    }
}
