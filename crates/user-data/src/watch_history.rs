//! Append-only watch history plus a per-user affinity summary.
//!
//! `watch_history.jsonl` holds one entry per line; `user_affinity.json` maps
//! user ids to their last computed summary.

use crate::error::Result;
use crate::files::{append_line, load_document_lenient, read_lines, save_document};
use catalog::MovieId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub const HISTORY_FILE: &str = "watch_history.jsonl";
pub const AFFINITY_FILE: &str = "user_affinity.json";

/// Default discovery source for a watched movie
pub const SOURCE_ORGANIC: &str = "organic";
pub const SOURCE_RECOMMENDATION: &str = "recommendation";

/// Genre recorded when a movie's genres could not be resolved
pub const UNKNOWN_GENRE: &str = "unknown";

const TOP_GENRES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub user_id: String,
    pub movie_id: MovieId,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub log_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAffinity {
    pub top_genres: Vec<String>,
    pub genre_counts: BTreeMap<String, u32>,
    pub last_updated: Option<DateTime<Utc>>,
    pub total_watched: usize,
}

pub struct WatchHistory {
    history_path: PathBuf,
    affinity_path: PathBuf,
}

impl WatchHistory {
    /// Store rooted in `dir`, using the standard file names
    pub fn open(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_FILE), dir.join(AFFINITY_FILE))
    }

    pub fn new(history_path: impl Into<PathBuf>, affinity_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            affinity_path: affinity_path.into(),
        }
    }

    /// Append a watched movie to the log
    pub fn add_entry(
        &self,
        user_id: &str,
        movie_id: MovieId,
        genres: Vec<String>,
        source: &str,
    ) -> Result<WatchEntry> {
        let entry = WatchEntry {
            user_id: user_id.to_string(),
            movie_id,
            timestamp: Utc::now(),
            source: source.to_string(),
            genres,
            log_id: Uuid::new_v4(),
        };
        append_line(&self.history_path, &entry)?;
        debug!(user_id, movie_id, log_id = %entry.log_id, "Recorded watch");
        Ok(entry)
    }

    /// A user's entries ordered by timestamp
    ///
    /// # Arguments
    /// * `limit` - Maximum entries to return, after ordering
    /// * `newest_first` - Reverse chronological order when true
    pub fn user_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        newest_first: bool,
    ) -> Result<Vec<WatchEntry>> {
        let mut entries: Vec<WatchEntry> = read_lines::<WatchEntry>(&self.history_path)?
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();

        if newest_first {
            // Later lines win ties on equal timestamps
            entries.reverse();
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        } else {
            entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        }

        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Genre lists of a user's watched movies, for affinity computation
    pub fn genre_history(&self, user_id: &str) -> Result<Vec<Vec<String>>> {
        Ok(self
            .user_history(user_id, None, true)?
            .into_iter()
            .map(|e| e.genres)
            .collect())
    }

    /// Recompute and persist a user's affinity summary
    pub fn update_affinity(&self, user_id: &str) -> Result<UserAffinity> {
        let history = self.user_history(user_id, None, true)?;

        let mut genre_counts: BTreeMap<String, u32> = BTreeMap::new();
        for genre in history.iter().flat_map(|e| e.genres.iter()) {
            *genre_counts.entry(genre.clone()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&String, &u32)> = genre_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top_genres = ranked
            .into_iter()
            .take(TOP_GENRES)
            .map(|(g, _)| g.clone())
            .collect();

        let affinity = UserAffinity {
            top_genres,
            genre_counts,
            last_updated: Some(Utc::now()),
            total_watched: history.len(),
        };

        let mut all: HashMap<String, UserAffinity> = load_document_lenient(&self.affinity_path)?;
        all.insert(user_id.to_string(), affinity.clone());
        save_document(&self.affinity_path, &all)?;

        info!(
            user_id,
            total_watched = affinity.total_watched,
            top = ?affinity.top_genres,
            "Updated user affinity"
        );
        Ok(affinity)
    }

    /// The stored affinity summary, if one was ever computed
    pub fn affinity(&self, user_id: &str) -> Result<Option<UserAffinity>> {
        let mut all: HashMap<String, UserAffinity> = load_document_lenient(&self.affinity_path)?;
        Ok(all.remove(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_and_read_history() {
        let dir = TempDir::new().unwrap();
        let store = WatchHistory::open(dir.path());

        store.add_entry("alice", 1, genres(&["action"]), SOURCE_ORGANIC).unwrap();
        store.add_entry("bob", 2, genres(&["drama"]), SOURCE_ORGANIC).unwrap();
        store
            .add_entry("alice", 3, genres(&["comedy"]), SOURCE_RECOMMENDATION)
            .unwrap();

        let newest = store.user_history("alice", None, true).unwrap();
        let ids: Vec<MovieId> = newest.iter().map(|e| e.movie_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(newest[0].source, "recommendation");

        let oldest = store.user_history("alice", Some(1), false).unwrap();
        assert_eq!(oldest.len(), 1);
        assert_eq!(oldest[0].movie_id, 1);

        assert!(store.user_history("carol", None, true).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = WatchHistory::open(dir.path());
        store.add_entry("alice", 1, genres(&["action"]), SOURCE_ORGANIC).unwrap();

        let path = dir.path().join(HISTORY_FILE);
        let mut contents = fs::read_to_string(&path).unwrap();
        contents.push_str("{not json\n\n");
        fs::write(&path, contents).unwrap();
        store.add_entry("alice", 2, genres(&["drama"]), SOURCE_ORGANIC).unwrap();

        assert_eq!(store.user_history("alice", None, true).unwrap().len(), 2);
    }

    #[test]
    fn test_update_affinity() {
        let dir = TempDir::new().unwrap();
        let store = WatchHistory::open(dir.path());

        store.add_entry("alice", 1, genres(&["action", "thriller"]), SOURCE_ORGANIC).unwrap();
        store.add_entry("alice", 2, genres(&["action"]), SOURCE_ORGANIC).unwrap();
        store.add_entry("alice", 3, genres(&["drama", "thriller"]), SOURCE_ORGANIC).unwrap();
        store.add_entry("alice", 4, genres(&["comedy"]), SOURCE_ORGANIC).unwrap();

        assert_eq!(store.affinity("alice").unwrap(), None);

        let affinity = store.update_affinity("alice").unwrap();
        assert_eq!(affinity.total_watched, 4);
        assert_eq!(affinity.top_genres, vec!["action", "thriller", "comedy"]);
        assert_eq!(affinity.genre_counts["action"], 2);

        let stored = store.affinity("alice").unwrap().unwrap();
        assert_eq!(stored, affinity);
    }

    #[test]
    fn test_corrupt_affinity_file_is_reset() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(AFFINITY_FILE), "[broken").unwrap();
        let store = WatchHistory::open(dir.path());

        assert_eq!(store.affinity("alice").unwrap(), None);
        let affinity = store.update_affinity("alice").unwrap();
        assert_eq!(affinity.total_watched, 0);
        assert!(affinity.top_genres.is_empty());
    }
}
