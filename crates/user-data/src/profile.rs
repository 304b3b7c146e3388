//! Per-user preference profiles stored in `user_profiles.json`.

use crate::error::Result;
use crate::files::{load_document_lenient, save_document};
use catalog::PersonId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PROFILE_FILE: &str = "user_profiles.json";

/// A user's explicit likes, dislikes and starter-pack choice.
///
/// Every field defaults, so profiles written by older versions load cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub preferred_genres: Vec<String>,
    pub disliked_genres: Vec<String>,
    pub preferred_actors: Vec<PersonId>,
    pub selected_moods: Vec<String>,
    pub starter_pack: Option<String>,
    /// Genre -> preference count, never negative
    pub preferences: BTreeMap<String, u32>,
}

impl UserProfile {
    /// Shift a genre preference count by `delta`, flooring at zero
    pub fn update_preference(&mut self, genre: &str, delta: i64) {
        let current = self.preferences.get(genre).copied().unwrap_or(0) as i64;
        let updated = (current + delta).clamp(0, u32::MAX as i64) as u32;
        self.preferences.insert(genre.to_string(), updated);
    }

    pub fn add_mood(&mut self, mood: &str) {
        let mood = mood.to_lowercase();
        if !self.selected_moods.contains(&mood) {
            self.selected_moods.push(mood);
        }
    }

    pub fn remove_mood(&mut self, mood: &str) {
        let mood = mood.to_lowercase();
        self.selected_moods.retain(|m| *m != mood);
    }
}

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn open(dir: &Path) -> Self {
        Self::new(dir.join(PROFILE_FILE))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_all(&self) -> Result<HashMap<String, UserProfile>> {
        load_document_lenient(&self.path)
    }

    /// The user's profile, or a default one if none was saved
    pub fn load(&self, user_id: &str) -> Result<UserProfile> {
        Ok(self.load_all()?.remove(user_id).unwrap_or_default())
    }

    /// Save one profile, preserving everyone else's
    pub fn save(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let mut all = self.load_all()?;
        all.insert(user_id.to_string(), profile.clone());
        save_document(&self.path, &all)?;
        debug!(user_id, "Saved profile");
        Ok(())
    }

    /// Load, modify and save a profile in one step
    pub fn update<F>(&self, user_id: &str, f: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile),
    {
        let mut profile = self.load(user_id)?;
        f(&mut profile);
        self.save(user_id, &profile)?;
        Ok(profile)
    }

    /// Record the chosen starter pack and bump its genre's preference
    pub fn set_starter_pack(
        &self,
        user_id: &str,
        pack_name: &str,
        pack_genre: Option<&str>,
    ) -> Result<UserProfile> {
        self.update(user_id, |profile| {
            profile.starter_pack = Some(pack_name.to_string());
            if let Some(genre) = pack_genre {
                profile.update_preference(genre, 1);
            }
        })
    }

    pub fn update_preference(&self, user_id: &str, genre: &str, delta: i64) -> Result<UserProfile> {
        self.update(user_id, |profile| profile.update_preference(genre, delta))
    }

    pub fn set_selected_moods(&self, user_id: &str, moods: &[String]) -> Result<UserProfile> {
        self.update(user_id, |profile| {
            profile.selected_moods.clear();
            for mood in moods {
                profile.add_mood(mood);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_profile_is_default() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path());
        assert_eq!(store.load("nobody").unwrap(), UserProfile::default());
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROFILE_FILE), "{not json").unwrap();
        let store = ProfileStore::open(dir.path());

        assert_eq!(store.load("alice").unwrap(), UserProfile::default());

        let profile = UserProfile {
            preferred_genres: vec!["Drama".to_string()],
            ..Default::default()
        };
        store.save("alice", &profile).unwrap();
        assert_eq!(store.load("alice").unwrap(), profile);
    }

    #[test]
    fn test_partial_profile_loads_with_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PROFILE_FILE),
            r#"{"alice": {"preferred_genres": ["Comedy"], "theme": "dark"}}"#,
        )
        .unwrap();

        let profile = ProfileStore::open(dir.path()).load("alice").unwrap();
        assert_eq!(profile.preferred_genres, vec!["Comedy"]);
        assert!(profile.preferences.is_empty());
        assert_eq!(profile.starter_pack, None);
    }

    #[test]
    fn test_starter_pack_bumps_genre() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path());

        store.set_starter_pack("alice", "Staff Picks", Some("Drama")).unwrap();
        store.set_starter_pack("alice", "Staff Picks", Some("Drama")).unwrap();
        store.save("bob", &UserProfile::default()).unwrap();

        let alice = store.load("alice").unwrap();
        assert_eq!(alice.starter_pack.as_deref(), Some("Staff Picks"));
        assert_eq!(alice.preferences["Drama"], 2);
    }

    #[test]
    fn test_preferences_never_go_negative() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path());

        store.update_preference("alice", "Horror", 1).unwrap();
        let profile = store.update_preference("alice", "Horror", -3).unwrap();
        assert_eq!(profile.preferences["Horror"], 0);
    }

    #[test]
    fn test_moods_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path());

        let moods = vec!["Cozy".to_string(), "cozy".to_string(), "Tense".to_string()];
        let mut profile = store.set_selected_moods("alice", &moods).unwrap();
        assert_eq!(profile.selected_moods, vec!["cozy", "tense"]);

        profile.remove_mood("TENSE");
        assert_eq!(profile.selected_moods, vec!["cozy"]);
    }
}
