//! Core domain types for the movie catalog.
//!
//! This module defines the fundamental data structures used throughout the
//! system: TMDB-shaped movies, genres and people, plus the rule tables that
//! drive the recommendation strategies (genre mappings, mood profiles, genre
//! compatibility rules, actor similarity graph, embeddings, curated sets).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// TMDB movie identifier
pub type MovieId = u32;

/// TMDB genre identifier (e.g. 35 = Comedy, 18 = Drama)
pub type GenreId = u32;

/// TMDB person identifier (actors and directors share one id space)
pub type PersonId = u32;

/// Base URL for poster and backdrop images
pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie genre as published by TMDB
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// A cast or crew member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Represents a movie in the catalog
///
/// Every field except `id` and `title` is optional in the data files, so the
/// loader fills in empty defaults rather than rejecting partial records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Format: "YYYY-MM-DD" (may be empty)
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub cast: Vec<Person>,
    #[serde(default)]
    pub directors: Vec<Person>,
}

impl Movie {
    /// Release year parsed from `release_date`, if present and well formed
    pub fn year(&self) -> Option<u16> {
        self.release_date.get(..4)?.parse().ok()
    }

    pub fn genre_ids(&self) -> Vec<GenreId> {
        self.genres.iter().map(|g| g.id).collect()
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }

    /// Names of the first `n` billed cast members
    pub fn top_cast_names(&self, n: usize) -> Vec<String> {
        self.cast.iter().take(n).map(|p| p.name.clone()).collect()
    }

    pub fn poster_url(&self) -> Option<String> {
        image_url(self.poster_path.as_deref())
    }

    pub fn backdrop_url(&self) -> Option<String> {
        image_url(self.backdrop_path.as_deref())
    }
}

/// Build a full image URL from a TMDB image path (empty paths yield `None`)
pub fn image_url(path: Option<&str>) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{}{}", TMDB_IMAGE_BASE_URL, p)),
        _ => None,
    }
}

/// Lightweight view of a movie returned by list queries (popular, search,
/// filmography)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub popularity: f32,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            release_date: movie.release_date.clone(),
            popularity: movie.popularity,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            poster_path: movie.poster_path.clone(),
            backdrop_path: movie.backdrop_path.clone(),
        }
    }
}

// =============================================================================
// Rule Tables
// =============================================================================

/// Genre tags for a single movie, as stored in `genre_mappings.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenreMapping {
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

fn default_weight() -> f32 {
    1.0
}

/// How a mood translates into genres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub genres: Vec<GenreId>,
    /// Score multiplier applied to mood-based results
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub description: String,
}

/// Which genres a requested genre can fall back to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreCompatibilityRule {
    #[serde(default)]
    pub compatible_genres: Vec<GenreId>,
    #[serde(default)]
    pub compatible_moods: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// One edge of the actor similarity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarActor {
    pub actor_id: PersonId,
    pub score: f32,
    #[serde(default)]
    pub common_movies: Vec<MovieId>,
}

/// All precomputed neighbours of one actor, strongest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    #[serde(default)]
    pub similar_actors: Vec<SimilarActor>,
}

/// A handpicked collection of movies surfaced as a last resort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedSet {
    pub name: String,
    pub movie_ids: Vec<MovieId>,
    pub genre: String,
}

/// Built-in mood map used when no `mood_genre_map.json` is shipped
pub fn default_mood_map() -> HashMap<String, MoodProfile> {
    let mut map = HashMap::new();
    map.insert(
        "uplifting".to_string(),
        MoodProfile {
            genres: vec![35, 10751, 10402],
            weight: 1.2,
            description: "Feel-good and inspiring".to_string(),
        },
    );
    map.insert(
        "melancholic".to_string(),
        MoodProfile {
            genres: vec![18, 36, 10749],
            weight: 1.0,
            description: "Bittersweet and emotional".to_string(),
        },
    );
    map
}

// =============================================================================
// CatalogIndex - The Core In-Memory Store
// =============================================================================

/// Main data structure that holds all static data and indices.
///
/// Provides O(1) lookups for movies and rule tables through HashMap indices,
/// plus secondary indices (genre -> movies, person -> movies) that are built
/// once after loading.
#[derive(Debug)]
pub struct CatalogIndex {
    // Primary data stores
    pub(crate) genres: Vec<Genre>,
    pub(crate) movies: HashMap<MovieId, Movie>,

    // Strategy rule tables
    pub(crate) genre_mappings: HashMap<MovieId, GenreMapping>,
    pub(crate) mood_map: HashMap<String, MoodProfile>,
    pub(crate) genre_rules: HashMap<GenreId, GenreCompatibilityRule>,
    pub(crate) actor_similarity: HashMap<PersonId, ActorProfile>,
    pub(crate) embeddings: HashMap<MovieId, Vec<f32>>,
    pub(crate) curated_sets: Vec<CuratedSet>,

    // Secondary indices
    /// Movies grouped by genre (sorted, deduplicated)
    pub(crate) genre_index: HashMap<GenreId, Vec<MovieId>>,
    /// Movies each person appears in or directed (sorted, deduplicated)
    pub(crate) person_index: HashMap<PersonId, Vec<MovieId>>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex with the built-in mood map
    pub fn new() -> Self {
        Self {
            genres: Vec::new(),
            movies: HashMap::new(),
            genre_mappings: HashMap::new(),
            mood_map: default_mood_map(),
            genre_rules: HashMap::new(),
            actor_similarity: HashMap::new(),
            embeddings: HashMap::new(),
            curated_sets: Vec::new(),
            genre_index: HashMap::new(),
            person_index: HashMap::new(),
        }
    }

    // Getters

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    pub fn get_all_movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// Look up a genre name by id
    pub fn genre_name(&self, id: GenreId) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    pub fn genre_mappings(&self) -> &HashMap<MovieId, GenreMapping> {
        &self.genre_mappings
    }

    /// Genre ids for a movie, preferring the mapping table over movie records
    pub fn movie_genre_ids(&self, movie_id: MovieId) -> Vec<GenreId> {
        if let Some(mapping) = self.genre_mappings.get(&movie_id) {
            return mapping.genre_ids.clone();
        }
        self.movies
            .get(&movie_id)
            .map(|m| m.genre_ids())
            .unwrap_or_default()
    }

    /// Get all movies tagged with a genre
    ///
    /// Returns an empty slice for unknown genres or before
    /// `build_secondary_indices` has run
    pub fn get_movies_by_genre(&self, genre: GenreId) -> &[MovieId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all movies a person appears in
    pub fn get_filmography(&self, person: PersonId) -> &[MovieId] {
        self.person_index
            .get(&person)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Mood lookup is case-insensitive
    pub fn mood_profile(&self, mood: &str) -> Option<&MoodProfile> {
        self.mood_map.get(&mood.to_lowercase())
    }

    pub fn mood_map(&self) -> &HashMap<String, MoodProfile> {
        &self.mood_map
    }

    pub fn genre_rule(&self, genre: GenreId) -> Option<&GenreCompatibilityRule> {
        self.genre_rules.get(&genre)
    }

    pub fn similar_actors(&self, actor: PersonId) -> &[SimilarActor] {
        self.actor_similarity
            .get(&actor)
            .map(|p| p.similar_actors.as_slice())
            .unwrap_or(&[])
    }

    pub fn embedding(&self, movie_id: MovieId) -> Option<&[f32]> {
        self.embeddings.get(&movie_id).map(|v| v.as_slice())
    }

    pub fn embeddings(&self) -> &HashMap<MovieId, Vec<f32>> {
        &self.embeddings
    }

    pub fn curated_sets(&self) -> &[CuratedSet] {
        &self.curated_sets
    }

    /// Movies ordered by TMDB popularity (descending), optionally restricted
    /// to one genre
    pub fn popular_movies(&self, genre: Option<GenreId>, limit: usize) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = match genre {
            Some(g) => self
                .get_movies_by_genre(g)
                .iter()
                .filter_map(|id| self.movies.get(id))
                .collect(),
            None => self.movies.values().collect(),
        };
        movies.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        movies.truncate(limit);
        movies
    }

    /// Case-insensitive title substring search
    pub fn search_titles(&self, query: &str, year: Option<u16>) -> Vec<&Movie> {
        let query = query.to_lowercase();
        let mut matches: Vec<&Movie> = self
            .movies
            .values()
            .filter(|m| m.title.to_lowercase().contains(&query))
            .filter(|m| year.is_none() || m.year() == year)
            .collect();
        matches.sort_by_key(|m| m.id);
        matches
    }

    // Mutators - used during loading and by tests

    pub fn insert_genre(&mut self, genre: Genre) {
        self.genres.retain(|g| g.id != genre.id);
        self.genres.push(genre);
    }

    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    pub fn insert_genre_mapping(&mut self, movie_id: MovieId, genre_ids: Vec<GenreId>) {
        self.genre_mappings
            .insert(movie_id, GenreMapping { genre_ids });
    }

    pub fn insert_mood(&mut self, mood: &str, profile: MoodProfile) {
        self.mood_map.insert(mood.to_lowercase(), profile);
    }

    pub fn insert_genre_rule(&mut self, genre: GenreId, rule: GenreCompatibilityRule) {
        self.genre_rules.insert(genre, rule);
    }

    pub fn insert_actor_profile(&mut self, actor: PersonId, profile: ActorProfile) {
        self.actor_similarity.insert(actor, profile);
    }

    pub fn insert_embedding(&mut self, movie_id: MovieId, embedding: Vec<f32>) {
        self.embeddings.insert(movie_id, embedding);
    }

    pub fn insert_curated_set(&mut self, set: CuratedSet) {
        self.curated_sets.push(set);
    }

    /// Get counts for debugging/validation: (movies, genre mappings, embeddings)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.movies.len(),
            self.genre_mappings.len(),
            self.embeddings.len(),
        )
    }
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}
