//! Parsers for the static JSON data files.
//!
//! Every file is optional: a missing file logs a warning and yields an empty
//! table, so a partially provisioned data directory still produces a usable
//! (if thinner) catalog. A file that exists but does not parse is an error.
//!
//! Files handled here:
//! - genres.json: `[{id, name}]`
//! - movies.json: `[{id, title, genres: [{id, name}], cast, directors, ...}]`
//! - genre_mappings.json: `{movie_id: {genre_ids}}`
//! - mood_genre_map.json: `{mood: {genres, weight, description}}`
//! - genre_rules.json: `{genre_id: {compatible_genres, compatible_moods, weight}}`
//! - actor_similarity.json: `{actor_id: {similar_actors: [...]}}`
//! - embeddings.json: `{movie_id: [f32, ...]}`
//! - starter_packs.json + pack_genres.json: `{name: [movie_id]}` + `{name: genre}`

use crate::error::{CatalogError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read and deserialize a JSON file, or `None` if it does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        warn!(path = %path.display(), "Data file not found, using empty table");
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents).map_err(|e| CatalogError::ParseError {
        file: file_name(path),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "Parsed data file");
    Ok(Some(value))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn parse_genres(path: &Path) -> Result<Vec<Genre>> {
    Ok(read_json(path)?.unwrap_or_default())
}

pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let movies: Vec<Movie> = read_json(path)?.unwrap_or_default();

    for movie in &movies {
        if movie.title.trim().is_empty() {
            return Err(CatalogError::InvalidValue {
                field: "title".to_string(),
                value: format!("empty title for movie {}", movie.id),
            });
        }
    }
    Ok(movies)
}

pub fn parse_genre_mappings(path: &Path) -> Result<HashMap<MovieId, GenreMapping>> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Parse the mood map, falling back to the built-in moods when the file is
/// missing or empty
pub fn parse_mood_map(path: &Path) -> Result<HashMap<String, MoodProfile>> {
    let raw: HashMap<String, MoodProfile> = read_json(path)?.unwrap_or_default();
    if raw.is_empty() {
        debug!("Using built-in mood map");
        return Ok(default_mood_map());
    }

    Ok(raw
        .into_iter()
        .map(|(mood, profile)| (mood.to_lowercase(), profile))
        .collect())
}

pub fn parse_genre_rules(path: &Path) -> Result<HashMap<GenreId, GenreCompatibilityRule>> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Parse the actor similarity graph, ordering each actor's neighbours by
/// descending similarity so callers can simply take the first N
pub fn parse_actor_similarity(path: &Path) -> Result<HashMap<PersonId, ActorProfile>> {
    let mut graph: HashMap<PersonId, ActorProfile> = read_json(path)?.unwrap_or_default();
    for profile in graph.values_mut() {
        profile.similar_actors.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    Ok(graph)
}

pub fn parse_embeddings(path: &Path) -> Result<HashMap<MovieId, Vec<f32>>> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Join `starter_packs.json` and `pack_genres.json` into curated sets
///
/// Packs without a genre entry are skipped with a warning. Output is sorted by
/// pack name so the result does not depend on map iteration order.
pub fn parse_curated_sets(packs_path: &Path, genres_path: &Path) -> Result<Vec<CuratedSet>> {
    let packs: HashMap<String, Vec<MovieId>> = read_json(packs_path)?.unwrap_or_default();
    let pack_genres: HashMap<String, String> = read_json(genres_path)?.unwrap_or_default();

    let mut sets: Vec<CuratedSet> = packs
        .into_iter()
        .filter_map(|(name, movie_ids)| match pack_genres.get(&name) {
            Some(genre) => Some(CuratedSet {
                genre: genre.clone(),
                name,
                movie_ids,
            }),
            None => {
                warn!(pack = %name, "Curated pack has no genre mapping, skipping");
                None
            }
        })
        .collect();

    sets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_yields_empty() {
        let dir = TempDir::new().unwrap();
        let genres = parse_genres(&dir.path().join("genres.json")).unwrap();
        assert!(genres.is_empty());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "genres.json", "[{\"id\": 1,");

        match parse_genres(&path) {
            Err(CatalogError::ParseError { file, .. }) => assert_eq!(file, "genres.json"),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_movies() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "movies.json",
            r#"[{
                "id": 603,
                "title": "The Matrix",
                "release_date": "1999-03-30",
                "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
                "vote_average": 8.2,
                "vote_count": 24000,
                "popularity": 80.5,
                "cast": [{"id": 6384, "name": "Keanu Reeves"}]
            }]"#,
        );

        let movies = parse_movies(&path).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].genre_ids(), vec![28, 878]);
        assert_eq!(movies[0].cast[0].name, "Keanu Reeves");
        assert!(movies[0].directors.is_empty());
    }

    #[test]
    fn test_parse_movies_rejects_empty_title() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "movies.json", r#"[{"id": 1, "title": "  "}]"#);
        assert!(matches!(
            parse_movies(&path),
            Err(CatalogError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_genre_mappings_numeric_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "genre_mappings.json",
            r#"{"603": {"genre_ids": [28, 878]}, "13": {"genre_ids": [18]}}"#,
        );

        let mappings = parse_genre_mappings(&path).unwrap();
        assert_eq!(mappings[&603].genre_ids, vec![28, 878]);
        assert_eq!(mappings[&13].genre_ids, vec![18]);
    }

    #[test]
    fn test_mood_map_defaults_and_lowercases() {
        let dir = TempDir::new().unwrap();

        let defaults = parse_mood_map(&dir.path().join("mood_genre_map.json")).unwrap();
        assert!(defaults.contains_key("uplifting"));
        assert!(defaults.contains_key("melancholic"));

        let path = write_file(
            &dir,
            "mood_genre_map.json",
            r#"{"Tense": {"genres": [53, 80]}}"#,
        );
        let moods = parse_mood_map(&path).unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods["tense"].genres, vec![53, 80]);
        assert_eq!(moods["tense"].weight, 1.0);
    }

    #[test]
    fn test_actor_similarity_sorted_by_score() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "actor_similarity.json",
            r#"{"1": {"similar_actors": [
                {"actor_id": 2, "score": 0.4},
                {"actor_id": 3, "score": 0.9}
            ]}}"#,
        );

        let graph = parse_actor_similarity(&path).unwrap();
        let ids: Vec<PersonId> = graph[&1].similar_actors.iter().map(|s| s.actor_id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_curated_sets_skip_packs_without_genre() {
        let dir = TempDir::new().unwrap();
        let packs = write_file(
            &dir,
            "starter_packs.json",
            r#"{"Staff Picks": [1, 2, 3], "Rainy Day": [6, 7], "Mystery Box": [11]}"#,
        );
        let genres = write_file(
            &dir,
            "pack_genres.json",
            r#"{"Staff Picks": "Drama", "Rainy Day": "Comedy"}"#,
        );

        let sets = parse_curated_sets(&packs, &genres).unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rainy Day", "Staff Picks"]);
        assert_eq!(sets[1].movie_ids, vec![1, 2, 3]);
        assert_eq!(sets[1].genre, "Drama");
    }
}
