//! CatalogIndex loading and indexing logic.
//!
//! Builds the CatalogIndex from the static data directory:
//! - Parse all data files (concurrently, with nested `rayon::join`)
//! - Build secondary indices (genre -> movies, person -> movies)
//! - Validate table integrity (embedding dimensions, mood weights)

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl CatalogIndex {
    /// Load the whole static catalog from a directory
    ///
    /// Steps:
    /// 1. Parse every data file in parallel
    /// 2. Insert primary data and rule tables
    /// 3. Build secondary indices
    /// 4. Validate data integrity
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!(dir = %data_dir.display(), "Loading static catalog");

        let path = |name: &str| data_dir.join(name);
        let genres_path = path("genres.json");
        let movies_path = path("movies.json");
        let mappings_path = path("genre_mappings.json");
        let moods_path = path("mood_genre_map.json");
        let rules_path = path("genre_rules.json");
        let actors_path = path("actor_similarity.json");
        let embeddings_path = path("embeddings.json");
        let packs_path = path("starter_packs.json");
        let pack_genres_path = path("pack_genres.json");

        // Embeddings and movies dominate load time, so they sit on opposite
        // sides of the outermost join
        let (((genres, movies), (mappings, moods)), ((rules, actors), (embeddings, curated))) =
            rayon::join(
                || {
                    rayon::join(
                        || {
                            rayon::join(
                                || parser::parse_genres(&genres_path),
                                || parser::parse_movies(&movies_path),
                            )
                        },
                        || {
                            rayon::join(
                                || parser::parse_genre_mappings(&mappings_path),
                                || parser::parse_mood_map(&moods_path),
                            )
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            rayon::join(
                                || parser::parse_genre_rules(&rules_path),
                                || parser::parse_actor_similarity(&actors_path),
                            )
                        },
                        || {
                            rayon::join(
                                || parser::parse_embeddings(&embeddings_path),
                                || parser::parse_curated_sets(&packs_path, &pack_genres_path),
                            )
                        },
                    )
                },
            );

        let mut index = CatalogIndex::new();
        for genre in genres? {
            index.insert_genre(genre);
        }
        for movie in movies? {
            index.insert_movie(movie);
        }
        index.genre_mappings = mappings?;
        index.mood_map = moods?;
        index.genre_rules = rules?;
        index.actor_similarity = actors?;
        index.embeddings = embeddings?;
        index.curated_sets = curated?;

        index.build_secondary_indices();
        index.validate()?;

        let (movies, mappings, embeddings) = index.counts();
        info!(
            movies,
            mappings,
            embeddings,
            moods = index.mood_map.len(),
            curated_sets = index.curated_sets.len(),
            "Catalog loaded"
        );
        Ok(index)
    }

    /// Build secondary indices after primary data is loaded
    ///
    /// The genre index merges genres from both the movie records and the
    /// genre-mapping table. The person index covers cast and directors.
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        self.person_index.clear();

        for (movie_id, movie) in &self.movies {
            for genre in &movie.genres {
                self.genre_index
                    .entry(genre.id)
                    .or_default()
                    .push(*movie_id);
            }
            for person in movie.cast.iter().chain(movie.directors.iter()) {
                self.person_index
                    .entry(person.id)
                    .or_default()
                    .push(*movie_id);
            }
        }

        for (movie_id, mapping) in &self.genre_mappings {
            for &genre in &mapping.genre_ids {
                self.genre_index.entry(genre).or_default().push(*movie_id);
            }
        }

        for ids in self
            .genre_index
            .values_mut()
            .chain(self.person_index.values_mut())
        {
            ids.sort_unstable();
            ids.dedup();
        }
    }

    /// Validate data integrity
    ///
    /// Checks that:
    /// - All embeddings share one non-zero dimension
    /// - Mood weights are positive and finite
    /// - Genre rule weights are positive and finite
    pub fn validate(&self) -> Result<()> {
        let mut dimension: Option<usize> = None;
        for (movie_id, embedding) in &self.embeddings {
            if embedding.is_empty() {
                return Err(CatalogError::InvalidValue {
                    field: "embedding".to_string(),
                    value: format!("empty vector for movie {}", movie_id),
                });
            }
            match dimension {
                None => dimension = Some(embedding.len()),
                Some(d) if d != embedding.len() => {
                    return Err(CatalogError::ValidationError(format!(
                        "embedding for movie {} has dimension {}, expected {}",
                        movie_id,
                        embedding.len(),
                        d
                    )));
                }
                Some(_) => {}
            }
        }

        for (mood, profile) in &self.mood_map {
            if !(profile.weight.is_finite() && profile.weight > 0.0) {
                return Err(CatalogError::InvalidValue {
                    field: format!("weight of mood '{}'", mood),
                    value: profile.weight.to_string(),
                });
            }
        }

        for (genre, rule) in &self.genre_rules {
            if !(rule.weight.is_finite() && rule.weight > 0.0) {
                return Err(CatalogError::InvalidValue {
                    field: format!("weight of genre rule {}", genre),
                    value: rule.weight.to_string(),
                });
            }
        }

        Ok(())
    }
}
