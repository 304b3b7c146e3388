//! # Catalog Crate
//!
//! Static movie data for MoviePulse: TMDB-shaped domain types, the rule tables
//! that drive the recommendation strategies, and the `MovieProvider` seam.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Genre, Person, rule tables, CatalogIndex)
//! - **parser**: Parse the JSON data files into Rust structs
//! - **index**: Load a data directory and build secondary indices
//! - **provider**: The async `MovieProvider` trait, implemented offline by `CatalogIndex`
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, MovieProvider};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_dir(Path::new("static_data"))?;
//! let drama = index.get_movies_by_genre(18);
//! let matrix = index.movie_details(603).await?;
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod provider;
pub mod types;

pub use error::{CatalogError, Result};
pub use provider::MovieProvider;
pub use types::{
    // Type aliases
    GenreId,
    MovieId,
    PersonId,
    // Core types
    Genre,
    Movie,
    MovieSummary,
    Person,
    // Rule tables
    ActorProfile,
    CatalogIndex,
    CuratedSet,
    GenreCompatibilityRule,
    GenreMapping,
    MoodProfile,
    SimilarActor,
    // Helpers
    TMDB_IMAGE_BASE_URL,
    default_mood_map,
    image_url,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_index_creation() {
        let index = CatalogIndex::new();
        assert_eq!(index.counts(), (0, 0, 0));
        assert!(index.curated_sets().is_empty());
    }

    #[test]
    fn test_empty_queries() {
        let index = CatalogIndex::new();

        assert!(index.get_movie(999).is_none());
        assert!(index.get_movies_by_genre(18).is_empty());
        assert!(index.get_filmography(999).is_empty());
        assert!(index.similar_actors(999).is_empty());
        assert!(index.embedding(999).is_none());
        assert!(index.genre_rule(18).is_none());
    }
}
