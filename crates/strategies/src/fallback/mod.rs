//! Rule-based fallback strategies.
//!
//! Tried in ascending priority when primary strategies come up short:
//!
//! | name | priority | activates when | score |
//! |---|---|---|---|
//! | `genre_fallback` | 1 | genres requested | 0.8 |
//! | `mood_fallback` | 2 | mood present | 0.7 |
//! | `actor_fallback` | 3 | preferred actors present | 0.75 |
//! | `popularity_fallback` | 4 | quality score <= 0.4 | 0.9 |
//! | `curated_fallback` | 5 | fallback required and sets loaded | 0.85 |
//!
//! Fallbacks build results from list endpoints only (no per-movie detail
//! calls), so they stay cheap when the primaries have already failed.

pub mod actor;
pub mod curated;
pub mod genre;
pub mod mood;
pub mod popularity;

pub use actor::ActorFallback;
pub use curated::CuratedFallback;
pub use genre::GenreCompatibilityFallback;
pub use mood::MoodCompatibilityFallback;
pub use popularity::PopularityFallback;

use crate::types::{Recommendation, RecommendationMetadata};
use catalog::{GenreId, MovieProvider, MovieSummary, image_url};
use std::collections::HashSet;
use tracing::warn;

/// Popular movies across several genres, unique, in genre order, up to `limit`
pub(crate) async fn movies_from_genres(
    provider: &dyn MovieProvider,
    genres: &[GenreId],
    limit: usize,
) -> Vec<MovieSummary> {
    let mut seen = HashSet::new();
    let mut movies = Vec::new();

    for &genre in genres {
        if movies.len() >= limit {
            break;
        }
        match provider.popular_movies(Some(genre), limit).await {
            Ok(batch) => {
                for movie in batch {
                    if movies.len() >= limit {
                        break;
                    }
                    if seen.insert(movie.id) {
                        movies.push(movie);
                    }
                }
            }
            Err(e) => warn!(genre, error = %e, "Genre listing failed"),
        }
    }
    movies
}

/// Recommendation built from a list entry
pub(crate) fn from_summary(movie: &MovieSummary, score: f32, reason: &str) -> Recommendation {
    Recommendation::new(movie.id, movie.title.clone(), score, reason).with_metadata(
        RecommendationMetadata {
            poster_url: image_url(movie.poster_path.as_deref()),
            backdrop_url: image_url(movie.backdrop_path.as_deref()),
            year: movie.release_date.get(..4).and_then(|y| y.parse().ok()),
            ..Default::default()
        },
    )
}
