//! Movie lookups shared by the strategies.

use catalog::{CatalogIndex, GenreId, Movie, MovieId, MovieProvider};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fetch full movie details, describing the failure when there are none
pub(crate) async fn fetch_movie(
    provider: &dyn MovieProvider,
    movie_id: MovieId,
) -> Result<Movie, String> {
    match provider.movie_details(movie_id).await {
        Ok(Some(movie)) => Ok(movie),
        Ok(None) => {
            debug!(movie_id, provider = provider.name(), "Movie not found");
            Err(format!("Movie {} not found", movie_id))
        }
        Err(e) => {
            warn!(movie_id, provider = provider.name(), error = %e, "Movie lookup failed");
            Err(e.to_string())
        }
    }
}

/// Score every known movie by the share of `target` genres it carries
///
/// score = |movie genres ∩ target| / |target|. Movies with no overlap are
/// dropped. Sorted by descending score, ties broken by ascending movie id.
pub(crate) fn score_by_genre_overlap(
    catalog: &CatalogIndex,
    target: &HashSet<GenreId>,
) -> Vec<(MovieId, f32)> {
    if target.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<MovieId> = catalog
        .genre_mappings()
        .keys()
        .copied()
        .chain(catalog.get_all_movie_ids())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut scored: Vec<(MovieId, f32)> = candidates
        .into_iter()
        .filter_map(|id| {
            let genres: HashSet<GenreId> = catalog.movie_genre_ids(id).into_iter().collect();
            let overlap = genres.intersection(target).count();
            (overlap > 0).then(|| (id, overlap as f32 / target.len() as f32))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_by_genre_overlap() {
        let mut catalog = CatalogIndex::new();
        catalog.insert_genre_mapping(30, vec![18]);
        catalog.insert_genre_mapping(10, vec![18, 35]);
        catalog.insert_genre_mapping(20, vec![35, 99]);
        catalog.insert_genre_mapping(40, vec![27]);

        let target: HashSet<GenreId> = [18, 35].into_iter().collect();
        let scored = score_by_genre_overlap(&catalog, &target);

        assert_eq!(scored, vec![(10, 1.0), (20, 0.5), (30, 0.5)]);
    }

    #[test]
    fn test_empty_target_scores_nothing() {
        let mut catalog = CatalogIndex::new();
        catalog.insert_genre_mapping(1, vec![18]);
        assert!(score_by_genre_overlap(&catalog, &HashSet::new()).is_empty());
    }
}
