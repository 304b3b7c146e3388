//! Curated fallback: the last resort, a handpicked set of movies.
//!
//! A set matching `preferred_genre` (case-insensitive) is picked at random,
//! any set when none match, and up to `limit` of its movies are sampled.

use crate::traits::{FallbackStrategy, Strategy};
use crate::types::{Recommendation, RecommendationContext, RecommendationMetadata};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, CuratedSet, MovieId};
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing::{debug, instrument};

const SCORE: f32 = 0.85;

pub struct CuratedFallback {
    catalog: Arc<CatalogIndex>,
}

impl CuratedFallback {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self { catalog }
    }

    fn pick(&self, preferred_genre: Option<&str>, limit: usize) -> Option<(&CuratedSet, Vec<MovieId>)> {
        let sets = self.catalog.curated_sets();
        let matching: Vec<&CuratedSet> = match preferred_genre {
            Some(genre) => sets
                .iter()
                .filter(|s| s.genre.eq_ignore_ascii_case(genre))
                .collect(),
            None => Vec::new(),
        };
        let candidates: Vec<&CuratedSet> = if matching.is_empty() {
            sets.iter().collect()
        } else {
            matching
        };

        let mut rng = rand::rng();
        let set = *candidates.choose(&mut rng)?;
        let movie_ids = if set.movie_ids.len() <= limit {
            set.movie_ids.clone()
        } else {
            set.movie_ids
                .choose_multiple(&mut rng, limit)
                .copied()
                .collect()
        };
        Some((set, movie_ids))
    }
}

#[async_trait]
impl Strategy for CuratedFallback {
    fn name(&self) -> &str {
        "curated_fallback"
    }

    #[instrument(skip(self, context), fields(genre = ?context.preferred_genre))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let Some((set, movie_ids)) = self.pick(context.preferred_genre.as_deref(), context.limit())
        else {
            return Ok(Vec::new());
        };
        debug!(set = %set.name, count = movie_ids.len(), "Serving curated set");

        Ok(movie_ids
            .into_iter()
            .map(|id| {
                let (title, mut metadata) = match self.catalog.get_movie(id) {
                    Some(movie) => (movie.title.clone(), RecommendationMetadata::from_movie(movie)),
                    None => (
                        format!("Curated selection from {}", set.name),
                        RecommendationMetadata::default(),
                    ),
                };
                metadata.curated_set = Some(set.name.clone());
                metadata.curated_genre = Some(set.genre.clone());
                Recommendation::new(id, title, SCORE, "Handpicked collection").with_metadata(metadata)
            })
            .collect())
    }
}

impl FallbackStrategy for CuratedFallback {
    fn priority(&self) -> u32 {
        5
    }

    fn should_activate(&self, context: &RecommendationContext) -> bool {
        context.fallback_required && !self.catalog.curated_sets().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    #[test]
    fn test_activation() {
        let fb = CuratedFallback::new(Arc::new(sample_catalog()));
        let mut ctx = RecommendationContext::new();
        assert!(!fb.should_activate(&ctx));

        ctx.fallback_required = true;
        assert!(fb.should_activate(&ctx));

        let empty = CuratedFallback::new(Arc::new(CatalogIndex::new()));
        assert!(!empty.should_activate(&ctx));
    }

    #[tokio::test]
    async fn test_preferred_genre_case_insensitive() {
        let fb = CuratedFallback::new(Arc::new(sample_catalog()));
        let ctx = RecommendationContext::new().with_preferred_genre("drama");

        let recs = fb.execute(&ctx).await.unwrap();
        let ids: Vec<MovieId> = recs.iter().map(|r| r.content_id).collect();

        assert_eq!(ids, vec![1, 3, 5]);
        assert!(recs.iter().all(|r| r.score == 0.85));
        assert_eq!(recs[0].title, "Toy Story");
        assert_eq!(recs[0].metadata.curated_set.as_deref(), Some("Staff Picks"));
        assert_eq!(recs[0].metadata.curated_genre.as_deref(), Some("Drama"));
    }

    #[tokio::test]
    async fn test_sampling_respects_limit() {
        let fb = CuratedFallback::new(Arc::new(sample_catalog()));
        let ctx = RecommendationContext::new()
            .with_preferred_genre("Drama")
            .with_limit(2);

        let recs = fb.execute(&ctx).await.unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| [1, 3, 5].contains(&r.content_id)));
        assert_ne!(recs[0].content_id, recs[1].content_id);
    }

    #[tokio::test]
    async fn test_unmatched_genre_uses_any_set() {
        let fb = CuratedFallback::new(Arc::new(sample_catalog()));
        let ctx = RecommendationContext::new().with_preferred_genre("Western");

        let recs = fb.execute(&ctx).await.unwrap();
        assert!(!recs.is_empty());
        let set = recs[0].metadata.curated_set.clone().unwrap();
        assert!(set == "Staff Picks" || set == "Rainy Day");
    }

    #[tokio::test]
    async fn test_no_sets_is_empty() {
        let fb = CuratedFallback::new(Arc::new(CatalogIndex::new()));
        assert!(fb.execute(&RecommendationContext::new()).await.unwrap().is_empty());
    }
}
