//! Content-Based Strategy
//!
//! Finds movies whose embeddings are closest to a target movie.
//!
//! ## Algorithm
//! 1. Require `target_movie_id` with a known embedding
//! 2. Cosine-similarity scan over all embeddings (see `similarity`)
//! 3. Keep matches at or above `min_similarity` (context override, default 0.3)
//! 4. Decorate each match with title, genres, top actors and artwork from the
//!    provider; a failed lookup yields a placeholder title and an error note

use crate::lookup::fetch_movie;
use crate::similarity::most_similar;
use crate::traits::Strategy;
use crate::types::{
    DEFAULT_MIN_SIMILARITY, Recommendation, RecommendationContext, RecommendationMetadata,
};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, MovieProvider};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ContentBasedStrategy {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
    min_similarity: f32,
}

impl ContentBasedStrategy {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            catalog,
            provider,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    /// Configure the default similarity threshold (default: 0.3)
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

#[async_trait]
impl Strategy for ContentBasedStrategy {
    fn name(&self) -> &str {
        "content_based"
    }

    #[instrument(skip(self, context), fields(target = ?context.target_movie_id))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let Some(target) = context.target_movie_id else {
            debug!("No target movie, skipping");
            return Ok(Vec::new());
        };
        if self.catalog.embedding(target).is_none() {
            debug!(target, "Target movie has no embedding");
            return Ok(Vec::new());
        }

        let min_similarity = context.min_similarity.unwrap_or(self.min_similarity);
        let matches = most_similar(
            self.catalog.embeddings(),
            target,
            min_similarity,
            context.limit(),
        );
        debug!(count = matches.len(), min_similarity, "Similarity scan complete");

        let mut recommendations = Vec::with_capacity(matches.len());
        for (movie_id, score) in matches {
            let rec = match fetch_movie(self.provider.as_ref(), movie_id).await {
                Ok(movie) => Recommendation::new(
                    movie_id,
                    movie.title.clone(),
                    score,
                    "Similar content and themes",
                )
                .with_metadata(RecommendationMetadata::from_movie(&movie)),
                Err(error) => Recommendation::new(
                    movie_id,
                    format!("Movie {}", movie_id),
                    score,
                    "Content-based match",
                )
                .with_metadata(RecommendationMetadata {
                    error: Some(error),
                    ..Default::default()
                }),
            };
            recommendations.push(rec);
        }

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingProvider, sample_catalog};

    #[tokio::test]
    async fn test_similar_movies_with_details() {
        let catalog = Arc::new(sample_catalog());
        let strategy = ContentBasedStrategy::new(catalog.clone(), catalog);

        let ctx = RecommendationContext::new().with_target_movie(1).with_limit(5);
        let recs = strategy.execute(&ctx).await.unwrap();

        let ids: Vec<u32> = recs.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(recs[0].title, "Paddington");
        assert_eq!(recs[0].reason, "Similar content and themes");
        assert_eq!(recs[0].metadata.year, Some(2014));
        assert!(recs[0].score > recs[1].score);
    }

    #[tokio::test]
    async fn test_threshold_override() {
        let catalog = Arc::new(sample_catalog());
        let strategy = ContentBasedStrategy::new(catalog.clone(), catalog);

        let ctx = RecommendationContext::new()
            .with_target_movie(1)
            .with_min_similarity(0.99);
        let recs = strategy.execute(&ctx).await.unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_target_is_empty() {
        let catalog = Arc::new(sample_catalog());
        let strategy = ContentBasedStrategy::new(catalog.clone(), catalog);

        let no_target = strategy.execute(&RecommendationContext::new()).await.unwrap();
        assert!(no_target.is_empty());

        let unknown = RecommendationContext::new().with_target_movie(999);
        assert!(strategy.execute(&unknown).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_uses_placeholder() {
        let catalog = Arc::new(sample_catalog());
        let strategy = ContentBasedStrategy::new(catalog, Arc::new(FailingProvider));

        let ctx = RecommendationContext::new().with_target_movie(1);
        let recs = strategy.execute(&ctx).await.unwrap();

        assert_eq!(recs[0].title, "Movie 2");
        assert_eq!(recs[0].reason, "Content-based match");
        assert!(recs[0].metadata.error.is_some());
    }
}
