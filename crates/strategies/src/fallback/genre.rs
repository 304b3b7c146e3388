//! Genre compatibility fallback.
//!
//! Each requested genre expands to its compatible genres through the rule
//! table; a genre without a rule is compatible with itself only.

use super::{from_summary, movies_from_genres};
use crate::traits::{FallbackStrategy, Strategy};
use crate::types::{Recommendation, RecommendationContext};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, GenreId, MovieProvider};
use std::sync::Arc;
use tracing::{debug, instrument};

const SCORE: f32 = 0.8;

pub struct GenreCompatibilityFallback {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
}

impl GenreCompatibilityFallback {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self { catalog, provider }
    }

    /// Compatible genres for a request, first-seen order, no duplicates
    pub fn compatible_genres(&self, genre_ids: &[GenreId]) -> Vec<GenreId> {
        let mut out: Vec<GenreId> = Vec::new();
        for &genre in genre_ids {
            let expanded = match self.catalog.genre_rule(genre) {
                Some(rule) => rule.compatible_genres.clone(),
                None => vec![genre],
            };
            for g in expanded {
                if !out.contains(&g) {
                    out.push(g);
                }
            }
        }
        out
    }
}

#[async_trait]
impl Strategy for GenreCompatibilityFallback {
    fn name(&self) -> &str {
        "genre_fallback"
    }

    #[instrument(skip(self, context), fields(genres = ?context.genre_ids))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        if context.genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let genres = self.compatible_genres(&context.genre_ids);
        debug!(?genres, "Expanded to compatible genres");

        let movies = movies_from_genres(self.provider.as_ref(), &genres, context.limit()).await;
        Ok(movies
            .iter()
            .map(|m| from_summary(m, SCORE, "Similar genre fallback"))
            .collect())
    }
}

impl FallbackStrategy for GenreCompatibilityFallback {
    fn priority(&self) -> u32 {
        1
    }

    fn should_activate(&self, context: &RecommendationContext) -> bool {
        !context.genre_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    fn fallback() -> GenreCompatibilityFallback {
        let catalog = Arc::new(sample_catalog());
        GenreCompatibilityFallback::new(catalog.clone(), catalog)
    }

    #[test]
    fn test_compatible_genres() {
        let fb = fallback();
        // 80 has a rule -> [53, 28]; 27 has none -> itself
        assert_eq!(fb.compatible_genres(&[80, 27]), vec![53, 28, 27]);
        assert_eq!(fb.compatible_genres(&[80, 80]), vec![53, 28]);
    }

    #[tokio::test]
    async fn test_execute_uses_compatible_genres() {
        let fb = fallback();
        let ctx = RecommendationContext::new().with_genres(vec![80]);

        assert!(fb.should_activate(&ctx));
        let recs = fb.execute(&ctx).await.unwrap();
        let ids: Vec<u32> = recs.iter().map(|r| r.content_id).collect();

        // Thriller: Se7en; Action: Heat
        assert_eq!(ids, vec![5, 4]);
        assert!(recs.iter().all(|r| r.score == 0.8));
        assert_eq!(recs[0].reason, "Similar genre fallback");
    }

    #[tokio::test]
    async fn test_inactive_without_genres() {
        let fb = fallback();
        let ctx = RecommendationContext::new();
        assert!(!fb.should_activate(&ctx));
        assert!(fb.execute(&ctx).await.unwrap().is_empty());
        assert_eq!(fb.priority(), 1);
    }
}
