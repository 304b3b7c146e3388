//! Mood compatibility fallback: mood -> genres via the mood map, then the
//! most popular movies of those genres.

use super::{from_summary, movies_from_genres};
use crate::traits::{FallbackStrategy, Strategy};
use crate::types::{Recommendation, RecommendationContext};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, MovieProvider};
use std::sync::Arc;
use tracing::{debug, instrument};

const SCORE: f32 = 0.7;

pub struct MoodCompatibilityFallback {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
}

impl MoodCompatibilityFallback {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self { catalog, provider }
    }
}

#[async_trait]
impl Strategy for MoodCompatibilityFallback {
    fn name(&self) -> &str {
        "mood_fallback"
    }

    #[instrument(skip(self, context), fields(mood = ?context.mood))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let Some(mood) = context.normalized_mood() else {
            return Ok(Vec::new());
        };
        let Some(profile) = self.catalog.mood_profile(&mood) else {
            debug!(mood = %mood, "No genres for mood");
            return Ok(Vec::new());
        };

        let movies =
            movies_from_genres(self.provider.as_ref(), &profile.genres, context.limit()).await;
        Ok(movies
            .iter()
            .map(|m| {
                let mut rec = from_summary(m, SCORE, "Mood-based genre match");
                rec.metadata.mood = Some(mood.clone());
                rec
            })
            .collect())
    }
}

impl FallbackStrategy for MoodCompatibilityFallback {
    fn priority(&self) -> u32 {
        2
    }

    fn should_activate(&self, context: &RecommendationContext) -> bool {
        context.normalized_mood().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    #[tokio::test]
    async fn test_mood_fallback() {
        let catalog = Arc::new(sample_catalog());
        let fb = MoodCompatibilityFallback::new(catalog.clone(), catalog);

        let ctx = RecommendationContext::new().with_mood("melancholic");
        assert!(fb.should_activate(&ctx));

        let recs = fb.execute(&ctx).await.unwrap();
        // Drama by popularity: Heat, Little Women, Obscure Drama
        let ids: Vec<u32> = recs.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![4, 3, 6]);
        assert!(recs.iter().all(|r| r.score == 0.7));
        assert_eq!(recs[0].metadata.mood.as_deref(), Some("melancholic"));
    }

    #[tokio::test]
    async fn test_mood_fallback_inactive_or_unknown() {
        let catalog = Arc::new(sample_catalog());
        let fb = MoodCompatibilityFallback::new(catalog.clone(), catalog);

        assert!(!fb.should_activate(&RecommendationContext::new()));
        let ctx = RecommendationContext::new().with_mood("furious");
        assert!(fb.execute(&ctx).await.unwrap().is_empty());
    }
}
