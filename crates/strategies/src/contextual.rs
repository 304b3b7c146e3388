//! Genre and mood strategies.
//!
//! ## Genre-based
//! score = |movie genres ∩ requested| / |requested| over every movie with
//! known genres, best first (ties by movie id), top `limit`.
//!
//! ## Mood-based
//! The lower-cased mood is resolved through the mood map to a genre set, the
//! genre scoring runs over that set, and each score is multiplied by the
//! mood's weight (so it may exceed 1.0).

use crate::lookup::{fetch_movie, score_by_genre_overlap};
use crate::traits::Strategy;
use crate::types::{Recommendation, RecommendationContext, RecommendationMetadata};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, GenreId, MovieProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct GenreStrategy {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
}

impl GenreStrategy {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self { catalog, provider }
    }

    /// Score and decorate the top `limit` movies for a genre set
    async fn recommend_for_genres(
        &self,
        genre_ids: &[GenreId],
        limit: usize,
    ) -> Vec<Recommendation> {
        let target: HashSet<GenreId> = genre_ids.iter().copied().collect();
        let mut scored = score_by_genre_overlap(&self.catalog, &target);
        scored.truncate(limit);

        let mut recommendations = Vec::with_capacity(scored.len());
        for (movie_id, score) in scored {
            let (title, mut metadata) = match fetch_movie(self.provider.as_ref(), movie_id).await
            {
                Ok(movie) => (movie.title.clone(), RecommendationMetadata::from_movie(&movie)),
                Err(_) => ("Unknown".to_string(), RecommendationMetadata::default()),
            };
            metadata.match_score = Some(score);

            recommendations.push(
                Recommendation::new(
                    movie_id,
                    title,
                    score,
                    format!("Matched {:.0}% of your preferred genres", score * 100.0),
                )
                .with_metadata(metadata),
            );
        }
        recommendations
    }
}

#[async_trait]
impl Strategy for GenreStrategy {
    fn name(&self) -> &str {
        "genre_based"
    }

    #[instrument(skip(self, context), fields(genres = ?context.genre_ids))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        if context.genre_ids.is_empty() {
            return Ok(Vec::new());
        }

        let recs = self
            .recommend_for_genres(&context.genre_ids, context.limit())
            .await;
        debug!(count = recs.len(), "Genre recommendations ready");
        Ok(recs)
    }
}

pub struct MoodStrategy {
    catalog: Arc<CatalogIndex>,
    genre: GenreStrategy,
}

impl MoodStrategy {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            genre: GenreStrategy::new(catalog.clone(), provider),
            catalog,
        }
    }
}

#[async_trait]
impl Strategy for MoodStrategy {
    fn name(&self) -> &str {
        "mood_based"
    }

    #[instrument(skip(self, context), fields(mood = ?context.mood))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let Some(mood) = context.normalized_mood() else {
            return Ok(Vec::new());
        };
        let Some(profile) = self.catalog.mood_profile(&mood) else {
            warn!(mood = %mood, "Unknown mood");
            return Ok(Vec::new());
        };

        let mut recs = self
            .genre
            .recommend_for_genres(&profile.genres, context.limit())
            .await;
        for rec in &mut recs {
            rec.score *= profile.weight;
            rec.reason = format!("Great for '{}' moods", mood);
            rec.metadata.mood = Some(mood.clone());
            rec.metadata.mood_weight = Some(profile.weight);
        }

        debug!(count = recs.len(), weight = profile.weight, "Mood recommendations ready");
        Ok(recs)
    }
}
