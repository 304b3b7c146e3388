//! Global popularity fallback.
//!
//! ## Algorithm
//! 1. Fetch `limit * 2` popular movies (optionally restricted to `genre_filter`)
//! 2. Keep those with at least 500 votes
//! 3. Rank by `0.6 * vote_average + 0.4 * popularity`
//! 4. Take `limit`

use super::from_summary;
use crate::traits::{FallbackStrategy, Strategy};
use crate::types::{Recommendation, RecommendationContext};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{MovieProvider, MovieSummary};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

const SCORE: f32 = 0.9;

pub struct PopularityFallback {
    provider: Arc<dyn MovieProvider>,
    min_quality_threshold: f32,
    min_votes: u32,
}

impl PopularityFallback {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            provider,
            min_quality_threshold: 0.4,
            min_votes: 500,
        }
    }

    /// Configure the quality score at or below which this fallback runs (default: 0.4)
    pub fn with_min_quality_threshold(mut self, threshold: f32) -> Self {
        self.min_quality_threshold = threshold;
        self
    }

    /// Configure the minimum vote count (default: 500)
    pub fn with_min_votes(mut self, min_votes: u32) -> Self {
        self.min_votes = min_votes;
        self
    }
}

/// Weighted popularity: 60% rating, 40% raw popularity
pub fn weighted_popularity(movie: &MovieSummary) -> f32 {
    movie.vote_average * 0.6 + movie.popularity * 0.4
}

#[async_trait]
impl Strategy for PopularityFallback {
    fn name(&self) -> &str {
        "popularity_fallback"
    }

    #[instrument(skip(self, context), fields(genre = ?context.genre_filter))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let limit = context.limit();
        let raw = self
            .provider
            .popular_movies(context.genre_filter, limit.saturating_mul(2))
            .await?;

        let mut valid: Vec<MovieSummary> = raw
            .into_iter()
            .filter(|m| m.vote_count >= self.min_votes)
            .collect();
        valid.sort_by(|a, b| {
            weighted_popularity(b)
                .partial_cmp(&weighted_popularity(a))
                .unwrap_or(Ordering::Equal)
        });
        valid.truncate(limit);
        debug!(count = valid.len(), "Popular movies after vote filter");

        Ok(valid
            .iter()
            .map(|m| {
                let mut rec = from_summary(m, SCORE, "Fallback to trending/popular movie");
                rec.metadata.popularity = Some(m.popularity);
                rec.metadata.vote_average = Some(m.vote_average);
                rec
            })
            .collect())
    }
}

impl FallbackStrategy for PopularityFallback {
    fn priority(&self) -> u32 {
        4
    }

    fn should_activate(&self, context: &RecommendationContext) -> bool {
        context.quality_score() <= self.min_quality_threshold
    }
}
