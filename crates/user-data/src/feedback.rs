//! Analytics log of served recommendation batches.
//!
//! Events are appended to `recommendation_analytics.jsonl`, one JSON object
//! per line, tagged by `event_type`. Only a whitelisted summary of the
//! request context is written.

use crate::error::Result;
use crate::files::append_line;
use catalog::{GenreId, MovieId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use strategies::{Recommendation, RecommendationContext};
use tracing::debug;

pub const ANALYTICS_FILE: &str = "recommendation_analytics.jsonl";

const CURATED_FALLBACK: &str = "curated_fallback";
const UNKNOWN_REQUEST: &str = "unknown";

/// The non-sensitive subset of a request context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub target_movie_id: Option<MovieId>,
    pub genre_ids: Vec<GenreId>,
    pub mood: Option<String>,
    pub preferred_actor_count: usize,
    pub limit: Option<usize>,
    pub force_fallback: bool,
    pub quality_score: Option<f32>,
}

impl From<&RecommendationContext> for ContextSummary {
    fn from(ctx: &RecommendationContext) -> Self {
        Self {
            target_movie_id: ctx.target_movie_id,
            genre_ids: ctx.genre_ids.clone(),
            mood: ctx.mood.clone(),
            preferred_actor_count: ctx.preferred_actors.len(),
            limit: ctx.limit,
            force_fallback: ctx.force_fallback,
            quality_score: ctx.quality_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum FeedbackEvent {
    RecommendationBatch {
        timestamp: DateTime<Utc>,
        request_id: String,
        user_id: Option<String>,
        strategy_distribution: BTreeMap<String, usize>,
        execution_ms: u64,
        recommendation_count: usize,
        fallback_used: bool,
        fallback_strategy: Option<String>,
        context_summary: ContextSummary,
    },
    CuratedFallbackUsed {
        timestamp: DateTime<Utc>,
        request_id: String,
        user_id: Option<String>,
        curated_sets: Vec<String>,
        recommendation_count: usize,
        context_summary: ContextSummary,
    },
    FallbackActivation {
        timestamp: DateTime<Utc>,
        strategy: String,
        reason: String,
        context_summary: ContextSummary,
    },
}

pub struct FeedbackLogger {
    path: PathBuf,
}

/// Count recommendations per producing strategy
pub fn strategy_distribution(recommendations: &[Recommendation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for rec in recommendations {
        *counts.entry(rec.source_strategy.clone()).or_insert(0) += 1;
    }
    counts
}

/// The fallback that produced any of the recommendations, if one did
pub fn detect_fallback(recommendations: &[Recommendation]) -> Option<&str> {
    recommendations
        .iter()
        .find(|r| r.is_fallback)
        .map(|r| r.source_strategy.as_str())
}

impl FeedbackLogger {
    pub fn open(dir: &Path) -> Self {
        Self::new(dir.join(ANALYTICS_FILE))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log a served batch, plus a curated-fallback event when curated
    /// recommendations were part of it
    pub fn log_recommendation_batch(
        &self,
        recommendations: &[Recommendation],
        context: &RecommendationContext,
        execution_ms: u64,
    ) -> Result<()> {
        let request_id = context
            .request_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_REQUEST.to_string());
        let summary = ContextSummary::from(context);
        let fallback = detect_fallback(recommendations).map(str::to_string);

        append_line(
            &self.path,
            &FeedbackEvent::RecommendationBatch {
                timestamp: Utc::now(),
                request_id: request_id.clone(),
                user_id: context.user_id.clone(),
                strategy_distribution: strategy_distribution(recommendations),
                execution_ms,
                recommendation_count: recommendations.len(),
                fallback_used: fallback.is_some(),
                fallback_strategy: fallback.clone(),
                context_summary: summary.clone(),
            },
        )?;
        debug!(%request_id, count = recommendations.len(), "Logged recommendation batch");

        if fallback.as_deref() == Some(CURATED_FALLBACK) {
            let curated: Vec<&Recommendation> = recommendations
                .iter()
                .filter(|r| r.source_strategy == CURATED_FALLBACK)
                .collect();
            let sets: BTreeSet<String> = curated
                .iter()
                .map(|r| {
                    r.metadata
                        .curated_set
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string())
                })
                .collect();

            append_line(
                &self.path,
                &FeedbackEvent::CuratedFallbackUsed {
                    timestamp: Utc::now(),
                    request_id,
                    user_id: context.user_id.clone(),
                    curated_sets: sets.into_iter().collect(),
                    recommendation_count: curated.len(),
                    context_summary: summary,
                },
            )?;
        }

        Ok(())
    }

    /// Log that a fallback strategy was activated, and why
    pub fn log_fallback_activation(
        &self,
        strategy: &str,
        context: &RecommendationContext,
        reason: &str,
    ) -> Result<()> {
        append_line(
            &self.path,
            &FeedbackEvent::FallbackActivation {
                timestamp: Utc::now(),
                strategy: strategy.to_string(),
                reason: reason.to_string(),
                context_summary: ContextSummary::from(context),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::read_lines;
    use strategies::RecommendationMetadata;
    use tempfile::TempDir;

    fn rec(id: MovieId, strategy: &str, is_fallback: bool) -> Recommendation {
        let mut rec = Recommendation::new(id, format!("Movie {}", id), 0.5, "test");
        rec.source_strategy = strategy.to_string();
        rec.is_fallback = is_fallback;
        rec
    }

    #[test]
    fn test_batch_event() {
        let dir = TempDir::new().unwrap();
        let logger = FeedbackLogger::open(dir.path());
        let ctx = RecommendationContext::new()
            .with_request_id("req-1")
            .with_user("alice")
            .with_genres(vec![28]);
        let recs = vec![
            rec(1, "genre_based", false),
            rec(2, "genre_based", false),
            rec(3, "popularity_fallback", true),
        ];

        logger.log_recommendation_batch(&recs, &ctx, 42).unwrap();

        let events: Vec<FeedbackEvent> = read_lines(logger.path()).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            FeedbackEvent::RecommendationBatch {
                request_id,
                strategy_distribution,
                fallback_strategy,
                recommendation_count,
                context_summary,
                ..
            } => {
                assert_eq!(request_id, "req-1");
                assert_eq!(strategy_distribution["genre_based"], 2);
                assert_eq!(fallback_strategy.as_deref(), Some("popularity_fallback"));
                assert_eq!(*recommendation_count, 3);
                assert_eq!(context_summary.genre_ids, vec![28]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_curated_batch_logs_set_names() {
        let dir = TempDir::new().unwrap();
        let logger = FeedbackLogger::open(dir.path());

        let mut curated = rec(5, "curated_fallback", true);
        curated.metadata = RecommendationMetadata {
            curated_set: Some("Staff Picks".to_string()),
            ..Default::default()
        };

        logger
            .log_recommendation_batch(&[curated], &RecommendationContext::new(), 3)
            .unwrap();

        let events: Vec<FeedbackEvent> = read_lines(logger.path()).unwrap();
        assert_eq!(events.len(), 2);
        match &events[1] {
            FeedbackEvent::CuratedFallbackUsed {
                curated_sets,
                request_id,
                ..
            } => {
                assert_eq!(curated_sets, &vec!["Staff Picks".to_string()]);
                assert_eq!(request_id, "unknown");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_type_tag_is_written() {
        let dir = TempDir::new().unwrap();
        let logger = FeedbackLogger::open(dir.path());
        logger
            .log_fallback_activation("mood_fallback", &RecommendationContext::new(), "no primaries")
            .unwrap();

        let raw = std::fs::read_to_string(logger.path()).unwrap();
        assert!(raw.contains(r#""event_type":"fallback_activation""#));
    }
}
