//! The RecommendationPipeline orchestrates primary and fallback strategies.
//!
//! ## Algorithm
//! 1. Fill request defaults (`limit = 10`, `enable_diversity = true`)
//! 2. Run primaries in insertion order, weighting and stamping results, until
//!    at least `limit` distinct movies have accumulated
//! 3. If the list is empty, short, or `force_fallback` is set, walk the
//!    fallback chain by priority; the first active fallback with results is
//!    used and the walk stops
//! 4. Deduplicate by movie (highest score wins), sort descending, diversify
//!    if enabled and installed, truncate to `limit`
//!
//! Strategy failures are logged and count as zero results.

use crate::error::{PipelineError, Result};
use crate::traits::{DEFAULT_DIVERSITY_FACTOR, Diversifier};
use catalog::MovieId;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use strategies::{FallbackStrategy, Recommendation, RecommendationContext, Strategy};
use tracing::{debug, error, info, warn};

/// Weight applied to fallback results when none is given
pub const DEFAULT_FALLBACK_WEIGHT: f32 = 0.5;

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineRun {
    pub recommendations: Vec<Recommendation>,
    /// Strategies that contributed results, in execution order
    pub strategies_used: Vec<String>,
    /// The fallback whose results were appended, if any
    pub fallback_strategy: Option<String>,
}

impl PipelineRun {
    pub fn fallback_used(&self) -> bool {
        self.fallback_strategy.is_some()
    }

    /// Number of distinct movies accumulated so far
    pub fn distinct_count(&self) -> usize {
        self.recommendations
            .iter()
            .map(|r| r.content_id)
            .collect::<HashSet<MovieId>>()
            .len()
    }
}

/// Chains weighted primary strategies with a priority-ordered fallback chain.
///
/// ## Usage
/// ```ignore
/// let pipeline = RecommendationPipeline::new()
///     .add_primary_strategy(Arc::new(ContentBasedStrategy::new(catalog.clone(), provider.clone())), 1.0)?
///     .add_primary_strategy(Arc::new(GenreStrategy::new(catalog.clone(), provider.clone())), 0.9)?
///     .add_fallback_strategy(Arc::new(PopularityFallback::new(provider.clone())), DEFAULT_FALLBACK_WEIGHT)?;
///
/// let recs = pipeline.run(&context).await;
/// ```
#[derive(Default)]
pub struct RecommendationPipeline {
    primaries: Vec<(Arc<dyn Strategy>, f32)>,
    fallbacks: Vec<(Arc<dyn FallbackStrategy>, f32)>,
    diversifier: Option<Arc<dyn Diversifier>>,
}

fn validate_weight(strategy: &str, weight: f32) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidWeight {
            strategy: strategy.to_string(),
            weight,
        })
    }
}

fn stamp(recs: &mut [Recommendation], name: &str, weight: f32, is_fallback: bool) {
    for rec in recs {
        rec.score *= weight;
        rec.source_strategy = name.to_string();
        rec.is_fallback = is_fallback;
    }
}

impl RecommendationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a weighted primary strategy (builder pattern)
    ///
    /// # Returns
    /// `PipelineError::InvalidWeight` when `weight` is not positive
    pub fn add_primary_strategy(mut self, strategy: Arc<dyn Strategy>, weight: f32) -> Result<Self> {
        validate_weight(strategy.name(), weight)?;
        debug!(
            strategy = strategy.name(),
            weight,
            total = self.primaries.len() + 1,
            "Added primary strategy"
        );
        self.primaries.push((strategy, weight));
        Ok(self)
    }

    /// Add a weighted fallback strategy, keeping the chain sorted by priority
    ///
    /// Strategies with equal priority keep their insertion order.
    pub fn add_fallback_strategy(
        mut self,
        strategy: Arc<dyn FallbackStrategy>,
        weight: f32,
    ) -> Result<Self> {
        validate_weight(strategy.name(), weight)?;
        debug!(
            strategy = strategy.name(),
            priority = strategy.priority(),
            weight,
            "Added fallback strategy"
        );
        self.fallbacks.push((strategy, weight));
        self.fallbacks.sort_by_key(|(s, _)| s.priority());
        Ok(self)
    }

    /// Install the diversity module
    pub fn with_diversifier(mut self, diversifier: Arc<dyn Diversifier>) -> Self {
        self.diversifier = Some(diversifier);
        self
    }

    /// True when at least one strategy of either kind is configured
    pub fn is_ready(&self) -> bool {
        !self.primaries.is_empty() || !self.fallbacks.is_empty()
    }

    /// Fallback names in the order they will be tried
    pub fn fallback_order(&self) -> Vec<&str> {
        self.fallbacks.iter().map(|(s, _)| s.name()).collect()
    }

    /// Run the pipeline and return the final recommendation list
    pub async fn run(&self, context: &RecommendationContext) -> Vec<Recommendation> {
        self.run_detailed(context).await.recommendations
    }

    /// Run the pipeline, also reporting which strategies contributed
    pub async fn run_detailed(&self, context: &RecommendationContext) -> PipelineRun {
        if !self.is_ready() {
            warn!("Pipeline has no strategies configured");
            return PipelineRun::default();
        }

        let context = context.with_defaults();
        let limit = context.limit();
        let mut run = PipelineRun::default();

        self.execute_primaries(&context, &mut run).await;

        if run.recommendations.is_empty() || run.distinct_count() < limit || context.force_fallback
        {
            self.execute_fallbacks(&context, &mut run).await;
        }

        run.recommendations = self.post_process(run.recommendations, &context);
        info!(
            count = run.recommendations.len(),
            strategies = ?run.strategies_used,
            fallback = ?run.fallback_strategy,
            "Pipeline run complete"
        );
        run
    }

    async fn execute_primaries(&self, context: &RecommendationContext, run: &mut PipelineRun) {
        let limit = context.limit();

        for (strategy, weight) in &self.primaries {
            let mut results = match strategy.execute(context).await {
                Ok(results) => results,
                Err(e) => {
                    error!(strategy = strategy.name(), error = %e, "Primary strategy failed");
                    continue;
                }
            };
            if results.is_empty() {
                debug!(strategy = strategy.name(), "Primary strategy returned nothing");
                continue;
            }

            stamp(&mut results, strategy.name(), *weight, false);
            debug!(
                strategy = strategy.name(),
                weight,
                count = results.len(),
                "Primary strategy returned recommendations"
            );
            run.recommendations.extend(results);
            run.strategies_used.push(strategy.name().to_string());

            if run.distinct_count() >= limit {
                break;
            }
        }
    }

    async fn execute_fallbacks(&self, context: &RecommendationContext, run: &mut PipelineRun) {
        let mut context = context.clone();
        context.fallback_required = true;

        for (fallback, weight) in &self.fallbacks {
            if !fallback.should_activate(&context) {
                continue;
            }

            match fallback.execute(&context).await {
                Ok(mut results) if !results.is_empty() => {
                    stamp(&mut results, fallback.name(), *weight, true);
                    info!(
                        fallback = fallback.name(),
                        priority = fallback.priority(),
                        weight,
                        count = results.len(),
                        "Activated fallback"
                    );
                    run.recommendations.extend(results);
                    run.strategies_used.push(fallback.name().to_string());
                    run.fallback_strategy = Some(fallback.name().to_string());
                    return;
                }
                Ok(_) => debug!(fallback = fallback.name(), "Fallback returned nothing"),
                Err(e) => error!(fallback = fallback.name(), error = %e, "Fallback failed"),
            }
        }
    }

    fn post_process(
        &self,
        recommendations: Vec<Recommendation>,
        context: &RecommendationContext,
    ) -> Vec<Recommendation> {
        if recommendations.is_empty() {
            return Vec::new();
        }

        let mut recs = dedup_keep_best(recommendations);
        sort_by_score(&mut recs);

        if context.enable_diversity() {
            if let Some(diversifier) = &self.diversifier {
                let factor = context.diversity_factor.unwrap_or(DEFAULT_DIVERSITY_FACTOR);
                match diversifier.diversify(&recs, factor) {
                    Ok(diversified) => recs = diversified,
                    Err(e) => error!(
                        diversifier = diversifier.name(),
                        error = %e,
                        "Diversity application failed"
                    ),
                }
            }
        }

        recs.truncate(context.limit());
        recs
    }
}

/// Keep one entry per movie, the highest-scoring one (first seen on ties),
/// preserving first-appearance order
pub fn dedup_keep_best(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut position: HashMap<MovieId, usize> = HashMap::new();
    let mut unique: Vec<Recommendation> = Vec::with_capacity(recommendations.len());

    for rec in recommendations {
        match position.get(&rec.content_id) {
            Some(&i) => {
                if rec.score > unique[i].score {
                    unique[i] = rec;
                }
            }
            None => {
                position.insert(rec.content_id, unique.len());
                unique.push(rec);
            }
        }
    }
    unique
}

/// Stable descending sort; NaN scores compare equal
pub fn sort_by_score(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: MovieId, score: f32) -> Recommendation {
        Recommendation::new(id, format!("Movie {}", id), score, "test")
    }

    #[test]
    fn test_dedup_keeps_highest() {
        let recs = vec![rec(1, 0.4), rec(2, 0.9), rec(1, 0.7), rec(2, 0.1)];
        let unique = dedup_keep_best(recs);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].content_id, 1);
        assert_eq!(unique[0].score, 0.7);
        assert_eq!(unique[1].score, 0.9);
    }

    #[test]
    fn test_sort_is_stable_and_nan_tolerant() {
        let mut recs = vec![rec(1, 0.5), rec(2, f32::NAN), rec(3, 0.9), rec(4, 0.5)];
        sort_by_score(&mut recs);

        assert_eq!(recs[0].content_id, 3);
        let ones: Vec<MovieId> = recs
            .iter()
            .filter(|r| r.score == 0.5)
            .map(|r| r.content_id)
            .collect();
        assert_eq!(ones, vec![1, 4]);
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight("x", 0.5).is_ok());
        assert!(validate_weight("x", 0.0).is_err());
        assert!(validate_weight("x", -1.0).is_err());
        assert!(validate_weight("x", f32::NAN).is_err());
    }

    #[tokio::test]
    async fn test_empty_pipeline_returns_nothing() {
        let pipeline = RecommendationPipeline::new();
        assert!(!pipeline.is_ready());

        let run = pipeline.run_detailed(&RecommendationContext::new()).await;
        assert!(run.recommendations.is_empty());
        assert!(!run.fallback_used());
    }
}
