//! Recommendation pipeline for MoviePulse.
//!
//! This crate provides:
//! - `RecommendationPipeline`, chaining weighted primary strategies with a
//!   priority-ordered fallback chain
//! - The `Diversifier` seam applied before truncation
//! - Personalization: affinity vectors, weight boosts and profile-based
//!   score adjustment
//!
//! ## Architecture
//! A request flows through the pipeline in stages:
//! 1. Primary strategies contribute weighted recommendations
//! 2. If too few arrive, the first fallback with results tops the list up
//! 3. Results are deduplicated, sorted, optionally diversified and truncated
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{RecommendationPipeline, StrategyWeights};
//! use strategies::*;
//!
//! let weights = StrategyWeights::default();
//! let pipeline = RecommendationPipeline::new()
//!     .add_primary_strategy(Arc::new(ContentBasedStrategy::new(catalog.clone(), provider.clone())), weights.content_based)?
//!     .add_fallback_strategy(Arc::new(PopularityFallback::new(provider.clone())), weights.fallback)?;
//!
//! let recs = pipeline.run(&RecommendationContext::new().with_target_movie(603)).await;
//! ```

pub mod error;
pub mod personalization;
pub mod recommendation_pipeline;
pub mod traits;

pub use error::{PipelineError, Result};
pub use personalization::{
    AffinityVector, GenreAffinityModel, PersonalizationConfig, ScoreAdjuster, StrategyWeights,
    label_favorite_genres, top_genres,
};
pub use recommendation_pipeline::{
    DEFAULT_FALLBACK_WEIGHT, PipelineRun, RecommendationPipeline, dedup_keep_best, sort_by_score,
};
pub use traits::{DEFAULT_DIVERSITY_FACTOR, Diversifier};
