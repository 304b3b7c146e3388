//! # Strategies Crate
//!
//! Recommendation strategies for MoviePulse.
//!
//! ## Components
//!
//! ### Primary strategies
//! - **content_based**: embedding cosine similarity to a target movie
//! - **genre_based**: share of requested genres a movie carries
//! - **mood_based**: mood -> genres, weighted by the mood's multiplier
//! - **actor_based**: filmographies of actors similar to the user's favourites
//!
//! ### Fallback strategies
//! Genre compatibility, mood compatibility, actor similarity, global
//! popularity and curated sets, tried in that order (see `fallback`).
//!
//! ## Example Usage
//!
//! ```ignore
//! use strategies::{ContentBasedStrategy, RecommendationContext, Strategy};
//! use catalog::CatalogIndex;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(CatalogIndex::load_from_dir("static_data".as_ref())?);
//! let strategy = ContentBasedStrategy::new(catalog.clone(), catalog.clone());
//!
//! let ctx = RecommendationContext::new().with_target_movie(603).with_limit(5);
//! let recs = strategy.execute(&ctx).await?;
//! ```

pub mod actor_based;
pub mod content_based;
pub mod contextual;
pub mod fallback;
mod lookup;
pub mod similarity;
pub mod traits;
pub mod types;

pub use actor_based::ActorSimilarityStrategy;
pub use content_based::ContentBasedStrategy;
pub use contextual::{GenreStrategy, MoodStrategy};
pub use fallback::{
    ActorFallback, CuratedFallback, GenreCompatibilityFallback, MoodCompatibilityFallback,
    PopularityFallback,
};
pub use traits::{FallbackStrategy, Strategy};
pub use types::{
    DEFAULT_LIMIT, DEFAULT_MIN_SIMILARITY, Recommendation, RecommendationContext,
    RecommendationMetadata,
};
