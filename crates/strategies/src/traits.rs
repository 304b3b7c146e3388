//! Core traits for recommendation strategies.
//!
//! A `Strategy` turns a request context into scored recommendations. A
//! `FallbackStrategy` is a strategy that also knows its place in the backup
//! chain and when it is worth trying.

use crate::types::{Recommendation, RecommendationContext};
use anyhow::Result;
use async_trait::async_trait;

/// Pluggable scoring function with a common interface.
///
/// `Send + Sync` so strategies can be shared behind `Arc` across requests.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Unique identifier, stamped on results as `source_strategy`
    fn name(&self) -> &str;

    /// Produce recommendations for a request.
    ///
    /// # Arguments
    /// * `context` - Request parameters
    ///
    /// # Returns
    /// * `Ok(Vec<Recommendation>)` - Possibly empty results, unweighted
    /// * `Err` - Any failure; the pipeline logs it and treats it as no results
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>>;
}

/// A strategy in the ordered backup chain
pub trait FallbackStrategy: Strategy {
    /// Lower runs earlier
    fn priority(&self) -> u32;

    /// Whether the request carries what this fallback needs
    fn should_activate(&self, context: &RecommendationContext) -> bool;
}
