//! Extension points of the pipeline.

use anyhow::Result;
use strategies::Recommendation;

/// Default strength passed to a diversifier when the request sets none
pub const DEFAULT_DIVERSITY_FACTOR: f32 = 0.3;

/// Re-ranks a sorted recommendation list to spread it across clusters.
///
/// The pipeline calls this after sorting and before truncation. A failure is
/// logged and the undiversified list is kept.
pub trait Diversifier: Send + Sync {
    fn name(&self) -> &str;

    /// # Arguments
    /// * `recommendations` - Sorted by descending score
    /// * `factor` - Diversity strength, 0.0 leaves the order untouched
    fn diversify(
        &self,
        recommendations: &[Recommendation],
        factor: f32,
    ) -> Result<Vec<Recommendation>>;
}
