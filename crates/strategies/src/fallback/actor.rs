//! Actor similarity fallback: the filmographies of the top 3 actors similar
//! to each preferred actor.

use super::from_summary;
use crate::traits::{FallbackStrategy, Strategy};
use crate::types::{Recommendation, RecommendationContext};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, MovieProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, warn};

const SCORE: f32 = 0.75;
const SIMILAR_PER_ACTOR: usize = 3;

pub struct ActorFallback {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
}

impl ActorFallback {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self { catalog, provider }
    }
}

#[async_trait]
impl Strategy for ActorFallback {
    fn name(&self) -> &str {
        "actor_fallback"
    }

    #[instrument(skip(self, context), fields(actors = ?context.preferred_actors))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        let limit = context.limit();
        let mut seen = HashSet::new();
        let mut recs = Vec::new();

        for &actor in &context.preferred_actors {
            for similar in self.catalog.similar_actors(actor).iter().take(SIMILAR_PER_ACTOR) {
                if recs.len() >= limit {
                    return Ok(recs);
                }
                let films = match self.provider.person_filmography(similar.actor_id).await {
                    Ok(films) => films,
                    Err(e) => {
                        warn!(actor = similar.actor_id, error = %e, "Filmography lookup failed");
                        continue;
                    }
                };
                for film in films.iter().filter(|f| seen.insert(f.id)) {
                    if recs.len() >= limit {
                        break;
                    }
                    recs.push(from_summary(film, SCORE, "Based on similar actors"));
                }
            }
        }
        Ok(recs)
    }
}

impl FallbackStrategy for ActorFallback {
    fn priority(&self) -> u32 {
        3
    }

    fn should_activate(&self, context: &RecommendationContext) -> bool {
        !context.preferred_actors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_catalog;

    #[tokio::test]
    async fn test_actor_fallback() {
        let catalog = Arc::new(sample_catalog());
        let fb = ActorFallback::new(catalog.clone(), catalog);

        let ctx = RecommendationContext::new().with_actors(vec![1158]);
        assert!(fb.should_activate(&ctx));

        let recs = fb.execute(&ctx).await.unwrap();
        let ids: Vec<u32> = recs.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert!(recs.iter().all(|r| r.score == 0.75));
        assert_eq!(recs[0].reason, "Based on similar actors");
    }

    #[tokio::test]
    async fn test_actor_fallback_without_graph_entry() {
        let catalog = Arc::new(sample_catalog());
        let fb = ActorFallback::new(catalog.clone(), catalog);

        let ctx = RecommendationContext::new().with_actors(vec![424242]);
        assert!(fb.should_activate(&ctx));
        assert!(fb.execute(&ctx).await.unwrap().is_empty());
        assert!(!fb.should_activate(&RecommendationContext::new()));
    }
}
