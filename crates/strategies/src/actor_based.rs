//! Actor Similarity Strategy
//!
//! "You like these actors, here is what actors like them starred in."
//!
//! ## Algorithm
//! 1. For each preferred actor, take the top 5 neighbours from the
//!    precomputed similarity graph
//! 2. Collect their filmographies from the provider (first-seen order, unique)
//! 3. Keep the first `limit` movies and decorate them with full details
//! 4. Every match scores a flat 0.7

use crate::lookup::fetch_movie;
use crate::traits::Strategy;
use crate::types::{Recommendation, RecommendationContext, RecommendationMetadata};
use anyhow::Result;
use async_trait::async_trait;
use catalog::{CatalogIndex, MovieId, MovieProvider, PersonId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const ACTOR_MATCH_SCORE: f32 = 0.7;

pub struct ActorSimilarityStrategy {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
    /// Neighbours considered per preferred actor
    similar_per_actor: usize,
}

impl ActorSimilarityStrategy {
    pub fn new(catalog: Arc<CatalogIndex>, provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            catalog,
            provider,
            similar_per_actor: 5,
        }
    }

    /// Configure neighbours per actor (default: 5)
    pub fn with_similar_per_actor(mut self, n: usize) -> Self {
        self.similar_per_actor = n;
        self
    }

    async fn candidate_movies(&self, actors: &[PersonId], limit: usize) -> Vec<MovieId> {
        let mut seen = HashSet::new();
        let mut movies = Vec::new();

        'actors: for &actor in actors {
            for similar in self.catalog.similar_actors(actor).iter().take(self.similar_per_actor) {
                let films = match self.provider.person_filmography(similar.actor_id).await {
                    Ok(films) => films,
                    Err(e) => {
                        warn!(actor = similar.actor_id, error = %e, "Filmography lookup failed");
                        continue;
                    }
                };
                for film in films {
                    if seen.insert(film.id) {
                        movies.push(film.id);
                        if movies.len() >= limit {
                            break 'actors;
                        }
                    }
                }
            }
        }
        movies
    }
}

#[async_trait]
impl Strategy for ActorSimilarityStrategy {
    fn name(&self) -> &str {
        "actor_based"
    }

    #[instrument(skip(self, context), fields(actors = ?context.preferred_actors))]
    async fn execute(&self, context: &RecommendationContext) -> Result<Vec<Recommendation>> {
        if context.preferred_actors.is_empty() {
            return Ok(Vec::new());
        }

        let movie_ids = self
            .candidate_movies(&context.preferred_actors, context.limit())
            .await;
        debug!(count = movie_ids.len(), "Collected actor candidates");

        let mut recommendations = Vec::with_capacity(movie_ids.len());
        for movie_id in movie_ids {
            let (title, mut metadata) = match fetch_movie(self.provider.as_ref(), movie_id).await
            {
                Ok(movie) => (movie.title.clone(), RecommendationMetadata::from_movie(&movie)),
                Err(error) => (
                    format!("Movie {}", movie_id),
                    RecommendationMetadata {
                        error: Some(error),
                        ..Default::default()
                    },
                ),
            };
            metadata.match_type = Some("actor".to_string());

            recommendations.push(
                Recommendation::new(
                    movie_id,
                    title,
                    ACTOR_MATCH_SCORE,
                    "Recommended because you like similar actors",
                )
                .with_metadata(metadata),
            );
        }
        Ok(recommendations)
    }
}
