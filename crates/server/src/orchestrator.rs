//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request end to end:
//! 1. Assign a request id
//! 2. Load the user's profile and watch history, if a user is given
//! 3. Personalize strategy weights from the history's genre affinity
//! 4. Build the pipeline with those weights and run it
//! 5. Apply profile likes/dislikes and label favourite-genre matches
//! 6. Log the served batch to the analytics file
//!
//! User-data failures degrade the request (no personalization, no
//! analytics) rather than failing it.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use catalog::{CatalogIndex, MovieId, MovieProvider};
use pipeline::{
    Diversifier, GenreAffinityModel, PersonalizationConfig, RecommendationPipeline, ScoreAdjuster,
    StrategyWeights, label_favorite_genres, top_genres,
};
use strategies::*;
use tmdb_client::TmdbClient;
use user_data::{
    FeedbackLogger, ProfileStore, SOURCE_ORGANIC, UNKNOWN_GENRE, UserProfile, WatchEntry,
    WatchHistory, Watchlist,
};

use crate::settings::Settings;

/// Favourite genres considered for labels
const FAVORITE_GENRES: usize = 3;

/// Summary of how a response was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub request_id: String,
    pub strategies_used: Vec<String>,
    pub recommendation_count: usize,
    pub fallback_used: bool,
    pub fallback_strategy: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub metadata: ResponseMetadata,
}

/// Per-user inputs gathered before the pipeline runs
#[derive(Debug, Default)]
struct UserSignals {
    weights: StrategyWeights,
    favorites: Vec<String>,
    profile: UserProfile,
}

/// Wires the catalog, the movie provider and the user stores together
pub struct RecommendationOrchestrator {
    catalog: Arc<CatalogIndex>,
    provider: Arc<dyn MovieProvider>,
    history: WatchHistory,
    profiles: ProfileStore,
    watchlist: Watchlist,
    feedback: FeedbackLogger,
    affinity_model: GenreAffinityModel,
    base_weights: StrategyWeights,
    personalization: PersonalizationConfig,
    diversifier: Option<Arc<dyn Diversifier>>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over an already loaded catalog and provider
    ///
    /// # Arguments
    /// * `catalog` - Static data (embeddings, rules, mood map, curated sets)
    /// * `provider` - Movie metadata source, TMDB or the catalog itself
    /// * `user_data_dir` - Directory of the per-user flat files
    pub fn new(
        catalog: Arc<CatalogIndex>,
        provider: Arc<dyn MovieProvider>,
        user_data_dir: &Path,
    ) -> Self {
        let affinity_model = GenreAffinityModel::from_catalog(&catalog);
        Self {
            catalog,
            provider,
            history: WatchHistory::open(user_data_dir),
            profiles: ProfileStore::open(user_data_dir),
            watchlist: Watchlist::open(user_data_dir),
            feedback: FeedbackLogger::open(user_data_dir),
            affinity_model,
            base_weights: StrategyWeights::default(),
            personalization: PersonalizationConfig::default(),
            diversifier: None,
        }
    }

    /// Load the catalog and choose a provider from settings
    ///
    /// TMDB is used when an API key is configured; otherwise the offline
    /// catalog serves movie metadata too.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        info!(data_dir = %settings.data_dir.display(), "Loading catalog");
        let catalog = CatalogIndex::load_from_dir(&settings.data_dir)
            .with_context(|| format!("Failed to load catalog from {}", settings.data_dir.display()))?;
        catalog.validate().context("Catalog validation failed")?;
        let catalog = Arc::new(catalog);

        let provider: Arc<dyn MovieProvider> = match settings.tmdb_config() {
            Some(config) => {
                Arc::new(TmdbClient::new(config).context("Failed to build TMDB client")?)
            }
            None => {
                warn!("TMDB_API_KEY not set, serving metadata from the offline catalog");
                catalog.clone()
            }
        };
        info!(provider = provider.name(), "Movie provider ready");

        let mut orchestrator = Self::new(catalog, provider, &settings.user_data_dir)
            .with_personalization(
                PersonalizationConfig::default().with_min_history(settings.min_history),
            );

        if orchestrator.affinity_model.known_genres().is_empty() {
            match orchestrator.provider.genres().await {
                Ok(genres) => {
                    orchestrator.affinity_model =
                        GenreAffinityModel::new(genres.iter().map(|g| g.name.as_str()));
                }
                Err(e) => warn!(error = %e, "Could not fetch genre list, affinity disabled"),
            }
        }

        Ok(orchestrator)
    }

    pub fn with_weights(mut self, weights: StrategyWeights) -> Self {
        self.base_weights = weights;
        self
    }

    pub fn with_personalization(mut self, config: PersonalizationConfig) -> Self {
        self.personalization = config;
        self
    }

    pub fn with_diversifier(mut self, diversifier: Arc<dyn Diversifier>) -> Self {
        self.diversifier = Some(diversifier);
        self
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    pub fn provider(&self) -> &Arc<dyn MovieProvider> {
        &self.provider
    }

    pub fn watch_history(&self) -> &WatchHistory {
        &self.history
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    /// Assemble the full strategy pipeline with the given weights
    pub fn build_pipeline(&self, weights: &StrategyWeights) -> Result<RecommendationPipeline> {
        let catalog = &self.catalog;
        let provider = &self.provider;

        let mut pipeline = RecommendationPipeline::new()
            .add_primary_strategy(
                Arc::new(ContentBasedStrategy::new(catalog.clone(), provider.clone())),
                weights.content_based,
            )?
            .add_primary_strategy(
                Arc::new(GenreStrategy::new(catalog.clone(), provider.clone())),
                weights.genre_based,
            )?
            .add_primary_strategy(
                Arc::new(MoodStrategy::new(catalog.clone(), provider.clone())),
                weights.mood_based,
            )?
            .add_primary_strategy(
                Arc::new(ActorSimilarityStrategy::new(catalog.clone(), provider.clone())),
                weights.actor_based,
            )?
            .add_fallback_strategy(
                Arc::new(GenreCompatibilityFallback::new(catalog.clone(), provider.clone())),
                weights.fallback,
            )?
            .add_fallback_strategy(
                Arc::new(MoodCompatibilityFallback::new(catalog.clone(), provider.clone())),
                weights.fallback,
            )?
            .add_fallback_strategy(
                Arc::new(ActorFallback::new(catalog.clone(), provider.clone())),
                weights.fallback,
            )?
            .add_fallback_strategy(
                Arc::new(PopularityFallback::new(provider.clone())),
                weights.fallback,
            )?
            .add_fallback_strategy(Arc::new(CuratedFallback::new(catalog.clone())), weights.fallback)?;

        if let Some(diversifier) = &self.diversifier {
            pipeline = pipeline.with_diversifier(diversifier.clone());
        }
        Ok(pipeline)
    }

    /// Main entry point: recommendations for one request
    ///
    /// # Returns
    /// The recommendations plus a summary of how they were produced. Only a
    /// misconfigured weight set is an error; strategy and store failures
    /// are logged and degrade the result.
    #[instrument(skip(self, context), fields(user = ?context.user_id))]
    pub async fn get_recommendations(
        &self,
        mut context: RecommendationContext,
    ) -> Result<RecommendationResponse> {
        let start_time = Instant::now();

        let request_id = context
            .request_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let signals = match context.user_id.clone() {
            Some(user_id) => self.user_signals(&user_id),
            None => UserSignals {
                weights: self.base_weights,
                ..Default::default()
            },
        };
        apply_profile_defaults(&mut context, &signals.profile);

        let pipeline = self.build_pipeline(&signals.weights)?;
        let run = pipeline.run_detailed(&context).await;
        let mut recommendations = run.recommendations;

        if context.user_id.is_some() {
            self.fill_missing_genres(&mut recommendations);
            ScoreAdjuster::new(
                &signals.profile.preferred_genres,
                &signals.profile.disliked_genres,
            )
            .adjust(&mut recommendations);
            label_favorite_genres(&mut recommendations, &signals.favorites);
        }

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        self.log_feedback(&recommendations, &context, run.fallback_strategy.as_deref(), elapsed_ms);

        info!(
            %request_id,
            count = recommendations.len(),
            fallback = ?run.fallback_strategy,
            elapsed_ms,
            "Served recommendations"
        );

        Ok(RecommendationResponse {
            metadata: ResponseMetadata {
                request_id,
                strategies_used: run.strategies_used,
                recommendation_count: recommendations.len(),
                fallback_used: run.fallback_strategy.is_some(),
                fallback_strategy: run.fallback_strategy,
                elapsed_ms,
            },
            recommendations,
        })
    }

    /// Weights, favourite genres and profile for a user
    fn user_signals(&self, user_id: &str) -> UserSignals {
        let history = self.history.genre_history(user_id).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "Could not read watch history");
            Vec::new()
        });
        let profile = self.profiles.load(user_id).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "Could not read profile");
            UserProfile::default()
        });

        let affinity = self.affinity_model.preference_vector(&history);
        let weights = self
            .base_weights
            .personalized(&affinity, history.len(), &self.personalization);
        let favorites = top_genres(&affinity, FAVORITE_GENRES)
            .into_iter()
            .map(|(genre, _)| genre)
            .collect();

        UserSignals {
            weights,
            favorites,
            profile,
        }
    }

    /// Fill genre names from the catalog where a strategy left them empty
    fn fill_missing_genres(&self, recommendations: &mut [Recommendation]) {
        for rec in recommendations.iter_mut() {
            if rec.metadata.genres.is_empty() {
                rec.metadata.genres = self
                    .catalog
                    .movie_genre_ids(rec.content_id)
                    .into_iter()
                    .filter_map(|id| self.catalog.genre_name(id).map(str::to_string))
                    .collect();
            }
        }
    }

    fn log_feedback(
        &self,
        recommendations: &[Recommendation],
        context: &RecommendationContext,
        fallback: Option<&str>,
        elapsed_ms: u64,
    ) {
        if let Some(strategy) = fallback {
            let reason = if context.force_fallback {
                "fallback forced by request".to_string()
            } else {
                "primary strategies returned too few results".to_string()
            };
            if let Err(e) = self.feedback.log_fallback_activation(strategy, context, &reason) {
                warn!(error = %e, "Failed to log fallback activation");
            }
        }
        if let Err(e) = self
            .feedback
            .log_recommendation_batch(recommendations, context, elapsed_ms)
        {
            warn!(error = %e, "Failed to log recommendation batch");
        }
    }

    /// Record that a user watched a movie and refresh their affinity summary
    ///
    /// Genres are resolved through the provider; `unknown` is recorded when
    /// the movie cannot be found or the lookup fails.
    pub async fn record_watch(&self, user_id: &str, movie_id: MovieId) -> Result<WatchEntry> {
        let genres = match self.provider.movie_details(movie_id).await {
            Ok(Some(movie)) if !movie.genres.is_empty() => movie
                .genres
                .iter()
                .map(|g| g.name.to_lowercase())
                .collect(),
            Ok(_) => vec![UNKNOWN_GENRE.to_string()],
            Err(e) => {
                warn!(movie_id, error = %e, "Genre lookup failed");
                vec![UNKNOWN_GENRE.to_string()]
            }
        };

        let entry = self
            .history
            .add_entry(user_id, movie_id, genres, SOURCE_ORGANIC)
            .context("Failed to record watch")?;
        self.history
            .update_affinity(user_id)
            .context("Failed to update affinity")?;
        Ok(entry)
    }

    /// Add a movie to a user's watchlist, resolving its title
    pub async fn add_to_watchlist(&self, user_id: &str, movie_id: MovieId) -> Result<bool> {
        let title = match self.provider.movie_details(movie_id).await {
            Ok(Some(movie)) => movie.title,
            Ok(None) => format!("Movie {}", movie_id),
            Err(e) => {
                warn!(movie_id, error = %e, "Title lookup failed");
                format!("Movie {}", movie_id)
            }
        };
        self.watchlist
            .add(user_id, movie_id, &title)
            .context("Failed to update watchlist")
    }
}

/// Use the profile's stored actors and first mood when the request has none
fn apply_profile_defaults(context: &mut RecommendationContext, profile: &UserProfile) {
    if context.preferred_actors.is_empty() && !profile.preferred_actors.is_empty() {
        context.preferred_actors = profile.preferred_actors.clone();
    }
    if context.mood.is_none() {
        context.mood = profile.selected_moods.first().cloned();
    }
}
