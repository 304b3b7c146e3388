//! Request and result types shared by every strategy.

use catalog::{GenreId, Movie, MovieId, PersonId};
use serde::{Deserialize, Serialize};

/// Default number of recommendations per request
pub const DEFAULT_LIMIT: usize = 10;

/// Default cosine similarity threshold for content-based matches
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.3;

/// Quality score assumed when the caller does not provide one
pub const DEFAULT_QUALITY_SCORE: f32 = 1.0;

/// The request parameter bag passed through the pipeline
///
/// Every field is optional; accessors fill in defaults so strategies never
/// have to agree on them individually.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Seed movie for content-based similarity
    #[serde(default)]
    pub target_movie_id: Option<MovieId>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub preferred_actors: Vec<PersonId>,
    /// Genre name used to pick a curated set
    #[serde(default)]
    pub preferred_genre: Option<String>,
    /// Genre restriction for the popularity fallback
    #[serde(default)]
    pub genre_filter: Option<GenreId>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_similarity: Option<f32>,
    #[serde(default)]
    pub enable_diversity: Option<bool>,
    #[serde(default)]
    pub diversity_factor: Option<f32>,
    /// Walk the fallback chain even when primaries filled the list
    #[serde(default)]
    pub force_fallback: bool,
    /// Set by the pipeline once the fallback chain is entered
    #[serde(default)]
    pub fallback_required: bool,
    /// Caller's estimate of primary result quality (0..1)
    #[serde(default)]
    pub quality_score: Option<f32>,
}

impl RecommendationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_target_movie(mut self, movie_id: MovieId) -> Self {
        self.target_movie_id = Some(movie_id);
        self
    }

    pub fn with_genres(mut self, genre_ids: Vec<GenreId>) -> Self {
        self.genre_ids = genre_ids;
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_actors(mut self, actors: Vec<PersonId>) -> Self {
        self.preferred_actors = actors;
        self
    }

    pub fn with_preferred_genre(mut self, genre: impl Into<String>) -> Self {
        self.preferred_genre = Some(genre.into());
        self
    }

    pub fn with_genre_filter(mut self, genre: GenreId) -> Self {
        self.genre_filter = Some(genre);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = Some(min_similarity);
        self
    }

    pub fn with_diversity(mut self, enabled: bool) -> Self {
        self.enable_diversity = Some(enabled);
        self
    }

    pub fn with_force_fallback(mut self, force: bool) -> Self {
        self.force_fallback = force;
        self
    }

    pub fn with_quality_score(mut self, quality_score: f32) -> Self {
        self.quality_score = Some(quality_score);
        self
    }

    /// Copy of this context with `limit` and `enable_diversity` filled in
    pub fn with_defaults(&self) -> Self {
        let mut ctx = self.clone();
        ctx.limit.get_or_insert(DEFAULT_LIMIT);
        ctx.enable_diversity.get_or_insert(true);
        ctx
    }

    // Default-filling accessors

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn enable_diversity(&self) -> bool {
        self.enable_diversity.unwrap_or(true)
    }

    pub fn quality_score(&self) -> f32 {
        self.quality_score.unwrap_or(DEFAULT_QUALITY_SCORE)
    }

    /// Trimmed, lower-cased mood; `None` when absent or blank
    pub fn normalized_mood(&self) -> Option<String> {
        self.mood
            .as_deref()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
    }
}

/// Display and provenance data attached to a recommendation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// Top-billed actors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Raw genre overlap ratio before weighting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curated_genre: Option<String>,
    /// Personalised explanation added after ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_label: Option<String>,
    /// Why display data is missing, when a lookup failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendationMetadata {
    /// Display fields taken from a full movie record
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            genres: movie.genre_names(),
            actors: movie.top_cast_names(3),
            poster_url: movie.poster_url(),
            backdrop_url: movie.backdrop_url(),
            year: movie.year(),
            ..Default::default()
        }
    }
}

/// A single scored suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub content_id: MovieId,
    pub title: String,
    /// Nominally in [0, 1]; weighting may push it higher
    pub score: f32,
    pub reason: String,
    /// Stamped by the pipeline with the producing strategy's name
    #[serde(default)]
    pub source_strategy: String,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub metadata: RecommendationMetadata,
}

impl Recommendation {
    pub fn new(
        content_id: MovieId,
        title: impl Into<String>,
        score: f32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            content_id,
            title: title.into(),
            score,
            reason: reason.into(),
            source_strategy: String::new(),
            is_fallback: false,
            metadata: RecommendationMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: RecommendationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
