//! Per-user personalization of strategy weights and final scores.
//!
//! ## Algorithm
//! 1. Count each known genre across the user's watch history
//!    (case-insensitive, unknown genres ignored)
//! 2. Normalize by the total number of counted occurrences and round to two
//!    decimals, giving the affinity vector
//! 3. With at least `min_history` watched movies, boost the genre and mood
//!    strategy weights by `w * (1 + boost_rate * top_affinity)`
//! 4. After the pipeline has run, scale scores by stored profile
//!    preferences and label matches against the top affinity genres

use crate::recommendation_pipeline::{DEFAULT_FALLBACK_WEIGHT, sort_by_score};
use catalog::CatalogIndex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use strategies::Recommendation;
use tracing::debug;

/// Genre name (lower-cased) -> share of the user's watched genres
pub type AffinityVector = BTreeMap<String, f32>;

pub const DEFAULT_MIN_HISTORY: usize = 5;
pub const DEFAULT_BOOST_RATE: f32 = 0.2;
pub const PREFERRED_GENRE_BOOST: f32 = 1.1;
pub const DISLIKED_GENRE_PENALTY: f32 = 0.5;

/// How many favourite genres a label may name
const MAX_LABEL_GENRES: usize = 2;

/// Builds affinity vectors over a fixed set of known genres.
#[derive(Debug, Clone)]
pub struct GenreAffinityModel {
    known: Vec<String>,
}

impl GenreAffinityModel {
    pub fn new<I, S>(known_genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known: Vec<String> = known_genres
            .into_iter()
            .map(|g| g.as_ref().trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
        known.sort();
        known.dedup();
        Self { known }
    }

    /// Model over every genre name the catalog knows
    pub fn from_catalog(catalog: &CatalogIndex) -> Self {
        Self::new(catalog.genres().iter().map(|g| g.name.as_str()))
    }

    pub fn known_genres(&self) -> &[String] {
        &self.known
    }

    /// Compute the normalized genre preference vector
    ///
    /// # Arguments
    /// * `history` - Genre names of each watched movie
    ///
    /// # Returns
    /// One entry per known genre; all zeros when nothing was counted
    pub fn preference_vector(&self, history: &[Vec<String>]) -> AffinityVector {
        let mut counts: AffinityVector = self.known.iter().map(|g| (g.clone(), 0.0)).collect();
        let mut total = 0usize;

        for genre in history.iter().flatten() {
            if let Some(count) = counts.get_mut(&genre.trim().to_lowercase()) {
                *count += 1.0;
                total += 1;
            }
        }

        if total > 0 {
            for value in counts.values_mut() {
                *value = round2(*value / total as f32);
            }
        }

        self.apply_decay(counts)
    }

    /// Temporal decay over the affinity vector; currently the identity
    pub fn apply_decay(&self, vector: AffinityVector) -> AffinityVector {
        vector
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Top `n` genres with non-zero affinity, strongest first (ties by name)
pub fn top_genres(vector: &AffinityVector, n: usize) -> Vec<(String, f32)> {
    let mut ranked: Vec<(String, f32)> = vector
        .iter()
        .filter(|(_, v)| **v > 0.0)
        .map(|(g, v)| (g.clone(), *v))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

/// Thresholds for boosting weights from history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationConfig {
    pub min_history: usize,
    pub boost_rate: f32,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            min_history: DEFAULT_MIN_HISTORY,
            boost_rate: DEFAULT_BOOST_RATE,
        }
    }
}

impl PersonalizationConfig {
    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn with_boost_rate(mut self, boost_rate: f32) -> Self {
        self.boost_rate = boost_rate;
        self
    }
}

/// Per-strategy weights used to assemble a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeights {
    pub content_based: f32,
    pub genre_based: f32,
    pub mood_based: f32,
    pub actor_based: f32,
    pub fallback: f32,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            content_based: 1.0,
            genre_based: 0.9,
            mood_based: 0.85,
            actor_based: 0.8,
            fallback: DEFAULT_FALLBACK_WEIGHT,
        }
    }
}

impl StrategyWeights {
    /// Boost the genre and mood weights from the user's affinity
    ///
    /// # Arguments
    /// * `affinity` - The user's affinity vector
    /// * `history_len` - Number of watched movies behind it
    ///
    /// # Returns
    /// Unchanged weights when the history is shorter than `min_history`
    pub fn personalized(
        &self,
        affinity: &AffinityVector,
        history_len: usize,
        config: &PersonalizationConfig,
    ) -> Self {
        if history_len < config.min_history {
            return *self;
        }

        let top = top_genres(affinity, 1)
            .first()
            .map(|(_, v)| *v)
            .unwrap_or(0.0);
        let boost = 1.0 + config.boost_rate * top;

        debug!(history_len, top_affinity = top, boost, "Personalizing strategy weights");

        Self {
            genre_based: self.genre_based * boost,
            mood_based: self.mood_based * boost,
            ..*self
        }
    }
}

/// Scales scores by the user's stored likes and dislikes.
#[derive(Debug, Clone, Default)]
pub struct ScoreAdjuster {
    preferred: HashSet<String>,
    disliked: HashSet<String>,
}

fn lowered<I, S>(genres: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    genres
        .into_iter()
        .map(|g| g.as_ref().to_lowercase())
        .collect()
}

impl ScoreAdjuster {
    pub fn new<I, S>(preferred: I, disliked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            preferred: lowered(preferred),
            disliked: lowered(disliked),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty() && self.disliked.is_empty()
    }

    /// Multiply by 1.1 when any of a movie's genres is preferred and by 0.5
    /// when any is disliked, then re-sort
    pub fn adjust(&self, recommendations: &mut [Recommendation]) {
        if self.is_empty() {
            return;
        }

        for rec in recommendations.iter_mut() {
            let genres = lowered(&rec.metadata.genres);
            if !genres.is_disjoint(&self.preferred) {
                rec.score *= PREFERRED_GENRE_BOOST;
            }
            if !genres.is_disjoint(&self.disliked) {
                rec.score *= DISLIKED_GENRE_PENALTY;
            }
        }

        sort_by_score(recommendations);
    }
}

/// Attach a human-readable label naming the user's favourite genres a
/// recommendation matches
///
/// # Arguments
/// * `favorites` - Lower-cased top affinity genres, strongest first
pub fn label_favorite_genres(recommendations: &mut [Recommendation], favorites: &[String]) {
    for rec in recommendations.iter_mut() {
        let matching: Vec<&str> = rec
            .metadata
            .genres
            .iter()
            .filter(|g| favorites.contains(&g.to_lowercase()))
            .map(|g| g.as_str())
            .take(MAX_LABEL_GENRES)
            .collect();

        if !matching.is_empty() {
            rec.metadata.reason_label =
                Some(format!("Matches your favorite genres: {}", matching.join(", ")));
        } else if rec.source_strategy == "genre_based" {
            rec.metadata.reason_label = Some("Similar genre to movies you've watched".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategies::RecommendationMetadata;

    fn history(entries: &[&[&str]]) -> Vec<Vec<String>> {
        entries
            .iter()
            .map(|e| e.iter().map(|g| g.to_string()).collect())
            .collect()
    }

    fn rec(id: u32, score: f32, genres: &[&str]) -> Recommendation {
        Recommendation::new(id, format!("Movie {}", id), score, "test").with_metadata(
            RecommendationMetadata {
                genres: genres.iter().map(|g| g.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_preference_vector_normalizes() {
        let model = GenreAffinityModel::new(["Action", "Comedy", "Drama"]);
        let h = history(&[&["Action", "Comedy"], &["action"], &["Western"]]);
        let v = model.preference_vector(&h);

        assert_eq!(v["action"], 0.67);
        assert_eq!(v["comedy"], 0.33);
        assert_eq!(v["drama"], 0.0);
        assert!(!v.contains_key("western"));
    }

    #[test]
    fn test_empty_history_is_all_zeros() {
        let model = GenreAffinityModel::new(["Action", "Drama"]);
        let v = model.preference_vector(&[]);
        assert_eq!(v.len(), 2);
        assert!(v.values().all(|x| *x == 0.0));
        assert!(top_genres(&v, 3).is_empty());
    }

    #[test]
    fn test_weights_boost_only_with_enough_history() {
        let model = GenreAffinityModel::new(["Action", "Drama"]);
        let v = model.preference_vector(&vec![vec!["Action".to_string()]; 5]);
        let base = StrategyWeights::default();
        let config = PersonalizationConfig::default();

        assert_eq!(base.personalized(&v, 4, &config), base);

        let boosted = base.personalized(&v, 5, &config);
        assert!((boosted.genre_based - 0.9 * 1.2).abs() < 1e-6);
        assert!((boosted.mood_based - 0.85 * 1.2).abs() < 1e-6);
        assert_eq!(boosted.content_based, base.content_based);
        assert_eq!(boosted.actor_based, base.actor_based);
    }

    #[test]
    fn test_score_adjuster() {
        let adjuster = ScoreAdjuster::new(vec!["comedy"], vec!["Horror"]);
        let mut recs = vec![
            rec(1, 0.8, &["Horror"]),
            rec(2, 0.6, &["Comedy"]),
            rec(3, 0.5, &["Drama"]),
        ];
        adjuster.adjust(&mut recs);

        let ids: Vec<u32> = recs.iter().map(|r| r.content_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!((recs[0].score - 0.66).abs() < 1e-6);
        assert!((recs[2].score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_labels() {
        let mut recs = vec![
            rec(1, 0.9, &["Action", "Comedy", "Drama"]),
            rec(2, 0.8, &["Western"]),
            rec(3, 0.7, &["Western"]),
        ];
        recs[2].source_strategy = "genre_based".to_string();
        let favorites = vec!["drama".to_string(), "action".to_string(), "comedy".to_string()];

        label_favorite_genres(&mut recs, &favorites);

        assert_eq!(
            recs[0].metadata.reason_label.as_deref(),
            Some("Matches your favorite genres: Action, Comedy")
        );
        assert_eq!(recs[1].metadata.reason_label, None);
        assert_eq!(
            recs[2].metadata.reason_label.as_deref(),
            Some("Similar genre to movies you've watched")
        );
    }
}
