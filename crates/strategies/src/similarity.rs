//! Embedding similarity search.
//!
//! ## Algorithm
//! 1. Look up the target movie's embedding
//! 2. Compute cosine similarity against every other embedding (parallel)
//! 3. Keep scores at or above the threshold
//! 4. Sort descending (ties by movie id) and keep the top `limit`

use catalog::MovieId;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Cosine similarity of two vectors; 0.0 when either has zero norm or the
/// lengths differ
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Movies most similar to `target`, excluding the target itself
///
/// Returns an empty list when the target has no embedding.
pub fn most_similar(
    embeddings: &HashMap<MovieId, Vec<f32>>,
    target: MovieId,
    min_similarity: f32,
    limit: usize,
) -> Vec<(MovieId, f32)> {
    let Some(target_embedding) = embeddings.get(&target) else {
        return Vec::new();
    };

    let mut scored: Vec<(MovieId, f32)> = embeddings
        .par_iter()
        .filter(|(id, _)| **id != target)
        .map(|(id, embedding)| (*id, cosine_similarity(target_embedding, embedding)))
        .filter(|(_, score)| *score >= min_similarity)
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_most_similar_excludes_target_and_threshold() {
        let mut embeddings = HashMap::new();
        embeddings.insert(1, vec![1.0, 0.0]);
        embeddings.insert(2, vec![0.9, 0.1]);
        embeddings.insert(3, vec![0.6, 0.8]);
        embeddings.insert(4, vec![0.0, 1.0]);

        let results = most_similar(&embeddings, 1, 0.3, 10);
        let ids: Vec<MovieId> = results.iter().map(|(id, _)| *id).collect();

        assert_eq!(ids, vec![2, 3]);
        assert!(results[0].1 > results[1].1);
    }

    #[test]
    fn test_most_similar_limit_and_missing_target() {
        let mut embeddings = HashMap::new();
        for id in 1..=5 {
            embeddings.insert(id, vec![1.0, id as f32 * 0.01]);
        }

        assert_eq!(most_similar(&embeddings, 1, 0.0, 2).len(), 2);
        assert!(most_similar(&embeddings, 99, 0.0, 2).is_empty());
    }
}
