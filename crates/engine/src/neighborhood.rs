//! Neighborhood Collaborative Filtering Predictor
//!
//! One generic k-nearest-neighbor predictor covering both axes: instantiated
//! over users with the user-user similarity matrix, and over items with the
//! item-item matrix. The prediction is the similarity-weighted average of the
//! top-k candidates' observed ratings.
//!
//! Degenerate neighborhoods (no candidates, or all candidate similarities
//! zero) predict the documented fallback value 0.0 rather than erroring or
//! propagating NaN.

use crate::ensemble::RatingPredictor;
use crate::similarity::{Axis, SimilarityMatrix};
use crate::store::RatingStore;
use readnext_core::{PredictorKind, ReadNextError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prediction returned when the weighted average has no evidence to work
/// with (empty candidate set or zero similarity mass).
pub const DEGENERATE_FALLBACK: f32 = 0.0;

/// Neighborhood predictor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodConfig {
    /// Number of nearest neighbors considered per prediction.
    pub k: usize,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self { k: 15 }
    }
}

/// k-NN weighted-average rating predictor over one axis.
///
/// Read-only after construction; predictions for distinct (user, item) pairs
/// are safe to run in parallel.
pub struct NeighborhoodPredictor {
    store: Arc<RatingStore>,
    similarity: SimilarityMatrix,
    config: NeighborhoodConfig,
}

impl NeighborhoodPredictor {
    /// Pair a rating store with a similarity matrix over one of its axes.
    ///
    /// Fails with `LengthMismatch` if the similarity matrix does not range
    /// over the store's entity count on that axis.
    pub fn new(
        store: Arc<RatingStore>,
        similarity: SimilarityMatrix,
        config: NeighborhoodConfig,
    ) -> Result<Self> {
        let expected = match similarity.axis() {
            Axis::Users => store.num_users(),
            Axis::Items => store.num_items(),
        };
        if similarity.len() != expected {
            return Err(ReadNextError::LengthMismatch {
                left: similarity.len(),
                right: expected,
            });
        }
        Ok(Self {
            store,
            similarity,
            config,
        })
    }

    pub fn axis(&self) -> Axis {
        self.similarity.axis()
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    /// Predict with the configured neighborhood size.
    pub fn predict(&self, user: usize, item: usize) -> Result<f32> {
        self.predict_with_k(user, item, self.config.k)
    }

    /// Predict with a per-call neighborhood size.
    ///
    /// Candidates are ranked by similarity descending (ties broken by
    /// ascending index); if fewer than `k` exist, all are used. The result is
    /// sum(similarity * rating) / sum(|similarity|), unclipped.
    pub fn predict_with_k(&self, user: usize, item: usize, k: usize) -> Result<f32> {
        self.store.check_user(user)?;
        self.store.check_item(item)?;

        // For the user axis the candidates are the users who rated the
        // queried item; for the item axis, the items the queried user rated.
        let (target, candidates) = match self.similarity.axis() {
            Axis::Users => (user, self.store.ratings_for_item(item)?),
            Axis::Items => (item, self.store.ratings_by_user(user)?),
        };

        let mut scored = Vec::with_capacity(candidates.len());
        for &(candidate, rating) in candidates {
            let sim = self.similarity.get(target, candidate)?;
            scored.push((candidate, sim, rating));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        let mut numerator = 0.0f32;
        let mut weight = 0.0f32;
        for &(_, sim, rating) in &scored {
            numerator += sim * rating;
            weight += sim.abs();
        }

        if weight <= f32::EPSILON {
            return Ok(DEGENERATE_FALLBACK);
        }
        Ok(numerator / weight)
    }
}

impl RatingPredictor for NeighborhoodPredictor {
    fn predict(&self, user: usize, item: usize) -> Result<f32> {
        NeighborhoodPredictor::predict(self, user, item)
    }

    fn kind(&self) -> PredictorKind {
        match self.similarity.axis() {
            Axis::Users => PredictorKind::UserNeighborhood,
            Axis::Items => PredictorKind::ItemNeighborhood,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readnext_core::RatingTriple;

    fn predictor(axis: Axis, triples: &[RatingTriple], users: usize, items: usize) -> NeighborhoodPredictor {
        let store = Arc::new(RatingStore::from_triples(users, items, triples).unwrap());
        let similarity = SimilarityMatrix::build(&store, axis);
        NeighborhoodPredictor::new(store, similarity, NeighborhoodConfig::default()).unwrap()
    }

    #[test]
    fn test_user_based_weighted_average() {
        // Raters of item 0 are users 0 and 1; user 2 only overlaps with
        // user 0 (via item 1), so the weighted average collapses to user 0's
        // rating of item 0.
        let triples = vec![
            RatingTriple::new(0, 0, 5.0),
            RatingTriple::new(0, 1, 3.0),
            RatingTriple::new(1, 0, 4.0),
            RatingTriple::new(2, 1, 2.0),
        ];
        let cf = predictor(Axis::Users, &triples, 3, 3);
        let prediction = cf.predict(2, 0).unwrap();
        assert!((prediction - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_item_based_weighted_average() {
        // Items 0 and 1 are each rated by user 0; for user 1 (who rated only
        // item 0), the item-based prediction for item 1 weights item 0's
        // rating by sim(item 1, item 0).
        let triples = vec![
            RatingTriple::new(0, 0, 5.0),
            RatingTriple::new(0, 1, 3.0),
            RatingTriple::new(1, 0, 4.0),
        ];
        let cf = predictor(Axis::Items, &triples, 2, 2);
        let prediction = cf.predict(1, 1).unwrap();
        // Single candidate with positive similarity: prediction equals the
        // candidate's rating.
        assert!((prediction - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_candidate_set_falls_back() {
        let triples = vec![RatingTriple::new(0, 0, 5.0)];
        let cf = predictor(Axis::Users, &triples, 2, 2);
        // Nobody rated item 1.
        assert_eq!(cf.predict(0, 1).unwrap(), DEGENERATE_FALLBACK);
    }

    #[test]
    fn test_cold_user_falls_back() {
        // User 1 has no ratings, so its similarity row is all zero and the
        // weighted average has no mass.
        let triples = vec![RatingTriple::new(0, 0, 5.0)];
        let cf = predictor(Axis::Users, &triples, 2, 1);
        assert_eq!(cf.predict(1, 0).unwrap(), DEGENERATE_FALLBACK);
    }

    #[test]
    fn test_k_truncation() {
        // Two raters of item 0: user 1 (identical tastes to user 2) and
        // user 0 (dissimilar). With k=1 only the closest neighbor counts.
        let triples = vec![
            RatingTriple::new(0, 0, 1.0),
            RatingTriple::new(1, 0, 5.0),
            RatingTriple::new(1, 1, 4.0),
            RatingTriple::new(2, 1, 4.0),
        ];
        let store = Arc::new(RatingStore::from_triples(3, 2, &triples).unwrap());
        let similarity = SimilarityMatrix::build(&store, Axis::Users);
        let cf =
            NeighborhoodPredictor::new(store, similarity, NeighborhoodConfig { k: 15 }).unwrap();

        let top1 = cf.predict_with_k(2, 0, 1).unwrap();
        assert!((top1 - 5.0).abs() < 1e-5);

        // With the full neighborhood user 0 contributes nothing anyway
        // (no overlap with user 2), so the estimate is unchanged.
        let full = cf.predict(2, 0).unwrap();
        assert!((full - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let triples = vec![RatingTriple::new(0, 0, 5.0)];
        let cf = predictor(Axis::Users, &triples, 1, 1);
        assert!(cf.predict(1, 0).is_err());
        assert!(cf.predict(0, 1).is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let small = Arc::new(
            RatingStore::from_triples(2, 2, &[RatingTriple::new(0, 0, 1.0)]).unwrap(),
        );
        let large = RatingStore::from_triples(3, 2, &[RatingTriple::new(0, 0, 1.0)]).unwrap();
        let similarity = SimilarityMatrix::build(&large, Axis::Users);
        let result = NeighborhoodPredictor::new(small, similarity, NeighborhoodConfig::default());
        assert!(matches!(
            result,
            Err(ReadNextError::LengthMismatch { left: 3, right: 2 })
        ));
    }
}
