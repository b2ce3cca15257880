//! Hybrid Ensemble Combiner
//!
//! Combines the user-neighborhood, item-neighborhood, and latent-factor
//! predictors into a single estimate: the unweighted arithmetic mean of the
//! three outputs. A configurable weight vector would be a direct
//! generalization but is deliberately not part of this contract.

use crate::factorization::LatentFactorModel;
use crate::neighborhood::NeighborhoodPredictor;
use readnext_core::{PredictorKind, Result};

/// A rating estimator for dense (user, item) index pairs.
///
/// Implementations are read-only after construction, so batch prediction
/// over distinct pairs is safe to parallelize (hence `Sync`).
pub trait RatingPredictor: Sync {
    fn predict(&self, user: usize, item: usize) -> Result<f32>;

    /// Identifies the predictor in logs and evaluation reports.
    fn kind(&self) -> PredictorKind;
}

/// Mean-of-three ensemble over the two neighborhood predictors and the
/// latent factor model.
pub struct HybridPredictor {
    user_cf: NeighborhoodPredictor,
    item_cf: NeighborhoodPredictor,
    latent: LatentFactorModel,
}

impl HybridPredictor {
    pub fn new(
        user_cf: NeighborhoodPredictor,
        item_cf: NeighborhoodPredictor,
        latent: LatentFactorModel,
    ) -> Self {
        Self {
            user_cf,
            item_cf,
            latent,
        }
    }

    pub fn user_cf(&self) -> &NeighborhoodPredictor {
        &self.user_cf
    }

    pub fn item_cf(&self) -> &NeighborhoodPredictor {
        &self.item_cf
    }

    pub fn latent(&self) -> &LatentFactorModel {
        &self.latent
    }

    /// Unweighted mean of the three component predictions.
    pub fn predict(&self, user: usize, item: usize) -> Result<f32> {
        let user_based = self.user_cf.predict(user, item)?;
        let item_based = self.item_cf.predict(user, item)?;
        let factored = self.latent.predict(user, item)?;
        Ok((user_based + item_based + factored) / 3.0)
    }

    /// Score every item the user has not rated and return the top `limit`,
    /// sorted by predicted rating descending (ties broken by ascending item
    /// index).
    pub fn recommend(&self, user: usize, limit: usize) -> Result<Vec<(usize, f32)>> {
        let store = self.user_cf.store();
        store.check_user(user)?;

        let mut rated = vec![false; store.num_items()];
        for &(item, _) in store.ratings_by_user(user)? {
            rated[item] = true;
        }

        let mut scored = Vec::new();
        for item in 0..store.num_items() {
            if rated[item] {
                continue;
            }
            scored.push((item, self.predict(user, item)?));
        }
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        Ok(scored)
    }
}

impl RatingPredictor for HybridPredictor {
    fn predict(&self, user: usize, item: usize) -> Result<f32> {
        HybridPredictor::predict(self, user, item)
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Hybrid
    }
}
