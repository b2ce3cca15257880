//! Latent Factor Matrix Factorization
//!
//! Factorizes the rating store into low-rank user and item factor matrices
//! with regularized stochastic gradient descent, then predicts a rating as
//! the dot product of the corresponding factor rows.
//!
//! Training examples within a pass are processed sequentially; concurrent
//! updates to the same factor row would lose writes.

use crate::ensemble::RatingPredictor;
use crate::store::RatingStore;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use readnext_core::{PredictorKind, ReadNextError, Result};
use serde::{Deserialize, Serialize};

/// SGD configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorizationConfig {
    /// Latent dimension (length of each factor row)
    pub latent_dim: usize,
    /// Gradient step size
    pub learning_rate: f32,
    /// L2 penalty on user factor rows
    pub user_penalty: f32,
    /// L2 penalty on item factor rows
    pub item_penalty: f32,
    /// Number of passes over the training triples
    pub passes: usize,
    /// Seed for factor initialization; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for FactorizationConfig {
    fn default() -> Self {
        Self {
            latent_dim: 20,
            learning_rate: 0.1,
            user_penalty: 0.1,
            item_penalty: 0.1,
            passes: 20,
            seed: None,
        }
    }
}

/// Trained latent factor model.
///
/// Predicted rating for (u, i) is the dot product of user factor row u and
/// item factor row i, with no bias terms and no clipping to the rating range.
/// Users or items that had no observed training ratings keep their random
/// initialization, so `predict` falls back to the training-set global mean
/// for them instead of returning a meaningless dot product.
pub struct LatentFactorModel {
    user_factors: Array2<f32>,
    item_factors: Array2<f32>,
    user_observed: Vec<bool>,
    item_observed: Vec<bool>,
    global_mean: f32,
}

impl LatentFactorModel {
    /// Train factor matrices on the observed ratings.
    ///
    /// Fails with `NoTrainingData` if the store holds no ratings. Training
    /// runs a fixed number of passes; there is no early stopping.
    pub fn fit(store: &RatingStore, config: &FactorizationConfig) -> Result<Self> {
        if store.is_empty() {
            return Err(ReadNextError::NoTrainingData);
        }

        let d = config.latent_dim;
        let lr = config.learning_rate;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut user_factors = Array2::<f32>::zeros((store.num_users(), d));
        let mut item_factors = Array2::<f32>::zeros((store.num_items(), d));
        for v in user_factors.iter_mut() {
            *v = rng.gen_range(-0.1..0.1);
        }
        for v in item_factors.iter_mut() {
            *v = rng.gen_range(-0.1..0.1);
        }

        let mut user_observed = vec![false; store.num_users()];
        let mut item_observed = vec![false; store.num_items()];

        for pass in 0..config.passes {
            // Row-major traversal keeps the example order deterministic.
            for u in 0..store.num_users() {
                for &(i, rating) in store.ratings_by_user(u)? {
                    if pass == 0 {
                        user_observed[u] = true;
                        item_observed[i] = true;
                    }

                    let error = rating - user_factors.row(u).dot(&item_factors.row(i));
                    let user_row = user_factors.row(u).to_owned();

                    {
                        let item_row = item_factors.row(i);
                        let mut row = user_factors.row_mut(u);
                        for f in 0..d {
                            row[f] += lr * (error * item_row[f] - config.user_penalty * row[f]);
                        }
                    }
                    {
                        // The item step uses the pre-update user row.
                        let mut row = item_factors.row_mut(i);
                        for f in 0..d {
                            row[f] += lr * (error * user_row[f] - config.item_penalty * row[f]);
                        }
                    }
                }
            }

            if pass % 2 == 0 {
                let mse = training_mse(store, &user_factors, &item_factors);
                tracing::debug!("SGD pass {}: training mse = {:.4}", pass, mse);
            }
        }

        Ok(Self {
            user_factors,
            item_factors,
            user_observed,
            item_observed,
            global_mean: store.global_mean(),
        })
    }

    /// Predict the rating for (user, item) as a factor dot product.
    ///
    /// Fails with `InvalidIndex` outside the trained ranges. Falls back to
    /// the training-set global mean when the user or item had no observed
    /// training ratings (documented cold-start policy).
    pub fn predict(&self, user: usize, item: usize) -> Result<f32> {
        if user >= self.user_factors.nrows() {
            return Err(ReadNextError::InvalidIndex {
                axis: "user",
                index: user,
                len: self.user_factors.nrows(),
            });
        }
        if item >= self.item_factors.nrows() {
            return Err(ReadNextError::InvalidIndex {
                axis: "item",
                index: item,
                len: self.item_factors.nrows(),
            });
        }

        if !self.user_observed[user] || !self.item_observed[item] {
            return Ok(self.global_mean);
        }
        Ok(self.user_factors.row(user).dot(&self.item_factors.row(item)))
    }

    pub fn latent_dim(&self) -> usize {
        self.user_factors.ncols()
    }

    pub fn user_factors(&self) -> &Array2<f32> {
        &self.user_factors
    }

    pub fn item_factors(&self) -> &Array2<f32> {
        &self.item_factors
    }

    /// Mean squared error over the training triples.
    pub fn training_mse(&self, store: &RatingStore) -> f32 {
        training_mse(store, &self.user_factors, &self.item_factors)
    }
}

fn training_mse(store: &RatingStore, user_factors: &Array2<f32>, item_factors: &Array2<f32>) -> f32 {
    let mut loss = 0.0f64;
    let mut count = 0usize;
    for u in 0..store.num_users() {
        if let Ok(ratings) = store.ratings_by_user(u) {
            for &(i, rating) in ratings {
                let prediction = user_factors.row(u).dot(&item_factors.row(i));
                loss += f64::from((rating - prediction).powi(2));
                count += 1;
            }
        }
    }
    if count > 0 {
        (loss / count as f64) as f32
    } else {
        0.0
    }
}

impl RatingPredictor for LatentFactorModel {
    fn predict(&self, user: usize, item: usize) -> Result<f32> {
        LatentFactorModel::predict(self, user, item)
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::LatentFactor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readnext_core::RatingTriple;

    fn two_rating_store() -> RatingStore {
        let triples = vec![RatingTriple::new(0, 0, 4.0), RatingTriple::new(1, 1, 2.0)];
        RatingStore::from_triples(2, 2, &triples).unwrap()
    }

    fn config(passes: usize) -> FactorizationConfig {
        FactorizationConfig {
            latent_dim: 2,
            learning_rate: 0.01,
            passes,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_store_rejected() {
        let store = RatingStore::from_triples(3, 3, &[]).unwrap();
        let result = LatentFactorModel::fit(&store, &FactorizationConfig::default());
        assert!(matches!(result, Err(ReadNextError::NoTrainingData)));
    }

    #[test]
    fn test_fit_produces_finite_predictions() {
        let store = two_rating_store();
        let model = LatentFactorModel::fit(&store, &config(20)).unwrap();

        for &(u, i) in &[(0, 0), (1, 1)] {
            let prediction = model.predict(u, i).unwrap();
            assert!(prediction.is_finite(), "prediction for ({u},{i}) is not finite");
        }
        assert_eq!(model.latent_dim(), 2);
        assert_eq!(model.user_factors().nrows(), 2);
        assert_eq!(model.item_factors().nrows(), 2);
    }

    #[test]
    fn test_training_error_decreases() {
        // Same seed, increasing pass counts: the training MSE must strictly
        // decrease over the first few passes at this learning rate.
        let store = two_rating_store();
        let mut previous = f32::INFINITY;
        for passes in 1..=5 {
            let model = LatentFactorModel::fit(&store, &config(passes)).unwrap();
            let mse = model.training_mse(&store);
            assert!(
                mse < previous,
                "mse after {passes} passes ({mse}) not below previous ({previous})"
            );
            previous = mse;
        }
    }

    #[test]
    fn test_seed_reproducibility() {
        let store = two_rating_store();
        let a = LatentFactorModel::fit(&store, &config(10)).unwrap();
        let b = LatentFactorModel::fit(&store, &config(10)).unwrap();
        assert_eq!(
            a.predict(0, 0).unwrap(),
            b.predict(0, 0).unwrap()
        );
    }

    #[test]
    fn test_cold_rows_fall_back_to_global_mean() {
        // User 2 and item 2 have no training ratings.
        let triples = vec![RatingTriple::new(0, 0, 4.0), RatingTriple::new(1, 1, 2.0)];
        let store = RatingStore::from_triples(3, 3, &triples).unwrap();
        let model = LatentFactorModel::fit(&store, &config(10)).unwrap();

        let mean = store.global_mean();
        assert_eq!(model.predict(2, 0).unwrap(), mean);
        assert_eq!(model.predict(0, 2).unwrap(), mean);
        assert_eq!(model.predict(2, 2).unwrap(), mean);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let store = two_rating_store();
        let model = LatentFactorModel::fit(&store, &config(5)).unwrap();
        assert!(matches!(
            model.predict(2, 0),
            Err(ReadNextError::InvalidIndex { axis: "user", .. })
        ));
        assert!(matches!(
            model.predict(0, 2),
            Err(ReadNextError::InvalidIndex { axis: "item", .. })
        ));
    }
}
