//! ReadNext Hybrid Rating Prediction Engine
//!
//! Predicts a user's rating for a book from historical user-item ratings,
//! combining three complementary predictors into one ensemble estimate:
//! user-neighborhood collaborative filtering, item-neighborhood collaborative
//! filtering, and latent-factor matrix factorization.
//!
//! Everything is batch and in-memory: the rating store is built once from
//! pre-cleaned, pre-split triples, derived artifacts (similarity matrices,
//! factor matrices) are computed once, and all inference is read-only.

pub mod ensemble;
pub mod evaluation;
pub mod factorization;
pub mod neighborhood;
pub mod similarity;
pub mod store;

// Re-export key types
pub use ensemble::{HybridPredictor, RatingPredictor};
pub use evaluation::{rmse, EvaluationConfig, EvaluationReport, Evaluator, PredictionRecord};
pub use factorization::{FactorizationConfig, LatentFactorModel};
pub use neighborhood::{NeighborhoodConfig, NeighborhoodPredictor, DEGENERATE_FALLBACK};
pub use similarity::{Axis, SimilarityMatrix};
pub use store::RatingStore;

use readnext_core::{EngineSettings, Result};
use std::sync::Arc;

/// Build the full hybrid predictor from a rating store and engine settings:
/// both similarity matrices, both neighborhood predictors, and a trained
/// latent factor model.
pub fn build_hybrid(store: Arc<RatingStore>, settings: &EngineSettings) -> Result<HybridPredictor> {
    settings.validate()?;

    let neighborhood = NeighborhoodConfig {
        k: settings.neighborhood_k,
    };
    let user_sim = SimilarityMatrix::build(&store, Axis::Users);
    let item_sim = SimilarityMatrix::build(&store, Axis::Items);
    let user_cf = NeighborhoodPredictor::new(Arc::clone(&store), user_sim, neighborhood)?;
    let item_cf = NeighborhoodPredictor::new(Arc::clone(&store), item_sim, neighborhood)?;

    let latent = LatentFactorModel::fit(
        &store,
        &FactorizationConfig {
            latent_dim: settings.latent_dim,
            learning_rate: settings.learning_rate,
            user_penalty: settings.user_penalty,
            item_penalty: settings.item_penalty,
            passes: settings.training_passes,
            seed: Some(settings.seed),
        },
    )?;

    Ok(HybridPredictor::new(user_cf, item_cf, latent))
}

#[cfg(test)]
mod tests;
