//! Shared model types for the rating prediction engine

use serde::{Deserialize, Serialize};

/// One observed user-item rating.
///
/// Indices are dense integers in `[0, num_users)` and `[0, num_items)`;
/// the rating value is positive (zero ratings mean "unobserved" and are
/// filtered out by the upstream data preparation stage).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingTriple {
    pub user: usize,
    pub item: usize,
    pub rating: f32,
}

impl RatingTriple {
    pub fn new(user: usize, item: usize, rating: f32) -> Self {
        Self { user, item, rating }
    }
}

/// Which predictor produced a score or evaluation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    UserNeighborhood,
    ItemNeighborhood,
    LatentFactor,
    Hybrid,
}

impl PredictorKind {
    /// String representation used in logs and serialized reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorKind::UserNeighborhood => "user_neighborhood",
            PredictorKind::ItemNeighborhood => "item_neighborhood",
            PredictorKind::LatentFactor => "latent_factor",
            PredictorKind::Hybrid => "hybrid",
        }
    }
}
