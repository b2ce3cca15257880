//! Predictor Evaluation
//!
//! Scores a predictor against held-out ratings with root-mean-squared error.
//! The bounded-random-sample policy the source applied to the (slow)
//! neighborhood predictors is an explicit, seeded configuration here instead
//! of a hidden constant.

use crate::ensemble::RatingPredictor;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use readnext_core::{PredictorKind, RatingTriple, ReadNextError, Result};
use serde::{Deserialize, Serialize};

/// Root-mean-squared error over two aligned sequences.
///
/// Fails with `LengthMismatch` if the sequences differ in length. Empty
/// sequences score 0.0.
pub fn rmse(actual: &[f32], predicted: &[f32]) -> Result<f32> {
    if actual.len() != predicted.len() {
        return Err(ReadNextError::LengthMismatch {
            left: actual.len(),
            right: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| f64::from(a - p).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt() as f32)
}

/// Evaluation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Bound on the number of holdout pairs scored; `None` scores them all.
    pub sample_size: Option<usize>,
    /// Seed for drawing the sample, so runs are reproducible.
    pub seed: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            sample_size: None,
            seed: 42,
        }
    }
}

/// One scored holdout pair, suitable for external reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub user: usize,
    pub item: usize,
    pub actual: f32,
    pub predicted: f32,
}

/// Result of evaluating one predictor against the holdout set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub predictor: PredictorKind,
    pub rmse: f32,
    pub sample_count: usize,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<PredictionRecord>,
}

/// Scores predictors against a fixed holdout set.
pub struct Evaluator {
    holdout: Vec<RatingTriple>,
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(holdout: Vec<RatingTriple>, config: EvaluationConfig) -> Self {
        Self { holdout, config }
    }

    pub fn holdout_len(&self) -> usize {
        self.holdout.len()
    }

    /// Draw the (seeded) sample, predict each pair, and compute RMSE.
    ///
    /// Prediction runs in parallel across pairs; the predictors are
    /// read-only, so the result is identical to a sequential run up to
    /// floating-point summation order (and the summation here is sequential).
    pub fn evaluate<P>(&self, predictor: &P) -> Result<EvaluationReport>
    where
        P: RatingPredictor + ?Sized,
    {
        let sample = self.draw_sample();

        let records: Vec<PredictionRecord> = sample
            .par_iter()
            .map(|triple| {
                let predicted = predictor.predict(triple.user, triple.item)?;
                Ok(PredictionRecord {
                    user: triple.user,
                    item: triple.item,
                    actual: triple.rating,
                    predicted,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let actual: Vec<f32> = records.iter().map(|r| r.actual).collect();
        let predicted: Vec<f32> = records.iter().map(|r| r.predicted).collect();
        let score = rmse(&actual, &predicted)?;

        tracing::debug!(
            predictor = predictor.kind().as_str(),
            rmse = score,
            samples = records.len(),
            "evaluation complete"
        );

        Ok(EvaluationReport {
            predictor: predictor.kind(),
            rmse: score,
            sample_count: records.len(),
            generated_at: Utc::now(),
            records,
        })
    }

    fn draw_sample(&self) -> Vec<RatingTriple> {
        match self.config.sample_size {
            Some(n) if n < self.holdout.len() => {
                let mut rng = StdRng::seed_from_u64(self.config.seed);
                self.holdout
                    .choose_multiple(&mut rng, n)
                    .copied()
                    .collect()
            }
            _ => self.holdout.clone(),
        }
    }
}
