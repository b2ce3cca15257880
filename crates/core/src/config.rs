//! Configuration loader for the ReadNext engine
//!
//! Provides a unified configuration loading system with environment variable
//! parsing, validation, and `.env` file support. All configuration uses the
//! `READNEXT_` prefix for environment variables.
//!
//! Override hierarchy: defaults < .env < environment.
//!
//! # Example
//!
//! ```no_run
//! use readnext_core::config::EngineSettings;
//!
//! # fn example() -> readnext_core::Result<()> {
//! // Loads .env (if present), then the environment, then validates.
//! let settings = EngineSettings::load()?;
//! assert!(settings.neighborhood_k >= 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{ReadNextError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Tunable parameters for the rating prediction engine.
///
/// # Environment Variables
///
/// - `READNEXT_NEIGHBORHOOD_K` (optional): neighborhood size (default: 15)
/// - `READNEXT_LATENT_DIM` (optional): latent factor dimension (default: 20)
/// - `READNEXT_LEARNING_RATE` (optional): SGD learning rate (default: 0.1)
/// - `READNEXT_USER_PENALTY` (optional): L2 penalty on user factors (default: 0.1)
/// - `READNEXT_ITEM_PENALTY` (optional): L2 penalty on item factors (default: 0.1)
/// - `READNEXT_TRAINING_PASSES` (optional): SGD passes over the data (default: 20)
/// - `READNEXT_EVAL_SAMPLE_SIZE` (optional): bound on evaluated holdout pairs
///   (default: unset, evaluate the full holdout)
/// - `READNEXT_SEED` (optional): seed for sampling and factor init (default: 42)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Neighborhood size `k` for both neighborhood predictors.
    pub neighborhood_k: usize,
    /// Latent factor dimension `d`.
    pub latent_dim: usize,
    /// SGD learning rate.
    pub learning_rate: f32,
    /// L2 penalty applied to user factor rows.
    pub user_penalty: f32,
    /// L2 penalty applied to item factor rows.
    pub item_penalty: f32,
    /// Number of SGD passes over the training triples.
    pub training_passes: usize,
    /// Bound on the number of holdout pairs scored per evaluation.
    pub eval_sample_size: Option<usize>,
    /// Seed for evaluation sampling and factor initialization.
    pub seed: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            neighborhood_k: 15,
            latent_dim: 20,
            learning_rate: 0.1,
            user_penalty: 0.1,
            item_penalty: 0.1,
            training_passes: 20,
            eval_sample_size: None,
            seed: 42,
        }
    }
}

impl EngineSettings {
    /// Load `.env` (if present), read the environment, and validate.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Self::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for unset values.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            neighborhood_k: env_parse("READNEXT_NEIGHBORHOOD_K", defaults.neighborhood_k)?,
            latent_dim: env_parse("READNEXT_LATENT_DIM", defaults.latent_dim)?,
            learning_rate: env_parse("READNEXT_LEARNING_RATE", defaults.learning_rate)?,
            user_penalty: env_parse("READNEXT_USER_PENALTY", defaults.user_penalty)?,
            item_penalty: env_parse("READNEXT_ITEM_PENALTY", defaults.item_penalty)?,
            training_passes: env_parse("READNEXT_TRAINING_PASSES", defaults.training_passes)?,
            eval_sample_size: env_parse_opt("READNEXT_EVAL_SAMPLE_SIZE")?,
            seed: env_parse("READNEXT_SEED", defaults.seed)?,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.neighborhood_k == 0 {
            return Err(ReadNextError::InvalidConfig(
                "neighborhood_k must be at least 1".to_string(),
            ));
        }
        if self.latent_dim == 0 {
            return Err(ReadNextError::InvalidConfig(
                "latent_dim must be at least 1".to_string(),
            ));
        }
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(ReadNextError::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if self.user_penalty < 0.0 || self.item_penalty < 0.0 {
            return Err(ReadNextError::InvalidConfig(
                "factor penalties must be non-negative".to_string(),
            ));
        }
        if self.training_passes == 0 {
            return Err(ReadNextError::InvalidConfig(
                "training_passes must be at least 1".to_string(),
            ));
        }
        if self.eval_sample_size == Some(0) {
            return Err(ReadNextError::InvalidConfig(
                "eval_sample_size must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(key) {
        Some(value) => value
            .parse()
            .map_err(|e| ReadNextError::InvalidConfig(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn env_parse_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env_var(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ReadNextError::InvalidConfig(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.neighborhood_k, 15);
        assert_eq!(settings.latent_dim, 20);
        assert_eq!(settings.learning_rate, 0.1);
        assert_eq!(settings.user_penalty, 0.1);
        assert_eq!(settings.item_penalty, 0.1);
        assert_eq!(settings.training_passes, 20);
        assert_eq!(settings.eval_sample_size, None);
        assert_eq!(settings.seed, 42);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let settings = EngineSettings {
            neighborhood_k: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ReadNextError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_nonpositive_learning_rate() {
        let settings = EngineSettings {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = EngineSettings {
            learning_rate: f32::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_penalty() {
        let settings = EngineSettings {
            user_penalty: -0.1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sample_size() {
        let settings = EngineSettings {
            eval_sample_size: Some(0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("READNEXT_NEIGHBORHOOD_K", "25");
        std::env::set_var("READNEXT_EVAL_SAMPLE_SIZE", "1000");
        let settings = EngineSettings::from_env().unwrap();
        std::env::remove_var("READNEXT_NEIGHBORHOOD_K");
        std::env::remove_var("READNEXT_EVAL_SAMPLE_SIZE");

        assert_eq!(settings.neighborhood_k, 25);
        assert_eq!(settings.eval_sample_size, Some(1000));
        // Unset values fall back to defaults.
        assert_eq!(settings.latent_dim, 20);
    }

    #[test]
    fn test_from_env_rejects_garbage() {
        std::env::set_var("READNEXT_LATENT_DIM", "not-a-number");
        let result = EngineSettings::from_env();
        std::env::remove_var("READNEXT_LATENT_DIM");
        assert!(matches!(result, Err(ReadNextError::InvalidConfig(_))));
    }
}
