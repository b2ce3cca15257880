//! # ReadNext Core
//!
//! Shared foundation for the ReadNext rating prediction engine.
//!
//! This crate provides the building blocks used by the prediction engine:
//! model types, the error taxonomy, configuration loading, and telemetry.
//!
//! ## Modules
//!
//! - `models`: Rating triples and predictor identification
//! - `error`: Error types and handling
//! - `config`: Configuration loading and validation
//! - `telemetry`: Tracing subscriber initialization

pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::EngineSettings;
pub use error::{ReadNextError, Result};
pub use models::{PredictorKind, RatingTriple};
pub use telemetry::{init_telemetry, TelemetryConfig};
