//! Tracing subscriber configuration and initialization

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(String),

    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for console tracing output
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported in the startup log line
    pub service_name: String,

    /// Filter directives for `EnvFilter` (e.g. "info", "readnext_engine=debug")
    pub log_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "readnext-engine".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create config from environment variables
    ///
    /// - READNEXT_SERVICE_NAME: Service identifier
    /// - READNEXT_LOG: Filter directives (falls back to RUST_LOG)
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("READNEXT_SERVICE_NAME").unwrap_or_else(|_| "readnext-engine".to_string());

        let log_filter = std::env::var("READNEXT_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        Self {
            service_name,
            log_filter,
        }
    }
}

/// Initialize the tracing subscriber with an env filter and console output.
///
/// Must be called once at application startup; a second call fails with
/// `SubscriberInit`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| TelemetryError::InvalidFilter(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    tracing::info!(service = %config.service_name, "telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "readnext-engine");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = TelemetryConfig {
            log_filter: "this is not [ a filter".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_telemetry(&config),
            Err(TelemetryError::InvalidFilter(_))
        ));
    }
}
