//! Configuration types for adapter settings
//!
//! This module defines the settings loaded from YAML and shared across the
//! application via `Arc<RwLock<AppConfig>>`. Credentials never live here;
//! they come from the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::adapters::factory::{AdapterOverrides, SUPPORTED_EXCHANGES};
use crate::adapters::types::HTTP_TIMEOUT_SECS;
use crate::error::AppError;

// ============================================================================
// Type Aliases
// ============================================================================

/// Type alias for shared configuration access across async tasks
pub type SharedConfig = Arc<RwLock<AppConfig>>;

/// Largest receive window any supported venue accepts
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

fn default_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings for one enabled exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeSettings {
    /// Exchange id or alias (e.g., "backpack", "pacifica-testnet")
    pub name: String,
    /// Use the venue's test host where one exists
    #[serde(default)]
    pub sandbox: bool,
    /// Validity window of signed requests, milliseconds
    #[serde(default)]
    pub recv_window_ms: Option<u64>,
    /// HTTP request timeout, seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ExchangeSettings {
    /// Validate exchange settings rules
    pub fn validate(&self) -> Result<(), AppError> {
        if !SUPPORTED_EXCHANGES.contains(&self.name.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown exchange '{}'. Supported: {}",
                self.name,
                SUPPORTED_EXCHANGES.join(", ")
            )));
        }

        if self.timeout_secs == 0 {
            return Err(AppError::Config(format!(
                "Exchange '{}': timeout_secs must be > 0",
                self.name
            )));
        }

        if let Some(window) = self.recv_window_ms {
            if window > MAX_RECV_WINDOW_MS {
                return Err(AppError::Config(format!(
                    "Exchange '{}': recv_window_ms must be <= {} (got {})",
                    self.name, MAX_RECV_WINDOW_MS, window
                )));
            }
        }

        Ok(())
    }

    /// Overrides handed to the adapter factory
    pub fn overrides(&self) -> AdapterOverrides {
        AdapterOverrides {
            sandbox: Some(self.sandbox),
            recv_window_ms: self.recv_window_ms,
            timeout: Some(Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Exchanges to build adapters for
    pub exchanges: Vec<ExchangeSettings>,
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.exchanges.is_empty() {
            return Err(AppError::Config(
                "Configuration must enable at least one exchange".to_string()
            ));
        }

        let mut seen = HashSet::new();
        for exchange in &self.exchanges {
            exchange.validate()?;
            if !seen.insert(exchange.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Exchange '{}' is listed more than once",
                    exchange.name
                )));
            }
        }

        Ok(())
    }

    /// Settings for one exchange id
    pub fn exchange(&self, name: &str) -> Option<&ExchangeSettings> {
        self.exchanges.iter().find(|e| e.name == name)
    }

    /// Convert to shared state wrapper for async access
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(name: &str) -> ExchangeSettings {
        ExchangeSettings {
            name: name.to_string(),
            sandbox: false,
            recv_window_ms: None,
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_valid_exchange_settings() {
        assert!(settings("toobit").validate().is_ok());
        assert!(settings("backpack-exchange").validate().is_ok());
    }

    #[test]
    fn test_unknown_exchange_rejected() {
        let result = settings("kraken").validate();
        assert!(result.unwrap_err().to_string().contains("Unknown exchange 'kraken'"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut exchange = settings("indodax");
        exchange.timeout_secs = 0;
        assert!(exchange.validate().unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_recv_window_bound() {
        let mut exchange = settings("backpack");
        exchange.recv_window_ms = Some(60_000);
        assert!(exchange.validate().is_ok());
        exchange.recv_window_ms = Some(60_001);
        assert!(exchange.validate().unwrap_err().to_string().contains("recv_window_ms"));
    }

    #[test]
    fn test_duplicates_rejected() {
        let config = AppConfig {
            exchanges: vec![settings("toobit"), settings("toobit")],
        };
        assert!(config.validate().unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_empty_config_rejected() {
        assert!(AppConfig::default().validate().is_err());
    }

    #[test]
    fn test_overrides_carry_settings() {
        let mut exchange = settings("deepwaters");
        exchange.sandbox = true;
        let overrides = exchange.overrides();
        assert_eq!(overrides.sandbox, Some(true));
        assert_eq!(overrides.recv_window_ms, None);
        assert_eq!(overrides.timeout, Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_shared_config() {
        let shared = AppConfig {
            exchanges: vec![settings("pacifica")],
        }
        .into_shared();
        let guard = shared.read().await;
        assert!(guard.exchange("pacifica").is_some());
        assert!(guard.exchange("toobit").is_none());
    }
}
