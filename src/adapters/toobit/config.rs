//! Toobit Configuration
//!
//! Environment variables:
//! - `TOOBIT_API_KEY`, `TOOBIT_SECRET` HMAC credentials
//! - `TOOBIT_RECV_WINDOW` validity of signed requests, milliseconds
//! - `TOOBIT_REST_URL` override the REST host

use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{env_string, Credentials, MarketType, HTTP_TIMEOUT_SECS};

const REST_URL: &str = "https://api.toobit.com";

pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct ToobitConfig {
    pub credentials: Credentials,
    pub recv_window_ms: u64,
    /// Ticker family queried when no symbol pins the market type
    pub default_market_type: MarketType,
    pub rest_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ToobitConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            default_market_type: MarketType::Spot,
            rest_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl ToobitConfig {
    pub fn from_env() -> ExchangeResult<Self> {
        let recv_window_ms = match env_string("TOOBIT_RECV_WINDOW") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ExchangeError::BadRequest(format!("TOOBIT_RECV_WINDOW must be an integer, got '{}'", raw))
            })?,
            None => DEFAULT_RECV_WINDOW_MS,
        };
        Ok(Self {
            credentials: Credentials::from_env("TOOBIT"),
            recv_window_ms,
            rest_url: env_string("TOOBIT_REST_URL"),
            ..Self::default()
        })
    }

    /// Toobit has no sandbox; only the override changes the host
    pub fn rest_base_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(REST_URL)
    }
}
