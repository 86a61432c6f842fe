//! Indodax Configuration
//!
//! Environment variables:
//! - `INDODAX_API_KEY`, `INDODAX_SECRET` HMAC credentials
//! - `INDODAX_RECV_WINDOW` validity of signed requests, milliseconds
//! - `INDODAX_REST_URL` override the host (the private API lives under `/tapi`)

use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{env_string, Credentials, HTTP_TIMEOUT_SECS};

const REST_URL: &str = "https://indodax.com";

pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct IndodaxConfig {
    pub credentials: Credentials,
    pub recv_window_ms: u64,
    pub rest_url: Option<String>,
    pub timeout: Duration,
}

impl Default for IndodaxConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            rest_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl IndodaxConfig {
    pub fn from_env() -> ExchangeResult<Self> {
        let recv_window_ms = match env_string("INDODAX_RECV_WINDOW") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ExchangeError::BadRequest(format!("INDODAX_RECV_WINDOW must be an integer, got '{}'", raw))
            })?,
            None => DEFAULT_RECV_WINDOW_MS,
        };
        Ok(Self {
            credentials: Credentials::from_env("INDODAX"),
            recv_window_ms,
            rest_url: env_string("INDODAX_REST_URL"),
            ..Self::default()
        })
    }

    pub fn rest_base_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(REST_URL)
    }

    /// Trade API endpoint; the route travels in the `method` form field
    pub fn private_url(&self) -> String {
        format!("{}/tapi", self.rest_base_url())
    }
}
