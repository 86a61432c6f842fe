//! Backpack Configuration
//!
//! Environment variables:
//! - `BACKPACK_API_KEY` base64 ed25519 public key
//! - `BACKPACK_SECRET` base64 ed25519 seed
//! - `BACKPACK_RECV_WINDOW` validity of signed requests, milliseconds (max 60000)
//! - `BACKPACK_REST_URL` override the REST host

use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{env_string, Credentials, HTTP_TIMEOUT_SECS};

const REST_URL: &str = "https://api.backpack.exchange";

pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;
pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

#[derive(Debug, Clone)]
pub struct BackpackConfig {
    pub credentials: Credentials,
    pub recv_window_ms: u64,
    pub rest_url: Option<String>,
    pub timeout: Duration,
}

impl Default for BackpackConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            rest_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl BackpackConfig {
    pub fn from_env() -> ExchangeResult<Self> {
        let recv_window_ms = match env_string("BACKPACK_RECV_WINDOW") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ExchangeError::BadRequest(format!("BACKPACK_RECV_WINDOW must be an integer, got '{}'", raw))
            })?,
            None => DEFAULT_RECV_WINDOW_MS,
        };
        if recv_window_ms > MAX_RECV_WINDOW_MS {
            return Err(ExchangeError::BadRequest(format!(
                "BACKPACK_RECV_WINDOW must not exceed {} ms, got {}",
                MAX_RECV_WINDOW_MS, recv_window_ms
            )));
        }
        Ok(Self {
            credentials: Credentials::from_env("BACKPACK"),
            recv_window_ms,
            rest_url: env_string("BACKPACK_REST_URL"),
            ..Self::default()
        })
    }

    pub fn rest_base_url(&self) -> &str {
        self.rest_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(REST_URL)
    }
}
