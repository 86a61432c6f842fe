//! Pacifica Configuration
//!
//! Environment variables:
//! - `PACIFICA_API_KEY` (optional, raises the rate-limit tier)
//! - `PACIFICA_WALLET_ADDRESS` main account address
//! - `PACIFICA_PRIVATE_KEY` ed25519 key of the account or its agent wallet
//! - `PACIFICA_SANDBOX` use the test host
//! - `PACIFICA_REST_URL` override the REST host

use std::time::Duration;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::signing::decode_ed25519_seed;
use crate::adapters::types::{env_flag, env_string, Credentials, HTTP_TIMEOUT_SECS};

const MAINNET_REST_URL: &str = "https://api.pacifica.fi";
const TESTNET_REST_URL: &str = "https://test-api.pacifica.fi";

/// Default signature validity, milliseconds
pub const DEFAULT_EXPIRY_WINDOW_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct PacificaConfig {
    pub sandbox: bool,
    pub credentials: Credentials,
    /// Validity window attached to signed actions
    pub expiry_window_ms: u64,
    /// Market slippage applied when the order carries none
    pub default_slippage: String,
    pub rest_url: Option<String>,
    pub timeout: Duration,
}

impl Default for PacificaConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            credentials: Credentials::default(),
            expiry_window_ms: DEFAULT_EXPIRY_WINDOW_MS,
            default_slippage: "0.5".to_string(),
            rest_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl PacificaConfig {
    /// Read configuration from the environment.
    ///
    /// Credentials are optional (public-only adapter); a private key that is
    /// present but not a valid ed25519 secret is rejected here.
    pub fn from_env() -> ExchangeResult<Self> {
        let credentials = Credentials::from_env("PACIFICA");
        if let Some(key) = credentials.private_key.as_deref() {
            decode_ed25519_seed(key)?;
        }
        Ok(Self {
            sandbox: env_flag("PACIFICA_SANDBOX", false)?,
            credentials,
            rest_url: env_string("PACIFICA_REST_URL"),
            ..Self::default()
        })
    }

    pub fn rest_base_url(&self) -> &str {
        match &self.rest_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.sandbox => TESTNET_REST_URL,
            None => MAINNET_REST_URL,
        }
    }
}
