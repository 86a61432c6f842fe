//! Deepwaters Configuration
//!
//! Environment variables:
//! - `DEEPWATERS_API_KEY` API key id
//! - `DEEPWATERS_SECRET` hex secp256k1 private key of the API key
//! - `DEEPWATERS_SANDBOX` use the testnet host
//! - `DEEPWATERS_REST_URL` override the REST host

use std::time::Duration;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::signing::parse_wallet;
use crate::adapters::types::{env_flag, env_string, Credentials, HTTP_TIMEOUT_SECS};

const MAINNET_REST_URL: &str = "https://api.deepwaters.xyz/rest/v1";
const TESTNET_REST_URL: &str = "https://testnet.api.deepwaters.xyz/rest/v1";

#[derive(Debug, Clone)]
pub struct DeepwatersConfig {
    pub sandbox: bool,
    pub credentials: Credentials,
    pub rest_url: Option<String>,
    pub timeout: Duration,
}

impl Default for DeepwatersConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            credentials: Credentials::default(),
            rest_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }
}

impl DeepwatersConfig {
    /// Read configuration from the environment; a secret that is not a valid
    /// secp256k1 key is rejected here rather than on the first signed call.
    pub fn from_env() -> ExchangeResult<Self> {
        let credentials = Credentials::from_env("DEEPWATERS");
        if let Some(secret) = credentials.secret.as_deref() {
            parse_wallet(secret)?;
        }
        Ok(Self {
            sandbox: env_flag("DEEPWATERS_SANDBOX", false)?,
            credentials,
            rest_url: env_string("DEEPWATERS_REST_URL"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::tests::TEST_PRIMARY_KEY;
    use serial_test::serial;

    fn clear_env() {
        for var in ["DEEPWATERS_API_KEY", "DEEPWATERS_SECRET", "DEEPWATERS_SANDBOX", "DEEPWATERS_REST_URL"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_sandbox_host() {
        clear_env();
        std::env::set_var("DEEPWATERS_SANDBOX", "true");
        let config = DeepwatersConfig::from_env().unwrap();
        assert_eq!(config.rest_base_url(), "https://testnet.api.deepwaters.xyz/rest/v1");
        clear_env();
        assert_eq!(
            DeepwatersConfig::default().rest_base_url(),
            "https://api.deepwaters.xyz/rest/v1"
        );
    }

    #[test]
    #[serial]
    fn test_secret_is_validated() {
        clear_env();
        std::env::set_var("DEEPWATERS_SECRET", "not-a-key");
        assert!(DeepwatersConfig::from_env().is_err());
        std::env::set_var("DEEPWATERS_SECRET", TEST_PRIMARY_KEY);
        assert!(DeepwatersConfig::from_env().is_ok());
        clear_env();
    }
}
