//! REST transport
//!
//! Executes a signed `RequestDescriptor` and hands back the raw status and
//! body. Vendor error classification happens in the adapter, not here.

use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{create_http_client, HttpMethod, RequestDescriptor, HTTP_TIMEOUT_SECS};

/// Raw HTTP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pooled reqwest client bound to one exchange
#[derive(Debug, Clone)]
pub struct RestClient {
    exchange: &'static str,
    client: reqwest::Client,
}

impl RestClient {
    pub fn new(exchange: &'static str) -> Self {
        Self::with_timeout(exchange, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    pub fn with_timeout(exchange: &'static str, timeout: Duration) -> Self {
        Self {
            exchange,
            client: create_http_client(exchange, timeout),
        }
    }

    /// Send the request once; no retries
    pub async fn execute(&self, request: &RequestDescriptor) -> ExchangeResult<HttpResponse> {
        tracing::debug!(
            exchange = %self.exchange,
            phase = "request",
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        let mut builder = self.client.request(request.method.into(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            if request.method != HttpMethod::Get {
                builder = builder.body(body.clone());
            }
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExchangeError::RequestTimeout(format!("{} request timed out: {}", self.exchange, e))
            } else {
                ExchangeError::ConnectionFailed(format!("{} request failed: {}", self.exchange, e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        tracing::debug!(
            exchange = %self.exchange,
            phase = "request",
            status,
            bytes = body.len(),
            "Response received"
        );

        Ok(HttpResponse { status, body })
    }
}
