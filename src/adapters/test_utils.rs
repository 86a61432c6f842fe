//! Shared test utilities for adapter testing
//!
//! Provides a `TestMockAdapter` that signs requests against a configurable
//! base URL (usually a mockito server) and counts market fetches.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::adapters::endpoints::{urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ErrorKind, ErrorTable, ExchangeError, ExchangeResult};
use crate::adapters::markets::MarketDirectory;
use crate::adapters::safe::{safe_string, Params};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    ExchangeIdentity, HttpMethod, Market, MarketLimits, MarketPrecision, MarketType, RequestDescriptor,
};

pub const MOCK_IDENTITY: ExchangeIdentity = ExchangeIdentity {
    id: "mock",
    name: "Mock",
    countries: &[],
    version: "v1",
    rate_limit_ms: 0,
    alias_of: None,
};

const MOCK_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "markets" => 2.0,
]);

const MOCK_ERRORS: ErrorTable = ErrorTable {
    exact: &[("ORDER_NOT_FOUND", ErrorKind::OrderNotFound)],
    broad: &[],
};

/// Mock adapter for trait-level tests
pub struct TestMockAdapter {
    pub base_url: String,
    /// Number of times `fetch_markets` hit the "venue"
    pub market_fetches: Arc<AtomicU64>,
    transport: RestClient,
    directory: MarketDirectory,
}

impl TestMockAdapter {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            market_fetches: Arc::new(AtomicU64::new(0)),
            transport: RestClient::new("mock"),
            directory: MarketDirectory::new(),
        }
    }
}

pub fn mock_market(id: &str, base: &str, quote: &str) -> Market {
    Market {
        id: id.to_string(),
        symbol: format!("{}/{}", base, quote),
        base: base.to_string(),
        quote: quote.to_string(),
        settle: None,
        base_id: base.to_string(),
        quote_id: quote.to_string(),
        settle_id: None,
        market_type: MarketType::Spot,
        active: Some(true),
        linear: None,
        inverse: None,
        contract_size: None,
        taker: None,
        maker: None,
        precision: MarketPrecision::default(),
        limits: MarketLimits::default(),
        created: None,
        info: json!({ "symbol": id }),
    }
}

#[async_trait]
impl ExchangeAdapter for TestMockAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &MOCK_IDENTITY
    }

    fn endpoints(&self) -> &EndpointTable {
        &MOCK_ENDPOINTS
    }

    fn transport(&self) -> &RestClient {
        &self.transport
    }

    fn directory(&self) -> &MarketDirectory {
        &self.directory
    }

    fn sign(
        &self,
        path: &str,
        _tier: ApiTier,
        method: HttpMethod,
        params: Params,
    ) -> ExchangeResult<RequestDescriptor> {
        let mut url = format!("{}/{}", self.base_url, path);
        if !params.is_empty() {
            url = format!("{}?{}", url, urlencode(&params));
        }
        Ok(RequestDescriptor::new(url, method))
    }

    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let message = safe_string(response?, "error")?;
        Some(MOCK_ERRORS.classify(&[&message], &message, &format!("mock {}", body)))
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        self.market_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![mock_market("BTC_USDC", "BTC", "USDC")])
    }
}
