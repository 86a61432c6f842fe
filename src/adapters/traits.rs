//! Exchange adapter trait definition
//!
//! The ExchangeAdapter trait defines the common interface that all
//! exchange adapters implement. Each adapter supplies its identity, endpoint
//! table, `sign` and `handle_errors`; request dispatch and market loading
//! are provided. Operations a venue does not offer keep the default body and
//! fail with `ExchangeError::NotSupported`.

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::endpoints::{ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::MarketDirectory;
use crate::adapters::safe::Params;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    Account, Balances, Currency, DepositAddress, ExchangeIdentity, ExchangeStatus, FundingHistory, FundingRate,
    FundingRateHistory, HttpMethod, LastPrice, LedgerEntry, Leverage, MarginMode, Market, Ohlcv, OpenInterest,
    Order, OrderBook, OrderRequest, Position, RequestDescriptor, Ticker, Trade, Transaction, TransactionFee,
    Transfer,
};

/// Error for an operation the venue does not offer
pub fn not_supported(exchange: &str, operation: &str) -> ExchangeError {
    ExchangeError::NotSupported(format!("{} {}() is not supported yet", exchange, operation))
}

/// Fallback classification by HTTP status when the vendor body did not match
pub fn http_status_error(exchange: &str, status: u16, body: &str) -> ExchangeError {
    let feedback = format!("{} {}", exchange, body);
    match status {
        401 => ExchangeError::AuthenticationError(feedback),
        403 => ExchangeError::PermissionDenied(feedback),
        404 => ExchangeError::BadRequest(feedback),
        408 | 504 => ExchangeError::RequestTimeout(feedback),
        429 => ExchangeError::RateLimitExceeded(feedback),
        500..=599 => ExchangeError::ExchangeNotAvailable(feedback),
        _ => ExchangeError::Exchange(feedback),
    }
}

/// Common trait for all exchange adapters
///
/// # Example Implementation
///
/// ```ignore
/// #[async_trait]
/// impl ExchangeAdapter for ToobitAdapter {
///     fn identity(&self) -> &ExchangeIdentity { &self.identity }
///     fn endpoints(&self) -> &EndpointTable { &TOOBIT_ENDPOINTS }
///     fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params)
///         -> ExchangeResult<RequestDescriptor> { /* HMAC-SHA256 */ }
///     // ... handle_errors, transport, directory, operations
/// }
/// ```
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Static identity record (id, display name, alias target)
    fn identity(&self) -> &ExchangeIdentity;

    /// Declared REST surface with rate-limit weights
    fn endpoints(&self) -> &EndpointTable;

    /// HTTP client used by [`ExchangeAdapter::request`]
    fn transport(&self) -> &RestClient;

    /// Markets and currencies loaded by this instance
    fn directory(&self) -> &MarketDirectory;

    /// Produce the full HTTP request for an endpoint, without sending it
    ///
    /// # Arguments
    /// * `path` - Route exactly as declared in the endpoint table
    /// * `tier` - Public or private access tier
    /// * `method` - HTTP verb
    /// * `params` - Path placeholders plus query/body parameters
    ///
    /// # Returns
    /// URL, method, optional body and headers, with authentication applied
    /// for private routes. Unknown routes fail with `NotSupported`; missing
    /// credentials fail with `AuthenticationError`.
    fn sign(
        &self,
        path: &str,
        tier: ApiTier,
        method: HttpMethod,
        params: Params,
    ) -> ExchangeResult<RequestDescriptor>;

    /// Inspect a raw response and raise the mapped error, if any
    ///
    /// # Arguments
    /// * `status` - HTTP status code
    /// * `body` - Raw response text
    /// * `response` - Parsed body when it was valid JSON
    ///
    /// # Returns
    /// `None` when the venue reported no error. Exact code/message matches
    /// take priority over broad substring matches; an unrecognized vendor
    /// error becomes `ExchangeError::Exchange` carrying the raw body.
    fn handle_errors(&self, status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError>;

    /// Get the exchange id (alias ids included)
    fn exchange_name(&self) -> &'static str {
        self.identity().id
    }

    /// Rate-limit cost of a route; undeclared routes cost 1
    fn cost(&self, tier: ApiTier, method: HttpMethod, path: &str) -> f64 {
        self.endpoints().weight(tier, method, path).unwrap_or(1.0)
    }

    /// Sign, send once, classify, and parse the JSON body
    async fn request(
        &self,
        path: &str,
        tier: ApiTier,
        method: HttpMethod,
        params: Params,
    ) -> ExchangeResult<Value> {
        let exchange = self.exchange_name();
        let request = self.sign(path, tier, method, params)?;
        let response = self.transport().execute(&request).await?;
        let parsed: Option<Value> = serde_json::from_str(&response.body).ok();

        if let Some(err) = self.handle_errors(response.status, &response.body, parsed.as_ref()) {
            tracing::warn!(
                exchange = %exchange,
                phase = "request",
                method = %method,
                path = %path,
                status = response.status,
                error = %err,
                "Request rejected"
            );
            return Err(err);
        }
        if !response.is_success() {
            return Err(http_status_error(exchange, response.status, &response.body));
        }

        parsed.ok_or_else(|| {
            ExchangeError::InvalidResponse(format!(
                "Failed to parse {} {} response - body: {}",
                exchange, path, response.body
            ))
        })
    }

    /// Markets from the directory, fetching them on first use or on `reload`
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<Market>> {
        if !reload && self.directory().is_loaded() {
            return Ok(self.directory().markets());
        }
        let markets = self.fetch_markets().await?;
        tracing::info!(
            exchange = %self.exchange_name(),
            phase = "markets",
            count = markets.len(),
            "Markets loaded"
        );
        self.directory().load_markets(markets.clone());
        Ok(markets)
    }

    /// Loaded market for a unified symbol
    async fn market(&self, symbol: &str) -> ExchangeResult<Market> {
        self.load_markets(false).await?;
        self.directory().market(self.exchange_name(), symbol)
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    /// Venue server time in milliseconds
    async fn fetch_time(&self) -> ExchangeResult<i64> {
        Err(not_supported(self.exchange_name(), "fetch_time"))
    }

    async fn fetch_status(&self) -> ExchangeResult<ExchangeStatus> {
        Err(not_supported(self.exchange_name(), "fetch_status"))
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        Err(not_supported(self.exchange_name(), "fetch_markets"))
    }

    async fn fetch_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        Err(not_supported(self.exchange_name(), "fetch_currencies"))
    }

    async fn fetch_ticker(&self, _symbol: &str) -> ExchangeResult<Ticker> {
        Err(not_supported(self.exchange_name(), "fetch_ticker"))
    }

    /// Tickers for `symbols`, or for every market when `None`
    async fn fetch_tickers(&self, _symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        Err(not_supported(self.exchange_name(), "fetch_tickers"))
    }

    async fn fetch_order_book(&self, _symbol: &str, _limit: Option<usize>) -> ExchangeResult<OrderBook> {
        Err(not_supported(self.exchange_name(), "fetch_order_book"))
    }

    async fn fetch_trades(
        &self,
        _symbol: &str,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        Err(not_supported(self.exchange_name(), "fetch_trades"))
    }

    /// Candles for `symbol`
    ///
    /// # Arguments
    /// * `timeframe` - Unified timeframe (`1m`, `1h`, `1d`, ...)
    async fn fetch_ohlcv(
        &self,
        _symbol: &str,
        _timeframe: &str,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        Err(not_supported(self.exchange_name(), "fetch_ohlcv"))
    }

    async fn fetch_funding_rate(&self, _symbol: &str) -> ExchangeResult<FundingRate> {
        Err(not_supported(self.exchange_name(), "fetch_funding_rate"))
    }

    async fn fetch_funding_rates(&self, _symbols: Option<&[String]>) -> ExchangeResult<Vec<FundingRate>> {
        Err(not_supported(self.exchange_name(), "fetch_funding_rates"))
    }

    async fn fetch_funding_rate_history(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
    ) -> ExchangeResult<Vec<FundingRateHistory>> {
        Err(not_supported(self.exchange_name(), "fetch_funding_rate_history"))
    }

    async fn fetch_open_interest(&self, _symbol: &str) -> ExchangeResult<OpenInterest> {
        Err(not_supported(self.exchange_name(), "fetch_open_interest"))
    }

    async fn fetch_open_interests(&self, _symbols: Option<&[String]>) -> ExchangeResult<Vec<OpenInterest>> {
        Err(not_supported(self.exchange_name(), "fetch_open_interests"))
    }

    async fn fetch_last_prices(&self, _symbols: Option<&[String]>) -> ExchangeResult<Vec<LastPrice>> {
        Err(not_supported(self.exchange_name(), "fetch_last_prices"))
    }

    /// Best bid and ask per market, as tickers
    async fn fetch_bids_asks(&self, _symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        Err(not_supported(self.exchange_name(), "fetch_bids_asks"))
    }

    // =========================================================================
    // Private account data
    // =========================================================================

    async fn fetch_accounts(&self) -> ExchangeResult<Vec<Account>> {
        Err(not_supported(self.exchange_name(), "fetch_accounts"))
    }

    /// Balances per currency
    ///
    /// # Arguments
    /// * `params` - Venue extras (DEX venues accept the account address here)
    async fn fetch_balance(&self, _params: &Params) -> ExchangeResult<Balances> {
        Err(not_supported(self.exchange_name(), "fetch_balance"))
    }

    async fn fetch_positions(
        &self,
        _symbols: Option<&[String]>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Position>> {
        Err(not_supported(self.exchange_name(), "fetch_positions"))
    }

    async fn fetch_my_trades(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        Err(not_supported(self.exchange_name(), "fetch_my_trades"))
    }

    async fn fetch_transactions(
        &self,
        _code: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        Err(not_supported(self.exchange_name(), "fetch_transactions"))
    }

    async fn fetch_deposits(
        &self,
        _code: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        Err(not_supported(self.exchange_name(), "fetch_deposits"))
    }

    async fn fetch_withdrawals(
        &self,
        _code: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        Err(not_supported(self.exchange_name(), "fetch_withdrawals"))
    }

    async fn fetch_ledger(
        &self,
        _code: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<LedgerEntry>> {
        Err(not_supported(self.exchange_name(), "fetch_ledger"))
    }

    /// Funding payments settled on the account's positions
    async fn fetch_funding_history(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<FundingHistory>> {
        Err(not_supported(self.exchange_name(), "fetch_funding_history"))
    }

    async fn fetch_leverage(&self, _symbol: &str, _params: &Params) -> ExchangeResult<Leverage> {
        Err(not_supported(self.exchange_name(), "fetch_leverage"))
    }

    async fn fetch_margin_mode(&self, _symbol: &str, _params: &Params) -> ExchangeResult<MarginMode> {
        Err(not_supported(self.exchange_name(), "fetch_margin_mode"))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order on the exchange
    ///
    /// # Arguments
    /// * `order` - Unified order request; venue extras travel in `order.params`
    ///
    /// # Returns
    /// The venue's acknowledgement parsed into a unified `Order`
    async fn create_order(&self, _order: &OrderRequest) -> ExchangeResult<Order> {
        Err(not_supported(self.exchange_name(), "create_order"))
    }

    /// Place several orders in one venue call
    ///
    /// # Returns
    /// One `Order` per request, in request order; rejected legs carry
    /// status `rejected`
    async fn create_orders(&self, _orders: &[OrderRequest]) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "create_orders"))
    }

    /// Cancel an existing order
    ///
    /// # Arguments
    /// * `id` - Exchange-assigned order id
    /// * `symbol` - Required by venues that scope ids per market
    async fn cancel_order(&self, _id: &str, _symbol: Option<&str>, _params: &Params) -> ExchangeResult<Order> {
        Err(not_supported(self.exchange_name(), "cancel_order"))
    }

    async fn cancel_orders(&self, _ids: &[String], _symbol: Option<&str>, _params: &Params) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "cancel_orders"))
    }

    async fn cancel_all_orders(&self, _symbol: Option<&str>, _params: &Params) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "cancel_all_orders"))
    }

    async fn edit_order(&self, _id: &str, _order: &OrderRequest) -> ExchangeResult<Order> {
        Err(not_supported(self.exchange_name(), "edit_order"))
    }

    async fn fetch_order(&self, _id: &str, _symbol: Option<&str>, _params: &Params) -> ExchangeResult<Order> {
        Err(not_supported(self.exchange_name(), "fetch_order"))
    }

    async fn fetch_orders(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "fetch_orders"))
    }

    async fn fetch_open_orders(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "fetch_open_orders"))
    }

    async fn fetch_closed_orders(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "fetch_closed_orders"))
    }

    async fn fetch_canceled_orders(
        &self,
        _symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<usize>,
        _params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        Err(not_supported(self.exchange_name(), "fetch_canceled_orders"))
    }

    // =========================================================================
    // Funding and account settings
    // =========================================================================

    async fn withdraw(
        &self,
        _code: &str,
        _amount: &str,
        _address: &str,
        _params: &Params,
    ) -> ExchangeResult<Transaction> {
        Err(not_supported(self.exchange_name(), "withdraw"))
    }

    async fn fetch_deposit_address(&self, _code: &str, _params: &Params) -> ExchangeResult<DepositAddress> {
        Err(not_supported(self.exchange_name(), "fetch_deposit_address"))
    }

    /// Deposit addresses for `codes`, or for every funded currency when `None`
    async fn fetch_deposit_addresses(
        &self,
        _codes: Option<&[String]>,
        _params: &Params,
    ) -> ExchangeResult<Vec<DepositAddress>> {
        Err(not_supported(self.exchange_name(), "fetch_deposit_addresses"))
    }

    async fn fetch_transaction_fee(&self, _code: &str, _params: &Params) -> ExchangeResult<TransactionFee> {
        Err(not_supported(self.exchange_name(), "fetch_transaction_fee"))
    }

    async fn transfer(
        &self,
        _code: &str,
        _amount: &str,
        _from_account: &str,
        _to_account: &str,
        _params: &Params,
    ) -> ExchangeResult<Transfer> {
        Err(not_supported(self.exchange_name(), "transfer"))
    }

    async fn set_leverage(&self, _leverage: &str, _symbol: &str, _params: &Params) -> ExchangeResult<Leverage> {
        Err(not_supported(self.exchange_name(), "set_leverage"))
    }

    /// Switch between `cross` and `isolated` margin
    async fn set_margin_mode(&self, _mode: &str, _symbol: &str, _params: &Params) -> ExchangeResult<MarginMode> {
        Err(not_supported(self.exchange_name(), "set_margin_mode"))
    }

    /// Register a sub-account under the configured main account
    ///
    /// # Arguments
    /// * `name` - Sub-account identifier (an address on wallet venues)
    async fn create_sub_account(&self, _name: &str, _params: &Params) -> ExchangeResult<Account> {
        Err(not_supported(self.exchange_name(), "create_sub_account"))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::adapters::test_utils::TestMockAdapter;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_http_status_fallback() {
        assert!(matches!(http_status_error("x", 429, ""), ExchangeError::RateLimitExceeded(_)));
        assert!(matches!(http_status_error("x", 502, ""), ExchangeError::ExchangeNotAvailable(_)));
        assert_eq!(http_status_error("x", 418, "teapot"), ExchangeError::Exchange("x teapot".into()));
    }

    #[test]
    fn test_cost_defaults_to_one() {
        let adapter = TestMockAdapter::new("http://localhost");
        assert_eq!(adapter.cost(ApiTier::Public, HttpMethod::Get, "markets"), 2.0);
        assert_eq!(adapter.cost(ApiTier::Public, HttpMethod::Get, "undeclared"), 1.0);
    }

    #[tokio::test]
    async fn test_unimplemented_operation_is_not_supported() {
        let adapter = TestMockAdapter::new("http://localhost");
        let err = adapter.fetch_funding_rate("BTC/USDC:USDC").await.unwrap_err();
        assert_eq!(
            err,
            ExchangeError::NotSupported("mock fetch_funding_rate() is not supported yet".into())
        );
    }

    #[tokio::test]
    async fn test_request_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/markets")
            .with_status(200)
            .with_body(r#"{"price":76213.4842}"#)
            .create_async()
            .await;

        let adapter = TestMockAdapter::new(&server.url());
        let value = adapter
            .request("markets", ApiTier::Public, HttpMethod::Get, Params::new())
            .await
            .unwrap();
        assert_eq!(value["price"].to_string(), "76213.4842");
    }

    #[tokio::test]
    async fn test_request_runs_vendor_classifier_first() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/markets")
            .with_status(400)
            .with_body(r#"{"error":"ORDER_NOT_FOUND"}"#)
            .create_async()
            .await;

        let adapter = TestMockAdapter::new(&server.url());
        let err = adapter
            .request("markets", ApiTier::Public, HttpMethod::Get, Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_request_falls_back_to_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/markets")
            .with_status(503)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let adapter = TestMockAdapter::new(&server.url());
        let err = adapter
            .request("markets", ApiTier::Public, HttpMethod::Get, Params::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExchangeError::ExchangeNotAvailable("mock <html>maintenance</html>".into())
        );
    }

    #[tokio::test]
    async fn test_request_invalid_json_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/markets")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let adapter = TestMockAdapter::new(&server.url());
        match adapter
            .request("markets", ApiTier::Public, HttpMethod::Get, Params::new())
            .await
        {
            Err(ExchangeError::InvalidResponse(msg)) => assert!(msg.contains("not json")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_markets_caches_until_reload() {
        let adapter = TestMockAdapter::new("http://localhost");
        adapter.load_markets(false).await.unwrap();
        adapter.load_markets(false).await.unwrap();
        assert_eq!(adapter.market_fetches.load(Ordering::SeqCst), 1);
        adapter.load_markets(true).await.unwrap();
        assert_eq!(adapter.market_fetches.load(Ordering::SeqCst), 2);

        let market = adapter.market("BTC/USDC").await.unwrap();
        assert_eq!(market.id, "BTC_USDC");
        assert!(matches!(adapter.market("DOGE/USDC").await, Err(ExchangeError::BadSymbol(_))));
    }
}
