//! Core data types for exchange adapters
//!
//! Unified value objects every adapter normalizes into, plus the request
//! descriptor produced by `sign`. All prices and amounts are decimal strings;
//! an absent vendor field is `None`, never `"0"` or `""`.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// HTTP Client Constants
// =============================================================================

/// HTTP request timeout (seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// HTTP connection timeout (milliseconds)
pub const HTTP_CONNECT_TIMEOUT_MS: u64 = 3000;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 5;
/// How long idle connections stay in the pool (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 60;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Create a pooled HTTP client for one exchange
pub fn create_http_client(exchange_name: &str, timeout: Duration) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::info!(
        phase = "init",
        exchange = %exchange_name,
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = HTTP_CONNECT_TIMEOUT_MS,
        pool_max_idle = HTTP_POOL_MAX_IDLE,
        tcp_keepalive_s = HTTP_TCP_KEEPALIVE_SECS,
        "HTTP client configured"
    );
    client
}

// =============================================================================
// Identity
// =============================================================================

/// Static metadata describing one venue.
///
/// Alias venues (a testnet, a rebrand) reuse the adapter of their target and
/// only swap this record, see [`ExchangeIdentity::alias`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeIdentity {
    pub id: &'static str,
    pub name: &'static str,
    pub countries: &'static [&'static str],
    pub version: &'static str,
    /// Minimum spacing between requests the venue expects
    pub rate_limit_ms: u64,
    /// Canonical venue when this record is an alias
    pub alias_of: Option<&'static str>,
}

impl ExchangeIdentity {
    /// Same venue under another id and display name
    pub const fn alias(self, id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            alias_of: Some(self.id),
            ..self
        }
    }

    /// Id of the adapter implementation backing this record
    pub fn canonical_id(&self) -> &'static str {
        self.alias_of.unwrap_or(self.id)
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Credential material an adapter may need. Unused fields stay `None`.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub secret: Option<String>,
    /// On-chain account address (DEX venues)
    pub wallet_address: Option<String>,
    /// Private key of the wallet or agent signer
    pub private_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("wallet_address", &self.wallet_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn require<'a>(value: &'a Option<String>, exchange: &str, field: &str) -> ExchangeResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ExchangeError::AuthenticationError(format!(
                "{} requires \"{}\" credential",
                exchange, field
            ))
        })
}

impl Credentials {
    pub fn require_api_key(&self, exchange: &str) -> ExchangeResult<&str> {
        require(&self.api_key, exchange, "apiKey")
    }

    pub fn require_secret(&self, exchange: &str) -> ExchangeResult<&str> {
        require(&self.secret, exchange, "secret")
    }

    pub fn require_private_key(&self, exchange: &str) -> ExchangeResult<&str> {
        require(&self.private_key, exchange, "privateKey")
    }

    pub fn require_wallet_address(&self, exchange: &str) -> ExchangeResult<&str> {
        require(&self.wallet_address, exchange, "walletAddress")
    }

    /// Read `<PREFIX>_API_KEY`, `_SECRET`, `_WALLET_ADDRESS`, `_PRIVATE_KEY`
    pub fn from_env(prefix: &str) -> Self {
        let read = |suffix: &str| {
            std::env::var(format!("{}_{}", prefix, suffix))
                .ok()
                .filter(|v| !v.is_empty())
        };
        Self {
            api_key: read("API_KEY"),
            secret: read("SECRET"),
            wallet_address: read("WALLET_ADDRESS"),
            private_key: read("PRIVATE_KEY"),
        }
    }
}

/// Boolean environment switch; unset or empty gives `default`
pub fn env_flag(name: &str, default: bool) -> ExchangeResult<bool> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_lowercase().parse::<bool>().map_err(|_| {
            ExchangeError::BadRequest(format!("{} must be true or false, got '{}'", name, raw))
        }),
        _ => Ok(default),
    }
}

/// Non-empty environment value
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Request descriptor
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Fully resolved HTTP request produced by `sign`; no I/O has happened yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(url: String, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

// =============================================================================
// Order input
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

/// Unified order placement request
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    /// Base-currency amount as decimal text
    pub amount: String,
    pub price: Option<String>,
    /// Venue-specific extras (trigger price, time in force, client id...)
    pub params: crate::adapters::safe::Params,
}

impl OrderRequest {
    pub fn limit(symbol: &str, side: OrderSide, amount: &str, price: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            order_type: OrderType::Limit,
            side,
            amount: amount.to_string(),
            price: Some(price.to_string()),
            params: Default::default(),
        }
    }

    pub fn market(symbol: &str, side: OrderSide, amount: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            order_type: OrderType::Market,
            side,
            amount: amount.to_string(),
            price: None,
            params: Default::default(),
        }
    }

    pub fn with_param(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

// =============================================================================
// Unified structures
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketType {
    Spot,
    Swap,
    Future,
    Option,
    /// Vendor type with no unified counterpart, passed through
    Other(String),
}

impl MarketType {
    pub fn as_str(&self) -> &str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Swap => "swap",
            MarketType::Future => "future",
            MarketType::Option => "option",
            MarketType::Other(raw) => raw,
        }
    }
}

impl Serialize for MarketType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MinMax {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl MinMax {
    pub fn new(min: Option<String>, max: Option<String>) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketPrecision {
    /// Amount step size
    pub amount: Option<String>,
    /// Price tick size
    pub price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
    pub leverage: MinMax,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Market {
    pub id: String,
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub settle: Option<String>,
    pub base_id: String,
    pub quote_id: String,
    pub settle_id: Option<String>,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    pub active: Option<bool>,
    pub linear: Option<bool>,
    pub inverse: Option<bool>,
    pub contract_size: Option<String>,
    pub taker: Option<String>,
    pub maker: Option<String>,
    pub precision: MarketPrecision,
    pub limits: MarketLimits,
    pub created: Option<i64>,
    pub info: Value,
}

impl Market {
    pub fn is_spot(&self) -> bool {
        self.market_type == MarketType::Spot
    }

    pub fn is_contract(&self) -> bool {
        matches!(self.market_type, MarketType::Swap | MarketType::Future | MarketType::Option)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyNetwork {
    pub id: String,
    pub network: String,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub deposit: Option<bool>,
    pub withdraw: Option<bool>,
    pub fee: Option<String>,
    pub precision: Option<String>,
    /// Token contract address on this network
    pub address: Option<String>,
    pub deposit_limits: MinMax,
    pub withdraw_limits: MinMax,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Currency {
    pub id: String,
    pub code: String,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub deposit: Option<bool>,
    pub withdraw: Option<bool>,
    pub fee: Option<String>,
    pub precision: Option<String>,
    pub networks: BTreeMap<String, CurrencyNetwork>,
    pub deposit_limits: MinMax,
    pub withdraw_limits: MinMax,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ticker {
    pub symbol: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub bid: Option<String>,
    pub bid_volume: Option<String>,
    pub ask: Option<String>,
    pub ask_volume: Option<String>,
    pub vwap: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
    pub last: Option<String>,
    pub previous_close: Option<String>,
    pub change: Option<String>,
    pub percentage: Option<String>,
    pub average: Option<String>,
    pub base_volume: Option<String>,
    pub quote_volume: Option<String>,
    pub mark_price: Option<String>,
    pub index_price: Option<String>,
    pub info: Value,
}

/// One ladder rung
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    pub price: String,
    pub amount: String,
}

impl PriceLevel {
    pub fn new(price: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderBook {
    pub symbol: Option<String>,
    /// Best bid first
    pub bids: Vec<PriceLevel>,
    /// Best ask first
    pub asks: Vec<PriceLevel>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub nonce: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fee {
    pub cost: Option<String>,
    pub currency: Option<String>,
    pub rate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trade {
    pub id: Option<String>,
    pub order: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub side: Option<String>,
    pub taker_or_maker: Option<String>,
    pub price: Option<String>,
    pub amount: Option<String>,
    pub cost: Option<String>,
    pub fee: Option<Fee>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Order {
    pub id: Option<String>,
    pub client_order_id: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub last_trade_timestamp: Option<i64>,
    pub last_update_timestamp: Option<i64>,
    /// Unified status (`open`, `closed`, `canceled`, `rejected`, `expired`)
    /// or the raw vendor status when it has no mapping
    pub status: Option<String>,
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub time_in_force: Option<String>,
    pub post_only: Option<bool>,
    pub reduce_only: Option<bool>,
    pub side: Option<String>,
    pub price: Option<String>,
    pub trigger_price: Option<String>,
    pub stop_loss_price: Option<String>,
    pub take_profit_price: Option<String>,
    pub average: Option<String>,
    pub amount: Option<String>,
    pub filled: Option<String>,
    pub remaining: Option<String>,
    pub cost: Option<String>,
    pub fee: Option<Fee>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceEntry {
    pub free: Option<String>,
    pub used: Option<String>,
    pub total: Option<String>,
}

impl BalanceEntry {
    pub fn new(free: Option<String>, used: Option<String>, total: Option<String>) -> Self {
        Self { free, used, total }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Balances {
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    /// Keyed by unified currency code
    pub currencies: BTreeMap<String, BalanceEntry>,
    pub info: Value,
}

impl Balances {
    pub fn get(&self, code: &str) -> Option<&BalanceEntry> {
        self.currencies.get(code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Option<String>,
    pub txid: Option<String>,
    /// `deposit` or `withdrawal`
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub currency: Option<String>,
    pub network: Option<String>,
    pub amount: Option<String>,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub fee: Option<Fee>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub updated: Option<i64>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Position {
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub contracts: Option<String>,
    pub contract_size: Option<String>,
    pub entry_price: Option<String>,
    pub mark_price: Option<String>,
    pub notional: Option<String>,
    pub leverage: Option<String>,
    pub collateral: Option<String>,
    pub margin_mode: Option<String>,
    pub liquidation_price: Option<String>,
    pub unrealized_pnl: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundingRate {
    pub symbol: Option<String>,
    pub mark_price: Option<String>,
    pub index_price: Option<String>,
    pub funding_rate: Option<String>,
    pub next_funding_rate: Option<String>,
    pub next_funding_timestamp: Option<i64>,
    pub next_funding_datetime: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub interval: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundingRateHistory {
    pub symbol: Option<String>,
    pub funding_rate: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpenInterest {
    pub symbol: Option<String>,
    pub open_interest_amount: Option<String>,
    pub open_interest_value: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

/// One candle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ohlcv {
    pub timestamp: Option<i64>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transfer {
    pub id: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<String>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub status: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leverage {
    pub symbol: Option<String>,
    pub margin_mode: Option<String>,
    pub long_leverage: Option<String>,
    pub short_leverage: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarginMode {
    pub symbol: Option<String>,
    pub margin_mode: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Account {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub code: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExchangeStatus {
    /// `ok` or `maintenance` (lowercased vendor value)
    pub status: Option<String>,
    pub updated: Option<i64>,
    pub eta: Option<i64>,
    pub url: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepositAddress {
    pub currency: Option<String>,
    /// Unified network code; several networks are joined with `,`
    pub network: Option<String>,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub info: Value,
}

/// One balance change on the account
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: Option<String>,
    /// `in` or `out`
    pub direction: Option<String>,
    pub account: Option<String>,
    pub reference_id: Option<String>,
    /// `trade`, `transaction`, `transfer`, `funding`, `fee`...
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub status: Option<String>,
    pub fee: Option<Fee>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

/// Funding payment paid or received on a position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FundingHistory {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub code: Option<String>,
    pub amount: Option<String>,
    pub rate: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LastPrice {
    pub symbol: Option<String>,
    pub price: Option<String>,
    pub side: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub info: Value,
}

/// Withdrawal fee of a currency
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionFee {
    pub currency: Option<String>,
    pub fee: Option<String>,
    pub info: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: ExchangeIdentity = ExchangeIdentity {
        id: "pacifica",
        name: "Pacifica",
        countries: &[],
        version: "v1",
        rate_limit_ms: 10,
        alias_of: None,
    };

    #[test]
    fn test_alias_keeps_metadata() {
        let alias = BASE.alias("pacifica-testnet", "Pacifica Testnet");
        assert_eq!(alias.id, "pacifica-testnet");
        assert_eq!(alias.canonical_id(), "pacifica");
        assert_eq!(alias.version, "v1");
        assert_eq!(BASE.canonical_id(), "pacifica");
    }

    #[test]
    fn test_missing_credential_is_authentication_error() {
        let creds = Credentials::default();
        let err = creds.require_secret("toobit").unwrap_err();
        assert!(matches!(err, ExchangeError::AuthenticationError(_)));
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials {
            secret: Some("super-secret".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }

    #[test]
    fn test_market_type_serializes_raw_passthrough() {
        let raw = serde_json::to_string(&MarketType::Other("PREDICTION".into())).unwrap();
        assert_eq!(raw, "\"PREDICTION\"");
        assert_eq!(serde_json::to_string(&MarketType::Swap).unwrap(), "\"swap\"");
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
