//! Deepwaters Adapter Implementation
//!
//! Every response is wrapped as `{success, result}` (or `{success: false,
//! code, error}`). Private routes are signed with the API key's secp256k1 key;
//! state-changing calls also carry the customer nonce, which is reloaded from
//! `customer/api-key-status` right before each POST or DELETE.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::config::DeepwatersConfig;
use super::signing::{sign_message, signing_message};
use super::types::{
    is_venue_order_id, network_code, pair_id, parse_order_status, DEEPWATERS, DEEPWATERS_ENDPOINTS, DEEPWATERS_ERRORS,
};
use crate::adapters::endpoints::{implode_path, urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::{safe_currency_code, MarketDirectory};
use crate::adapters::precise::{omit_zero, parse_precision, string_add, string_sub};
use crate::adapters::safe::{
    omit, param_string, param_string_n, safe_bool, safe_list, safe_string, safe_timestamp_micros, Params,
};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    BalanceEntry, Balances, Currency, CurrencyNetwork, ExchangeIdentity, Fee, HttpMethod, Market, MarketLimits,
    MarketPrecision, MarketType, MinMax, Order, OrderBook, OrderRequest, OrderType, RequestDescriptor, Ticker, Trade,
};
use crate::adapters::unified::{
    build_symbol, filter_by_since_limit, iso8601, now_us, parse_order_book, safe_balance, safe_order, safe_ticker,
    safe_trade, LevelLayout,
};

const JSON_CONTENT_TYPE: &str = "application/json";

const DEFAULT_DURATION: &str = "GOOD_TILL_CANCEL";

/// Order params consumed by `create_order` itself
const ORDER_PARAM_KEYS: &[&str] = &["durationType", "clientOrderId", "customerObjectId", "expiresIn", "expiresAtMicros"];

/// Spot fees from the venue's published schedule
const TAKER_FEE: &str = "0.0015";
const MAKER_FEE: &str = "0.001";

// =============================================================================
// DeepwatersAdapter Implementation
// =============================================================================

/// Deepwaters spot adapter
pub struct DeepwatersAdapter {
    pub(crate) config: DeepwatersConfig,
    identity: ExchangeIdentity,
    transport: RestClient,
    directory: MarketDirectory,
    /// Last customer nonce read from the venue
    nonce: AtomicU64,
    /// assetID -> unified code, filled by `fetch_currencies`
    asset_codes: RwLock<HashMap<String, String>>,
}

impl DeepwatersAdapter {
    pub fn new(config: DeepwatersConfig) -> Self {
        tracing::info!(
            exchange = %DEEPWATERS.id,
            phase = "init",
            url = %config.rest_base_url(),
            sandbox = config.sandbox,
            authenticated = config.credentials.api_key.is_some(),
            "Adapter created"
        );
        Self {
            transport: RestClient::with_timeout(DEEPWATERS.id, config.timeout),
            config,
            identity: DEEPWATERS,
            directory: MarketDirectory::new(),
            nonce: AtomicU64::new(0),
            asset_codes: RwLock::new(HashMap::new()),
        }
    }

    /// Nonce the next state-changing request will be signed with
    pub fn nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Read the customer nonce from `customer/api-key-status` and keep it
    pub async fn load_nonce(&self) -> ExchangeResult<u64> {
        let response = self
            .request("customer/api-key-status", ApiTier::Private, HttpMethod::Get, Params::new())
            .await?;
        let nonce = safe_string(&result_of(&response), "nonce")
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| ExchangeError::InvalidNonce(format!("{} nonce could not be found", self.exchange_name())))?;
        self.nonce.store(nonce, Ordering::SeqCst);
        tracing::debug!(exchange = %self.exchange_name(), phase = "nonce", nonce, "Nonce loaded");
        Ok(nonce)
    }

    fn asset_code(&self, asset_id: &str) -> Option<String> {
        self.asset_codes.read().unwrap_or_else(PoisonError::into_inner).get(asset_id).cloned()
    }

    fn has_asset_codes(&self) -> bool {
        !self.asset_codes.read().unwrap_or_else(PoisonError::into_inner).is_empty()
    }

    /// Market for `<baseAssetID>-<quoteAssetID>` carried by orders and trades
    fn market_for_assets(&self, entry: &Value) -> Option<Market> {
        let base = safe_string(entry, "baseAssetID")?;
        let quote = safe_string(entry, "quoteAssetID")?;
        self.directory.market_by_id(&pair_id(&base, &quote))
    }

    fn require_symbol<'a>(&self, symbol: Option<&'a str>, operation: &str) -> ExchangeResult<&'a str> {
        symbol.ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} {}() requires a symbol argument",
                self.exchange_name(),
                operation
            ))
        })
    }

    // =========================================================================
    // Parsers
    // =========================================================================

    /// Pair ids are `<baseAssetID>-<quoteAssetID>` and symbols come from the
    /// root symbols of both assets.
    pub fn parse_market(market: &Value) -> Option<Market> {
        let id = safe_string(market, "name")?;
        let base_id = safe_string(market, "baseAssetID")?;
        let quote_id = safe_string(market, "quoteAssetID")?;
        let base = safe_currency_code(&safe_string(market, "baseAssetRootSymbol")?, &[]);
        let quote = safe_currency_code(&safe_string(market, "quoteAssetRootSymbol")?, &[]);
        Some(Market {
            symbol: build_symbol(&base, &quote, None),
            id,
            base,
            quote,
            settle: None,
            base_id,
            quote_id,
            settle_id: None,
            market_type: MarketType::Spot,
            active: Some(true),
            linear: None,
            inverse: None,
            contract_size: None,
            taker: Some(TAKER_FEE.to_string()),
            maker: Some(MAKER_FEE.to_string()),
            precision: MarketPrecision {
                amount: parse_precision(safe_string(market, "baseAssetIncrementPrecision").as_deref()),
                price: parse_precision(safe_string(market, "quoteAssetIncrementPrecision").as_deref()),
            },
            limits: MarketLimits::default(),
            created: safe_timestamp_micros(market, "createdAtMicros"),
            info: market.clone(),
        })
    }

    /// One asset per chain deployment; the root symbol is the unified code
    pub fn parse_currency(asset: &Value) -> Option<Currency> {
        let id = safe_string(asset, "assetID")?;
        let code = safe_currency_code(&safe_string(asset, "rootSymbol")?, &[]);
        let precision = parse_precision(safe_string(asset, "uiDecimals").as_deref());
        let mut networks = BTreeMap::new();
        if let Some(chain_id) = safe_string(asset, "chainID") {
            let chain_name = safe_string(asset, "chainName");
            let network = network_code(chain_name.as_deref().unwrap_or(&chain_id));
            networks.insert(
                network.clone(),
                CurrencyNetwork {
                    id: chain_id,
                    network,
                    name: chain_name,
                    active: None,
                    deposit: None,
                    withdraw: None,
                    fee: None,
                    precision: precision.clone(),
                    address: safe_string(asset, "assetAddress"),
                    deposit_limits: MinMax::default(),
                    withdraw_limits: MinMax::default(),
                    info: asset.clone(),
                },
            );
        }
        Some(Currency {
            id,
            code,
            name: safe_string(asset, "name"),
            active: None,
            deposit: None,
            withdraw: None,
            fee: None,
            precision,
            networks,
            deposit_limits: MinMax::default(),
            withdraw_limits: MinMax::default(),
            info: asset.clone(),
        })
    }

    /// Pair entries double as tickers: best bid/ask and the quote time only
    pub fn parse_ticker(pair: &Value) -> Option<Ticker> {
        let base = safe_currency_code(&safe_string(pair, "baseAssetRootSymbol")?, &[]);
        let quote = safe_currency_code(&safe_string(pair, "quoteAssetRootSymbol")?, &[]);
        Some(safe_ticker(Ticker {
            symbol: Some(build_symbol(&base, &quote, None)),
            timestamp: safe_timestamp_micros(pair, "quotedAtMicros"),
            bid: safe_string(pair, "bid"),
            ask: safe_string(pair, "ask"),
            info: pair.clone(),
            ..Default::default()
        }))
    }

    /// `quantity` is what is left of `originalQuantity`
    pub fn parse_order(&self, order: &Value, market: Option<&Market>) -> Order {
        let market = market.cloned().or_else(|| self.market_for_assets(order));
        let amount = safe_string(order, "originalQuantity");
        let remaining = safe_string(order, "quantity");
        let timestamp = safe_timestamp_micros(order, "createdAtMicros");
        safe_order(Order {
            id: safe_string(order, "venueOrderID"),
            client_order_id: safe_string(order, "customerObjectID"),
            timestamp,
            datetime: iso8601(timestamp),
            last_trade_timestamp: safe_timestamp_micros(order, "modifiedAtMicros"),
            status: safe_string(order, "status").map(|s| parse_order_status(&s)),
            symbol: market.map(|m| m.symbol),
            order_type: safe_string(order, "type").map(|t| t.to_lowercase()),
            time_in_force: safe_string(order, "durationType"),
            side: safe_string(order, "side").map(|s| s.to_lowercase()),
            price: omit_zero(safe_string(order, "price")),
            average: omit_zero(safe_string(order, "averagePrice")),
            filled: string_sub(amount.as_deref(), remaining.as_deref()),
            amount,
            remaining,
            info: order.clone(),
            ..Default::default()
        })
    }

    /// Account trades. The user bought when they sat on the same side as
    /// the maker's buy flag; aggressors are reported as market orders.
    pub fn parse_trade(&self, trade: &Value, market: Option<&Market>) -> Trade {
        let market = market.cloned().or_else(|| self.market_for_assets(trade));
        let user_was_maker = safe_bool(trade, "userWasMaker");
        let maker_was_buyer = safe_bool(trade, "makerWasBuyer");
        let aggressor = safe_bool(trade, "userWasAggressor");
        let side = match (user_was_maker, maker_was_buyer) {
            (Some(user), Some(maker)) => Some(if user == maker { "buy" } else { "sell" }.to_string()),
            _ => None,
        };
        let role = if aggressor == Some(true) { "aggressor" } else { "maker" };
        let fee = safe_string(trade, &format!("{}FeesQuoteAssetAmount", role)).map(|cost| Fee {
            cost: Some(cost),
            currency: market.as_ref().map(|m| m.quote.clone()),
            rate: None,
        });
        safe_trade(Trade {
            id: safe_string(trade, "tradeID"),
            order: safe_string(trade, &format!("{}VenueOrderID", role)),
            timestamp: safe_timestamp_micros(trade, "createdAtMicros"),
            symbol: market.map(|m| m.symbol),
            order_type: aggressor.map(|a| if a { "market" } else { "limit" }.to_string()),
            side,
            taker_or_maker: user_was_maker.map(|maker| if maker { "maker" } else { "taker" }.to_string()),
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "quantity"),
            fee,
            info: trade.clone(),
            ..Default::default()
        })
    }

    /// `since` (ms) in the microseconds the venue filters on
    fn since_micros(&self, since: i64, operation: &str) -> ExchangeResult<i64> {
        since.checked_mul(1000).ok_or_else(|| {
            ExchangeError::BadRequest(format!(
                "{} {}() since {} is out of range",
                self.exchange_name(),
                operation,
                since
            ))
        })
    }

    async fn fetch_order_list(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
        status: Option<&str>,
        operation: &str,
    ) -> ExchangeResult<Vec<Order>> {
        let symbol = self.require_symbol(symbol, operation)?;
        let market = self.market(symbol).await?;
        let mut request = params.clone();
        request.insert("pair".into(), Value::from(market.id.clone()));
        if let Some(status) = status {
            request.insert("status-in".into(), Value::from(status));
        }
        if let Some(since) = since {
            request.insert("created-at-or-after-micros".into(), Value::from(self.since_micros(since, operation)?));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request("orders", ApiTier::Private, HttpMethod::Get, request).await?;
        let result = result_of(&response);
        Ok(safe_list(&result, "orders")
            .into_iter()
            .flatten()
            .map(|o| self.parse_order(o, Some(&market)))
            .collect())
    }
}

/// `customer` document: one row per (asset, service). Available funds are
/// free; fee and swap-engine holds are used. Assets without a known code are
/// skipped.
pub fn parse_balance(result: &Value, asset_code: impl Fn(&str) -> Option<String>) -> Balances {
    let timestamp = safe_timestamp_micros(result, "modifiedAtMicros");
    let mut sums: BTreeMap<String, (String, String)> = BTreeMap::new();
    for row in safe_list(result, "balances").into_iter().flatten() {
        let Some(code) = safe_string(row, "assetID").and_then(|id| asset_code(&id)) else {
            continue;
        };
        let amount = safe_string(row, "amount");
        let (free, used) = sums.entry(code).or_insert_with(|| ("0".to_string(), "0".to_string()));
        match safe_string(row, "serviceName").as_deref() {
            Some("accounting.available") => {
                if let Some(amount) = amount {
                    *free = amount;
                }
            }
            Some("fee") | Some("swap.engine") => {
                if let Some(sum) = string_add(Some(used.as_str()), amount.as_deref()) {
                    *used = sum;
                }
            }
            _ => {}
        }
    }
    let mut balances = Balances {
        timestamp,
        datetime: iso8601(timestamp),
        info: result.clone(),
        ..Default::default()
    };
    for (code, (free, used)) in sums {
        balances.currencies.insert(code, BalanceEntry::new(Some(free), Some(used), None));
    }
    safe_balance(balances)
}

fn result_of(response: &Value) -> Value {
    response.get("result").cloned().unwrap_or(Value::Null)
}

fn result_list(response: &Value) -> Vec<Value> {
    result_of(response).as_array().cloned().unwrap_or_default()
}

#[async_trait]
impl ExchangeAdapter for DeepwatersAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &self.identity
    }

    fn endpoints(&self) -> &EndpointTable {
        &DEEPWATERS_ENDPOINTS
    }

    fn transport(&self) -> &RestClient {
        &self.transport
    }

    fn directory(&self) -> &MarketDirectory {
        &self.directory
    }

    fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<RequestDescriptor> {
        self.endpoints().ensure(self.exchange_name(), tier, method, path)?;
        let mut query = params;
        let mut route = format!("/{}", implode_path(path, &mut query));
        if tier == ApiTier::Public {
            if !query.is_empty() {
                route = format!("{}?{}", route, urlencode(&query));
            }
            return Ok(RequestDescriptor::new(
                format!("{}{}", self.config.rest_base_url(), route),
                method,
            ));
        }

        let api_key = self.config.credentials.require_api_key(self.exchange_name())?;
        let secret = self.config.credentials.require_secret(self.exchange_name())?;
        let timestamp = now_us();
        let mut headers = BTreeMap::new();
        if method != HttpMethod::Post && !query.is_empty() {
            route = format!("{}?{}", route, urlencode(&query));
        }
        let body = if method == HttpMethod::Post {
            Some(Value::Object(query).to_string())
        } else {
            None
        };
        let nonce = if matches!(method, HttpMethod::Post | HttpMethod::Delete) {
            let nonce = self.nonce().to_string();
            headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
            headers.insert("X-DW-NONCE".to_string(), nonce.clone());
            nonce
        } else {
            String::new()
        };
        let message = signing_message(method, &route, timestamp, &nonce, body.as_deref().unwrap_or(""));
        let signature = sign_message(&message, secret)?;
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "sign",
            path = %path,
            signature_len = signature.len(),
            "Request signed"
        );

        headers.insert("X-DW-APIKEY".to_string(), api_key.to_string());
        headers.insert("X-DW-TSUS".to_string(), timestamp.to_string());
        headers.insert("X-DW-SIGHEX".to_string(), signature);
        Ok(RequestDescriptor {
            url: format!("{}{}", self.config.rest_base_url(), route),
            method,
            body,
            headers,
        })
    }

    /// Failures carry `success: false` with a `code` and an `error` message
    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let response = response?;
        if safe_bool(response, "success") != Some(false) {
            return None;
        }
        let code = safe_string(response, "code").unwrap_or_default();
        let message = safe_string(response, "error").unwrap_or_default();
        let feedback = format!("{} {}", self.exchange_name(), body);
        Some(DEEPWATERS_ERRORS.classify(&[&code], &message, &feedback))
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    async fn fetch_time(&self) -> ExchangeResult<i64> {
        let response = self.request("time", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let result = result_of(&response);
        safe_timestamp_micros(&result, "timestampMicros")
            .or_else(|| safe_timestamp_micros(&response, "timestampMicros"))
            .ok_or_else(|| {
                ExchangeError::InvalidResponse(format!("{} time response has no timestamp: {}", self.exchange_name(), response))
            })
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let response = self.request("pairs", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(result_list(&response).iter().filter_map(Self::parse_market).collect())
    }

    /// Also records the assetID -> code map balances are keyed through
    async fn fetch_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        let response = self.request("assets", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let currencies: Vec<Currency> = result_list(&response).iter().filter_map(Self::parse_currency).collect();
        {
            let mut codes = self.asset_codes.write().unwrap_or_else(PoisonError::into_inner);
            for currency in &currencies {
                codes.insert(currency.id.clone(), currency.code.clone());
            }
        }
        self.directory.load_currencies(currencies.clone());
        Ok(currencies)
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let wanted = [symbol.to_string()];
        self.fetch_tickers(Some(&wanted))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::BadSymbol(format!("{} has no ticker for {}", self.exchange_name(), symbol)))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        let response = self.request("pairs", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let tickers = result_list(&response)
            .iter()
            .filter_map(Self::parse_ticker)
            .filter(|t| match (symbols, &t.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(tickers)
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("pair".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("depth".into(), Value::from(limit as u64));
        }
        let response = self
            .request("pairs/{pair}/orderbook", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let result = result_of(&response);
        Ok(parse_order_book(
            &result,
            Some(&market.symbol),
            safe_timestamp_micros(&result, "snapshotAtMicros"),
            "bids",
            "asks",
            LevelLayout::Object {
                price: "price",
                amount: "quantity",
            },
        ))
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        if !self.has_asset_codes() {
            self.fetch_currencies().await?;
        }
        let response = self
            .request("customer", ApiTier::Private, HttpMethod::Get, params.clone())
            .await?;
        Ok(parse_balance(&result_of(&response), |id| self.asset_code(id)))
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        let symbol = self.require_symbol(symbol, "fetch_my_trades")?;
        let market = self.market(symbol).await?;
        let mut request = params.clone();
        request.insert("pair".into(), Value::from(market.id.clone()));
        if let Some(since) = since {
            request.insert(
                "created-at-or-after-micros".into(),
                Value::from(self.since_micros(since, "fetch_my_trades")?),
            );
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request("trades", ApiTier::Private, HttpMethod::Get, request).await?;
        let result = result_of(&response);
        let trades = safe_list(&result, "trades")
            .into_iter()
            .flatten()
            .map(|t| self.parse_trade(t, Some(&market)))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        let market = self.market(&order.symbol).await?;
        let params = &order.params;
        let duration = param_string(params, "durationType").unwrap_or_else(|| DEFAULT_DURATION.to_string());
        let customer_object_id = param_string_n(params, &["clientOrderId", "customerObjectId"]);

        let mut request = omit(params, ORDER_PARAM_KEYS);
        request.insert("baseAssetID".into(), Value::from(market.base_id.clone()));
        request.insert("quoteAssetID".into(), Value::from(market.quote_id.clone()));
        request.insert("type".into(), Value::from(order.order_type.as_str().to_uppercase()));
        request.insert("side".into(), Value::from(order.side.as_str().to_uppercase()));
        request.insert("quantity".into(), Value::from(order.amount.clone()));
        request.insert("durationType".into(), Value::from(duration.clone()));
        if let Some(id) = &customer_object_id {
            request.insert("customerObjectID".into(), Value::from(id.clone()));
        }
        if order.order_type == OrderType::Limit {
            let price = order.price.clone().ok_or_else(|| {
                ExchangeError::ArgumentsRequired(format!(
                    "{} create_order() requires a price for limit orders",
                    self.exchange_name()
                ))
            })?;
            request.insert("price".into(), Value::from(price));
            if duration == "GOOD_TILL_EXPIRY" {
                if let Some(expires_in) = param_string(params, "expiresIn") {
                    request.insert("expiresIn".into(), Value::from(expires_in));
                }
                if let Some(expires_at) = params.get("expiresAtMicros") {
                    request.insert("expiresAtMicros".into(), expires_at.clone());
                }
            }
        }

        self.load_nonce().await?;
        let response = self.request("orders", ApiTier::Private, HttpMethod::Post, request).await?;
        let result = result_of(&response);
        let timestamp = safe_timestamp_micros(&result, "respondedAtMicros");
        Ok(safe_order(Order {
            id: safe_string(&result, "venueOrderID"),
            client_order_id: customer_object_id,
            timestamp,
            datetime: iso8601(timestamp),
            status: safe_string(&result, "status").map(|s| parse_order_status(&s)),
            symbol: Some(market.symbol.clone()),
            order_type: Some(order.order_type.as_str().to_string()),
            time_in_force: Some(duration),
            side: Some(order.side.as_str().to_string()),
            price: order.price.clone(),
            amount: safe_string(&result, "originalQuantity").or_else(|| Some(order.amount.clone())),
            remaining: safe_string(&result, "quantity"),
            info: result,
            ..Default::default()
        }))
    }

    /// Ids starting with `0x` are venue ids; anything else is a customer object id
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = match symbol {
            Some(symbol) => Some(self.market(symbol).await?.symbol),
            None => None,
        };
        let path = if is_venue_order_id(id) {
            "orders/by-venue-order-id/{id}"
        } else {
            "orders/by-customer-object-id/{id}"
        };
        let mut request = params.clone();
        request.insert("id".into(), Value::from(id));
        self.load_nonce().await?;
        let response = self.request(path, ApiTier::Private, HttpMethod::Delete, request).await?;
        let result = result_of(&response);
        let timestamp = safe_timestamp_micros(&result, "respondedAtMicros");
        Ok(safe_order(Order {
            id: Some(id.to_string()),
            timestamp,
            datetime: iso8601(timestamp),
            status: Some("canceled".to_string()),
            symbol,
            info: result,
            ..Default::default()
        }))
    }

    /// The venue only reports how many orders went; the summary comes back
    /// as the `info` of a single entry.
    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        let mut market_symbol = None;
        if let Some(symbol) = symbol {
            let market = self.market(symbol).await?;
            request.insert("pair".into(), Value::from(market.id.clone()));
            market_symbol = Some(market.symbol);
        }
        self.load_nonce().await?;
        let response = self.request("orders", ApiTier::Private, HttpMethod::Delete, request).await?;
        let result = result_of(&response);
        let timestamp = safe_timestamp_micros(&result, "respondedAtMicros");
        Ok(vec![Order {
            timestamp,
            datetime: iso8601(timestamp),
            symbol: market_symbol,
            info: result,
            ..Default::default()
        }])
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        self.load_markets(false).await?;
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        let path = if is_venue_order_id(id) {
            "orders/by-venue-order-id/{id}"
        } else {
            "orders/by-customer-object-id/{id}"
        };
        let mut request = params.clone();
        request.insert("id".into(), Value::from(id));
        let response = self.request(path, ApiTier::Private, HttpMethod::Get, request).await?;
        Ok(self.parse_order(&result_of(&response), market.as_ref()))
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.fetch_order_list(symbol, since, limit, params, None, "fetch_orders").await
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.fetch_order_list(symbol, since, limit, params, Some("ACTIVE-PARTIALLY_FILLED"), "fetch_open_orders")
            .await
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.fetch_order_list(symbol, since, limit, params, Some("FILLED"), "fetch_closed_orders")
            .await
    }

    async fn fetch_canceled_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.fetch_order_list(symbol, since, limit, params, Some("CANCELLED"), "fetch_canceled_orders")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::{keccak256, parse_wallet, tests::TEST_PRIMARY_KEY};
    use crate::adapters::types::{Credentials, OrderSide};
    use ethers::core::types::{RecoveryMessage, Signature, H256};
    use ethers::signers::Signer;
    use mockito::Matcher;
    use serde_json::json;

    const BASE_ID: &str = "WAVAX.AVALANCHE_FUJI.43113.TESTNET.PROD";
    const QUOTE_ID: &str = "USDC.AVALANCHE_FUJI.43113.TESTNET.PROD";
    const PAIR: &str = "WAVAX.AVALANCHE_FUJI.43113.TESTNET.PROD-USDC.AVALANCHE_FUJI.43113.TESTNET.PROD";

    const PAIRS: &str = r#"{"success": true, "result": [{
        "baseAssetRootSymbol": "AVAX", "quoteAssetRootSymbol": "USDC",
        "baseAssetID": "WAVAX.AVALANCHE_FUJI.43113.TESTNET.PROD",
        "quoteAssetID": "USDC.AVALANCHE_FUJI.43113.TESTNET.PROD",
        "name": "WAVAX.AVALANCHE_FUJI.43113.TESTNET.PROD-USDC.AVALANCHE_FUJI.43113.TESTNET.PROD",
        "baseAssetIncrementSize": ".01", "baseAssetIncrementPrecision": "2",
        "quoteAssetIncrementSize": ".001", "quoteAssetIncrementPrecision": "3",
        "createdAtMicros": "1677695274781348", "quotedAtMicros": "1677838210968536",
        "ask": "16.418", "bid": "16.396"
    }]}"#;

    const ASSETS: &str = r#"{"success": true, "result": [
        {"assetID": "WAVAX.AVALANCHE_FUJI.43113.TESTNET.PROD", "rootSymbol": "AVAX", "name": "Wrapped AVAX",
         "chainID": "43113", "chainName": "AVALANCHE_C_CHAIN", "uiDecimals": "4",
         "assetAddress": "0xd00ae08403B9bbb9124bB305C09058E32C39A48c"},
        {"assetID": "USDC.AVALANCHE_FUJI.43113.TESTNET.PROD", "rootSymbol": "USDC", "name": "USD Coin",
         "chainID": "43113", "chainName": "AVALANCHE_C_CHAIN", "uiDecimals": "2"}
    ]}"#;

    fn adapter(url: Option<String>) -> DeepwatersAdapter {
        DeepwatersAdapter::new(DeepwatersConfig {
            rest_url: url,
            ..DeepwatersConfig::default()
        })
    }

    fn signed_adapter(url: Option<String>) -> DeepwatersAdapter {
        DeepwatersAdapter::new(DeepwatersConfig {
            rest_url: url,
            credentials: Credentials {
                api_key: Some("0xapikey".into()),
                secret: Some(TEST_PRIMARY_KEY.into()),
                ..Default::default()
            },
            ..DeepwatersConfig::default()
        })
    }

    fn recovers_signer(message: &str, signature: &str) -> bool {
        let mut raw = hex::decode(&signature[2..]).unwrap();
        raw[64] += 27;
        let parsed = Signature::try_from(raw.as_slice()).unwrap();
        let recovered = parsed
            .recover(RecoveryMessage::Hash(H256::from(keccak256(message.as_bytes()))))
            .unwrap();
        recovered == parse_wallet(TEST_PRIMARY_KEY).unwrap().address()
    }

    async fn mock_pairs(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/pairs")
            .with_status(200)
            .with_body(PAIRS)
            .create_async()
            .await
    }

    async fn mock_nonce(server: &mut mockito::ServerGuard, nonce: &str) -> mockito::Mock {
        server
            .mock("GET", "/customer/api-key-status")
            .with_status(200)
            .with_body(json!({"success": true, "result": {"nonce": nonce}}).to_string())
            .create_async()
            .await
    }

    #[test]
    fn test_public_route_implodes_pair() {
        let mut params = Params::new();
        params.insert("pair".into(), json!("ABC-DEF"));
        params.insert("depth".into(), json!(5));
        let request = adapter(None)
            .sign("pairs/{pair}/orderbook", ApiTier::Public, HttpMethod::Get, params)
            .unwrap();
        assert_eq!(request.url, "https://api.deepwaters.xyz/rest/v1/pairs/ABC-DEF/orderbook?depth=5");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_private_get_signature() {
        let mut params = Params::new();
        params.insert("pair".into(), json!("ABC-DEF"));
        let request = signed_adapter(None)
            .sign("orders", ApiTier::Private, HttpMethod::Get, params)
            .unwrap();
        assert_eq!(request.url, "https://api.deepwaters.xyz/rest/v1/orders?pair=ABC-DEF");
        assert!(request.body.is_none());
        assert!(request.header("X-DW-NONCE").is_none());
        assert_eq!(request.header("X-DW-APIKEY"), Some("0xapikey"));
        let message = format!("GET/rest/v1/orders?pair=abc-def{}", request.header("X-DW-TSUS").unwrap());
        assert!(recovers_signer(&message, request.header("X-DW-SIGHEX").unwrap()));
    }

    #[test]
    fn test_post_signs_nonce_and_body() {
        let adapter = signed_adapter(None);
        adapter.nonce.store(7, Ordering::SeqCst);
        let mut params = Params::new();
        params.insert("side".into(), json!("BUY"));
        params.insert("quantity".into(), json!("1"));
        let request = adapter.sign("orders", ApiTier::Private, HttpMethod::Post, params).unwrap();
        assert_eq!(request.url, "https://api.deepwaters.xyz/rest/v1/orders");
        assert_eq!(request.body.as_deref(), Some(r#"{"quantity":"1","side":"BUY"}"#));
        assert_eq!(request.header("X-DW-NONCE"), Some("7"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        let message = format!(
            "POST/rest/v1/orders{}7{}",
            request.header("X-DW-TSUS").unwrap(),
            request.body.as_deref().unwrap()
        );
        assert!(recovers_signer(&message, request.header("X-DW-SIGHEX").unwrap()));
    }

    #[test]
    fn test_private_without_credentials_fails() {
        let err = adapter(None)
            .sign("customer", ApiTier::Private, HttpMethod::Get, Params::new())
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthenticationError(_)));
    }

    #[test]
    fn test_auth_failures_classify_as_authentication() {
        let adapter = adapter(None);
        for body in [
            r#"{"success":false,"code":"UNAUTHORIZED","error":"api key disabled"}"#,
            r#"{"success":false,"code":"INVALID_SIGNATURE","error":"bad sig"}"#,
            r#"{"success":false,"error":"signature does not match"}"#,
        ] {
            let parsed: Value = serde_json::from_str(body).unwrap();
            assert_eq!(
                adapter.handle_errors(401, body, Some(&parsed)),
                Some(ExchangeError::AuthenticationError(format!("deepwaters {}", body)))
            );
        }
    }

    #[test]
    fn test_handle_errors() {
        let adapter = adapter(None);
        assert!(adapter
            .handle_errors(200, "", Some(&json!({"success": true, "result": []})))
            .is_none());

        let body = r#"{"success":false,"code":"INVALID_NONCE","error":"nonce too low"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            adapter.handle_errors(400, body, Some(&parsed)),
            Some(ExchangeError::InvalidNonce(format!("deepwaters {}", body)))
        );

        let body = r#"{"success":false,"error":"order not found"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert!(matches!(
            adapter.handle_errors(404, body, Some(&parsed)),
            Some(ExchangeError::OrderNotFound(_))
        ));

        let body = r#"{"success":false,"error":"???"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            adapter.handle_errors(200, body, Some(&parsed)),
            Some(ExchangeError::Exchange(format!("deepwaters {}", body)))
        );
    }

    #[test]
    fn test_parse_market() {
        let pairs: Value = serde_json::from_str(PAIRS).unwrap();
        let market = DeepwatersAdapter::parse_market(&pairs["result"][0]).unwrap();
        assert_eq!(market.symbol, "AVAX/USDC");
        assert_eq!(market.id, PAIR);
        assert_eq!(market.base_id, BASE_ID);
        assert_eq!(market.precision.amount.as_deref(), Some("0.01"));
        assert_eq!(market.precision.price.as_deref(), Some("0.001"));
        assert_eq!(market.created, Some(1_677_695_274_781));
        assert_eq!(market.market_type, MarketType::Spot);
    }

    #[test]
    fn test_parse_ticker_from_pair() {
        let pairs: Value = serde_json::from_str(PAIRS).unwrap();
        let ticker = DeepwatersAdapter::parse_ticker(&pairs["result"][0]).unwrap();
        assert_eq!(ticker.symbol.as_deref(), Some("AVAX/USDC"));
        assert_eq!(ticker.bid.as_deref(), Some("16.396"));
        assert_eq!(ticker.ask.as_deref(), Some("16.418"));
        assert_eq!(ticker.timestamp, Some(1_677_838_210_968));
        assert_eq!(ticker.last, None);
    }

    #[test]
    fn test_parse_currency_network() {
        let assets: Value = serde_json::from_str(ASSETS).unwrap();
        let avax = DeepwatersAdapter::parse_currency(&assets["result"][0]).unwrap();
        assert_eq!(avax.code, "AVAX");
        assert_eq!(avax.precision.as_deref(), Some("0.0001"));
        let network = avax.networks.get("AVAX").unwrap();
        assert_eq!(network.id, "43113");
        assert!(network.address.is_some());
    }

    #[test]
    fn test_parse_balance_sums_service_rows() {
        let result = json!({
            "modifiedAtMicros": "1677829125843553",
            "balances": [
                {"assetID": "A", "serviceName": "accounting.available", "amount": "10"},
                {"assetID": "A", "serviceName": "swap.engine", "amount": "2"},
                {"assetID": "A", "serviceName": "fee", "amount": "0.5"},
                {"assetID": "B", "serviceName": "swap.engine", "amount": "3"},
                {"assetID": "AIRDROP", "serviceName": "accounting.available", "amount": "99"}
            ]
        });
        let codes: HashMap<&str, &str> = [("A", "AVAX"), ("B", "USDC")].into_iter().collect();
        let balances = parse_balance(&result, |id| codes.get(id).map(|c| c.to_string()));
        let avax = balances.get("AVAX").unwrap();
        assert_eq!(avax.free.as_deref(), Some("10"));
        assert_eq!(avax.used.as_deref(), Some("2.5"));
        assert_eq!(avax.total.as_deref(), Some("12.5"));
        let usdc = balances.get("USDC").unwrap();
        assert_eq!(usdc.free.as_deref(), Some("0"));
        assert_eq!(usdc.total.as_deref(), Some("3"));
        assert_eq!(balances.currencies.len(), 2);
        assert_eq!(balances.timestamp, Some(1_677_829_125_843));
    }

    #[test]
    fn test_parse_order_without_markets() {
        let order = json!({
            "averagePrice": "16.4", "baseAssetID": BASE_ID, "quoteAssetID": QUOTE_ID,
            "createdAtMicros": "1677872186295635", "customerObjectID": "mine-1",
            "durationType": "GOOD_TILL_CANCEL", "modifiedAtMicros": "1677872186300000",
            "originalQuantity": "2", "quantity": "0.5", "price": "16.5", "side": "BUY",
            "status": "PARTIALLY_FILLED", "type": "LIMIT", "venueOrderID": "0xabc"
        });
        let parsed = adapter(None).parse_order(&order, None);
        assert_eq!(parsed.id.as_deref(), Some("0xabc"));
        assert_eq!(parsed.filled.as_deref(), Some("1.5"));
        assert_eq!(parsed.status.as_deref(), Some("open"));
        assert_eq!(parsed.side.as_deref(), Some("buy"));
        assert_eq!(parsed.order_type.as_deref(), Some("limit"));
        assert_eq!(parsed.symbol, None);
        assert_eq!(parsed.cost.as_deref(), Some("24.6"));
        assert_eq!(parsed.last_trade_timestamp, Some(1_677_872_186_300));
    }

    #[test]
    fn test_parse_trade_sides() {
        let adapter = adapter(None);
        let trade = json!({
            "tradeID": "t1", "createdAtMicros": "1677872186295635", "price": "16", "quantity": "2",
            "userWasMaker": false, "makerWasBuyer": true, "userWasAggressor": true,
            "aggressorVenueOrderID": "0xagg", "makerVenueOrderID": "0xmaker",
            "aggressorFeesQuoteAssetAmount": "0.048"
        });
        let parsed = adapter.parse_trade(&trade, None);
        assert_eq!(parsed.side.as_deref(), Some("sell"));
        assert_eq!(parsed.taker_or_maker.as_deref(), Some("taker"));
        assert_eq!(parsed.order_type.as_deref(), Some("market"));
        assert_eq!(parsed.order.as_deref(), Some("0xagg"));
        assert_eq!(parsed.cost.as_deref(), Some("32"));
        assert_eq!(parsed.fee.unwrap().cost.as_deref(), Some("0.048"));

        let maker = json!({"tradeID": "t2", "userWasMaker": true, "makerWasBuyer": true, "userWasAggressor": false});
        let parsed = adapter.parse_trade(&maker, None);
        assert_eq!(parsed.side.as_deref(), Some("buy"));
        assert_eq!(parsed.order_type.as_deref(), Some("limit"));
        assert_eq!(parsed.fee, None);
    }

    #[tokio::test]
    async fn test_fetch_order_book_object_levels() {
        let mut server = mockito::Server::new_async().await;
        let _pairs = mock_pairs(&mut server).await;
        let _book = server
            .mock("GET", format!("/pairs/{}/orderbook", PAIR).as_str())
            .match_query(Matcher::UrlEncoded("depth".into(), "2".into()))
            .with_status(200)
            .with_body(
                r#"{"success": true, "result": {"snapshotAtMicros": "1677844033163585",
                    "bids": [{"depth": "0", "price": "320.01", "quantity": "4"},
                             {"depth": "1", "price": "320.00", "quantity": "10"}],
                    "asks": []}}"#,
            )
            .create_async()
            .await;
        let book = adapter(Some(server.url())).fetch_order_book("AVAX/USDC", Some(2)).await.unwrap();
        assert_eq!(book.timestamp, Some(1_677_844_033_163));
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.bids[0].price, "320.01");
        assert!(book.asks.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_balance_loads_asset_codes() {
        let mut server = mockito::Server::new_async().await;
        let assets = server
            .mock("GET", "/assets")
            .with_status(200)
            .with_body(ASSETS)
            .expect(1)
            .create_async()
            .await;
        let _customer = server
            .mock("GET", "/customer")
            .match_header("X-DW-APIKEY", "0xapikey")
            .with_status(200)
            .with_body(
                json!({"success": true, "result": {"modifiedAtMicros": "1677829125843553", "balances": [
                    {"assetID": BASE_ID, "serviceName": "accounting.available", "amount": "4"},
                    {"assetID": QUOTE_ID, "serviceName": "swap.engine", "amount": "12.5"}
                ]}})
                .to_string(),
            )
            .create_async()
            .await;
        let adapter = signed_adapter(Some(server.url()));
        let balances = adapter.fetch_balance(&Params::new()).await.unwrap();
        assert_eq!(balances.get("AVAX").unwrap().total.as_deref(), Some("4"));
        assert_eq!(balances.get("USDC").unwrap().used.as_deref(), Some("12.5"));
        adapter.fetch_balance(&Params::new()).await.unwrap();
        assets.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_order_reloads_nonce() {
        let mut server = mockito::Server::new_async().await;
        let _pairs = mock_pairs(&mut server).await;
        let _nonce = mock_nonce(&mut server, "42").await;
        let order = server
            .mock("POST", "/orders")
            .match_header("X-DW-NONCE", "42")
            .match_body(Matcher::Json(json!({
                "baseAssetID": BASE_ID, "quoteAssetID": QUOTE_ID, "type": "LIMIT", "side": "BUY",
                "quantity": "1", "price": "16.4", "durationType": "GOOD_TILL_CANCEL",
                "customerObjectID": "mine-1"
            })))
            .with_status(200)
            .with_body(
                r#"{"success": true, "result": {"status": "ACTIVE", "respondedAtMicros": "1677872186295635",
                    "venueOrderID": "0x85b3", "originalQuantity": "1", "quantity": "1"}}"#,
            )
            .create_async()
            .await;

        let adapter = signed_adapter(Some(server.url()));
        let request = OrderRequest::limit("AVAX/USDC", OrderSide::Buy, "1", "16.4").with_param("clientOrderId", json!("mine-1"));
        let placed = adapter.create_order(&request).await.unwrap();
        assert_eq!(adapter.nonce(), 42);
        assert_eq!(placed.id.as_deref(), Some("0x85b3"));
        assert_eq!(placed.status.as_deref(), Some("open"));
        assert_eq!(placed.filled.as_deref(), Some("0"));
        assert_eq!(placed.client_order_id.as_deref(), Some("mine-1"));
        assert_eq!(placed.timestamp, Some(1_677_872_186_295));
        order.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_nonce_is_invalid_nonce() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/customer/api-key-status")
            .with_status(200)
            .with_body(r#"{"success": true, "result": {}}"#)
            .create_async()
            .await;
        let err = signed_adapter(Some(server.url())).load_nonce().await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidNonce(_)));
    }

    #[tokio::test]
    async fn test_cancel_order_routes_by_id_kind() {
        let mut server = mockito::Server::new_async().await;
        let _nonce = mock_nonce(&mut server, "3").await;
        let venue = server
            .mock("DELETE", "/orders/by-venue-order-id/0xabc")
            .match_header("X-DW-NONCE", "3")
            .with_status(200)
            .with_body(r#"{"success": true, "result": {"respondedAtMicros": "1677872186295635"}}"#)
            .create_async()
            .await;
        let customer = server
            .mock("DELETE", "/orders/by-customer-object-id/mine-1")
            .with_status(200)
            .with_body(r#"{"success": true, "result": {}}"#)
            .create_async()
            .await;
        let adapter = signed_adapter(Some(server.url()));
        let canceled = adapter.cancel_order("0xabc", None, &Params::new()).await.unwrap();
        assert_eq!(canceled.status.as_deref(), Some("canceled"));
        assert_eq!(canceled.timestamp, Some(1_677_872_186_295));
        adapter.cancel_order("mine-1", None, &Params::new()).await.unwrap();
        venue.assert_async().await;
        customer.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_open_orders_filters_status() {
        let mut server = mockito::Server::new_async().await;
        let _pairs = mock_pairs(&mut server).await;
        let _orders = server
            .mock("GET", "/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pair".into(), PAIR.into()),
                Matcher::UrlEncoded("status-in".into(), "ACTIVE-PARTIALLY_FILLED".into()),
                Matcher::UrlEncoded("created-at-or-after-micros".into(), "1677872186000000".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"success": true, "result": {"orders": [{
                    "baseAssetID": BASE_ID, "quoteAssetID": QUOTE_ID, "venueOrderID": "0x1",
                    "originalQuantity": "1", "quantity": "1", "status": "ACTIVE", "type": "LIMIT", "side": "SELL"
                }]}})
                .to_string(),
            )
            .create_async()
            .await;
        let orders = signed_adapter(Some(server.url()))
            .fetch_open_orders(Some("AVAX/USDC"), Some(1_677_872_186_000), None, &Params::new())
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol.as_deref(), Some("AVAX/USDC"));
        assert_eq!(orders[0].side.as_deref(), Some("sell"));
    }

    #[tokio::test]
    async fn test_fetch_canceled_orders_filters_status() {
        let mut server = mockito::Server::new_async().await;
        let _pairs = mock_pairs(&mut server).await;
        let orders = server
            .mock("GET", "/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pair".into(), PAIR.into()),
                Matcher::UrlEncoded("status-in".into(), "CANCELLED".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({"success": true, "result": {"orders": [{
                    "baseAssetID": BASE_ID, "quoteAssetID": QUOTE_ID, "venueOrderID": "0x2",
                    "originalQuantity": "1", "quantity": "1", "status": "CANCELLED", "type": "LIMIT", "side": "BUY"
                }]}})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let canceled = signed_adapter(Some(server.url()))
            .fetch_canceled_orders(Some("AVAX/USDC"), None, Some(5), &Params::new())
            .await
            .unwrap();
        assert_eq!(canceled.len(), 1);
        assert_eq!(canceled[0].status.as_deref(), Some("canceled"));
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_since_overflow_is_bad_request() {
        let mut server = mockito::Server::new_async().await;
        let _pairs = mock_pairs(&mut server).await;
        let orders = server
            .mock("GET", "/orders")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let adapter = signed_adapter(Some(server.url()));
        let err = adapter
            .fetch_closed_orders(Some("AVAX/USDC"), Some(i64::MAX / 10), None, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)), "{:?}", err);
        let err = adapter
            .fetch_my_trades(Some("AVAX/USDC"), Some(i64::MAX / 10), None, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)), "{:?}", err);
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_my_trades_requires_symbol() {
        let err = signed_adapter(None)
            .fetch_my_trades(None, None, None, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ArgumentsRequired(_)));
    }
}
