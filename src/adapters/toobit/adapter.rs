//! Toobit Adapter Implementation
//!
//! Binance-style REST: public routes are plain query strings, private routes
//! carry `recvWindow` + `timestamp` and a hex HMAC-SHA256 `signature`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use super::config::ToobitConfig;
use super::types::{parse_order_status, parse_order_type, BATCH_ORDERS_PATH, TIMEFRAMES, TOOBIT, TOOBIT_ENDPOINTS, TOOBIT_ERRORS};
use crate::adapters::endpoints::{implode_path, urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::{safe_currency_code, MarketDirectory};
use crate::adapters::precise::omit_zero;
use crate::adapters::safe::{
    omit, param_bool, param_integer, param_string, safe_bool, safe_integer, safe_integer_at, safe_integer_n,
    safe_list, safe_string, safe_string_at, safe_string_n, Params,
};
use crate::adapters::signing::hmac_sha256_hex;
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    BalanceEntry, Balances, ExchangeIdentity, ExchangeStatus, Fee, FundingRate, FundingRateHistory, HttpMethod,
    LastPrice, Market, MarketLimits, MarketPrecision, MarketType, MinMax, Ohlcv, Order, OrderBook, OrderRequest, OrderType,
    RequestDescriptor, Ticker, Trade,
};
use crate::adapters::unified::{
    build_symbol, filter_by_since_limit, iso8601, now_ms, parse_order_book, safe_balance, safe_order, safe_ticker,
    safe_trade, LevelLayout,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Order params consumed by `create_order` itself
const ORDER_PARAM_KEYS: &[&str] = &["postOnly", "timeInForce", "clientOrderId"];

// =============================================================================
// ToobitAdapter Implementation
// =============================================================================

/// Toobit spot + USDT-swap adapter
pub struct ToobitAdapter {
    pub(crate) config: ToobitConfig,
    identity: ExchangeIdentity,
    transport: RestClient,
    directory: MarketDirectory,
}

impl ToobitAdapter {
    pub fn new(config: ToobitConfig) -> Self {
        tracing::info!(
            exchange = %TOOBIT.id,
            phase = "init",
            url = %config.rest_base_url(),
            authenticated = config.credentials.api_key.is_some(),
            "Adapter created"
        );
        Self {
            transport: RestClient::with_timeout(TOOBIT.id, config.timeout),
            config,
            identity: TOOBIT,
            directory: MarketDirectory::new(),
        }
    }

    /// Unified symbol for a vendor id; unknown ids pass through unchanged
    fn symbol_for(&self, market_id: Option<String>, market: Option<&Market>) -> Option<String> {
        if let Some(market) = market {
            return Some(market.symbol.clone());
        }
        let id = market_id?;
        Some(self.directory.symbol_for_id(&id).unwrap_or(id))
    }

    // =========================================================================
    // Parsers
    // =========================================================================

    /// Spot `symbols[]` and swap `contracts[]` share one shape; contracts
    /// carry `contractMultiplier` and a `BASE-SWAP-QUOTE` base asset.
    pub fn parse_market(market: &Value) -> Option<Market> {
        let id = safe_string(market, "symbol")?;
        let base_id = safe_string(market, "baseAsset")?;
        let quote_id = safe_string(market, "quoteAsset")?;
        let base = safe_currency_code(base_id.split('-').next().unwrap_or(&base_id), &[]);
        let quote = safe_currency_code(&quote_id, &[]);
        let is_contract = market.get("contractMultiplier").is_some();
        let settle_id = if is_contract { safe_string(market, "marginToken") } else { None };
        let settle = settle_id.as_deref().map(|s| safe_currency_code(s, &[]));
        let inverse = safe_bool(market, "inverse").or_else(|| safe_bool(market, "isInverse"));

        let filters = safe_list(market, "filters").cloned().unwrap_or_default();
        let filter = |kind: &str| {
            filters
                .iter()
                .find(|f| safe_string(f, "filterType").as_deref() == Some(kind))
                .cloned()
                .unwrap_or(Value::Null)
        };
        let price_filter = filter("PRICE_FILTER");
        let lot_size = filter("LOT_SIZE");
        let min_notional = filter("MIN_NOTIONAL");

        Some(Market {
            symbol: build_symbol(&base, &quote, settle.as_deref()),
            id,
            base,
            quote,
            settle,
            base_id,
            quote_id,
            settle_id,
            market_type: if is_contract { MarketType::Swap } else { MarketType::Spot },
            active: Some(safe_string(market, "status").as_deref() == Some("TRADING")),
            linear: if is_contract { Some(!inverse.unwrap_or(false)) } else { None },
            inverse: if is_contract { Some(inverse.unwrap_or(false)) } else { None },
            contract_size: safe_string(market, "contractMultiplier"),
            taker: None,
            maker: None,
            precision: MarketPrecision {
                amount: safe_string(&lot_size, "stepSize"),
                price: safe_string(&price_filter, "tickSize"),
            },
            limits: MarketLimits {
                amount: MinMax::new(safe_string(&lot_size, "minQty"), safe_string(&lot_size, "maxQty")),
                price: MinMax::new(safe_string(&price_filter, "minPrice"), safe_string(&price_filter, "maxPrice")),
                cost: MinMax::new(safe_string(&min_notional, "minNotional"), None),
                leverage: MinMax::default(),
            },
            created: None,
            info: market.clone(),
        })
    }

    pub fn parse_ticker(&self, ticker: &Value, market: Option<&Market>) -> Ticker {
        let timestamp = safe_integer(ticker, "t");
        let last = safe_string(ticker, "c");
        safe_ticker(Ticker {
            symbol: self.symbol_for(safe_string(ticker, "s"), market),
            timestamp,
            datetime: iso8601(timestamp),
            high: safe_string(ticker, "h"),
            low: safe_string(ticker, "l"),
            open: safe_string(ticker, "o"),
            close: last.clone(),
            last,
            change: safe_string(ticker, "pc"),
            percentage: safe_string(ticker, "pcp"),
            base_volume: safe_string(ticker, "v"),
            quote_volume: safe_string(ticker, "qv"),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    /// Public trades (`t,p,q,ibm`) and account fills (`time,price,qty,isBuyer`)
    pub fn parse_trade(&self, trade: &Value, market: Option<&Market>) -> Trade {
        let side = match safe_bool(trade, "isBuyer") {
            Some(is_buyer) => Some(if is_buyer { "buy" } else { "sell" }),
            None => safe_bool(trade, "ibm").map(|buyer_maker| if buyer_maker { "sell" } else { "buy" }),
        };
        let taker_or_maker =
            safe_bool(trade, "isMaker").map(|maker| if maker { "maker" } else { "taker" }.to_string());
        let fee = safe_string(trade, "commission").map(|cost| Fee {
            cost: Some(cost),
            currency: safe_string(trade, "commissionAsset").map(|c| safe_currency_code(&c, &[])),
            rate: None,
        });
        safe_trade(Trade {
            id: safe_string(trade, "id"),
            order: safe_string(trade, "orderId"),
            timestamp: safe_integer_n(trade, &["t", "time"]),
            symbol: self.symbol_for(safe_string(trade, "symbol"), market),
            side: side.map(str::to_string),
            taker_or_maker,
            price: safe_string_n(trade, &["p", "price"]),
            amount: safe_string_n(trade, &["q", "qty"]),
            fee,
            info: trade.clone(),
            ..Default::default()
        })
    }

    pub fn parse_order(&self, order: &Value, market: Option<&Market>) -> Order {
        let timestamp = safe_integer_n(order, &["transactTime", "time"]);
        let raw_type = safe_string(order, "type");
        safe_order(Order {
            id: safe_string(order, "orderId"),
            client_order_id: safe_string(order, "clientOrderId"),
            timestamp,
            datetime: iso8601(timestamp),
            last_update_timestamp: safe_integer(order, "updateTime"),
            status: safe_string(order, "status").map(|s| parse_order_status(&s)),
            symbol: self.symbol_for(safe_string(order, "symbol"), market),
            order_type: raw_type.as_deref().map(parse_order_type),
            time_in_force: safe_string(order, "timeInForce"),
            post_only: raw_type.as_deref().map(|t| t == "LIMIT_MAKER"),
            side: safe_string(order, "side").map(|s| s.to_lowercase()),
            price: omit_zero(safe_string(order, "price")),
            trigger_price: omit_zero(safe_string(order, "stopPrice")),
            average: omit_zero(safe_string(order, "avgPrice")),
            amount: safe_string(order, "origQty"),
            filled: safe_string(order, "executedQty"),
            info: order.clone(),
            ..Default::default()
        })
    }

    fn market_for(&self, market_id: Option<&str>) -> Option<Market> {
        market_id.and_then(|id| self.directory.market_by_id(id))
    }
}

/// `[t, o, h, l, c, v, ...]` arrays or `{t|time, o|open, ...}` objects
pub fn parse_ohlcv(candle: &Value) -> Ohlcv {
    if candle.is_array() {
        return Ohlcv {
            timestamp: safe_integer_at(candle, 0),
            open: safe_string_at(candle, 1),
            high: safe_string_at(candle, 2),
            low: safe_string_at(candle, 3),
            close: safe_string_at(candle, 4),
            volume: safe_string_at(candle, 5),
        };
    }
    Ohlcv {
        timestamp: safe_integer_n(candle, &["t", "time"]),
        open: safe_string_n(candle, &["o", "open"]),
        high: safe_string_n(candle, &["h", "high"]),
        low: safe_string_n(candle, &["l", "low"]),
        close: safe_string_n(candle, &["c", "close"]),
        volume: safe_string_n(candle, &["v", "volume"]),
    }
}

pub fn parse_balance(response: &Value) -> Balances {
    let mut balances = Balances {
        info: response.clone(),
        ..Default::default()
    };
    for entry in safe_list(response, "balances").into_iter().flatten() {
        let Some(asset) = safe_string(entry, "asset") else {
            continue;
        };
        balances.currencies.insert(
            safe_currency_code(&asset, &[]),
            BalanceEntry::new(
                safe_string(entry, "free"),
                safe_string(entry, "locked"),
                safe_string(entry, "total"),
            ),
        );
    }
    safe_balance(balances)
}

/// A bare list, or the list under `data` for `{code, data}` envelopes
fn list_payload(response: &Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        other => safe_list(other, "data").cloned().unwrap_or_default(),
    }
}

#[async_trait]
impl ExchangeAdapter for ToobitAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &self.identity
    }

    fn endpoints(&self) -> &EndpointTable {
        &TOOBIT_ENDPOINTS
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
        let route = implode_path(path, &mut query);
        let mut url = format!("{}/{}", self.config.rest_base_url(), route);

        if tier == ApiTier::Public {
            if method != HttpMethod::Post && !query.is_empty() {
                url = format!("{}?{}", url, urlencode(&query));
            }
            return Ok(RequestDescriptor::new(url, method));
        }

        let api_key = self.config.credentials.require_api_key(self.exchange_name())?;
        let secret = self.config.credentials.require_secret(self.exchange_name())?;
        let mut auth = Params::new();
        auth.insert("recvWindow".into(), Value::from(self.config.recv_window_ms.to_string()));
        auth.insert("timestamp".into(), Value::from(now_ms().to_string()));

        let (mut query_string, mut body) = match method {
            HttpMethod::Post | HttpMethod::Delete if path == BATCH_ORDERS_PATH => {
                let orders = query.remove("orders").unwrap_or_else(|| Value::Array(Vec::new()));
                (urlencode(&auth), Some(orders.to_string()))
            }
            HttpMethod::Post | HttpMethod::Delete => {
                query.extend(auth);
                (String::new(), Some(urlencode(&query)))
            }
            _ => {
                query.extend(auth);
                (urlencode(&query), None)
            }
        };
        let payload = format!("{}{}", body.as_deref().unwrap_or(""), query_string);
        let signature = hmac_sha256_hex(secret, &payload)?;
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "sign",
            path = %path,
            signature_len = signature.len(),
            "Request signed"
        );
        if query_string.is_empty() {
            body = body.map(|b| format!("{}&signature={}", b, signature));
        } else {
            query_string = format!("{}&signature={}", query_string, signature);
            url = format!("{}?{}", url, query_string);
        }

        let mut headers = BTreeMap::new();
        headers.insert("X-BB-APIKEY".to_string(), api_key.to_string());
        headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
        Ok(RequestDescriptor {
            url,
            method,
            body,
            headers,
        })
    }

    /// `{code, msg}` is an error unless the code is `200` or `0`
    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let response = response?;
        let code = safe_string(response, "code")?;
        if code == "200" || code == "0" {
            return None;
        }
        let message = safe_string(response, "msg").unwrap_or_default();
        let feedback = format!("{} {}", self.exchange_name(), body);
        Some(TOOBIT_ERRORS.classify(&[&code], &message, &feedback))
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    async fn fetch_time(&self) -> ExchangeResult<i64> {
        let response = self.request("api/v1/time", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        safe_integer(&response, "serverTime").ok_or_else(|| {
            ExchangeError::InvalidResponse(format!("{} time response has no serverTime", self.exchange_name()))
        })
    }

    async fn fetch_status(&self) -> ExchangeResult<ExchangeStatus> {
        let response = self.request("api/v1/ping", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(ExchangeStatus {
            status: Some("ok".to_string()),
            info: response,
            ..Default::default()
        })
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let response = self
            .request("api/v1/exchangeInfo", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let spot = safe_list(&response, "symbols").cloned().unwrap_or_default();
        let contracts = safe_list(&response, "contracts").cloned().unwrap_or_default();
        Ok(spot
            .iter()
            .chain(contracts.iter())
            .filter_map(Self::parse_market)
            .collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let path = if market.is_contract() {
            "quote/v1/contract/ticker/24hr"
        } else {
            "quote/v1/ticker/24hr"
        };
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self.request(path, ApiTier::Public, HttpMethod::Get, request).await?;
        let ticker = match &response {
            Value::Array(items) => items.first().cloned(),
            Value::Object(_) => Some(response.clone()),
            _ => None,
        }
        .ok_or_else(|| ExchangeError::BadSymbol(format!("{} has no ticker for {}", self.exchange_name(), symbol)))?;
        Ok(self.parse_ticker(&ticker, Some(&market)))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        self.load_markets(false).await?;
        let market_type = match symbols.and_then(|s| s.first()) {
            Some(first) => self.market(first).await?.market_type,
            None => self.config.default_market_type.clone(),
        };
        let path = if market_type == MarketType::Spot {
            "quote/v1/ticker/24hr"
        } else {
            "quote/v1/contract/ticker/24hr"
        };
        let response = self.request(path, ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let tickers = list_payload(&response)
            .iter()
            .map(|t| {
                let market = self.market_for(safe_string(t, "s").as_deref());
                self.parse_ticker(t, market.as_ref())
            })
            .filter(|t| match (symbols, &t.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(tickers)
    }

    async fn fetch_last_prices(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<LastPrice>> {
        let request = self.single_symbol_request(symbols).await?;
        let response = self
            .request("quote/v1/ticker/price", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let prices = list_payload(&response)
            .iter()
            .map(|entry| {
                let market = self.market_for(safe_string(entry, "s").as_deref());
                LastPrice {
                    symbol: self.symbol_for(safe_string(entry, "s"), market.as_ref()),
                    price: omit_zero(safe_string_n(entry, &["p", "price"])),
                    info: entry.clone(),
                    ..Default::default()
                }
            })
            .filter(|p| match (symbols, &p.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(prices)
    }

    async fn fetch_bids_asks(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        let request = self.single_symbol_request(symbols).await?;
        let response = self
            .request("quote/v1/ticker/bookTicker", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let tickers = list_payload(&response)
            .iter()
            .map(|entry| {
                let market = self.market_for(safe_string(entry, "s").as_deref());
                let timestamp = safe_integer(entry, "t");
                Ticker {
                    symbol: self.symbol_for(safe_string(entry, "s"), market.as_ref()),
                    timestamp,
                    datetime: iso8601(timestamp),
                    bid: safe_string(entry, "b"),
                    bid_volume: safe_string(entry, "bq"),
                    ask: safe_string(entry, "a"),
                    ask_volume: safe_string(entry, "aq"),
                    info: entry.clone(),
                    ..Default::default()
                }
            })
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
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request("quote/v1/depth", ApiTier::Public, HttpMethod::Get, request).await?;
        Ok(parse_order_book(
            &response,
            Some(&market.symbol),
            safe_integer(&response, "t"),
            "b",
            "a",
            LevelLayout::Pair,
        ))
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        let market = self.market(symbol).await?;
        let mut request = params.clone();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request("quote/v1/trades", ApiTier::Public, HttpMethod::Get, request).await?;
        let trades = list_payload(&response)
            .iter()
            .map(|t| self.parse_trade(t, Some(&market)))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    /// `params.price` selects `index` or `mark` candles
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        if !TIMEFRAMES.contains(&timeframe) {
            return Err(ExchangeError::BadRequest(format!(
                "{} does not support timeframe {}",
                self.exchange_name(),
                timeframe
            )));
        }
        let market = self.market(symbol).await?;
        let path = match param_string(params, "price").as_deref() {
            Some("index") => "quote/v1/index/klines",
            Some("mark") => "quote/v1/markPrice/klines",
            _ => "quote/v1/klines",
        };
        let mut request = omit(params, &["price", "until"]);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("interval".into(), Value::from(timeframe));
        if let Some(since) = since {
            request.insert("startTime".into(), Value::from(since));
        }
        if let Some(until) = param_integer(params, "until") {
            request.insert("endTime".into(), Value::from(until));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request(path, ApiTier::Public, HttpMethod::Get, request).await?;
        let candles = list_payload(&response).iter().map(parse_ohlcv).collect();
        Ok(filter_by_since_limit(candles, since, limit, |c: &Ohlcv| c.timestamp))
    }

    async fn fetch_funding_rates(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<FundingRate>> {
        self.load_markets(false).await?;
        let response = self
            .request("api/v1/futures/fundingRate", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let rates = list_payload(&response)
            .iter()
            .map(|entry| {
                let next = safe_integer(entry, "nextFundingTime");
                FundingRate {
                    symbol: self.symbol_for(safe_string(entry, "symbol"), None),
                    funding_rate: safe_string(entry, "rate"),
                    next_funding_timestamp: next,
                    next_funding_datetime: iso8601(next),
                    info: entry.clone(),
                    ..Default::default()
                }
            })
            .filter(|rate| match (symbols, &rate.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(rates)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> ExchangeResult<FundingRate> {
        let market = self.market(symbol).await?;
        let symbols = [market.symbol.clone()];
        self.fetch_funding_rates(Some(&symbols[..]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ExchangeError::BadSymbol(format!("{} has no funding rate for {}", self.exchange_name(), symbol))
            })
    }

    async fn fetch_funding_rate_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<FundingRateHistory>> {
        let symbol = symbol.ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} fetch_funding_rate_history() requires a symbol argument",
                self.exchange_name()
            ))
        })?;
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self
            .request("api/v1/futures/historyFundingRate", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let mut history: Vec<FundingRateHistory> = list_payload(&response)
            .iter()
            .map(|entry| {
                let timestamp = safe_integer(entry, "settleTime");
                FundingRateHistory {
                    symbol: Some(market.symbol.clone()),
                    funding_rate: safe_string(entry, "settleRate"),
                    timestamp,
                    datetime: iso8601(timestamp),
                    info: entry.clone(),
                }
            })
            .collect();
        history.sort_by_key(|h| h.timestamp);
        Ok(filter_by_since_limit(history, since, limit, |h: &FundingRateHistory| h.timestamp))
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        let response = self
            .request("api/v1/account", ApiTier::Private, HttpMethod::Get, params.clone())
            .await?;
        Ok(parse_balance(&response))
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        let mut request = params.clone();
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        if let Some(since) = since {
            request.insert("startTime".into(), Value::from(since));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self
            .request("api/v1/account/trades", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let trades = list_payload(&response)
            .iter()
            .map(|t| {
                let resolved = market.clone().or_else(|| self.market_for(safe_string(t, "symbol").as_deref()));
                self.parse_trade(t, resolved.as_ref())
            })
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        let market = self.market(&order.symbol).await?;
        let request = self.order_request(&market, order)?;
        let response = self
            .request("api/v1/spot/order", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        Ok(self.parse_order(&response, Some(&market)))
    }

    /// Answered with `{code, result: [{code, order}]}`; an entry with a
    /// non-zero code comes back as a rejected order
    async fn create_orders(&self, orders: &[OrderRequest]) -> ExchangeResult<Vec<Order>> {
        let mut entries = Vec::with_capacity(orders.len());
        for order in orders {
            let market = self.market(&order.symbol).await?;
            entries.push(Value::Object(self.order_request(&market, order)?));
        }
        let mut request = Params::new();
        request.insert("orders".into(), Value::Array(entries));
        let response = self
            .request(BATCH_ORDERS_PATH, ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let placed = safe_list(&response, "result")
            .into_iter()
            .flatten()
            .map(|entry| {
                let code = safe_string(entry, "code").unwrap_or_else(|| "0".to_string());
                match entry.get("order") {
                    Some(order) if code == "0" || code == "200" => {
                        let market = self.market_for(safe_string(order, "symbol").as_deref());
                        self.parse_order(order, market.as_ref())
                    }
                    _ => Order {
                        status: Some("rejected".to_string()),
                        info: entry.clone(),
                        ..Default::default()
                    },
                }
            })
            .collect();
        Ok(placed)
    }

    /// A cancel answered with anything but an open status did not cancel
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let mut request = omit(params, &["clientOrderId"]);
        match param_string(params, "clientOrderId") {
            Some(client_id) => {
                request.insert("origClientOrderId".into(), Value::from(client_id));
            }
            None => {
                request.insert("orderId".into(), Value::from(id));
            }
        }
        let response = self
            .request("api/v1/spot/order", ApiTier::Private, HttpMethod::Delete, request)
            .await?;
        let status = safe_string(&response, "status").map(|s| parse_order_status(&s));
        if status.as_deref() != Some("open") {
            return Err(ExchangeError::OrderNotFound(format!(
                "{} order {} can not be canceled, {}",
                self.exchange_name(),
                id,
                response
            )));
        }
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        Ok(self.parse_order(&response, market.as_ref()))
    }

    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        if let Some(symbol) = symbol {
            let market = self.market(symbol).await?;
            request.insert("symbol".into(), Value::from(market.id));
        }
        let response = self
            .request("api/v1/spot/openOrders", ApiTier::Private, HttpMethod::Delete, request)
            .await?;
        Ok(vec![Order {
            info: response,
            ..Default::default()
        }])
    }

    /// Spot answers `{"success":true}` with no per-order detail, so each id
    /// comes back as a bare canceled order
    async fn cancel_orders(&self, ids: &[String], symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        let mut request = params.clone();
        request.insert("ids".into(), Value::from(ids.join(",")));
        let response = self
            .request("api/v1/spot/cancelOrderByIds", ApiTier::Private, HttpMethod::Delete, request)
            .await?;
        if let Some(result) = safe_list(&response, "result") {
            return Ok(result.iter().map(|o| self.parse_order(o, market.as_ref())).collect());
        }
        if safe_bool(&response, "success") != Some(true) {
            return Err(ExchangeError::Exchange(format!("{} {}", self.exchange_name(), response)));
        }
        Ok(ids
            .iter()
            .map(|id| Order {
                id: Some(id.clone()),
                status: Some("canceled".to_string()),
                symbol: market.as_ref().map(|m| m.symbol.clone()),
                info: response.clone(),
                ..Default::default()
            })
            .collect())
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let mut request = params.clone();
        request.insert("orderId".into(), Value::from(id));
        let response = self
            .request("api/v1/spot/order", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => self.market_for(safe_string(&response, "symbol").as_deref()),
        };
        Ok(self.parse_order(&response, market.as_ref()))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.orders_from("api/v1/spot/openOrders", symbol, since, limit, params).await
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        self.orders_from("api/v1/spot/tradeOrders", symbol, since, limit, params).await
    }
}

impl ToobitAdapter {
    /// `api/v1/spot/order` form for one unified order
    fn order_request(&self, market: &Market, order: &OrderRequest) -> ExchangeResult<Params> {
        let params = &order.params;
        let post_only = param_bool(params, "postOnly").unwrap_or(false)
            || param_string(params, "timeInForce").as_deref() == Some("PO");
        if post_only && order.order_type == OrderType::Market {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} market orders cannot be post-only",
                self.exchange_name()
            )));
        }

        let mut request = omit(params, ORDER_PARAM_KEYS);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("side".into(), Value::from(order.side.as_str().to_uppercase()));
        request.insert("quantity".into(), Value::from(order.amount.clone()));
        let order_type = if post_only { "LIMIT_MAKER" } else { order.order_type.as_str() };
        request.insert("type".into(), Value::from(order_type.to_uppercase()));
        if order.order_type == OrderType::Limit {
            let price = order.price.clone().ok_or_else(|| {
                ExchangeError::ArgumentsRequired(format!(
                    "{} limit orders require a price",
                    self.exchange_name()
                ))
            })?;
            request.insert("price".into(), Value::from(price));
            if !post_only {
                let tif = param_string(params, "timeInForce").unwrap_or_else(|| "GTC".to_string());
                request.insert("timeInForce".into(), Value::from(tif));
            }
        }
        if let Some(client_id) = param_string(params, "clientOrderId") {
            request.insert("newClientOrderId".into(), Value::from(client_id));
        }
        Ok(request)
    }


    /// Price tickers take `symbol` only when exactly one market is wanted
    async fn single_symbol_request(&self, symbols: Option<&[String]>) -> ExchangeResult<Params> {
        self.load_markets(false).await?;
        let mut request = Params::new();
        if let Some([only]) = symbols {
            let market = self.market(only).await?;
            request.insert("symbol".into(), Value::from(market.id));
        }
        Ok(request)
    }

    async fn orders_from(
        &self,
        path: &str,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request(path, ApiTier::Private, HttpMethod::Get, request).await?;
        let orders = list_payload(&response)
            .iter()
            .map(|o| {
                let resolved = market.clone().or_else(|| self.market_for(safe_string(o, "symbol").as_deref()));
                self.parse_order(o, resolved.as_ref())
            })
            .collect();
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }
}
