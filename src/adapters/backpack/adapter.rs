//! Backpack Adapter Implementation
//!
//! Public routes are plain GETs. Private routes are ed25519-signed: every
//! (path, verb) pair maps to an `instruction` that prefixes the signed string,
//! and the base64 signature travels in `X-Signature`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use super::cache::{split_concatenated, AdapterCache, SharedCache};
use super::config::BackpackConfig;
use super::signing::{batch_signing_payload, sign_payload, signing_payload};
use super::types::{
    instruction_for, interval_for, network_code, network_id, parse_market_type, parse_order_status, parse_side,
    parse_transaction_status, BACKPACK, BACKPACK_ENDPOINTS, BACKPACK_ERRORS, BATCH_ORDERS_PATH, BROKER_ID,
};
use crate::adapters::endpoints::{urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::{currency_id_for_code, safe_currency_code, MarketDirectory};
use crate::adapters::precise::{omit_zero, string_add, string_div, string_gt};
use crate::adapters::safe::{
    omit, param_bool, param_integer, param_string, safe_bool, safe_integer, safe_list, safe_string, safe_string_n,
    safe_timestamp_micros, value_to_string, Params,
};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    Account, BalanceEntry, Balances, Currency, CurrencyNetwork, DepositAddress, ExchangeIdentity, ExchangeStatus, Fee,
    FundingHistory, FundingRate, FundingRateHistory, HttpMethod, Market, MarketLimits, MarketPrecision, MarketType,
    MinMax, Ohlcv, OpenInterest, Order, OrderBook, OrderRequest, OrderType, Position, RequestDescriptor, Ticker,
    Trade, Transaction,
};
use crate::adapters::unified::{
    build_symbol, filter_by_since_limit, iso8601, now_ms, parse8601, parse_order_book, safe_balance, safe_order,
    safe_ticker, safe_trade, LevelLayout,
};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Venue cap on `limit` for trades and funding history
const MAX_PAGE: usize = 1000;

/// Order params consumed by `create_order` itself
const ORDER_PARAM_KEYS: &[&str] = &["postOnly", "timeInForce", "clientOrderId", "reduceOnly", "triggerPrice"];

// =============================================================================
// BackpackAdapter Implementation
// =============================================================================

/// Backpack spot + perpetual adapter
pub struct BackpackAdapter {
    pub(crate) config: BackpackConfig,
    identity: ExchangeIdentity,
    transport: RestClient,
    directory: MarketDirectory,
    cache: SharedCache,
}

impl BackpackAdapter {
    pub fn new(config: BackpackConfig) -> Self {
        Self::with_identity(config, BACKPACK)
    }

    /// Build the adapter under an identity record (`backpack-exchange` shares
    /// everything but the id and display name).
    pub fn with_identity(config: BackpackConfig, identity: ExchangeIdentity) -> Self {
        tracing::info!(
            exchange = %identity.id,
            phase = "init",
            url = %config.rest_base_url(),
            authenticated = config.credentials.api_key.is_some(),
            "Adapter created"
        );
        Self {
            transport: RestClient::with_timeout(identity.id, config.timeout),
            config,
            identity,
            directory: MarketDirectory::new(),
            cache: SharedCache::new(),
        }
    }

    /// Currency ids cached by the first `fetch_currencies`
    pub fn cached_currency_ids(&self) -> Option<Vec<String>> {
        self.cache.currency_ids()
    }

    pub fn cache_snapshot(&self) -> AdapterCache {
        self.cache.snapshot()
    }

    /// Refetch the asset list and overwrite the cached currency ids
    pub async fn refresh_currency_ids(&self) -> ExchangeResult<Vec<String>> {
        let ids: Vec<String> = self.fetch_currencies().await?.into_iter().map(|c| c.id).collect();
        self.cache.replace_currency_ids(ids.clone());
        Ok(ids)
    }

    /// Unified symbol for a vendor market id.
    ///
    /// Known markets resolve through the directory. Otherwise `BASE_QUOTE`
    /// and `BASE_QUOTE_PERP` are split on `_`, and bare concatenations fall
    /// back to the cached currency ids.
    pub fn parse_market_id(&self, market_id: &str) -> Option<String> {
        if let Some(symbol) = self.directory.symbol_for_id(market_id) {
            return Some(symbol);
        }
        let parts: Vec<&str> = market_id.split('_').collect();
        match parts.as_slice() {
            [base, quote] => {
                return Some(build_symbol(&safe_currency_code(base, &[]), &safe_currency_code(quote, &[]), None))
            }
            [base, quote, "PERP"] => {
                let quote = safe_currency_code(quote, &[]);
                return Some(build_symbol(&safe_currency_code(base, &[]), &quote, Some(&quote)));
            }
            _ => {}
        }
        let ids = self.cache.currency_ids()?;
        let (base, quote) = split_concatenated(market_id, &ids)?;
        Some(build_symbol(&safe_currency_code(&base, &[]), &safe_currency_code(&quote, &[]), None))
    }

    /// Unified symbol for a vendor id; unresolvable ids pass through
    fn symbol_for(&self, market_id: Option<String>, market: Option<&Market>) -> Option<String> {
        if let Some(market) = market {
            return Some(market.symbol.clone());
        }
        let id = market_id?;
        Some(self.parse_market_id(&id).unwrap_or(id))
    }

    fn market_for(&self, market_id: Option<&str>) -> Option<Market> {
        market_id.and_then(|id| self.directory.market_by_id(id))
    }

    async fn optional_market(&self, symbol: Option<&str>) -> ExchangeResult<Option<Market>> {
        match symbol {
            Some(symbol) => Ok(Some(self.market(symbol).await?)),
            None => Ok(None),
        }
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

    fn require_contract(&self, market: &Market, operation: &str) -> ExchangeResult<()> {
        if market.is_spot() {
            return Err(ExchangeError::BadRequest(format!(
                "{} {}() does not support spot market {}",
                self.exchange_name(),
                operation,
                market.symbol
            )));
        }
        Ok(())
    }

    /// `api/v1/order` body for one unified order
    fn order_request(&self, market: &Market, order: &OrderRequest) -> ExchangeResult<Params> {
        let params = &order.params;
        let post_only = param_bool(params, "postOnly").unwrap_or(false);
        if post_only && order.order_type == OrderType::Market {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} market orders cannot be post-only",
                self.exchange_name()
            )));
        }

        let mut request = omit(params, ORDER_PARAM_KEYS);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let side = match order.side.as_str() {
            "buy" => "Bid",
            _ => "Ask",
        };
        request.insert("side".into(), Value::from(side));
        request.insert("quantity".into(), Value::from(order.amount.clone()));
        match order.order_type {
            OrderType::Limit => {
                let price = order.price.clone().ok_or_else(|| {
                    ExchangeError::ArgumentsRequired(format!(
                        "{} limit orders require a price",
                        self.exchange_name()
                    ))
                })?;
                request.insert("orderType".into(), Value::from("Limit"));
                request.insert("price".into(), Value::from(price));
                if post_only {
                    request.insert("postOnly".into(), Value::Bool(true));
                } else {
                    let tif = param_string(params, "timeInForce").unwrap_or_else(|| "GTC".to_string());
                    request.insert("timeInForce".into(), Value::from(tif));
                }
            }
            OrderType::Market => {
                request.insert("orderType".into(), Value::from("Market"));
            }
        }
        if let Some(client_id) = param_integer(params, "clientOrderId") {
            request.insert("clientId".into(), Value::from(client_id));
        }
        if param_bool(params, "reduceOnly").unwrap_or(false) {
            request.insert("reduceOnly".into(), Value::Bool(true));
        }
        if let Some(trigger) = param_string(params, "triggerPrice") {
            request.insert("triggerPrice".into(), Value::from(trigger));
        }
        Ok(request)
    }


    /// Deposit or withdrawal history; `params.until` is sent as `until_key`
    async fn capital_history(
        &self,
        path: &str,
        kind: &str,
        until_key: &str,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        let mut request = omit(params, &["until"]);
        if let Some(since) = since {
            request.insert("from".into(), Value::from(since));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        if let Some(until) = param_integer(params, "until") {
            request.insert(until_key.into(), Value::from(until));
        }
        let response = self.request(path, ApiTier::Private, HttpMethod::Get, request).await?;
        let transactions = list_payload(&response)
            .iter()
            .map(|entry| parse_transaction(entry, Some(kind)))
            .filter(|tx| code.map_or(true, |code| tx.currency.as_deref() == Some(code)))
            .collect();
        Ok(filter_by_since_limit(transactions, since, limit, |tx: &Transaction| tx.timestamp))
    }

    // =========================================================================
    // Parsers
    // =========================================================================

    /// `api/v1/assets` entry with its per-blockchain `tokens`
    pub fn parse_currency(currency: &Value) -> Option<Currency> {
        let id = safe_string(currency, "symbol")?;
        let mut networks = BTreeMap::new();
        for token in safe_list(currency, "tokens").into_iter().flatten() {
            let Some(blockchain) = safe_string(token, "blockchain") else {
                continue;
            };
            let code = network_code(&blockchain);
            networks.insert(
                code.clone(),
                CurrencyNetwork {
                    id: blockchain,
                    network: code,
                    name: safe_string(token, "displayName"),
                    active: None,
                    deposit: safe_bool(token, "depositEnabled"),
                    withdraw: safe_bool(token, "withdrawEnabled"),
                    fee: safe_string(token, "withdrawalFee"),
                    precision: None,
                    address: safe_string(token, "contractAddress"),
                    deposit_limits: MinMax::new(safe_string(token, "minimumDeposit"), None),
                    withdraw_limits: MinMax::new(
                        safe_string(token, "minimumWithdrawal"),
                        omit_zero(safe_string(token, "maximumWithdrawal")),
                    ),
                    info: token.clone(),
                },
            );
        }
        let any_network = |flag: fn(&CurrencyNetwork) -> Option<bool>| {
            if networks.is_empty() {
                None
            } else {
                Some(networks.values().any(|n| flag(n).unwrap_or(false)))
            }
        };
        let deposit = any_network(|n| n.deposit);
        let withdraw = any_network(|n| n.withdraw);
        Some(Currency {
            code: safe_currency_code(&id, &[]),
            id,
            name: safe_string(currency, "displayName"),
            active: None,
            deposit,
            withdraw,
            fee: None,
            precision: None,
            networks,
            deposit_limits: MinMax::default(),
            withdraw_limits: MinMax::default(),
            info: currency.clone(),
        })
    }

    /// `SPOT` and `PERP` markets; perps settle in the quote currency
    pub fn parse_market(market: &Value) -> Option<Market> {
        let id = safe_string(market, "symbol")?;
        let base_id = safe_string(market, "baseSymbol")?;
        let quote_id = safe_string(market, "quoteSymbol")?;
        let base = safe_currency_code(&base_id, &[]);
        let quote = safe_currency_code(&quote_id, &[]);
        let market_type = safe_string(market, "marketType")
            .map(|t| parse_market_type(&t))
            .unwrap_or(MarketType::Spot);
        let is_swap = market_type == MarketType::Swap;
        let settle_id = if is_swap { Some(quote_id.clone()) } else { None };
        let settle = settle_id.as_deref().map(|s| safe_currency_code(s, &[]));

        let filters = market.get("filters").cloned().unwrap_or(Value::Null);
        let price = filters.get("price").cloned().unwrap_or(Value::Null);
        let quantity = filters.get("quantity").cloned().unwrap_or(Value::Null);

        Some(Market {
            symbol: build_symbol(&base, &quote, settle.as_deref()),
            id,
            base,
            quote,
            settle,
            base_id,
            quote_id,
            settle_id,
            active: Some(safe_string(market, "orderBookState").as_deref() == Some("Open")),
            linear: if is_swap { Some(true) } else { None },
            inverse: if is_swap { Some(false) } else { None },
            contract_size: if is_swap { Some("1".to_string()) } else { None },
            market_type,
            taker: None,
            maker: None,
            precision: MarketPrecision {
                amount: safe_string(&quantity, "stepSize"),
                price: safe_string(&price, "tickSize"),
            },
            limits: MarketLimits {
                amount: MinMax::new(safe_string(&quantity, "minQuantity"), safe_string(&quantity, "maxQuantity")),
                price: MinMax::new(safe_string(&price, "minPrice"), safe_string(&price, "maxPrice")),
                cost: MinMax::default(),
                leverage: MinMax::default(),
            },
            created: parse8601(safe_string(market, "createdAt").as_deref()),
            info: market.clone(),
        })
    }

    /// `priceChangePercent` is a fraction and is kept as sent
    pub fn parse_ticker(&self, ticker: &Value, market: Option<&Market>) -> Ticker {
        let last = safe_string(ticker, "lastPrice");
        safe_ticker(Ticker {
            symbol: self.symbol_for(safe_string(ticker, "symbol"), market),
            high: safe_string(ticker, "high"),
            low: safe_string(ticker, "low"),
            open: safe_string(ticker, "firstPrice"),
            close: last.clone(),
            last,
            change: safe_string(ticker, "priceChange"),
            percentage: safe_string(ticker, "priceChangePercent"),
            base_volume: safe_string(ticker, "volume"),
            quote_volume: safe_string(ticker, "quoteVolume"),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    /// Public trades (`isBuyerMaker`) and account fills (`side`, `isMaker`, `fee`)
    pub fn parse_trade(&self, trade: &Value, market: Option<&Market>) -> Trade {
        let taker_or_maker = safe_bool(trade, "isMaker")
            .or_else(|| safe_bool(trade, "isBuyerMaker"))
            .map(|maker| if maker { "maker" } else { "taker" }.to_string());
        let timestamp = safe_integer(trade, "timestamp").or_else(|| parse8601(safe_string(trade, "timestamp").as_deref()));
        let fee = safe_string(trade, "fee").map(|cost| Fee {
            cost: Some(cost),
            currency: safe_string(trade, "feeSymbol").map(|c| safe_currency_code(&c, &[])),
            rate: None,
        });
        safe_trade(Trade {
            id: safe_string(trade, "tradeId").or_else(|| safe_string(trade, "id")),
            order: safe_string(trade, "orderId"),
            timestamp,
            symbol: self.symbol_for(safe_string(trade, "symbol"), market),
            side: safe_string(trade, "side").map(|s| parse_side(&s)),
            taker_or_maker,
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "quantity"),
            cost: safe_string(trade, "quoteQuantity"),
            fee,
            info: trade.clone(),
            ..Default::default()
        })
    }

    pub fn parse_funding_rate(&self, contract: &Value, market: Option<&Market>) -> FundingRate {
        let next = safe_integer(contract, "nextFundingTimestamp");
        FundingRate {
            symbol: self.symbol_for(safe_string(contract, "symbol"), market),
            mark_price: safe_string(contract, "markPrice"),
            index_price: safe_string(contract, "indexPrice"),
            funding_rate: safe_string(contract, "fundingRate"),
            next_funding_timestamp: next,
            next_funding_datetime: iso8601(next),
            info: contract.clone(),
            ..Default::default()
        }
    }

    pub fn parse_order(&self, order: &Value, market: Option<&Market>) -> Order {
        let timestamp = safe_integer(order, "createdAt");
        let filled = safe_string(order, "executedQuantity");
        let cost = safe_string(order, "executedQuoteQuantity");
        let average = string_div(cost.as_deref(), omit_zero(filled.clone()).as_deref());
        safe_order(Order {
            id: safe_string(order, "id"),
            client_order_id: safe_string(order, "clientId"),
            timestamp,
            datetime: iso8601(timestamp),
            status: safe_string(order, "status").map(|s| parse_order_status(&s)),
            symbol: self.symbol_for(safe_string(order, "symbol"), market),
            order_type: safe_string(order, "orderType").map(|t| t.to_lowercase()),
            time_in_force: safe_string(order, "timeInForce"),
            post_only: safe_bool(order, "postOnly"),
            reduce_only: safe_bool(order, "reduceOnly"),
            side: safe_string(order, "side").map(|s| parse_side(&s)),
            price: omit_zero(safe_string(order, "price")),
            trigger_price: omit_zero(safe_string(order, "triggerPrice")),
            average,
            amount: safe_string(order, "quantity"),
            filled,
            cost,
            info: order.clone(),
            ..Default::default()
        })
    }

    fn parse_orders(&self, response: &Value, market: Option<&Market>) -> Vec<Order> {
        list_payload(response)
            .iter()
            .map(|o| {
                let resolved = market.cloned().or_else(|| self.market_for(safe_string(o, "symbol").as_deref()));
                self.parse_order(o, resolved.as_ref())
            })
            .collect()
    }

    /// The side follows the sign of `netCost`
    pub fn parse_position(&self, position: &Value, market: Option<&Market>) -> Position {
        let net_cost = safe_string(position, "netCost");
        let side = net_cost
            .as_deref()
            .map(|cost| if string_gt("0", cost) { "short" } else { "long" }.to_string());
        let timestamp = parse8601(safe_string(position, "timestamp").as_deref());
        Position {
            symbol: self.symbol_for(safe_string(position, "symbol"), market),
            side,
            contracts: safe_string(position, "netExposureQuantity"),
            entry_price: safe_string(position, "entryPrice"),
            mark_price: safe_string(position, "markPrice"),
            notional: net_cost.map(|cost| cost.trim_start_matches('-').to_string()),
            liquidation_price: safe_string(position, "estLiquidationPrice"),
            unrealized_pnl: safe_string(position, "pnlUnrealized"),
            timestamp,
            datetime: iso8601(timestamp),
            info: position.clone(),
            ..Default::default()
        }
    }

    /// Funding payment; the venue has no payment id and reports the user id
    pub fn parse_funding_payment(&self, payment: &Value, market: Option<&Market>) -> FundingHistory {
        let timestamp = parse8601(safe_string(payment, "intervalEndTimestamp").as_deref());
        FundingHistory {
            id: safe_string(payment, "userId"),
            symbol: self.symbol_for(safe_string(payment, "symbol"), market),
            code: None,
            amount: safe_string(payment, "quantity"),
            rate: safe_string(payment, "fundingRate"),
            timestamp,
            datetime: iso8601(timestamp),
            info: payment.clone(),
        }
    }
}

/// Deposits carry `source`, withdrawals `blockchain` and `fee`
pub fn parse_transaction(transaction: &Value, transaction_type: Option<&str>) -> Transaction {
    let code = safe_string(transaction, "symbol").map(|c| safe_currency_code(&c, &[]));
    let timestamp = parse8601(safe_string(transaction, "createdAt").as_deref());
    let fee = safe_string(transaction, "fee").map(|cost| Fee {
        cost: Some(cost),
        currency: code.clone(),
        rate: None,
    });
    Transaction {
        id: safe_string(transaction, "id"),
        txid: safe_string(transaction, "transactionHash"),
        transaction_type: transaction_type.map(str::to_string),
        currency: code,
        network: safe_string_n(transaction, &["source", "blockchain"]).map(|id| network_code(&id)),
        amount: safe_string(transaction, "quantity"),
        address: safe_string(transaction, "toAddress"),
        tag: safe_string(transaction, "platformMemo"),
        status: safe_string(transaction, "status").map(|s| parse_transaction_status(&s)),
        fee,
        timestamp,
        datetime: iso8601(timestamp),
        updated: None,
        info: transaction.clone(),
    }
}

/// Kline objects keyed by `start` (`YYYY-MM-DD HH:MM:SS`, UTC)
pub fn parse_ohlcv(candle: &Value) -> Ohlcv {
    Ohlcv {
        timestamp: parse8601(safe_string(candle, "start").as_deref()),
        open: safe_string(candle, "open"),
        high: safe_string(candle, "high"),
        low: safe_string(candle, "low"),
        close: safe_string(candle, "close"),
        volume: safe_string(candle, "volume"),
    }
}

/// Only the symbol is known to the venue, so the open interest is reported
/// as a value.
pub fn parse_open_interest(interest: &Value, market: &Market) -> OpenInterest {
    let timestamp = safe_integer(interest, "timestamp");
    OpenInterest {
        symbol: Some(market.symbol.clone()),
        open_interest_amount: None,
        open_interest_value: safe_string(interest, "openInterest"),
        timestamp,
        datetime: iso8601(timestamp),
        info: interest.clone(),
    }
}

pub fn parse_account(account: &Value) -> Account {
    Account {
        id: safe_string(account, "id"),
        account_type: None,
        code: safe_string(account, "currency").map(|c| safe_currency_code(&c, &[])),
        info: account.clone(),
    }
}

/// `{CODE: {available, locked, staked}}`; staked funds count as used
pub fn parse_balance(response: &Value) -> Balances {
    let mut balances = Balances {
        info: response.clone(),
        ..Default::default()
    };
    for (currency_id, entry) in response.as_object().into_iter().flatten() {
        let locked = safe_string(entry, "locked");
        let staked = safe_string(entry, "staked");
        let used = match (&locked, &staked) {
            (Some(_), Some(_)) => string_add(locked.as_deref(), staked.as_deref()),
            _ => locked.or(staked),
        };
        balances.currencies.insert(
            safe_currency_code(currency_id, &[]),
            BalanceEntry::new(safe_string(entry, "available"), used, None),
        );
    }
    safe_balance(balances)
}

fn list_payload(response: &Value) -> Vec<Value> {
    response.as_array().cloned().unwrap_or_default()
}

fn first_entry(response: &Value) -> Option<Value> {
    match response {
        Value::Array(items) => items.first().cloned(),
        Value::Object(_) => Some(response.clone()),
        _ => None,
    }
}

#[async_trait]
impl ExchangeAdapter for BackpackAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &self.identity
    }

    fn endpoints(&self) -> &EndpointTable {
        &BACKPACK_ENDPOINTS
    }

    fn transport(&self) -> &RestClient {
        &self.transport
    }

    fn directory(&self) -> &MarketDirectory {
        &self.directory
    }

    fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<RequestDescriptor> {
        self.endpoints().ensure(self.exchange_name(), tier, method, path)?;
        let mut url = format!("{}/{}", self.config.rest_base_url(), path);
        let query = urlencode(&params);
        if method == HttpMethod::Get && !query.is_empty() {
            url = format!("{}?{}", url, query);
        }
        if tier == ApiTier::Public {
            return Ok(RequestDescriptor::new(url, method));
        }

        let instruction = instruction_for(path, method).ok_or_else(|| {
            ExchangeError::NotSupported(format!(
                "{} has no signing instruction for {} {}",
                self.exchange_name(),
                method,
                path
            ))
        })?;
        let api_key = self.config.credentials.require_api_key(self.exchange_name())?;
        let secret = self.config.credentials.require_secret(self.exchange_name())?;
        let timestamp = now_ms();
        let window = self.config.recv_window_ms;
        let (payload, body) = if method == HttpMethod::Post && path == BATCH_ORDERS_PATH {
            let orders = params.get("orders").and_then(Value::as_array).cloned().unwrap_or_default();
            (batch_signing_payload(instruction, &orders, timestamp, window), Value::Array(orders))
        } else {
            (signing_payload(instruction, &params, timestamp, window), Value::Object(params))
        };
        let signature = sign_payload(secret, &payload)?;
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "sign",
            path = %path,
            instruction = %instruction,
            signature_len = signature.len(),
            "Request signed"
        );

        let mut headers = BTreeMap::new();
        headers.insert("X-API-Key".to_string(), api_key.to_string());
        headers.insert("X-Timestamp".to_string(), timestamp.to_string());
        headers.insert("X-Window".to_string(), window.to_string());
        headers.insert("X-Signature".to_string(), signature);
        headers.insert("X-Broker-Id".to_string(), BROKER_ID.to_string());
        let body = if method == HttpMethod::Get {
            None
        } else {
            headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
            Some(body.to_string())
        };
        Ok(RequestDescriptor {
            url,
            method,
            body,
            headers,
        })
    }

    /// Errors arrive as `{code, message}` with a non-2xx status
    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let response = response?;
        let code = safe_string(response, "code")?;
        let message = safe_string(response, "message").unwrap_or_default();
        let feedback = format!("{} {}", self.exchange_name(), body);
        Some(BACKPACK_ERRORS.classify(&[&code, &message], &message, &feedback))
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    /// The venue answers with a bare millisecond integer
    async fn fetch_time(&self) -> ExchangeResult<i64> {
        let response = self.request("api/v1/time", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        value_to_string(&response)
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(|| {
                ExchangeError::InvalidResponse(format!("{} time response is not an integer: {}", self.exchange_name(), response))
            })
    }

    async fn fetch_status(&self) -> ExchangeResult<ExchangeStatus> {
        let response = self.request("api/v1/status", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(ExchangeStatus {
            status: safe_string(&response, "status").map(|s| s.to_lowercase()),
            info: response,
            ..Default::default()
        })
    }

    /// Also seeds the currency-id cache used to split concatenated market ids
    async fn fetch_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        let response = self.request("api/v1/assets", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let currencies: Vec<Currency> = list_payload(&response).iter().filter_map(Self::parse_currency).collect();
        let ids: Vec<String> = currencies.iter().map(|c| c.id.clone()).collect();
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "markets",
            count = ids.len(),
            "Currency ids resolved"
        );
        self.cache.fill_currency_ids(ids);
        self.directory.load_currencies(currencies.clone());
        Ok(currencies)
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let response = self.request("api/v1/markets", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(list_payload(&response).iter().filter_map(Self::parse_market).collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self.request("api/v1/ticker", ApiTier::Public, HttpMethod::Get, request).await?;
        Ok(self.parse_ticker(&response, Some(&market)))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        self.load_markets(false).await?;
        let response = self.request("api/v1/tickers", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        let tickers = list_payload(&response)
            .iter()
            .map(|t| {
                let market = self.market_for(safe_string(t, "symbol").as_deref());
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

    /// The snapshot timestamp is in microseconds
    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self.request("api/v1/depth", ApiTier::Public, HttpMethod::Get, request).await?;
        Ok(parse_order_book(
            &response,
            Some(&market.symbol),
            safe_timestamp_micros(&response, "timestamp"),
            "bids",
            "asks",
            LevelLayout::Pair,
        ))
    }

    /// A positive `params.offset` pages through `trades/history`
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        let market = self.market(symbol).await?;
        let offset = param_integer(params, "offset").unwrap_or(0);
        let mut request = omit(params, &["offset"]);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        let path = if offset > 0 {
            request.insert("offset".into(), Value::from(offset));
            "api/v1/trades/history"
        } else {
            "api/v1/trades"
        };
        let response = self.request(path, ApiTier::Public, HttpMethod::Get, request).await?;
        let trades = list_payload(&response)
            .iter()
            .map(|t| self.parse_trade(t, Some(&market)))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    /// `since` is mandatory; `startTime`/`endTime` are sent in seconds
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        let since = since.ok_or_else(|| {
            ExchangeError::BadRequest(format!("{} fetch_ohlcv() requires a since argument", self.exchange_name()))
        })?;
        let interval = interval_for(timeframe).ok_or_else(|| {
            ExchangeError::BadRequest(format!(
                "{} does not support timeframe {}",
                self.exchange_name(),
                timeframe
            ))
        })?;
        let market = self.market(symbol).await?;
        let mut request = omit(params, &["until"]);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("interval".into(), Value::from(interval));
        request.insert("startTime".into(), Value::from(since / 1000));
        if let Some(until) = param_integer(params, "until") {
            request.insert("endTime".into(), Value::from(until / 1000));
        }
        let response = self.request("api/v1/klines", ApiTier::Public, HttpMethod::Get, request).await?;
        let candles = list_payload(&response).iter().map(parse_ohlcv).collect();
        Ok(filter_by_since_limit(candles, Some(since), limit, |c: &Ohlcv| c.timestamp))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> ExchangeResult<FundingRate> {
        let market = self.market(symbol).await?;
        self.require_contract(&market, "fetch_funding_rate")?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self.request("api/v1/markPrices", ApiTier::Public, HttpMethod::Get, request).await?;
        let entry = first_entry(&response).unwrap_or(Value::Null);
        Ok(self.parse_funding_rate(&entry, Some(&market)))
    }

    async fn fetch_funding_rates(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<FundingRate>> {
        self.load_markets(false).await?;
        let response = self
            .request("api/v1/markPrices", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let rates = list_payload(&response)
            .iter()
            .filter(|entry| self.market_for(safe_string(entry, "symbol").as_deref()).map_or(true, |m| !m.is_spot()))
            .map(|entry| {
                let market = self.market_for(safe_string(entry, "symbol").as_deref());
                self.parse_funding_rate(entry, market.as_ref())
            })
            .filter(|rate| match (symbols, &rate.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(rates)
    }

    async fn fetch_funding_rate_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<FundingRateHistory>> {
        let symbol = self.require_symbol(symbol, "fetch_funding_rate_history")?;
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        let response = self
            .request("api/v1/fundingRates", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let mut history: Vec<FundingRateHistory> = list_payload(&response)
            .iter()
            .map(|entry| {
                let datetime = safe_string(entry, "intervalEndTimestamp");
                FundingRateHistory {
                    symbol: Some(market.symbol.clone()),
                    funding_rate: safe_string(entry, "fundingRate"),
                    timestamp: parse8601(datetime.as_deref()),
                    datetime,
                    info: entry.clone(),
                }
            })
            .collect();
        history.sort_by_key(|h| h.timestamp);
        Ok(filter_by_since_limit(history, since, limit, |h: &FundingRateHistory| h.timestamp))
    }

    async fn fetch_open_interest(&self, symbol: &str) -> ExchangeResult<OpenInterest> {
        let market = self.market(symbol).await?;
        self.require_contract(&market, "fetch_open_interest")?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self
            .request("api/v1/openInterest", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let entry = first_entry(&response).unwrap_or(Value::Null);
        Ok(parse_open_interest(&entry, &market))
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn fetch_accounts(&self) -> ExchangeResult<Vec<Account>> {
        let response = self
            .request("api/v1/account", ApiTier::Private, HttpMethod::Get, Params::new())
            .await?;
        Ok(match &response {
            Value::Array(items) => items.iter().map(parse_account).collect(),
            other => vec![parse_account(other)],
        })
    }

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        let response = self
            .request("api/v1/capital", ApiTier::Private, HttpMethod::Get, params.clone())
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
        let market = self.optional_market(symbol).await?;
        let mut request = params.clone();
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        if let Some(since) = since {
            request.insert("from".into(), Value::from(since));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        let response = self
            .request("wapi/v1/history/fills", ApiTier::Private, HttpMethod::Get, request)
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

    async fn fetch_positions(&self, symbols: Option<&[String]>, params: &Params) -> ExchangeResult<Vec<Position>> {
        self.load_markets(false).await?;
        let response = self
            .request("api/v1/position", ApiTier::Private, HttpMethod::Get, params.clone())
            .await?;
        let positions = list_payload(&response)
            .iter()
            .map(|p| {
                let market = self.market_for(safe_string(p, "symbol").as_deref());
                self.parse_position(p, market.as_ref())
            })
            .filter(|p| match (symbols, &p.symbol) {
                (Some(wanted), Some(symbol)) => wanted.contains(symbol),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();
        Ok(positions)
    }

    async fn fetch_funding_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<FundingHistory>> {
        let market = self.optional_market(symbol).await?;
        let mut request = params.clone();
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        let response = self
            .request("wapi/v1/history/funding", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let payments = list_payload(&response)
            .iter()
            .map(|p| {
                let resolved = market.clone().or_else(|| self.market_for(safe_string(p, "symbol").as_deref()));
                self.parse_funding_payment(p, resolved.as_ref())
            })
            .collect();
        Ok(filter_by_since_limit(payments, since, limit, |p: &FundingHistory| p.timestamp))
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        self.capital_history("wapi/v1/capital/deposits", "deposit", "endTime", code, since, limit, params)
            .await
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        self.capital_history("wapi/v1/capital/withdrawals", "withdrawal", "to", code, since, limit, params)
            .await
    }

    /// `params.network` (unified code) is mandatory; `params.tag` becomes the
    /// `clientId`
    async fn withdraw(&self, code: &str, amount: &str, address: &str, params: &Params) -> ExchangeResult<Transaction> {
        let network = param_string(params, "network").ok_or_else(|| {
            ExchangeError::BadRequest(format!("{} withdraw() requires a network parameter", self.exchange_name()))
        })?;
        let mut request = omit(params, &["network", "tag"]);
        request.insert("symbol".into(), Value::from(currency_id_for_code(code, &[])));
        request.insert("amount".into(), Value::from(amount));
        request.insert("address".into(), Value::from(address));
        request.insert("blockchain".into(), Value::from(network_id(&network)));
        if let Some(tag) = param_string(params, "tag") {
            request.insert("clientId".into(), Value::from(tag));
        }
        let response = self
            .request("wapi/v1/capital/withdrawals", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        Ok(parse_transaction(&response, Some("withdrawal")))
    }

    async fn fetch_deposit_address(&self, code: &str, params: &Params) -> ExchangeResult<DepositAddress> {
        let network = param_string(params, "network").ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} fetch_deposit_address() requires a network parameter",
                self.exchange_name()
            ))
        })?;
        let mut request = omit(params, &["network"]);
        request.insert("blockchain".into(), Value::from(network_id(&network)));
        let response = self
            .request("wapi/v1/capital/deposit/address", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        Ok(DepositAddress {
            currency: Some(code.to_string()),
            network: Some(network.to_uppercase()),
            address: safe_string(&response, "address"),
            tag: None,
            info: response,
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        let market = self.market(&order.symbol).await?;
        let request = self.order_request(&market, order)?;
        let response = self
            .request("api/v1/order", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        Ok(self.parse_order(&response, Some(&market)))
    }

    /// One signed array; the venue answers with one order per entry
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
        Ok(self.parse_orders(&response, None))
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = self.require_symbol(symbol, "cancel_order")?;
        let market = self.market(symbol).await?;
        let mut request = omit(params, &["clientOrderId"]);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        match param_integer(params, "clientOrderId") {
            Some(client_id) => request.insert("clientId".into(), Value::from(client_id)),
            None => request.insert("orderId".into(), Value::from(id)),
        };
        let response = self
            .request("api/v1/order", ApiTier::Private, HttpMethod::Delete, request)
            .await?;
        Ok(self.parse_order(&response, Some(&market)))
    }

    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let symbol = self.require_symbol(symbol, "cancel_all_orders")?;
        let market = self.market(symbol).await?;
        let mut request = params.clone();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self
            .request("api/v1/orders", ApiTier::Private, HttpMethod::Delete, request)
            .await?;
        Ok(self.parse_orders(&response, Some(&market)))
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = self.require_symbol(symbol, "fetch_order")?;
        let market = self.market(symbol).await?;
        let mut request = params.clone();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("orderId".into(), Value::from(id));
        let response = self
            .request("api/v1/order", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        Ok(self.parse_order(&response, Some(&market)))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let market = self.optional_market(symbol).await?;
        let mut request = params.clone();
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        let response = self
            .request("api/v1/orders", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let orders = self.parse_orders(&response, market.as_ref());
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }

    /// Order history, open and finished
    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let market = self.optional_market(symbol).await?;
        let mut request = params.clone();
        if let Some(market) = &market {
            request.insert("symbol".into(), Value::from(market.id.clone()));
        }
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit.min(MAX_PAGE) as u64));
        }
        let response = self
            .request("wapi/v1/history/orders", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let orders = self.parse_orders(&response, market.as_ref());
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::{decode_ed25519_seed, ed25519_public_key, tests::TEST_ED25519_SEED};
    use crate::adapters::types::{Credentials, OrderSide};
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use mockito::Matcher;
    use serde_json::json;

    const MARKETS: &str = r#"[
        {
            "baseSymbol": "SOL", "quoteSymbol": "USDC", "symbol": "SOL_USDC", "marketType": "SPOT",
            "createdAt": "2025-01-21T06:34:54.691858", "orderBookState": "Open",
            "filters": {
                "price": {"minPrice": "0.01", "maxPrice": null, "tickSize": "0.01"},
                "quantity": {"minQuantity": "0.01", "maxQuantity": null, "stepSize": "0.01"}
            }
        },
        {
            "baseSymbol": "SOL", "quoteSymbol": "USDC", "symbol": "SOL_USDC_PERP", "marketType": "PERP",
            "createdAt": "2025-01-21T06:34:54.691858", "orderBookState": "Open",
            "filters": {
                "price": {"minPrice": "0.01", "maxPrice": "1000", "tickSize": "0.01"},
                "quantity": {"minQuantity": "0.01", "maxQuantity": null, "stepSize": "0.01"}
            }
        }
    ]"#;

    const ASSETS: &str = r#"[
        {"symbol": "JTO", "displayName": "Jito", "tokens": [{
            "blockchain": "Solana", "contractAddress": "jtojtomepa8beP8AuQc6eXt5FriJwfFMwQx2v2f9mCL",
            "depositEnabled": true, "displayName": "Jito", "maximumWithdrawal": null,
            "minimumDeposit": "0.29", "minimumWithdrawal": "0.58", "withdrawEnabled": true, "withdrawalFee": "0.29"
        }]},
        {"symbol": "USDC", "displayName": "USD Coin", "tokens": []}
    ]"#;

    fn secret() -> String {
        BASE64.encode(decode_ed25519_seed(TEST_ED25519_SEED).unwrap())
    }

    fn adapter(url: Option<String>) -> BackpackAdapter {
        BackpackAdapter::new(BackpackConfig {
            rest_url: url,
            ..BackpackConfig::default()
        })
    }

    fn signed_adapter(url: Option<String>) -> BackpackAdapter {
        BackpackAdapter::new(BackpackConfig {
            rest_url: url,
            credentials: Credentials {
                api_key: Some("api-key".into()),
                secret: Some(secret()),
                ..Default::default()
            },
            ..BackpackConfig::default()
        })
    }

    fn verify(payload: &str, signature_b64: &str) -> bool {
        let seed = decode_ed25519_seed(TEST_ED25519_SEED).unwrap();
        let key = VerifyingKey::from_bytes(&ed25519_public_key(&seed)).unwrap();
        let raw: [u8; 64] = BASE64.decode(signature_b64).unwrap().try_into().unwrap();
        key.verify(payload.as_bytes(), &Signature::from_bytes(&raw)).is_ok()
    }

    #[test]
    fn test_public_get_is_unsigned() {
        let mut params = Params::new();
        params.insert("symbol".into(), json!("SOL_USDC"));
        let request = adapter(None)
            .sign("api/v1/depth", ApiTier::Public, HttpMethod::Get, params)
            .unwrap();
        assert_eq!(request.url, "https://api.backpack.exchange/api/v1/depth?symbol=SOL_USDC");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_private_get_signs_instruction_and_query() {
        let mut params = Params::new();
        params.insert("symbol".into(), json!("SOL_USDC"));
        params.insert("orderId".into(), json!("111"));
        let request = signed_adapter(None)
            .sign("api/v1/order", ApiTier::Private, HttpMethod::Get, params)
            .unwrap();
        assert_eq!(
            request.url,
            "https://api.backpack.exchange/api/v1/order?orderId=111&symbol=SOL_USDC"
        );
        assert!(request.body.is_none());
        let timestamp = request.header("X-Timestamp").unwrap();
        assert_eq!(request.header("X-Window"), Some("5000"));
        assert_eq!(request.header("X-API-Key"), Some("api-key"));
        let payload = format!(
            "instruction=orderQuery&orderId=111&symbol=SOL_USDC&timestamp={}&window=5000",
            timestamp
        );
        assert!(verify(&payload, request.header("X-Signature").unwrap()));
    }

    #[test]
    fn test_private_delete_sends_sorted_json_body() {
        let mut params = Params::new();
        params.insert("symbol".into(), json!("SOL_USDC"));
        params.insert("orderId".into(), json!("111"));
        let request = signed_adapter(None)
            .sign("api/v1/order", ApiTier::Private, HttpMethod::Delete, params)
            .unwrap();
        assert_eq!(request.url, "https://api.backpack.exchange/api/v1/order");
        assert_eq!(request.body.as_deref(), Some(r#"{"orderId":"111","symbol":"SOL_USDC"}"#));
        assert_eq!(request.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        let payload = format!(
            "instruction=orderCancel&orderId=111&symbol=SOL_USDC&timestamp={}&window=5000",
            request.header("X-Timestamp").unwrap()
        );
        assert!(verify(&payload, request.header("X-Signature").unwrap()));
    }

    #[test]
    fn test_private_without_credentials_fails() {
        let err = adapter(None)
            .sign("api/v1/capital", ApiTier::Private, HttpMethod::Get, Params::new())
            .unwrap_err();
        assert!(matches!(err, ExchangeError::AuthenticationError(_)));
    }

    #[test]
    fn test_alias_identity() {
        let alias = BackpackAdapter::with_identity(BackpackConfig::default(), super::super::types::BACKPACK_EXCHANGE);
        assert_eq!(alias.exchange_name(), "backpack-exchange");
        assert_eq!(alias.identity().canonical_id(), "backpack");
    }

    #[test]
    fn test_auth_failures_classify_as_authentication() {
        let adapter = adapter(None);
        for body in [
            r#"{"code":"INVALID_SIGNATURE","message":"Invalid signature"}"#,
            r#"{"code":"UNAUTHORIZED","message":"Unauthorized"}"#,
        ] {
            let parsed: Value = serde_json::from_str(body).unwrap();
            assert_eq!(
                adapter.handle_errors(401, body, Some(&parsed)),
                Some(ExchangeError::AuthenticationError(format!("backpack {}", body)))
            );
        }
    }

    #[test]
    fn test_error_code_table() {
        let adapter = adapter(None);
        let cases: &[(&str, fn(&ExchangeError) -> bool)] = &[
            ("INVALID_MARKET", |e| matches!(e, ExchangeError::BadSymbol(_))),
            ("INVALID_SYMBOL", |e| matches!(e, ExchangeError::BadSymbol(_))),
            ("INSUFFICIENT_MARGIN", |e| matches!(e, ExchangeError::InsufficientFunds(_))),
            ("INSUFFICIENT_SUPPLY", |e| matches!(e, ExchangeError::InsufficientFunds(_))),
            ("MAX_LEVERAGE_REACHED", |e| matches!(e, ExchangeError::InsufficientFunds(_))),
            ("INVALID_PRICE", |e| matches!(e, ExchangeError::BadRequest(_))),
            ("INVALID_QUANTITY", |e| matches!(e, ExchangeError::BadRequest(_))),
            ("ACCOUNT_LIQUIDATING", |e| matches!(e, ExchangeError::BadRequest(_))),
            ("TIMEOUT", |e| matches!(e, ExchangeError::RequestTimeout(_))),
            ("TRADING_PAUSED", |e| matches!(e, ExchangeError::ExchangeNotAvailable(_))),
            ("RESOURCE_NOT_FOUND", |e| matches!(e, ExchangeError::ExchangeNotAvailable(_))),
            ("FORBIDDEN", |e| matches!(e, ExchangeError::OperationRejected(_))),
            ("ORDER_LIMIT", |e| matches!(e, ExchangeError::OperationRejected(_))),
            ("NOT_IMPLEMENTED", |e| matches!(e, ExchangeError::OperationFailed(_))),
            ("PRECONDITION_FAILED", |e| matches!(e, ExchangeError::OperationFailed(_))),
            ("SERVER_ERROR", |e| matches!(e, ExchangeError::NetworkError(_))),
            ("TOO_MANY_REQUESTS", |e| matches!(e, ExchangeError::RateLimitExceeded(_))),
            ("MAINTENANCE", |e| matches!(e, ExchangeError::Exchange(_))),
        ];
        for (code, expected) in cases {
            let parsed = json!({"code": code, "message": "rejected"});
            let body = parsed.to_string();
            let err = adapter.handle_errors(400, &body, Some(&parsed)).unwrap();
            assert!(expected(&err), "{} -> {:?}", code, err);
        }
    }

    #[test]
    fn test_handle_errors() {
        let adapter = adapter(None);
        assert!(adapter.handle_errors(200, "[]", Some(&json!([]))).is_none());
        assert!(adapter.handle_errors(200, "", Some(&json!({"status": "Ok"}))).is_none());

        let body = r#"{"code":"INVALID_CLIENT_REQUEST","message":"Invalid market"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            adapter.handle_errors(400, body, Some(&parsed)),
            Some(ExchangeError::BadRequest(format!("backpack {}", body)))
        );

        // the message is tried as an exact key too
        let body = r#"{"code":"SOMETHING_NEW","message":"INSUFFICIENT_MARGIN"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert!(matches!(
            adapter.handle_errors(400, body, Some(&parsed)),
            Some(ExchangeError::InsufficientFunds(_))
        ));

        let body = r#"{"code":"SOMETHING_NEW","message":"???"}"#;
        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            adapter.handle_errors(400, body, Some(&parsed)),
            Some(ExchangeError::Exchange(format!("backpack {}", body)))
        );
    }

    #[test]
    fn test_parse_spot_and_perp_markets() {
        let markets: Value = serde_json::from_str(MARKETS).unwrap();
        let spot = BackpackAdapter::parse_market(&markets[0]).unwrap();
        assert_eq!(spot.symbol, "SOL/USDC");
        assert_eq!(spot.market_type, MarketType::Spot);
        assert_eq!(spot.contract_size, None);
        assert_eq!(spot.precision.price.as_deref(), Some("0.01"));
        assert_eq!(spot.limits.price.max, None);
        assert_eq!(spot.active, Some(true));
        assert_eq!(spot.created, Some(1_737_441_294_691));

        let perp = BackpackAdapter::parse_market(&markets[1]).unwrap();
        assert_eq!(perp.symbol, "SOL/USDC:USDC");
        assert_eq!(perp.market_type, MarketType::Swap);
        assert_eq!(perp.linear, Some(true));
        assert_eq!(perp.contract_size.as_deref(), Some("1"));
        assert_eq!(perp.settle.as_deref(), Some("USDC"));
        assert_eq!(perp.limits.price.max.as_deref(), Some("1000"));
    }

    #[test]
    fn test_unknown_market_type_passes_through() {
        let market = json!({
            "baseSymbol": "BTC", "quoteSymbol": "USDC", "symbol": "BTC_USDC_DATED",
            "marketType": "DATED", "orderBookState": "Closed"
        });
        let parsed = BackpackAdapter::parse_market(&market).unwrap();
        assert_eq!(parsed.market_type, MarketType::Other("DATED".into()));
        assert_eq!(parsed.symbol, "BTC/USDC");
        assert_eq!(parsed.active, Some(false));
        assert_eq!(parsed.linear, None);
    }

    #[test]
    fn test_parse_currency_networks() {
        let assets: Value = serde_json::from_str(ASSETS).unwrap();
        let jto = BackpackAdapter::parse_currency(&assets[0]).unwrap();
        assert_eq!(jto.code, "JTO");
        assert_eq!(jto.deposit, Some(true));
        let sol = jto.networks.get("SOL").unwrap();
        assert_eq!(sol.id, "Solana");
        assert_eq!(sol.fee.as_deref(), Some("0.29"));
        assert_eq!(sol.withdraw_limits.min.as_deref(), Some("0.58"));
        assert_eq!(sol.withdraw_limits.max, None);

        let usdc = BackpackAdapter::parse_currency(&assets[1]).unwrap();
        assert!(usdc.networks.is_empty());
        assert_eq!(usdc.deposit, None);
    }

    #[test]
    fn test_parse_market_id_without_loaded_markets() {
        let adapter = adapter(None);
        assert_eq!(adapter.parse_market_id("SOL_USDC").as_deref(), Some("SOL/USDC"));
        assert_eq!(adapter.parse_market_id("SOL_USDC_PERP").as_deref(), Some("SOL/USDC:USDC"));
        assert_eq!(adapter.parse_market_id("SOLUSDC"), None);

        adapter.cache.fill_currency_ids(vec!["SOL".into(), "USDC".into()]);
        assert_eq!(adapter.parse_market_id("SOLUSDC").as_deref(), Some("SOL/USDC"));
    }

    #[test]
    fn test_parse_ticker_keeps_fractional_percentage() {
        let ticker = json!({
            "firstPrice": "327.38", "high": "337.99", "lastPrice": "317.14", "low": "300.01",
            "priceChange": "-10.24", "priceChangePercent": "-0.031279", "quoteVolume": "21584.32278",
            "symbol": "AAVE_USDC", "trades": "245", "volume": "65.823"
        });
        let parsed = adapter(None).parse_ticker(&ticker, None);
        assert_eq!(parsed.symbol.as_deref(), Some("AAVE/USDC"));
        assert_eq!(parsed.percentage.as_deref(), Some("-0.031279"));
        assert_eq!(parsed.close.as_deref(), Some("317.14"));
        assert_eq!(parsed.base_volume.as_deref(), Some("65.823"));
    }

    #[test]
    fn test_parse_trade_and_fill() {
        let adapter = adapter(None);
        let trade = json!({
            "id": 8721564, "isBuyerMaker": false, "price": "117427.6", "quantity": "0.00016",
            "quoteQuantity": "18.788416", "timestamp": 1753123916818u64
        });
        let parsed = adapter.parse_trade(&trade, None);
        assert_eq!(parsed.id.as_deref(), Some("8721564"));
        assert_eq!(parsed.taker_or_maker.as_deref(), Some("taker"));
        assert_eq!(parsed.side, None);
        assert_eq!(parsed.cost.as_deref(), Some("18.788416"));

        let fill = json!({
            "tradeId": 42, "orderId": "111", "symbol": "SOL_USDC", "side": "Ask", "isMaker": true,
            "price": "150", "quantity": "2", "fee": "0.3", "feeSymbol": "USDC",
            "timestamp": "2025-07-21T12:00:00"
        });
        let parsed = adapter.parse_trade(&fill, None);
        assert_eq!(parsed.side.as_deref(), Some("sell"));
        assert_eq!(parsed.taker_or_maker.as_deref(), Some("maker"));
        assert_eq!(parsed.cost.as_deref(), Some("300"));
        assert_eq!(parsed.timestamp, Some(1_753_099_200_000));
        assert_eq!(parsed.fee.unwrap().currency.as_deref(), Some("USDC"));
    }

    #[test]
    fn test_parse_order() {
        let order = json!({
            "id": "111", "clientId": 7, "createdAt": 1753100000000u64, "executedQuantity": "0.5",
            "executedQuoteQuantity": "75", "orderType": "Limit", "postOnly": true, "price": "150",
            "quantity": "2", "side": "Bid", "status": "PartiallyFilled", "symbol": "SOL_USDC",
            "timeInForce": "GTC", "triggerPrice": null
        });
        let parsed = adapter(None).parse_order(&order, None);
        assert_eq!(parsed.status.as_deref(), Some("open"));
        assert_eq!(parsed.side.as_deref(), Some("buy"));
        assert_eq!(parsed.order_type.as_deref(), Some("limit"));
        assert_eq!(parsed.remaining.as_deref(), Some("1.5"));
        assert_eq!(parsed.average.as_deref(), Some("150"));
        assert_eq!(parsed.client_order_id.as_deref(), Some("7"));
        assert_eq!(parsed.trigger_price, None);
        assert_eq!(parsed.symbol.as_deref(), Some("SOL/USDC"));
    }

    #[test]
    fn test_parse_balance_counts_staked_as_used() {
        let response = json!({
            "SOL": {"available": "10", "locked": "1", "staked": "2"},
            "USDC": {"available": "100", "locked": "0", "staked": "0"}
        });
        let balances = parse_balance(&response);
        let sol = balances.get("SOL").unwrap();
        assert_eq!(sol.free.as_deref(), Some("10"));
        assert_eq!(sol.used.as_deref(), Some("3"));
        assert_eq!(sol.total.as_deref(), Some("13"));
    }

    #[test]
    fn test_parse_ohlcv_start_time() {
        let candle = json!({
            "close": "118294.6", "end": "2025-07-19 13:12:00", "high": "118297.6", "low": "118237.5",
            "open": "118238", "quoteVolume": "4106.558156", "start": "2025-07-19 13:09:00",
            "trades": "12", "volume": "0.03473"
        });
        let parsed = parse_ohlcv(&candle);
        assert_eq!(parsed.timestamp, Some(1_752_930_540_000));
        assert_eq!(parsed.open.as_deref(), Some("118238"));
        assert_eq!(parsed.volume.as_deref(), Some("0.03473"));
    }

    #[tokio::test]
    async fn test_fetch_currencies_fills_cache_once() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/api/v1/assets")
            .with_status(200)
            .with_body(ASSETS)
            .create_async()
            .await;
        let adapter = adapter(Some(server.url()));
        adapter.fetch_currencies().await.unwrap();
        assert_eq!(adapter.cached_currency_ids(), Some(vec!["JTO".to_string(), "USDC".to_string()]));
        first.remove_async().await;

        let _second = server
            .mock("GET", "/api/v1/assets")
            .with_status(200)
            .with_body(r#"[{"symbol": "BTC", "tokens": []}]"#)
            .create_async()
            .await;
        adapter.fetch_currencies().await.unwrap();
        assert_eq!(adapter.cached_currency_ids(), Some(vec!["JTO".to_string(), "USDC".to_string()]));
        adapter.refresh_currency_ids().await.unwrap();
        assert_eq!(adapter.cache_snapshot().resolved_currency_ids, Some(vec!["BTC".to_string()]));
    }

    #[tokio::test]
    async fn test_fetch_order_book_micros_timestamp() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let _depth = server
            .mock("GET", "/api/v1/depth")
            .match_query(Matcher::UrlEncoded("symbol".into(), "SOL_USDC".into()))
            .with_status(200)
            .with_body(
                r#"{"asks":[["151.2","3"],["150.9","1"]],"bids":[["150.1","2"],["150.5","4"]],
                   "lastUpdateId":"1504999670","timestamp":1753102447307501}"#,
            )
            .create_async()
            .await;
        let book = adapter(Some(server.url())).fetch_order_book("SOL/USDC", None).await.unwrap();
        assert_eq!(book.timestamp, Some(1_753_102_447_307));
        assert_eq!(book.bids[0].price, "150.5");
        assert_eq!(book.asks[0].price, "150.9");
    }

    #[tokio::test]
    async fn test_fetch_ohlcv_requires_since() {
        let err = adapter(None)
            .fetch_ohlcv("SOL/USDC", "1m", None, None, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_funding_rate_rejects_spot() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let adapter = adapter(Some(server.url()));
        let err = adapter.fetch_funding_rate("SOL/USDC").await.unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)));
        let err = adapter.fetch_open_interest("SOL/USDC").await.unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_fetch_time_bare_integer() {
        let mut server = mockito::Server::new_async().await;
        let _time = server
            .mock("GET", "/api/v1/time")
            .with_status(200)
            .with_body("1753131712992")
            .create_async()
            .await;
        assert_eq!(adapter(Some(server.url())).fetch_time().await.unwrap(), 1_753_131_712_992);
    }

    #[tokio::test]
    async fn test_create_limit_order_posts_signed_json() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let order = server
            .mock("POST", "/api/v1/order")
            .match_header("X-API-Key", "api-key")
            .match_header("X-Window", "5000")
            .match_body(Matcher::Json(json!({
                "orderType": "Limit", "price": "150", "quantity": "2",
                "side": "Bid", "symbol": "SOL_USDC", "timeInForce": "GTC"
            })))
            .with_status(200)
            .with_body(
                r#"{"id":"111","createdAt":1753100000000,"executedQuantity":"0","executedQuoteQuantity":"0",
                   "orderType":"Limit","price":"150","quantity":"2","side":"Bid","status":"New",
                   "symbol":"SOL_USDC","timeInForce":"GTC"}"#,
            )
            .create_async()
            .await;

        let request = OrderRequest::limit("SOL/USDC", OrderSide::Buy, "2", "150");
        let placed = signed_adapter(Some(server.url())).create_order(&request).await.unwrap();
        assert_eq!(placed.id.as_deref(), Some("111"));
        assert_eq!(placed.status.as_deref(), Some("open"));
        assert_eq!(placed.symbol.as_deref(), Some("SOL/USDC"));
        assert_eq!(placed.average, None);
        order.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancel_order_requires_symbol() {
        let err = signed_adapter(None)
            .cancel_order("111", None, &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ArgumentsRequired(_)));
    }

    #[test]
    fn test_private_request_carries_broker_id() {
        let request = signed_adapter(None)
            .sign("api/v1/capital", ApiTier::Private, HttpMethod::Get, Params::new())
            .unwrap();
        assert_eq!(request.header("X-Broker-Id"), Some(BROKER_ID));

        let public = adapter(None)
            .sign("api/v1/time", ApiTier::Public, HttpMethod::Get, Params::new())
            .unwrap();
        assert_eq!(public.header("X-Broker-Id"), None);
    }

    #[test]
    fn test_batch_order_signs_every_entry() {
        let mut params = Params::new();
        params.insert(
            "orders".into(),
            json!([
                {"symbol": "SOL_USDC", "side": "Bid", "orderType": "Market", "quantity": "1"},
                {"symbol": "SOL_USDC_PERP", "side": "Ask", "orderType": "Market", "quantity": "2"}
            ]),
        );
        let request = signed_adapter(None)
            .sign(BATCH_ORDERS_PATH, ApiTier::Private, HttpMethod::Post, params)
            .unwrap();
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        let payload = format!(
            "instruction=orderExecute&orderType=Market&quantity=1&side=Bid&symbol=SOL_USDC&\
             instruction=orderExecute&orderType=Market&quantity=2&side=Ask&symbol=SOL_USDC_PERP&\
             timestamp={}&window=5000",
            request.header("X-Timestamp").unwrap()
        );
        assert!(verify(&payload, request.header("X-Signature").unwrap()));
    }

    #[tokio::test]
    async fn test_create_orders_posts_one_array() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let batch = server
            .mock("POST", "/api/v1/orders")
            .match_header("X-Broker-Id", "1400")
            .match_body(Matcher::Json(json!([
                {"orderType": "Limit", "price": "150", "quantity": "2", "side": "Bid",
                 "symbol": "SOL_USDC", "timeInForce": "GTC"},
                {"orderType": "Market", "quantity": "1", "side": "Ask", "symbol": "SOL_USDC_PERP"}
            ])))
            .with_status(200)
            .with_body(
                r#"[{"id":"111","orderType":"Limit","price":"150","quantity":"2","side":"Bid",
                    "status":"New","symbol":"SOL_USDC"},
                   {"id":"112","orderType":"Market","quantity":"1","side":"Ask",
                    "status":"Filled","symbol":"SOL_USDC_PERP"}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let orders = vec![
            OrderRequest::limit("SOL/USDC", OrderSide::Buy, "2", "150"),
            OrderRequest::market("SOL/USDC:USDC", OrderSide::Sell, "1"),
        ];
        let placed = signed_adapter(Some(server.url())).create_orders(&orders).await.unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].symbol.as_deref(), Some("SOL/USDC"));
        assert_eq!(placed[1].status.as_deref(), Some("closed"));
        assert_eq!(placed[1].symbol.as_deref(), Some("SOL/USDC:USDC"));
        batch.assert_async().await;
    }

    #[test]
    fn test_parse_deposit_and_withdrawal() {
        let deposit = json!({
            "createdAt": "2025-07-23T13:55:54.267", "id": 6695353, "platformMemo": null,
            "quantity": "120", "source": "ethereum", "status": "confirmed", "symbol": "USDC",
            "toAddress": "0xfBe7CbfCde93c8a4204a4be6B56732Eb32690170",
            "transactionHash": "0x58edaac415398d617b34c6673fffcaf0024990d5700565030119db5cbf3765d1"
        });
        let parsed = parse_transaction(&deposit, Some("deposit"));
        assert_eq!(parsed.id.as_deref(), Some("6695353"));
        assert_eq!(parsed.network.as_deref(), Some("ERC20"));
        assert_eq!(parsed.status.as_deref(), Some("ok"));
        assert_eq!(parsed.timestamp, Some(1_753_278_954_267));
        assert_eq!(parsed.fee, None);

        let withdrawal = json!({
            "blockchain": "Ethereum", "createdAt": "2025-08-13T19:27:13.817", "fee": "3",
            "id": 5479929, "isInternal": false, "quantity": "10", "status": "pending", "symbol": "USDC",
            "toAddress": "0x0ad42b8e602c2d3d475ae52d678cf63d84ab2749", "transactionHash": null
        });
        let parsed = parse_transaction(&withdrawal, Some("withdrawal"));
        assert_eq!(parsed.transaction_type.as_deref(), Some("withdrawal"));
        assert_eq!(parsed.status.as_deref(), Some("pending"));
        assert_eq!(parsed.txid, None);
        let fee = parsed.fee.unwrap();
        assert_eq!(fee.cost.as_deref(), Some("3"));
        assert_eq!(fee.currency.as_deref(), Some("USDC"));
    }

    #[tokio::test]
    async fn test_fetch_deposits_filters_currency() {
        let mut server = mockito::Server::new_async().await;
        let deposits = server
            .mock("GET", "/wapi/v1/capital/deposits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "50".into()),
                Matcher::UrlEncoded("endTime".into(), "1753300000000".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"createdAt":"2025-07-23T13:55:54.267","id":1,"quantity":"120","source":"ethereum",
                    "status":"confirmed","symbol":"USDC"},
                   {"createdAt":"2025-07-23T14:00:00","id":2,"quantity":"1","source":"solana",
                    "status":"pending","symbol":"SOL"}]"#,
            )
            .create_async()
            .await;

        let mut params = Params::new();
        params.insert("until".into(), json!(1753300000000i64));
        let found = signed_adapter(Some(server.url()))
            .fetch_deposits(Some("USDC"), None, Some(50), &params)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].transaction_type.as_deref(), Some("deposit"));
        assert_eq!(found[0].amount.as_deref(), Some("120"));
        deposits.assert_async().await;
    }

    #[tokio::test]
    async fn test_withdraw_requires_network() {
        let err = signed_adapter(None)
            .withdraw("USDC", "10", "0x0ad4", &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_withdraw_sends_blockchain_name() {
        let mut server = mockito::Server::new_async().await;
        let withdrawal = server
            .mock("POST", "/wapi/v1/capital/withdrawals")
            .match_body(Matcher::Json(json!({
                "address": "0x0ad4", "amount": "10", "blockchain": "Ethereum", "clientId": "memo-1", "symbol": "USDC"
            })))
            .with_status(200)
            .with_body(r#"{"blockchain":"Ethereum","fee":"3","id":5479929,"quantity":"10","status":"pending","symbol":"USDC"}"#)
            .create_async()
            .await;

        let mut params = Params::new();
        params.insert("network".into(), json!("ERC20"));
        params.insert("tag".into(), json!("memo-1"));
        let tx = signed_adapter(Some(server.url()))
            .withdraw("USDC", "10", "0x0ad4", &params)
            .await
            .unwrap();
        assert_eq!(tx.id.as_deref(), Some("5479929"));
        assert_eq!(tx.network.as_deref(), Some("ERC20"));
        withdrawal.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_deposit_address_needs_network() {
        let adapter = signed_adapter(None);
        let err = adapter.fetch_deposit_address("SOL", &Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::ArgumentsRequired(_)));

        let mut server = mockito::Server::new_async().await;
        let _address = server
            .mock("GET", "/wapi/v1/capital/deposit/address")
            .match_query(Matcher::UrlEncoded("blockchain".into(), "Solana".into()))
            .with_status(200)
            .with_body(r#"{"address":"5ZkjpK3Z3sP4iVqHwRkBC5tyWjWmbsuZDrfc4oSgkUZm"}"#)
            .create_async()
            .await;
        let mut params = Params::new();
        params.insert("network".into(), json!("SOL"));
        let address = signed_adapter(Some(server.url()))
            .fetch_deposit_address("SOL", &params)
            .await
            .unwrap();
        assert_eq!(address.address.as_deref(), Some("5ZkjpK3Z3sP4iVqHwRkBC5tyWjWmbsuZDrfc4oSgkUZm"));
        assert_eq!(address.network.as_deref(), Some("SOL"));
        assert_eq!(address.currency.as_deref(), Some("SOL"));
    }

    #[tokio::test]
    async fn test_fetch_positions_side_from_net_cost() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let _positions = server
            .mock("GET", "/api/v1/position")
            .with_status(200)
            .with_body(
                r#"[{"entryPrice":"150","estLiquidationPrice":"0","markPrice":"149","netCost":"-13.7768",
                    "netExposureQuantity":"0.09","pnlUnrealized":"0.09","positionId":"42","symbol":"SOL_USDC_PERP"}]"#,
            )
            .create_async()
            .await;

        let adapter = signed_adapter(Some(server.url()));
        let positions = adapter.fetch_positions(None, &Params::new()).await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol.as_deref(), Some("SOL/USDC:USDC"));
        assert_eq!(positions[0].side.as_deref(), Some("short"));
        assert_eq!(positions[0].notional.as_deref(), Some("13.7768"));

        let wanted = vec!["BTC/USDC:USDC".to_string()];
        assert!(adapter.fetch_positions(Some(&wanted), &Params::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_funding_history() {
        let mut server = mockito::Server::new_async().await;
        let _markets = server
            .mock("GET", "/api/v1/markets")
            .with_status(200)
            .with_body(MARKETS)
            .create_async()
            .await;
        let _funding = server
            .mock("GET", "/wapi/v1/history/funding")
            .match_query(Matcher::UrlEncoded("symbol".into(), "SOL_USDC_PERP".into()))
            .with_status(200)
            .with_body(
                r#"[{"fundingRate":"0.0001","intervalEndTimestamp":"2025-08-01T16:00:00","quantity":"-0.001301",
                    "subaccountId":0,"symbol":"SOL_USDC_PERP","userId":1813870}]"#,
            )
            .create_async()
            .await;

        let history = signed_adapter(Some(server.url()))
            .fetch_funding_history(Some("SOL/USDC:USDC"), None, None, &Params::new())
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].symbol.as_deref(), Some("SOL/USDC:USDC"));
        assert_eq!(history[0].amount.as_deref(), Some("-0.001301"));
        assert_eq!(history[0].rate.as_deref(), Some("0.0001"));
        assert_eq!(history[0].timestamp, Some(1_754_064_000_000));
    }
}
