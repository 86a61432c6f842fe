//! Indodax Adapter Implementation
//!
//! Public data comes from `https://indodax.com/api/...`; every private call is
//! a form POST to `/tapi` naming the route in `method`, signed with a hex
//! HMAC-SHA512 of the body and replay-protected by a millisecond nonce.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::config::IndodaxConfig;
use super::types::{
    network_code, parse_order_status, parse_transaction_status, timeframe_id, COMMON_CURRENCIES,
    DEFAULT_OHLCV_LIMIT, INDODAX, INDODAX_ENDPOINTS, INDODAX_ERRORS,
};
use crate::adapters::endpoints::{implode_path, urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::{currency_id_for_code, safe_currency_code, MarketDirectory};
use crate::adapters::precise::{parse_precision, string_div, string_mul};
use crate::adapters::safe::{
    omit, param_integer, param_string, param_string_n, safe_dict, safe_integer, safe_string, safe_string_n,
    safe_timestamp, safe_value, value_to_string, Params,
};
use crate::adapters::signing::hmac_sha512_hex;
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    BalanceEntry, Balances, DepositAddress, ExchangeIdentity, Fee, HttpMethod, Market, MarketLimits,
    MarketPrecision, MarketType, MinMax, Ohlcv, Order, OrderBook, OrderRequest, OrderSide, OrderType,
    RequestDescriptor, Ticker, Trade, Transaction, TransactionFee,
};
use crate::adapters::unified::{
    build_symbol, filter_by_since_limit, iso8601, now_ms, parse_order_book, parse_timeframe, safe_balance,
    safe_order, safe_ticker, safe_trade, LevelLayout,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Every Indodax pair trades in steps of one satoshi
const AMOUNT_PRECISION: &str = "0.00000001";

// =============================================================================
// IndodaxAdapter Implementation
// =============================================================================

/// Indodax spot adapter
pub struct IndodaxAdapter {
    pub(crate) config: IndodaxConfig,
    identity: ExchangeIdentity,
    transport: RestClient,
    directory: MarketDirectory,
    /// Last nonce handed out; private calls must see it strictly increase
    last_nonce: AtomicI64,
}

impl IndodaxAdapter {
    pub fn new(config: IndodaxConfig) -> Self {
        tracing::info!(
            exchange = %INDODAX.id,
            phase = "init",
            url = %config.rest_base_url(),
            authenticated = config.credentials.api_key.is_some(),
            "Adapter created"
        );
        Self {
            transport: RestClient::with_timeout(INDODAX.id, config.timeout),
            config,
            identity: INDODAX,
            directory: MarketDirectory::new(),
            last_nonce: AtomicI64::new(0),
        }
    }

    /// Current time in ms, bumped past the previous nonce when calls collide
    fn next_nonce(&self) -> i64 {
        let now = now_ms();
        let previous = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or(now);
        now.max(previous + 1)
    }

    /// Public routes key pairs by `BASEQUOTE` (`BTCIDR`)
    fn public_pair(market: &Market) -> String {
        format!("{}{}", market.base, market.quote)
    }

    fn require_symbol(&self, symbol: Option<&str>, method: &str) -> ExchangeResult<String> {
        symbol.map(str::to_string).ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} {}() requires a symbol argument",
                self.exchange_name(),
                method
            ))
        })
    }

    /// Loaded market for a vendor pair id (`btc_idr`)
    fn safe_market(&self, market_id: &str) -> Option<Market> {
        self.directory.market_by_id(market_id)
    }

    // =========================================================================
    // Parsers
    // =========================================================================

    pub fn parse_market(market: &Value) -> Option<Market> {
        let id = safe_string(market, "ticker_id")?;
        let base_id = safe_string(market, "traded_currency")?;
        let quote_id = safe_string(market, "base_currency")?;
        let base = safe_currency_code(&base_id, COMMON_CURRENCIES);
        let quote = safe_currency_code(&quote_id, COMMON_CURRENCIES);
        let maintenance = safe_integer(market, "is_maintenance").unwrap_or(0);
        let taker = string_div(safe_string(market, "trade_fee_percent").as_deref(), Some("100"));
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
            active: Some(maintenance == 0),
            linear: None,
            inverse: None,
            contract_size: None,
            taker,
            maker: Some("0".to_string()),
            precision: MarketPrecision {
                amount: Some(AMOUNT_PRECISION.to_string()),
                price: parse_precision(safe_string(market, "price_round").as_deref()),
            },
            limits: MarketLimits {
                amount: MinMax::new(safe_string(market, "trade_min_traded_currency"), None),
                cost: MinMax::new(safe_string(market, "trade_min_base_currency"), None),
                ..Default::default()
            },
            created: None,
            info: market.clone(),
        })
    }

    /// Volume keys are named after the pair's currencies (`vol_btc`, `vol_idr`)
    pub fn parse_ticker(ticker: &Value, market: Option<&Market>) -> Ticker {
        let timestamp = safe_timestamp(ticker, "server_time");
        let last = safe_string(ticker, "last");
        let volume = |currency: Option<&String>| {
            currency.and_then(|id| safe_string(ticker, &format!("vol_{}", id.to_lowercase())))
        };
        safe_ticker(Ticker {
            symbol: market.map(|m| m.symbol.clone()),
            timestamp,
            datetime: iso8601(timestamp),
            high: safe_string(ticker, "high"),
            low: safe_string(ticker, "low"),
            bid: safe_string(ticker, "buy"),
            ask: safe_string(ticker, "sell"),
            close: last.clone(),
            last,
            base_volume: volume(market.map(|m| &m.base_id)),
            quote_volume: volume(market.map(|m| &m.quote_id)),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    pub fn parse_trade(trade: &Value, market: Option<&Market>) -> Trade {
        safe_trade(Trade {
            id: safe_string(trade, "tid"),
            timestamp: safe_timestamp(trade, "date"),
            symbol: market.map(|m| m.symbol.clone()),
            side: safe_string(trade, "type"),
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "amount"),
            info: trade.clone(),
            ..Default::default()
        })
    }

    /// Amounts are keyed by currency id (`order_btc`, `remain_btc`); buy
    /// orders are sized in the quote currency and report only a cost.
    /// IDR quantities may appear under `rp`.
    pub fn parse_order(order: &Value, market: Option<&Market>) -> Order {
        let status = parse_order_status(&safe_string(order, "status").unwrap_or_else(|| "open".to_string()));
        let mut cost = None;
        let mut amount = None;
        let mut remaining = None;
        if let Some(market) = market {
            let has = |key: &str| order.get(key).is_some();
            let quote_id = if market.quote_id == "idr" && has("order_rp") { "rp" } else { market.quote_id.as_str() };
            let base_id = if market.base_id == "idr" && has("remain_rp") { "rp" } else { market.base_id.as_str() };
            cost = safe_string(order, &format!("order_{}", quote_id));
            if cost.is_none() {
                amount = safe_string(order, &format!("order_{}", base_id));
                remaining = safe_string(order, &format!("remain_{}", base_id));
            }
        }
        let timestamp = safe_timestamp(order, "submit_time");
        safe_order(Order {
            id: safe_string_n(order, &["order_id", "id"]),
            timestamp,
            datetime: iso8601(timestamp),
            last_trade_timestamp: safe_timestamp(order, "finish_time"),
            status: Some(status),
            symbol: market.map(|m| m.symbol.clone()),
            order_type: Some("limit".to_string()),
            side: safe_string(order, "type"),
            price: safe_string(order, "price"),
            amount,
            remaining,
            cost,
            info: order.clone(),
            ..Default::default()
        })
    }

    /// `transHistory` entries and the flat `withdrawCoin` receipt
    pub fn parse_transaction(transaction: &Value, code: Option<&str>) -> Transaction {
        let timestamp = safe_timestamp(transaction, "success_time").or_else(|| safe_timestamp(transaction, "submit_time"));
        let deposit_id = safe_string(transaction, "deposit_id");
        let currency = code.map(str::to_string).or_else(|| {
            safe_string(transaction, "withdraw_currency").map(|id| safe_currency_code(&id, COMMON_CURRENCIES))
        });
        let fee = safe_string(transaction, "fee").map(|cost| Fee {
            cost: Some(cost),
            currency: currency.clone(),
            rate: None,
        });
        Transaction {
            id: safe_string_n(transaction, &["withdraw_id", "deposit_id"]),
            txid: safe_string_n(transaction, &["txid", "tx"]),
            transaction_type: Some(if deposit_id.is_some() { "deposit" } else { "withdrawal" }.to_string()),
            currency,
            amount: safe_string_n(transaction, &["amount", "withdraw_amount", "deposit_amount"]),
            address: safe_string(transaction, "withdraw_address"),
            tag: safe_string(transaction, "withdraw_memo"),
            status: safe_string(transaction, "status").map(|s| parse_transaction_status(&s)),
            fee,
            timestamp,
            datetime: iso8601(timestamp),
            info: transaction.clone(),
            ..Default::default()
        }
    }
}

fn transactions_of_kind(transactions: Vec<Transaction>, kind: &str, limit: Option<usize>) -> Vec<Transaction> {
    let matching = transactions
        .into_iter()
        .filter(|t| t.transaction_type.as_deref() == Some(kind))
        .collect();
    filter_by_since_limit(matching, None, limit, |t: &Transaction| t.timestamp)
}

/// `{Time, Open, High, Low, Close, Volume}` with `Time` in seconds
pub fn parse_ohlcv(candle: &Value) -> Ohlcv {
    Ohlcv {
        timestamp: safe_timestamp(candle, "Time"),
        open: safe_string(candle, "Open"),
        high: safe_string(candle, "High"),
        low: safe_string(candle, "Low"),
        close: safe_string(candle, "Close"),
        volume: safe_string(candle, "Volume"),
    }
}

/// `return.balance` is free, `return.balance_hold` is used
pub fn parse_balance(response: &Value) -> Balances {
    let data = safe_value(response, "return").cloned().unwrap_or(Value::Null);
    let timestamp = safe_timestamp(&data, "server_time");
    let held = safe_value(&data, "balance_hold").cloned().unwrap_or(Value::Null);
    let mut balances = Balances {
        timestamp,
        datetime: iso8601(timestamp),
        info: response.clone(),
        ..Default::default()
    };
    for (currency_id, free) in safe_dict(&data, "balance").into_iter().flatten() {
        balances.currencies.insert(
            safe_currency_code(currency_id, COMMON_CURRENCIES),
            BalanceEntry::new(
                value_to_string(free),
                safe_string(&held, currency_id),
                None,
            ),
        );
    }
    safe_balance(balances)
}

#[async_trait]
impl ExchangeAdapter for IndodaxAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &self.identity
    }

    fn endpoints(&self) -> &EndpointTable {
        &INDODAX_ENDPOINTS
    }

    fn transport(&self) -> &RestClient {
        &self.transport
    }

    fn directory(&self) -> &MarketDirectory {
        &self.directory
    }

    fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<RequestDescriptor> {
        self.endpoints().ensure(self.exchange_name(), tier, method, path)?;
        if tier == ApiTier::Public {
            let mut query = params;
            let route = implode_path(path, &mut query);
            let mut url = format!("{}/{}", self.config.rest_base_url(), route);
            if !query.is_empty() {
                url = format!("{}?{}", url, urlencode(&query));
            }
            return Ok(RequestDescriptor::new(url, method));
        }

        let api_key = self.config.credentials.require_api_key(self.exchange_name())?;
        let secret = self.config.credentials.require_secret(self.exchange_name())?;
        let mut form = params;
        form.insert("method".into(), Value::from(path));
        form.insert("timestamp".into(), Value::from(self.next_nonce()));
        form.insert("recvWindow".into(), Value::from(self.config.recv_window_ms));
        let body = urlencode(&form);
        let signature = hmac_sha512_hex(secret, &body)?;
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "sign",
            path = %path,
            signature_len = signature.len(),
            "Request signed"
        );

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string());
        headers.insert("Key".to_string(), api_key.to_string());
        headers.insert("Sign".to_string(), signature);
        Ok(RequestDescriptor {
            url: self.config.private_url(),
            method,
            body: Some(body),
            headers,
        })
    }

    /// `{success: 0, error, error_code}` is an error. `{success: 1}` must carry
    /// `return`, except the flat `withdrawCoin` receipt.
    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let response = response?;
        if !response.is_object() {
            return None;
        }
        let error = safe_string(response, "error").unwrap_or_default();
        if response.get("success").is_none() && error.is_empty() {
            return None;
        }
        if safe_integer(response, "success") == Some(1) {
            if response.get("return").is_none() && response.get("withdraw_id").is_none() {
                return Some(ExchangeError::Exchange(format!(
                    "{}: malformed response: {}",
                    self.exchange_name(),
                    response
                )));
            }
            return None;
        }
        let feedback = format!("{} {}", self.exchange_name(), body);
        Some(INDODAX_ERRORS.classify(&[&error], &error, &feedback))
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    async fn fetch_time(&self) -> ExchangeResult<i64> {
        let response = self
            .request("api/server_time", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        safe_integer(&response, "server_time").ok_or_else(|| {
            ExchangeError::InvalidResponse(format!("{} time response has no server_time", self.exchange_name()))
        })
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let response = self.request("api/pairs", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(response
            .as_array()
            .map(|pairs| pairs.iter().filter_map(Self::parse_market).collect())
            .unwrap_or_default())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("pair".into(), Value::from(Self::public_pair(&market)));
        let response = self
            .request("api/ticker/{pair}", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let ticker = safe_value(&response, "ticker").cloned().unwrap_or(Value::Null);
        Ok(Self::parse_ticker(&ticker, Some(&market)))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        self.load_markets(false).await?;
        let response = self
            .request("api/ticker_all", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let tickers = safe_dict(&response, "tickers")
            .into_iter()
            .flatten()
            .filter_map(|(market_id, ticker)| {
                let market = self.safe_market(market_id)?;
                if let Some(wanted) = symbols {
                    if !wanted.contains(&market.symbol) {
                        return None;
                    }
                }
                Some(Self::parse_ticker(ticker, Some(&market)))
            })
            .collect();
        Ok(tickers)
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("pair".into(), Value::from(Self::public_pair(&market)));
        let response = self
            .request("api/depth/{pair}", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let mut book = parse_order_book(&response, Some(&market.symbol), None, "buy", "sell", LevelLayout::Pair);
        if let Some(limit) = limit {
            book.bids.truncate(limit);
            book.asks.truncate(limit);
        }
        Ok(book)
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
        request.insert("pair".into(), Value::from(Self::public_pair(&market)));
        let response = self
            .request("api/trades/{pair}", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let mut trades: Vec<Trade> = response
            .as_array()
            .into_iter()
            .flatten()
            .map(|t| Self::parse_trade(t, Some(&market)))
            .collect();
        trades.sort_by_key(|t| t.timestamp);
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    /// Window ends at `params.until` (seconds) or now and spans `limit` candles
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        let tf = timeframe_id(timeframe).ok_or_else(|| {
            ExchangeError::BadRequest(format!(
                "{} does not support timeframe {}",
                self.exchange_name(),
                timeframe
            ))
        })?;
        let out_of_range = || {
            ExchangeError::BadRequest(format!(
                "{} fetch_ohlcv() time range out of bounds",
                self.exchange_name()
            ))
        };
        let duration = parse_timeframe(timeframe).ok_or_else(out_of_range)?;
        let market = self.market(symbol).await?;
        let now = now_ms() / 1000;
        let limit = limit.unwrap_or(DEFAULT_OHLCV_LIMIT);
        let mut request = omit(params, &["until"]);
        request.insert("to".into(), Value::from(param_integer(params, "until").unwrap_or(now)));
        request.insert("tf".into(), Value::from(tf));
        request.insert("symbol".into(), Value::from(Self::public_pair(&market)));
        let from = match since {
            Some(since) => since / 1000,
            None => i64::try_from(limit)
                .ok()
                .and_then(|count| count.checked_mul(duration))
                .and_then(|span| now.checked_sub(span))
                .and_then(|start| start.checked_sub(1))
                .ok_or_else(out_of_range)?,
        };
        request.insert("from".into(), Value::from(from));
        let response = self
            .request("tradingview/history_v2", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let candles = response.as_array().into_iter().flatten().map(parse_ohlcv).collect();
        Ok(filter_by_since_limit(candles, since, Some(limit), |c: &Ohlcv| c.timestamp))
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        let response = self
            .request("getInfo", ApiTier::Private, HttpMethod::Post, params.clone())
            .await?;
        Ok(parse_balance(&response))
    }

    /// Deposits and withdrawals from `transHistory`; `since` narrows the
    /// window to whole days
    async fn fetch_transactions(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        let mut request = params.clone();
        if let Some(since) = since {
            let day = |ms: i64| iso8601(Some(ms)).map(|d| d.chars().take(10).collect::<String>());
            if let (Some(start), Some(end)) = (day(since), day(now_ms())) {
                request.insert("start".into(), Value::from(start));
                request.insert("end".into(), Value::from(end));
            }
        }
        let response = self
            .request("transHistory", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let data = safe_value(&response, "return").cloned().unwrap_or(Value::Null);
        let wanted_id = code.map(|c| currency_id_for_code(c, COMMON_CURRENCIES).to_lowercase());

        let mut transactions = Vec::new();
        for kind in ["withdraw", "deposit"] {
            for (currency_id, entries) in safe_dict(&data, kind).into_iter().flatten() {
                if wanted_id.as_deref().is_some_and(|id| id != currency_id) {
                    continue;
                }
                let currency = safe_currency_code(currency_id, COMMON_CURRENCIES);
                for entry in entries.as_array().into_iter().flatten() {
                    transactions.push(Self::parse_transaction(entry, Some(&currency)));
                }
            }
        }
        transactions.sort_by_key(|t| t.timestamp);
        Ok(filter_by_since_limit(transactions, since, limit, |t: &Transaction| t.timestamp))
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        let transactions = self.fetch_transactions(code, since, None, params).await?;
        Ok(transactions_of_kind(transactions, "deposit", limit))
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        let transactions = self.fetch_transactions(code, since, None, params).await?;
        Ok(transactions_of_kind(transactions, "withdrawal", limit))
    }

    /// Addresses listed by `getInfo`; a currency on several chains reports
    /// its networks comma-joined
    async fn fetch_deposit_addresses(
        &self,
        codes: Option<&[String]>,
        params: &Params,
    ) -> ExchangeResult<Vec<DepositAddress>> {
        let response = self
            .request("getInfo", ApiTier::Private, HttpMethod::Post, params.clone())
            .await?;
        let data = safe_value(&response, "return").cloned().unwrap_or(Value::Null);
        let networks = safe_dict(&data, "network");
        let mut addresses = Vec::new();
        for (currency_id, address) in safe_dict(&data, "address").into_iter().flatten() {
            let code = safe_currency_code(currency_id, COMMON_CURRENCIES);
            let Some(address) = value_to_string(address) else {
                continue;
            };
            if codes.is_some_and(|wanted| !wanted.contains(&code)) {
                continue;
            }
            let network = networks
                .and_then(|n| n.get(currency_id))
                .and_then(value_to_string)
                .map(|ids| ids.split(',').map(network_code).collect::<Vec<_>>().join(","));
            addresses.push(DepositAddress {
                currency: Some(code),
                network,
                address: Some(address),
                tag: None,
                info: data.clone(),
            });
        }
        Ok(addresses)
    }

    async fn fetch_transaction_fee(&self, code: &str, params: &Params) -> ExchangeResult<TransactionFee> {
        let mut request = params.clone();
        request.insert(
            "currency".into(),
            Value::from(currency_id_for_code(code, COMMON_CURRENCIES).to_lowercase()),
        );
        let response = self
            .request("withdrawFee", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let data = safe_value(&response, "return").cloned().unwrap_or(Value::Null);
        Ok(TransactionFee {
            currency: safe_string(&data, "currency")
                .map(|id| safe_currency_code(&id, COMMON_CURRENCIES))
                .or_else(|| Some(code.to_uppercase())),
            fee: safe_string(&data, "withdraw_fee"),
            info: response,
        })
    }

    async fn withdraw(&self, code: &str, amount: &str, address: &str, params: &Params) -> ExchangeResult<Transaction> {
        let mut request = omit(params, &["tag", "memo"]);
        request.insert(
            "currency".into(),
            Value::from(currency_id_for_code(code, COMMON_CURRENCIES).to_lowercase()),
        );
        request.insert("withdraw_amount".into(), Value::from(amount));
        request.insert("withdraw_address".into(), Value::from(address));
        request.insert("request_id".into(), Value::from(now_ms().to_string()));
        if let Some(tag) = param_string_n(params, &["tag", "memo"]) {
            request.insert("withdraw_memo".into(), Value::from(tag));
        }
        let response = self
            .request("withdrawCoin", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        Ok(Self::parse_transaction(&response, Some(code)))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Limit orders only. Buys are sized in the quote currency
    /// (`amount * price`), sells in the base currency.
    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        if order.order_type != OrderType::Limit {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} create_order() allows limit orders only",
                self.exchange_name()
            )));
        }
        let price = order.price.clone().ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!("{} create_order() requires a price", self.exchange_name()))
        })?;
        let market = self.market(&order.symbol).await?;
        let mut request = order.params.clone();
        request.insert("pair".into(), Value::from(market.id.clone()));
        request.insert("type".into(), Value::from(order.side.as_str()));
        request.insert("price".into(), Value::from(price.clone()));
        match order.side {
            OrderSide::Buy => {
                let cost = string_mul(Some(&order.amount), Some(&price)).ok_or_else(|| {
                    ExchangeError::InvalidOrder(format!(
                        "{} create_order() amount and price must be decimals",
                        self.exchange_name()
                    ))
                })?;
                request.insert(market.quote_id.clone(), Value::from(cost));
            }
            OrderSide::Sell => {
                request.insert(market.base_id.clone(), Value::from(order.amount.clone()));
            }
        }
        let response = self
            .request("trade", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let data = safe_value(&response, "return").cloned().unwrap_or(Value::Null);
        Ok(safe_order(Order {
            id: safe_string(&data, "order_id"),
            symbol: Some(market.symbol.clone()),
            order_type: Some("limit".to_string()),
            side: Some(order.side.as_str().to_string()),
            price: Some(price),
            amount: Some(order.amount.clone()),
            info: response,
            ..Default::default()
        }))
    }

    /// Needs the symbol and a `side` param (`buy`/`sell`)
    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = self.require_symbol(symbol, "cancel_order")?;
        let side = param_string(params, "side").ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} cancel_order() requires an extra \"side\" param",
                self.exchange_name()
            ))
        })?;
        let market = self.market(&symbol).await?;
        let mut request = omit(params, &["side"]);
        request.insert("order_id".into(), Value::from(id));
        request.insert("pair".into(), Value::from(market.id.clone()));
        request.insert("type".into(), Value::from(side.clone()));
        let response = self
            .request("cancelOrder", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        Ok(Order {
            id: Some(id.to_string()),
            symbol: Some(market.symbol),
            side: Some(side),
            info: response,
            ..Default::default()
        })
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = self.require_symbol(symbol, "fetch_order")?;
        let market = self.market(&symbol).await?;
        let mut request = params.clone();
        request.insert("pair".into(), Value::from(market.id.clone()));
        request.insert("order_id".into(), Value::from(id));
        let response = self
            .request("getOrder", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let raw = response
            .get("return")
            .and_then(|r| r.get("order"))
            .cloned()
            .unwrap_or(Value::Null);
        let mut order = Self::parse_order(&raw, Some(&market));
        if order.id.is_none() {
            order.id = Some(id.to_string());
        }
        order.info = response;
        Ok(order)
    }

    /// `return.orders` is null when empty, a list for one pair, or a map of
    /// pair id to list when no symbol is given
    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => {
                self.load_markets(false).await?;
                None
            }
        };
        if let Some(market) = &market {
            request.insert("pair".into(), Value::from(market.id.clone()));
        }
        let response = self
            .request("openOrders", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let raw = response
            .get("return")
            .and_then(|r| r.get("orders"))
            .cloned()
            .unwrap_or(Value::Null);

        let orders = match &raw {
            Value::Array(items) => items.iter().map(|o| Self::parse_order(o, market.as_ref())).collect(),
            Value::Object(by_pair) => {
                let mut orders = Vec::new();
                for (market_id, items) in by_pair {
                    let pair_market = self.safe_market(market_id);
                    for item in items.as_array().into_iter().flatten() {
                        orders.push(Self::parse_order(item, pair_market.as_ref()));
                    }
                }
                orders
            }
            _ => Vec::new(),
        };
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let symbol = self.require_symbol(symbol, "fetch_closed_orders")?;
        let market = self.market(&symbol).await?;
        let mut request = params.clone();
        request.insert("pair".into(), Value::from(market.id.clone()));
        let response = self
            .request("orderHistory", ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let orders = response
            .get("return")
            .and_then(|r| r.get("orders"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|o| Self::parse_order(o, Some(&market)))
            .filter(|o| o.status.as_deref() == Some("closed"))
            .collect();
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }
}
