//! Pacifica Adapter Implementation
//!
//! PacificaAdapter implements ExchangeAdapter over the Pacifica REST API.
//! Reads are plain GETs keyed by account address; every write is a signed
//! action (see `signing`) posted as JSON.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::config::PacificaConfig;
use super::signing::{sign_action, ActionHeader};
use super::types::{
    map_time_in_force, parse_ledger_entry_type, parse_order_status, parse_order_type, parse_trade_side, ActionType,
    BATCH_ORDERS_MAX, BATCH_ORDERS_PATH, HEAVY_COST_WITH_API_KEY, MAKER_FEE, PACIFICA, PACIFICA_ENDPOINTS,
    PACIFICA_ERRORS, PACIFICA_TESTNET, SETTLE_CURRENCY, TAKER_FEE, TIMEFRAMES,
};
use crate::adapters::endpoints::{implode_path, urlencode, ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::markets::{safe_currency_code, MarketDirectory};
use crate::adapters::precise::{omit_zero, string_mul, string_sub};
use crate::adapters::safe::{
    omit, param_bool, param_integer, param_string, param_string_n, safe_bool, safe_integer, safe_list,
    safe_string, safe_string_lower, safe_string_n, safe_value, Params,
};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    Account, Balances, BalanceEntry, ExchangeIdentity, Fee, FundingHistory, FundingRate, FundingRateHistory,
    HttpMethod, LedgerEntry, Leverage, MarginMode, Market, MarketLimits, MarketPrecision, MarketType, MinMax,
    Ohlcv, OpenInterest, Order, OrderBook, OrderRequest, OrderSide, OrderType, Position, RequestDescriptor,
    Ticker, Trade, Transaction, Transfer,
};
use crate::adapters::unified::{
    build_symbol, filter_by_since_limit, iso8601, now_ms, parse_order_book, parse_timeframe, safe_balance,
    safe_order, safe_ticker, safe_trade, LevelLayout,
};

// =============================================================================
// Constants
// =============================================================================

/// Candles requested when neither `since` nor `limit` is given
const DEFAULT_OHLCV_LIMIT: usize = 200;

/// Funding settles every hour
const FUNDING_INTERVAL_MS: i64 = 3_600_000;

// =============================================================================
// PacificaAdapter Implementation
// =============================================================================

/// Pacifica perpetuals adapter
pub struct PacificaAdapter {
    pub(crate) config: PacificaConfig,
    identity: ExchangeIdentity,
    transport: RestClient,
    directory: MarketDirectory,
}

impl PacificaAdapter {
    pub fn new(config: PacificaConfig) -> Self {
        Self::with_identity(config, PACIFICA)
    }

    /// Build the adapter under an identity record.
    ///
    /// The `pacifica-testnet` alias always targets the test host.
    pub fn with_identity(mut config: PacificaConfig, identity: ExchangeIdentity) -> Self {
        if identity.id == PACIFICA_TESTNET.id {
            config.sandbox = true;
        }
        tracing::info!(
            exchange = %identity.id,
            phase = "init",
            sandbox = config.sandbox,
            url = %config.rest_base_url(),
            "Adapter created"
        );
        Self {
            transport: RestClient::with_timeout(identity.id, config.timeout),
            config,
            identity,
            directory: MarketDirectory::new(),
        }
    }

    /// Unified symbol for a vendor market id (`BTC` -> `BTC/USDC:USDC`)
    fn unified_symbol(&self, vendor_id: &str) -> String {
        self.directory.symbol_for_id(vendor_id).unwrap_or_else(|| {
            build_symbol(
                &safe_currency_code(vendor_id, &[]),
                SETTLE_CURRENCY,
                Some(SETTLE_CURRENCY),
            )
        })
    }

    /// Account address from params, falling back to the configured wallet.
    /// Consumed keys are removed from `params`.
    fn resolve_account(&self, method: &str, params: &mut Params) -> ExchangeResult<String> {
        let from_params = param_string_n(params, &["account", "address", "mainAddress", "main_address"]);
        for key in ["account", "address", "mainAddress", "main_address"] {
            params.remove(key);
        }
        from_params
            .or_else(|| self.config.credentials.wallet_address.clone())
            .ok_or_else(|| {
                ExchangeError::ArgumentsRequired(format!(
                    "{} {}() requires address",
                    self.exchange_name(),
                    method
                ))
            })
    }

    fn expiry_window(&self, params: &Params) -> u64 {
        param_integer(params, "expiryWindow")
            .or_else(|| param_integer(params, "expiry_window"))
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(self.config.expiry_window_ms)
    }

    /// Signed body for `payload` under `action`.
    ///
    /// `params` may carry `account`/`mainAddress`, `agentAddress` and
    /// `expiryWindow`; anything else in it is not sent.
    fn signed_action_body(
        &self,
        method: &str,
        action: ActionType,
        payload: Map<String, Value>,
        params: &Params,
    ) -> ExchangeResult<Params> {
        let private_key = self.config.credentials.require_private_key(self.exchange_name())?;
        let mut params = params.clone();
        let account = self.resolve_account(method, &mut params)?;
        let expiry_window = self.expiry_window(&params);
        let agent_wallet = param_string(&params, "agentAddress");

        let header = ActionHeader {
            timestamp: now_ms(),
            expiry_window,
            action,
        };
        let payload = Value::Object(payload);
        let signature = sign_action(private_key, &header, &payload)?;
        tracing::debug!(
            exchange = %self.exchange_name(),
            phase = "sign",
            action = action.as_str(),
            signature_len = signature.len(),
            "Action signed"
        );

        let mut body = Params::new();
        body.insert("account".into(), Value::from(account));
        if let Some(agent) = agent_wallet {
            body.insert("agent_wallet".into(), Value::from(agent));
        }
        body.insert("signature".into(), Value::from(signature));
        body.insert("timestamp".into(), Value::from(header.timestamp));
        body.insert("expiry_window".into(), Value::from(header.expiry_window));
        if let Value::Object(fields) = payload {
            body.extend(fields);
        }
        Ok(body)
    }

    /// Sign `payload` as `action` and post it to the action's route
    async fn post_action(
        &self,
        method: &str,
        action: ActionType,
        payload: Map<String, Value>,
        params: &Params,
    ) -> ExchangeResult<Value> {
        let body = self.signed_action_body(method, action, payload, params)?;
        self.request(action.path(), ApiTier::Private, HttpMethod::Post, body).await
    }

    /// Post `Create`/`Cancel` actions in one `orders/batch` call
    async fn post_batch(&self, method: &str, actions: Vec<Value>) -> ExchangeResult<Vec<Value>> {
        if actions.len() > BATCH_ORDERS_MAX {
            return Err(ExchangeError::BadRequest(format!(
                "{} {}() too many orders to create/cancel. Limit is {}",
                self.exchange_name(),
                method,
                BATCH_ORDERS_MAX
            )));
        }
        let mut request = Params::new();
        request.insert("actions".into(), Value::Array(actions));
        let response = self
            .request(BATCH_ORDERS_PATH, ApiTier::Private, HttpMethod::Post, request)
            .await?;
        let data = safe_value(&response, "data").cloned().unwrap_or(Value::Null);
        Ok(safe_list(&data, "results").cloned().unwrap_or_default())
    }

    /// Settings row of `market`; markets left at their defaults have none
    async fn account_setting(&self, method: &str, market: &Market, params: &Params) -> ExchangeResult<Option<Value>> {
        let mut request = params.clone();
        let account = self.resolve_account(method, &mut request)?;
        request.insert("account".into(), Value::from(account));
        let response = self
            .request("account/settings", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        Ok(data_list(&response)
            .into_iter()
            .find(|setting| safe_string(setting, "symbol").as_deref() == Some(market.id.as_str())))
    }

    /// Payload and action for a unified order request
    fn order_payload(&self, market: &Market, order: &OrderRequest) -> ExchangeResult<(ActionType, Map<String, Value>)> {
        let params = &order.params;
        let mut payload = Map::new();
        payload.insert("symbol".into(), Value::from(market.id.clone()));
        let side = match order.side {
            OrderSide::Buy => "bid",
            OrderSide::Sell => "ask",
        };
        payload.insert("side".into(), Value::from(side));

        let reduce_only = param_bool(params, "reduceOnly")
            .or_else(|| param_bool(params, "reduce_only"))
            .unwrap_or(false);
        let trigger_price = param_string_n(params, &["triggerPrice", "stopPrice"]);
        let stop_loss_price = param_string(params, "stopLossPrice");
        let take_profit_price = param_string(params, "takeProfitPrice");
        let mut client_order_id = param_string_n(params, &["clientOrderId", "cloid", "client_order_id"]);

        let action = if order.order_type == OrderType::Market {
            let slippage = param_string_n(params, &["slippage", "slippage_percent"])
                .unwrap_or_else(|| self.config.default_slippage.clone());
            payload.insert("reduce_only".into(), Value::from(reduce_only));
            payload.insert("slippage_percent".into(), Value::from(slippage));
            ActionType::CreateMarketOrder
        } else if (take_profit_price.is_some() || stop_loss_price.is_some()) && order.price.is_none() {
            ActionType::SetPositionTpsl
        } else if let Some(trigger_price) = trigger_price {
            let mut stop_order = Map::new();
            stop_order.insert("amount".into(), Value::from(order.amount.clone()));
            stop_order.insert("stop_price".into(), Value::from(trigger_price));
            let limit_price = param_string_n(params, &["stopLimit", "stopLimitPrice", "stop_limit_price"])
                .or_else(|| order.price.clone());
            if let Some(limit_price) = limit_price {
                stop_order.insert("limit_price".into(), Value::from(limit_price));
            }
            if let Some(id) = client_order_id.take() {
                stop_order.insert("client_order_id".into(), Value::from(id));
            }
            payload.insert("reduce_only".into(), Value::from(reduce_only));
            payload.insert("stop_order".into(), Value::Object(stop_order));
            ActionType::CreateStopOrder
        } else {
            let price = order.price.clone().ok_or_else(|| {
                ExchangeError::ArgumentsRequired(format!(
                    "{} create_order() requires a price for limit orders",
                    self.exchange_name()
                ))
            })?;
            let tif = param_string_n(params, &["timeInForce", "tif", "time_in_force"])
                .and_then(|raw| map_time_in_force(&raw))
                .unwrap_or("GTC");
            payload.insert("reduce_only".into(), Value::from(reduce_only));
            payload.insert("tif".into(), Value::from(tif));
            payload.insert("price".into(), Value::from(price));
            ActionType::CreateOrder
        };

        if let Some(stop_price) = take_profit_price {
            let leg = tpsl_leg(
                stop_price,
                param_string_n(params, &["tp_limit_price", "takeProfitLimit"]),
                param_string_n(params, &["takeProfitCloid", "tpCloid", "tp_cloid", "take_profit_cloid"]),
            );
            payload.insert("take_profit".into(), leg);
        }
        if let Some(stop_price) = stop_loss_price {
            let leg = tpsl_leg(
                stop_price,
                param_string_n(params, &["sl_limit_price", "stopLossLimit"]),
                param_string_n(params, &["stopLossCloid", "slCloid", "sl_cloid", "stop_loss_cloid"]),
            );
            payload.insert("stop_loss".into(), leg);
        }
        if !matches!(action, ActionType::CreateStopOrder | ActionType::SetPositionTpsl) {
            payload.insert("amount".into(), Value::from(order.amount.clone()));
        }
        if let Some(id) = client_order_id {
            payload.insert("client_order_id".into(), Value::from(id));
        }
        Ok((action, payload))
    }

    // =========================================================================
    // Parsers
    // =========================================================================

    pub fn parse_market(market: &Value) -> Option<Market> {
        let id = safe_string(market, "symbol")?;
        let base = safe_currency_code(&id, &[]);
        Some(Market {
            symbol: build_symbol(&base, SETTLE_CURRENCY, Some(SETTLE_CURRENCY)),
            base,
            quote: SETTLE_CURRENCY.to_string(),
            settle: Some(SETTLE_CURRENCY.to_string()),
            base_id: id.clone(),
            quote_id: SETTLE_CURRENCY.to_string(),
            settle_id: Some(SETTLE_CURRENCY.to_string()),
            id,
            market_type: MarketType::Swap,
            active: Some(true),
            linear: Some(true),
            inverse: Some(false),
            contract_size: Some("1".to_string()),
            taker: Some(TAKER_FEE.to_string()),
            maker: Some(MAKER_FEE.to_string()),
            precision: MarketPrecision {
                amount: safe_string(market, "lot_size"),
                price: safe_string(market, "tick_size"),
            },
            limits: MarketLimits {
                amount: MinMax::default(),
                price: MinMax::new(safe_string(market, "min_tick"), safe_string(market, "max_tick")),
                cost: MinMax::new(
                    safe_string(market, "min_order_size"),
                    safe_string(market, "max_order_size"),
                ),
                leverage: MinMax::new(Some("1".to_string()), safe_string(market, "max_leverage")),
            },
            created: safe_integer(market, "created_at"),
            info: market.clone(),
        })
    }

    pub fn parse_ticker(&self, ticker: &Value) -> Ticker {
        let timestamp = safe_integer(ticker, "timestamp");
        safe_ticker(Ticker {
            symbol: safe_string(ticker, "symbol").map(|id| self.unified_symbol(&id)),
            timestamp,
            datetime: iso8601(timestamp),
            open: safe_string(ticker, "yesterday_price"),
            previous_close: safe_string(ticker, "yesterday_price"),
            close: safe_string(ticker, "mid"),
            quote_volume: safe_string(ticker, "volume_24h"),
            mark_price: safe_string(ticker, "mark"),
            index_price: safe_string(ticker, "oracle"),
            info: ticker.clone(),
            ..Default::default()
        })
    }

    pub fn parse_trade(&self, trade: &Value, market: Option<&Market>) -> Trade {
        let timestamp = safe_integer(trade, "created_at");
        let symbol = market
            .map(|m| m.symbol.clone())
            .or_else(|| safe_string(trade, "symbol").map(|id| self.unified_symbol(&id)));
        let taker_or_maker = safe_string(trade, "event_type").map(|event| {
            if event == "fulfill_maker" { "maker" } else { "taker" }.to_string()
        });
        let fee = safe_string(trade, "fee").map(|cost| Fee {
            cost: Some(cost),
            currency: Some(SETTLE_CURRENCY.to_string()),
            rate: None,
        });
        safe_trade(Trade {
            id: safe_string(trade, "history_id"),
            order: safe_string(trade, "order_id"),
            timestamp,
            symbol,
            side: safe_string(trade, "side").map(|s| parse_trade_side(&s)),
            taker_or_maker,
            price: safe_string(trade, "price"),
            amount: safe_string(trade, "amount"),
            fee,
            info: trade.clone(),
            ..Default::default()
        })
    }

    pub fn parse_order(&self, order: &Value) -> Order {
        let timestamp = safe_integer(order, "created_at");
        let amount = safe_string_n(order, &["initial_amount", "amount"]);
        let filled = safe_string(order, "filled_amount");
        let side = safe_string(order, "side").map(|side| match side.as_str() {
            "bid" => "buy".to_string(),
            "ask" => "sell".to_string(),
            _ => side,
        });
        safe_order(Order {
            id: safe_string(order, "order_id"),
            client_order_id: safe_string(order, "client_order_id"),
            timestamp,
            datetime: iso8601(timestamp),
            last_update_timestamp: safe_integer(order, "updated_at"),
            status: safe_string(order, "order_status").map(|s| parse_order_status(&s)),
            symbol: safe_string(order, "symbol").map(|id| self.unified_symbol(&id)),
            order_type: safe_string_lower(order, "order_type").map(|t| parse_order_type(&t)),
            reduce_only: safe_bool(order, "reduce_only"),
            side,
            price: safe_string_n(order, &["price", "initial_price"]),
            trigger_price: safe_string(order, "stop_price"),
            average: omit_zero(safe_string(order, "average_filled_price")),
            remaining: string_sub(amount.as_deref(), filled.as_deref()),
            amount,
            filled,
            info: order.clone(),
            ..Default::default()
        })
    }

    pub fn parse_position(&self, position: &Value) -> Position {
        let timestamp = safe_integer(position, "created_at");
        let collateral = safe_string(position, "margin");
        let isolated = safe_bool(position, "isolated").unwrap_or(collateral.is_some());
        Position {
            symbol: safe_string(position, "symbol").map(|id| self.unified_symbol(&id)),
            side: safe_string(position, "side").map(|s| if s == "bid" { "long" } else { "short" }.to_string()),
            contracts: safe_string(position, "amount"),
            contract_size: Some("1".to_string()),
            entry_price: safe_string(position, "entry_price"),
            collateral,
            margin_mode: Some(if isolated { "isolated" } else { "cross" }.to_string()),
            timestamp,
            datetime: iso8601(timestamp),
            info: position.clone(),
            ..Default::default()
        }
    }

    pub fn parse_open_interest(&self, interest: &Value) -> OpenInterest {
        let timestamp = safe_integer(interest, "timestamp");
        let amount = safe_string(interest, "open_interest");
        let value = match (&amount, safe_string(interest, "mark")) {
            (Some(amount), Some(mark)) => string_mul(Some(amount), Some(mark.as_str())),
            _ => None,
        };
        OpenInterest {
            symbol: safe_string(interest, "symbol").map(|id| self.unified_symbol(&id)),
            open_interest_amount: amount,
            open_interest_value: value,
            timestamp,
            datetime: iso8601(timestamp),
            info: interest.clone(),
        }
    }

    pub fn parse_funding_payment(&self, income: &Value) -> FundingHistory {
        let timestamp = safe_integer(income, "created_at");
        FundingHistory {
            id: safe_string(income, "history_id"),
            symbol: safe_string(income, "symbol").map(|id| self.unified_symbol(&id)),
            code: Some(SETTLE_CURRENCY.to_string()),
            amount: safe_string_n(income, &["payout", "amount"]),
            rate: safe_string(income, "rate"),
            timestamp,
            datetime: iso8601(timestamp),
            info: income.clone(),
        }
    }

    pub fn parse_funding_rate(&self, info: &Value) -> FundingRate {
        let timestamp = safe_integer(info, "timestamp");
        let next_funding = (now_ms() / FUNDING_INTERVAL_MS + 1) * FUNDING_INTERVAL_MS;
        FundingRate {
            symbol: safe_string(info, "symbol").map(|id| self.unified_symbol(&id)),
            mark_price: safe_string(info, "mark"),
            index_price: safe_string(info, "oracle"),
            funding_rate: safe_string(info, "funding"),
            next_funding_rate: safe_string(info, "next_funding"),
            next_funding_timestamp: Some(next_funding),
            next_funding_datetime: iso8601(Some(next_funding)),
            timestamp,
            datetime: iso8601(timestamp),
            interval: Some("1h".to_string()),
            info: info.clone(),
        }
    }
}

/// `take_profit` / `stop_loss` sub-object
fn tpsl_leg(stop_price: String, limit_price: Option<String>, client_order_id: Option<String>) -> Value {
    let mut leg = Map::new();
    leg.insert("stop_price".into(), Value::from(stop_price));
    if let Some(limit_price) = limit_price {
        leg.insert("limit_price".into(), Value::from(limit_price));
    }
    if let Some(id) = client_order_id {
        leg.insert("client_order_id".into(), Value::from(id));
    }
    Value::Object(leg)
}

pub fn parse_ohlcv(candle: &Value) -> Ohlcv {
    Ohlcv {
        timestamp: safe_integer(candle, "t"),
        open: safe_string(candle, "o"),
        high: safe_string(candle, "h"),
        low: safe_string(candle, "l"),
        close: safe_string(candle, "c"),
        volume: safe_string(candle, "v"),
    }
}

/// Account summary: all margin is USDC
pub fn parse_balance(data: &Value) -> Balances {
    let timestamp = safe_integer(data, "updated_at");
    let mut balances = Balances {
        timestamp,
        datetime: iso8601(timestamp),
        info: data.clone(),
        ..Default::default()
    };
    balances.currencies.insert(
        SETTLE_CURRENCY.to_string(),
        BalanceEntry::new(
            safe_string(data, "available_to_spend"),
            safe_string(data, "total_margin_used"),
            safe_string(data, "account_equity"),
        ),
    );
    safe_balance(balances)
}

pub fn parse_ledger_entry(item: &Value) -> LedgerEntry {
    let timestamp = safe_integer(item, "created_at");
    LedgerEntry {
        entry_type: safe_string(item, "event_type").map(|t| parse_ledger_entry_type(&t)),
        currency: Some(SETTLE_CURRENCY.to_string()),
        amount: safe_string(item, "amount"),
        after: safe_string(item, "balance"),
        timestamp,
        datetime: iso8601(timestamp),
        info: item.clone(),
        ..Default::default()
    }
}

fn parse_setting_margin_mode(setting: &Value) -> String {
    if safe_bool(setting, "isolated").unwrap_or(false) {
        "isolated".to_string()
    } else {
        "cross".to_string()
    }
}

/// Status of one `orders/batch` result
fn batch_status(result: &Value, ok: &str, failed: &str) -> String {
    let accepted = safe_bool(result, "success").unwrap_or(false) && safe_string(result, "error").is_none();
    if accepted { ok } else { failed }.to_string()
}

/// `data` list of a response, empty when absent
fn data_list(response: &Value) -> Vec<Value> {
    safe_list(response, "data").cloned().unwrap_or_default()
}

fn filter_symbols<T>(items: Vec<T>, symbols: Option<&[String]>, symbol: impl Fn(&T) -> Option<&String>) -> Vec<T> {
    match symbols {
        Some(wanted) => items
            .into_iter()
            .filter(|item| symbol(item).map(|s| wanted.contains(s)).unwrap_or(false))
            .collect(),
        None => items,
    }
}

/// Order ids travel as numbers when they are numeric
fn order_id_value(id: &str) -> Value {
    id.parse::<u64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

#[async_trait]
impl ExchangeAdapter for PacificaAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        &self.identity
    }

    fn endpoints(&self) -> &EndpointTable {
        &PACIFICA_ENDPOINTS
    }

    fn transport(&self) -> &RestClient {
        &self.transport
    }

    fn directory(&self) -> &MarketDirectory {
        &self.directory
    }

    fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<RequestDescriptor> {
        self.endpoints().ensure(self.exchange_name(), tier, method, path)?;
        let mut params = params;
        let route = implode_path(path, &mut params);
        let mut url = format!(
            "{}/api/{}/{}",
            self.config.rest_base_url(),
            self.identity.version,
            route
        );
        let mut headers = std::collections::BTreeMap::new();
        let mut body = None;
        if method == HttpMethod::Get && !params.is_empty() {
            url = format!("{}?{}", url, urlencode(&params));
            headers.insert("Accept".to_string(), "*/*".to_string());
        }
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if method == HttpMethod::Post {
            body = Some(Value::Object(params).to_string());
        }
        if let Some(api_key) = self.config.credentials.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert("PF-API-KEY".to_string(), api_key.to_string());
        }
        Ok(RequestDescriptor {
            url,
            method,
            body,
            headers,
        })
    }

    fn handle_errors(&self, _status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        let response = response?;
        let code = safe_string(response, "code");
        let message = safe_string(response, "error");
        if code.is_none() && message.is_none() {
            return None;
        }
        let code = code.unwrap_or_default();
        let message = message.unwrap_or_default();
        let feedback = format!("{} {}", self.exchange_name(), body);
        Some(PACIFICA_ERRORS.classify(&[&code, &message], &message, &feedback))
    }

    /// Heavy routes cost a flat 3 once an API key lifts the tier
    fn cost(&self, tier: ApiTier, method: HttpMethod, path: &str) -> f64 {
        let weight = self.endpoints().weight(tier, method, path).unwrap_or(1.0);
        if weight > 1.0 && self.config.credentials.api_key.is_some() {
            HEAVY_COST_WITH_API_KEY
        } else {
            weight
        }
    }

    // =========================================================================
    // Public market data
    // =========================================================================

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let response = self.request("info", ApiTier::Public, HttpMethod::Get, Params::new()).await?;
        Ok(data_list(&response).iter().filter_map(Self::parse_market).collect())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let symbols = [market.symbol.clone()];
        self.fetch_tickers(Some(&symbols))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::BadSymbol(format!("{} has no ticker for {}", self.exchange_name(), symbol)))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        self.load_markets(false).await?;
        let response = self
            .request("info/prices", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let tickers = data_list(&response).iter().map(|t| self.parse_ticker(t)).collect();
        Ok(filter_symbols(tickers, symbols, |t: &Ticker| t.symbol.as_ref()))
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        let market = self.market(symbol).await?;
        let mut request = Params::new();
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("agg_level".into(), Value::from(1));
        let response = self.request("book", ApiTier::Public, HttpMethod::Get, request).await?;
        let data = safe_value(&response, "data").cloned().unwrap_or(Value::Null);
        let levels = safe_list(&data, "l").cloned().unwrap_or_default();
        let sides = serde_json::json!({
            "bids": levels.first().cloned().unwrap_or(Value::Null),
            "asks": levels.get(1).cloned().unwrap_or(Value::Null),
        });
        let mut book = parse_order_book(
            &sides,
            Some(&market.symbol),
            safe_integer(&data, "t"),
            "bids",
            "asks",
            LevelLayout::Object { price: "p", amount: "a" },
        );
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
        request.insert("symbol".into(), Value::from(market.id.clone()));
        let response = self.request("trades", ApiTier::Public, HttpMethod::Get, request).await?;
        let trades = data_list(&response)
            .iter()
            .map(|t| self.parse_trade(t, Some(&market)))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

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
        let out_of_range = || {
            ExchangeError::BadRequest(format!(
                "{} fetch_ohlcv() time range out of bounds",
                self.exchange_name()
            ))
        };
        let market = self.market(symbol).await?;
        let duration_ms = parse_timeframe(timeframe)
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or_else(out_of_range)?;
        let span = i64::try_from(limit.unwrap_or(DEFAULT_OHLCV_LIMIT))
            .ok()
            .and_then(|count| count.checked_mul(duration_ms))
            .ok_or_else(out_of_range)?;
        let start = match since {
            Some(since) => since,
            None => now_ms().checked_sub(span).ok_or_else(out_of_range)?,
        };

        let mut request = omit(params, &["until"]);
        request.insert("symbol".into(), Value::from(market.id.clone()));
        request.insert("interval".into(), Value::from(timeframe));
        request.insert("start_time".into(), Value::from(start));
        let end = match limit {
            Some(_) => Some(start.checked_add(span).ok_or_else(out_of_range)?),
            None => param_integer(params, "until"),
        };
        if let Some(end) = end {
            request.insert("end_time".into(), Value::from(end));
        }
        let response = self.request("kline", ApiTier::Public, HttpMethod::Get, request).await?;
        let candles: Vec<Ohlcv> = data_list(&response).iter().map(parse_ohlcv).collect();
        Ok(filter_by_since_limit(candles, None, limit, |c: &Ohlcv| c.timestamp))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> ExchangeResult<FundingRate> {
        let market = self.market(symbol).await?;
        let symbols = [market.symbol.clone()];
        self.fetch_funding_rates(Some(&symbols))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ExchangeError::BadSymbol(format!("{} has no funding rate for {}", self.exchange_name(), symbol))
            })
    }

    async fn fetch_funding_rates(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<FundingRate>> {
        let response = self
            .request("info/prices", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let rates = data_list(&response).iter().map(|r| self.parse_funding_rate(r)).collect();
        Ok(filter_symbols(rates, symbols, |r: &FundingRate| r.symbol.as_ref()))
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
            .request("funding_rate/history", ApiTier::Public, HttpMethod::Get, request)
            .await?;
        let mut history: Vec<FundingRateHistory> = data_list(&response)
            .iter()
            .map(|entry| {
                let timestamp = safe_integer(entry, "created_at");
                FundingRateHistory {
                    symbol: Some(market.symbol.clone()),
                    funding_rate: safe_string(entry, "funding_rate"),
                    timestamp,
                    datetime: iso8601(timestamp),
                    info: entry.clone(),
                }
            })
            .collect();
        history.sort_by_key(|h| h.timestamp);
        Ok(filter_by_since_limit(history, since, limit, |h: &FundingRateHistory| h.timestamp))
    }

    async fn fetch_open_interest(&self, symbol: &str) -> ExchangeResult<OpenInterest> {
        let market = self.market(symbol).await?;
        let symbols = [market.symbol.clone()];
        self.fetch_open_interests(Some(&symbols))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ExchangeError::BadSymbol(format!("{} has no open interest for {}", self.exchange_name(), symbol))
            })
    }

    async fn fetch_open_interests(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<OpenInterest>> {
        self.load_markets(false).await?;
        let response = self
            .request("info/prices", ApiTier::Public, HttpMethod::Get, Params::new())
            .await?;
        let interests = data_list(&response).iter().map(|i| self.parse_open_interest(i)).collect();
        Ok(filter_symbols(interests, symbols, |i: &OpenInterest| i.symbol.as_ref()))
    }

    // =========================================================================
    // Account data
    // =========================================================================

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        let mut request = params.clone();
        let account = self.resolve_account("fetch_balance", &mut request)?;
        request.insert("account".into(), Value::from(account));
        let response = self.request("account", ApiTier::Private, HttpMethod::Get, request).await?;
        let data = safe_value(&response, "data").cloned().unwrap_or(Value::Null);
        Ok(parse_balance(&data))
    }

    async fn fetch_positions(&self, symbols: Option<&[String]>, params: &Params) -> ExchangeResult<Vec<Position>> {
        let mut request = params.clone();
        let account = self.resolve_account("fetch_positions", &mut request)?;
        request.insert("account".into(), Value::from(account));
        let response = self.request("positions", ApiTier::Private, HttpMethod::Get, request).await?;
        let positions = data_list(&response).iter().map(|p| self.parse_position(p)).collect();
        Ok(filter_symbols(positions, symbols, |p: &Position| p.symbol.as_ref()))
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        let mut request = omit(params, &["until"]);
        let account = self.resolve_account("fetch_my_trades", &mut request)?;
        request.insert("account".into(), Value::from(account));
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
        if let Some(since) = since {
            request.insert("start_time".into(), Value::from(since));
        }
        if let Some(until) = param_integer(params, "until") {
            request.insert("end_time".into(), Value::from(until));
        }
        let response = self
            .request("trades/history", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let trades = data_list(&response)
            .iter()
            .map(|t| self.parse_trade(t, market.as_ref()))
            .collect();
        Ok(filter_by_since_limit(trades, since, limit, |t: &Trade| t.timestamp))
    }

    /// Balance history; `params.cursor` continues a previous page
    async fn fetch_ledger(
        &self,
        _code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<LedgerEntry>> {
        let mut request = params.clone();
        let account = self.resolve_account("fetch_ledger", &mut request)?;
        request.insert("account".into(), Value::from(account));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self
            .request("account/balance/history", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let entries = data_list(&response).iter().map(parse_ledger_entry).collect();
        Ok(filter_by_since_limit(entries, since, limit, |e: &LedgerEntry| e.timestamp))
    }

    async fn fetch_funding_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<FundingHistory>> {
        let wanted = match symbol {
            Some(symbol) => Some(self.market(symbol).await?.symbol),
            None => None,
        };
        let mut request = params.clone();
        let account = self.resolve_account("fetch_funding_history", &mut request)?;
        request.insert("account".into(), Value::from(account));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self
            .request("funding/history", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let payments = data_list(&response)
            .iter()
            .map(|p| self.parse_funding_payment(p))
            .filter(|p| wanted.is_none() || p.symbol == wanted)
            .collect();
        Ok(filter_by_since_limit(payments, since, limit, |p: &FundingHistory| p.timestamp))
    }

    /// Markets never touched report cross margin at maximum leverage
    async fn fetch_leverage(&self, symbol: &str, params: &Params) -> ExchangeResult<Leverage> {
        let market = self.market(symbol).await?;
        match self.account_setting("fetch_leverage", &market, params).await? {
            Some(setting) => {
                let leverage = safe_string(&setting, "leverage");
                Ok(Leverage {
                    symbol: Some(market.symbol),
                    margin_mode: Some(parse_setting_margin_mode(&setting)),
                    long_leverage: leverage.clone(),
                    short_leverage: leverage,
                    info: setting,
                })
            }
            None => Ok(Leverage {
                symbol: Some(market.symbol),
                margin_mode: Some("cross".to_string()),
                long_leverage: market.limits.leverage.max.clone(),
                short_leverage: market.limits.leverage.max,
                info: market.info,
            }),
        }
    }

    async fn fetch_margin_mode(&self, symbol: &str, params: &Params) -> ExchangeResult<MarginMode> {
        let market = self.market(symbol).await?;
        let setting = self.account_setting("fetch_margin_mode", &market, params).await?;
        Ok(MarginMode {
            symbol: Some(market.symbol),
            margin_mode: Some(
                setting
                    .as_ref()
                    .map(parse_setting_margin_mode)
                    .unwrap_or_else(|| "cross".to_string()),
            ),
            info: setting.unwrap_or(Value::Null),
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        let market = self.market(&order.symbol).await?;
        let (action, payload) = self.order_payload(&market, order)?;
        let response = self.post_action("create_order", action, payload, &order.params).await?;
        let accepted = safe_bool(&response, "success").unwrap_or(false) && safe_string(&response, "error").is_none();
        let data = safe_value(&response, "data").cloned().unwrap_or(Value::Null);
        Ok(safe_order(Order {
            id: safe_string(&data, "order_id"),
            client_order_id: param_string_n(&order.params, &["clientOrderId", "cloid", "client_order_id"]),
            status: Some(if accepted { "open" } else { "rejected" }.to_string()),
            symbol: Some(market.symbol),
            order_type: Some(order.order_type.as_str().to_string()),
            side: Some(order.side.as_str().to_string()),
            amount: Some(order.amount.clone()),
            price: order.price.clone(),
            info: response,
            ..Default::default()
        }))
    }

    /// Limit and market orders only; trigger and TP/SL orders are refused
    async fn create_orders(&self, orders: &[OrderRequest]) -> ExchangeResult<Vec<Order>> {
        let mut actions = Vec::with_capacity(orders.len());
        for order in orders {
            let market = self.market(&order.symbol).await?;
            let (action, payload) = self.order_payload(&market, order)?;
            if !matches!(action, ActionType::CreateOrder | ActionType::CreateMarketOrder) {
                return Err(ExchangeError::InvalidOrder(format!(
                    "{} create_orders() batches only limit and market orders, got {}",
                    self.exchange_name(),
                    action.as_str()
                )));
            }
            let data = self.signed_action_body("create_orders", action, payload, &order.params)?;
            actions.push(json!({"type": "Create", "data": Value::Object(data)}));
        }
        let results = self.post_batch("create_orders", actions).await?;
        Ok(results
            .into_iter()
            .map(|result| Order {
                id: safe_string(&result, "order_id"),
                status: Some(batch_status(&result, "open", "rejected")),
                info: result,
                ..Default::default()
            })
            .collect())
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let symbol = symbol.ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} cancel_order() requires a symbol argument",
                self.exchange_name()
            ))
        })?;
        let market = self.market(symbol).await?;
        let is_stop = param_bool(params, "isStopOrder")
            .or_else(|| param_bool(params, "is_stop_order"))
            .unwrap_or(false);
        let mut payload = Map::new();
        payload.insert("symbol".into(), Value::from(market.id.clone()));
        match param_string_n(params, &["clientOrderId", "client_order_id", "cloid"]) {
            Some(client_id) => {
                payload.insert("client_order_id".into(), Value::from(client_id));
            }
            None if !id.is_empty() => {
                payload.insert("order_id".into(), order_id_value(id));
            }
            None => {
                return Err(ExchangeError::ArgumentsRequired(format!(
                    "{} cancel_order() requires either \"id\" or \"clientOrderId\"",
                    self.exchange_name()
                )))
            }
        }
        let action = if is_stop {
            ActionType::CancelStopOrder
        } else {
            ActionType::CancelOrder
        };
        let response = self.post_action("cancel_order", action, payload, params).await?;
        let canceled = safe_bool(&response, "success").unwrap_or(false);
        Ok(Order {
            id: Some(id.to_string()).filter(|id| !id.is_empty()),
            symbol: Some(market.symbol),
            status: Some(if canceled { "canceled" } else { "closed" }.to_string()),
            info: response,
            ..Default::default()
        })
    }

    async fn cancel_orders(&self, ids: &[String], symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let symbol = symbol.ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} cancel_orders() requires a symbol argument",
                self.exchange_name()
            ))
        })?;
        let market = self.market(symbol).await?;
        let mut actions = Vec::with_capacity(ids.len());
        for id in ids {
            let mut payload = Map::new();
            payload.insert("symbol".into(), Value::from(market.id.clone()));
            payload.insert("order_id".into(), order_id_value(id));
            let data = self.signed_action_body("cancel_orders", ActionType::CancelOrder, payload, params)?;
            actions.push(json!({"type": "Cancel", "data": Value::Object(data)}));
        }
        let results = self.post_batch("cancel_orders", actions).await?;
        Ok(results
            .into_iter()
            .enumerate()
            .map(|(i, result)| Order {
                id: ids.get(i).cloned(),
                symbol: Some(market.symbol.clone()),
                status: Some(batch_status(&result, "canceled", "closed")),
                info: result,
                ..Default::default()
            })
            .collect())
    }

    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        let exclude_reduce_only = param_bool(params, "excludeReduceOnly")
            .or_else(|| param_bool(params, "exclude_reduce_only"))
            .unwrap_or(false);
        let mut payload = Map::new();
        payload.insert("exclude_reduce_only".into(), Value::from(exclude_reduce_only));
        match symbol {
            Some(symbol) => {
                let market = self.market(symbol).await?;
                payload.insert("all_symbols".into(), Value::from(false));
                payload.insert("symbol".into(), Value::from(market.id));
            }
            None => {
                payload.insert("all_symbols".into(), Value::from(true));
            }
        }
        let response = self
            .post_action("cancel_all_orders", ActionType::CancelAllOrders, payload, params)
            .await?;
        Ok(vec![Order {
            info: response,
            ..Default::default()
        }])
    }

    async fn edit_order(&self, id: &str, order: &OrderRequest) -> ExchangeResult<Order> {
        let market = self.market(&order.symbol).await?;
        let price = order.price.clone().ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!("{} edit_order() requires a price", self.exchange_name()))
        })?;
        let mut payload = Map::new();
        payload.insert("symbol".into(), Value::from(market.id.clone()));
        payload.insert("price".into(), Value::from(price.clone()));
        payload.insert("amount".into(), Value::from(order.amount.clone()));
        match param_string(&order.params, "clientOrderId") {
            Some(client_id) => {
                payload.insert("client_order_id".into(), Value::from(client_id));
            }
            None if !id.is_empty() => {
                payload.insert("order_id".into(), order_id_value(id));
            }
            None => {
                return Err(ExchangeError::ArgumentsRequired(format!(
                    "{} edit_order() requires either \"id\" or \"clientOrderId\"",
                    self.exchange_name()
                )))
            }
        }
        let response = self
            .post_action("edit_order", ActionType::EditOrder, payload, &order.params)
            .await?;
        let data = safe_value(&response, "data").cloned().unwrap_or(Value::Null);
        Ok(Order {
            id: safe_string(&data, "order_id"),
            symbol: Some(market.symbol),
            price: Some(price),
            amount: Some(order.amount.clone()),
            info: response,
            ..Default::default()
        })
    }

    /// Latest state from the order's event history
    async fn fetch_order(&self, id: &str, _symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        let mut request = params.clone();
        request.insert("order_id".into(), order_id_value(id));
        let response = self
            .request("orders/history_by_id", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        data_list(&response)
            .iter()
            .max_by_key(|event| safe_integer(event, "created_at").unwrap_or(i64::MIN))
            .map(|latest| self.parse_order(latest))
            .ok_or_else(|| ExchangeError::OrderNotFound(format!("{} order {} not found", self.exchange_name(), id)))
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        let account = self.resolve_account("fetch_orders", &mut request)?;
        request.insert("account".into(), Value::from(account));
        if let Some(limit) = limit {
            request.insert("limit".into(), Value::from(limit as u64));
        }
        let response = self
            .request("orders/history", ApiTier::Private, HttpMethod::Get, request)
            .await?;
        let orders = self.orders_for_symbol(&response, symbol).await?;
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let mut request = params.clone();
        let account = self.resolve_account("fetch_open_orders", &mut request)?;
        request.insert("account".into(), Value::from(account));
        let response = self.request("orders", ApiTier::Private, HttpMethod::Get, request).await?;
        let orders = self
            .orders_for_symbol(&response, symbol)
            .await?
            .into_iter()
            .map(|mut order| {
                // the open-orders route omits the status field
                order.status.get_or_insert_with(|| "open".to_string());
                order
            })
            .collect();
        Ok(filter_by_since_limit(orders, since, limit, |o: &Order| o.timestamp))
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        let orders = self.fetch_orders(symbol, since, None, params).await?;
        let closed = orders
            .into_iter()
            .filter(|o| o.status.as_deref() == Some("closed"))
            .collect();
        Ok(filter_by_since_limit(closed, None, limit, |o: &Order| o.timestamp))
    }

    // =========================================================================
    // Funding and account settings
    // =========================================================================

    async fn withdraw(&self, code: &str, amount: &str, address: &str, params: &Params) -> ExchangeResult<Transaction> {
        if address.is_empty() {
            return Err(ExchangeError::ArgumentsRequired(format!(
                "{} withdraw() requires an address",
                self.exchange_name()
            )));
        }
        let mut payload = Map::new();
        payload.insert("amount".into(), Value::from(amount));
        let response = self
            .post_action("withdraw", ActionType::Withdraw, payload, params)
            .await?;
        Ok(Transaction {
            transaction_type: Some("withdrawal".to_string()),
            currency: Some(code.to_uppercase()),
            amount: Some(amount.to_string()),
            address: Some(address.to_string()),
            info: response,
            ..Default::default()
        })
    }

    async fn transfer(
        &self,
        code: &str,
        amount: &str,
        from_account: &str,
        to_account: &str,
        params: &Params,
    ) -> ExchangeResult<Transfer> {
        if to_account.is_empty() {
            return Err(ExchangeError::ArgumentsRequired(format!(
                "{} transfer() requires a \"toAccount\" argument",
                self.exchange_name()
            )));
        }
        let mut params = params.clone();
        if !from_account.is_empty() && !params.contains_key("account") {
            params.insert("account".into(), Value::from(from_account));
        }
        let mut payload = Map::new();
        payload.insert("to_account".into(), Value::from(to_account));
        payload.insert("amount".into(), Value::from(amount));
        let response = self
            .post_action("transfer", ActionType::TransferFunds, payload, &params)
            .await?;
        Ok(Transfer {
            currency: Some(code.to_uppercase()),
            amount: Some(amount.to_string()),
            from_account: Some(from_account.to_string()).filter(|a| !a.is_empty()),
            to_account: Some(to_account.to_string()),
            status: Some("ok".to_string()),
            info: safe_value(&response, "data").cloned().unwrap_or(response),
            ..Default::default()
        })
    }

    async fn set_leverage(&self, leverage: &str, symbol: &str, params: &Params) -> ExchangeResult<Leverage> {
        let value: u64 = leverage.parse().map_err(|_| {
            ExchangeError::BadRequest(format!(
                "{} set_leverage() expects an integer leverage, got {}",
                self.exchange_name(),
                leverage
            ))
        })?;
        let market = self.market(symbol).await?;
        let mut payload = Map::new();
        payload.insert("symbol".into(), Value::from(market.id.clone()));
        payload.insert("leverage".into(), Value::from(value));
        let response = self
            .post_action("set_leverage", ActionType::UpdateLeverage, payload, params)
            .await?;
        Ok(Leverage {
            symbol: Some(market.symbol),
            margin_mode: None,
            long_leverage: Some(leverage.to_string()),
            short_leverage: Some(leverage.to_string()),
            info: response,
        })
    }

    async fn set_margin_mode(&self, mode: &str, symbol: &str, params: &Params) -> ExchangeResult<MarginMode> {
        let is_isolated = match mode {
            "isolated" => true,
            "cross" => false,
            other => {
                return Err(ExchangeError::BadRequest(format!(
                    "{} set_margin_mode() expects cross or isolated, got {}",
                    self.exchange_name(),
                    other
                )))
            }
        };
        let market = self.market(symbol).await?;
        let mut payload = Map::new();
        payload.insert("symbol".into(), Value::from(market.id.clone()));
        payload.insert("is_isolated".into(), Value::from(is_isolated));
        let response = self
            .post_action("set_margin_mode", ActionType::UpdateMarginMode, payload, params)
            .await?;
        Ok(MarginMode {
            symbol: Some(market.symbol),
            margin_mode: Some(mode.to_string()),
            info: response,
        })
    }

    /// `name` is the sub-account address; `params.subAccountPrivateKey`
    /// signs its consent, the configured key confirms it
    async fn create_sub_account(&self, name: &str, params: &Params) -> ExchangeResult<Account> {
        let main_key = self.config.credentials.require_private_key(self.exchange_name())?;
        let mut params = params.clone();
        let sub_key = param_string(&params, "subAccountPrivateKey").ok_or_else(|| {
            ExchangeError::ArgumentsRequired(format!(
                "{} create_sub_account() requires \"subAccountPrivateKey\" in params",
                self.exchange_name()
            ))
        })?;
        let main_account = self.resolve_account("create_sub_account", &mut params)?;
        let timestamp = now_ms();
        let expiry_window = self.expiry_window(&params);

        let initiate = ActionHeader {
            timestamp,
            expiry_window,
            action: ActionType::SubaccountInitiate,
        };
        let sub_signature = sign_action(&sub_key, &initiate, &json!({"account": main_account}))?;
        let confirm = ActionHeader {
            action: ActionType::SubaccountConfirm,
            ..initiate
        };
        let main_signature = sign_action(main_key, &confirm, &json!({"signature": sub_signature}))?;

        let mut body = Params::new();
        if let Some(agent) = param_string(&params, "agentAddress") {
            body.insert("agent_wallet".into(), Value::from(agent));
        }
        body.insert("main_account".into(), Value::from(main_account));
        body.insert("subaccount".into(), Value::from(name));
        body.insert("sub_signature".into(), Value::from(sub_signature));
        body.insert("main_signature".into(), Value::from(main_signature));
        body.insert("timestamp".into(), Value::from(timestamp));
        body.insert("expiry_window".into(), Value::from(expiry_window));
        let response = self
            .request(ActionType::SubaccountConfirm.path(), ApiTier::Private, HttpMethod::Post, body)
            .await?;
        Ok(Account {
            id: Some(name.to_string()),
            account_type: Some("subaccount".to_string()),
            code: Some(SETTLE_CURRENCY.to_string()),
            info: response,
        })
    }
}

impl PacificaAdapter {
    /// Parse the `data` list and keep orders of `symbol` when given
    async fn orders_for_symbol(&self, response: &Value, symbol: Option<&str>) -> ExchangeResult<Vec<Order>> {
        let wanted = match symbol {
            Some(symbol) => Some(self.market(symbol).await?.symbol),
            None => None,
        };
        Ok(data_list(response)
            .iter()
            .map(|o| self.parse_order(o))
            .filter(|o| wanted.is_none() || o.symbol == wanted)
            .collect())
    }
}
