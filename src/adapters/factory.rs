//! Adapter factory for dynamic exchange selection
//!
//! Creates `ExchangeAdapter` instances from exchange ids.
//! Uses an enum-based dispatch pattern (no `Box<dyn>`) to preserve monomorphization.
//! Alias ids build the canonical adapter under the alias identity record.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::adapters::backpack::{BackpackAdapter, BackpackConfig, BACKPACK_EXCHANGE};
use crate::adapters::deepwaters::{DeepwatersAdapter, DeepwatersConfig};
use crate::adapters::endpoints::{ApiTier, EndpointTable};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::indodax::{IndodaxAdapter, IndodaxConfig};
use crate::adapters::markets::MarketDirectory;
use crate::adapters::pacifica::{PacificaAdapter, PacificaConfig, PACIFICA_TESTNET};
use crate::adapters::safe::Params;
use crate::adapters::toobit::{ToobitAdapter, ToobitConfig};
use crate::adapters::traits::ExchangeAdapter;
use crate::adapters::transport::RestClient;
use crate::adapters::types::{
    Account, Balances, Currency, DepositAddress, ExchangeIdentity, ExchangeStatus, FundingHistory, FundingRate,
    FundingRateHistory, HttpMethod, LastPrice, LedgerEntry, Leverage, MarginMode, Market, Ohlcv, OpenInterest, Order,
    OrderBook, OrderRequest, Position, RequestDescriptor, Ticker, Trade, Transaction, TransactionFee, Transfer,
};

// =============================================================================
// AnyAdapter - enum-based dispatch for dynamic exchange selection
// =============================================================================

/// Enum wrapping all concrete adapter types for runtime dispatch.
pub enum AnyAdapter {
    Pacifica(PacificaAdapter),
    Toobit(ToobitAdapter),
    Indodax(IndodaxAdapter),
    Backpack(BackpackAdapter),
    Deepwaters(DeepwatersAdapter),
}

/// Macro to reduce boilerplate for delegating trait methods
macro_rules! delegate {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyAdapter::Pacifica(a) => a.$method($($arg),*),
            AnyAdapter::Toobit(a) => a.$method($($arg),*),
            AnyAdapter::Indodax(a) => a.$method($($arg),*),
            AnyAdapter::Backpack(a) => a.$method($($arg),*),
            AnyAdapter::Deepwaters(a) => a.$method($($arg),*),
        }
    };
    (await $self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyAdapter::Pacifica(a) => a.$method($($arg),*).await,
            AnyAdapter::Toobit(a) => a.$method($($arg),*).await,
            AnyAdapter::Indodax(a) => a.$method($($arg),*).await,
            AnyAdapter::Backpack(a) => a.$method($($arg),*).await,
            AnyAdapter::Deepwaters(a) => a.$method($($arg),*).await,
        }
    };
}

#[async_trait]
impl ExchangeAdapter for AnyAdapter {
    fn identity(&self) -> &ExchangeIdentity {
        delegate!(self, identity())
    }

    fn endpoints(&self) -> &EndpointTable {
        delegate!(self, endpoints())
    }

    fn transport(&self) -> &RestClient {
        delegate!(self, transport())
    }

    fn directory(&self) -> &MarketDirectory {
        delegate!(self, directory())
    }

    fn sign(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<RequestDescriptor> {
        delegate!(self, sign(path, tier, method, params))
    }

    fn handle_errors(&self, status: u16, body: &str, response: Option<&Value>) -> Option<ExchangeError> {
        delegate!(self, handle_errors(status, body, response))
    }

    fn cost(&self, tier: ApiTier, method: HttpMethod, path: &str) -> f64 {
        delegate!(self, cost(tier, method, path))
    }

    async fn request(&self, path: &str, tier: ApiTier, method: HttpMethod, params: Params) -> ExchangeResult<Value> {
        delegate!(await self, request(path, tier, method, params))
    }

    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<Market>> {
        delegate!(await self, load_markets(reload))
    }

    async fn market(&self, symbol: &str) -> ExchangeResult<Market> {
        delegate!(await self, market(symbol))
    }

    async fn fetch_time(&self) -> ExchangeResult<i64> {
        delegate!(await self, fetch_time())
    }

    async fn fetch_status(&self) -> ExchangeResult<ExchangeStatus> {
        delegate!(await self, fetch_status())
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        delegate!(await self, fetch_markets())
    }

    async fn fetch_currencies(&self) -> ExchangeResult<Vec<Currency>> {
        delegate!(await self, fetch_currencies())
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        delegate!(await self, fetch_ticker(symbol))
    }

    async fn fetch_tickers(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        delegate!(await self, fetch_tickers(symbols))
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<usize>) -> ExchangeResult<OrderBook> {
        delegate!(await self, fetch_order_book(symbol, limit))
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        delegate!(await self, fetch_trades(symbol, since, limit, params))
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        delegate!(await self, fetch_ohlcv(symbol, timeframe, since, limit, params))
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> ExchangeResult<FundingRate> {
        delegate!(await self, fetch_funding_rate(symbol))
    }

    async fn fetch_funding_rates(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<FundingRate>> {
        delegate!(await self, fetch_funding_rates(symbols))
    }

    async fn fetch_funding_rate_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<FundingRateHistory>> {
        delegate!(await self, fetch_funding_rate_history(symbol, since, limit))
    }

    async fn fetch_open_interest(&self, symbol: &str) -> ExchangeResult<OpenInterest> {
        delegate!(await self, fetch_open_interest(symbol))
    }

    async fn fetch_open_interests(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<OpenInterest>> {
        delegate!(await self, fetch_open_interests(symbols))
    }

    async fn fetch_last_prices(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<LastPrice>> {
        delegate!(await self, fetch_last_prices(symbols))
    }

    async fn fetch_bids_asks(&self, symbols: Option<&[String]>) -> ExchangeResult<Vec<Ticker>> {
        delegate!(await self, fetch_bids_asks(symbols))
    }

    async fn fetch_accounts(&self) -> ExchangeResult<Vec<Account>> {
        delegate!(await self, fetch_accounts())
    }

    async fn fetch_balance(&self, params: &Params) -> ExchangeResult<Balances> {
        delegate!(await self, fetch_balance(params))
    }

    async fn fetch_positions(&self, symbols: Option<&[String]>, params: &Params) -> ExchangeResult<Vec<Position>> {
        delegate!(await self, fetch_positions(symbols, params))
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Trade>> {
        delegate!(await self, fetch_my_trades(symbol, since, limit, params))
    }

    async fn fetch_transactions(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        delegate!(await self, fetch_transactions(code, since, limit, params))
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        delegate!(await self, fetch_deposits(code, since, limit, params))
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Transaction>> {
        delegate!(await self, fetch_withdrawals(code, since, limit, params))
    }

    async fn fetch_ledger(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<LedgerEntry>> {
        delegate!(await self, fetch_ledger(code, since, limit, params))
    }

    async fn fetch_funding_history(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<FundingHistory>> {
        delegate!(await self, fetch_funding_history(symbol, since, limit, params))
    }

    async fn fetch_leverage(&self, symbol: &str, params: &Params) -> ExchangeResult<Leverage> {
        delegate!(await self, fetch_leverage(symbol, params))
    }

    async fn fetch_margin_mode(&self, symbol: &str, params: &Params) -> ExchangeResult<MarginMode> {
        delegate!(await self, fetch_margin_mode(symbol, params))
    }

    async fn create_order(&self, order: &OrderRequest) -> ExchangeResult<Order> {
        delegate!(await self, create_order(order))
    }

    async fn create_orders(&self, orders: &[OrderRequest]) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, create_orders(orders))
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        delegate!(await self, cancel_order(id, symbol, params))
    }

    async fn cancel_orders(&self, ids: &[String], symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, cancel_orders(ids, symbol, params))
    }

    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &Params) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, cancel_all_orders(symbol, params))
    }

    async fn edit_order(&self, id: &str, order: &OrderRequest) -> ExchangeResult<Order> {
        delegate!(await self, edit_order(id, order))
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &Params) -> ExchangeResult<Order> {
        delegate!(await self, fetch_order(id, symbol, params))
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, fetch_orders(symbol, since, limit, params))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, fetch_open_orders(symbol, since, limit, params))
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, fetch_closed_orders(symbol, since, limit, params))
    }

    async fn fetch_canceled_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
        params: &Params,
    ) -> ExchangeResult<Vec<Order>> {
        delegate!(await self, fetch_canceled_orders(symbol, since, limit, params))
    }

    async fn withdraw(&self, code: &str, amount: &str, address: &str, params: &Params) -> ExchangeResult<Transaction> {
        delegate!(await self, withdraw(code, amount, address, params))
    }

    async fn fetch_deposit_address(&self, code: &str, params: &Params) -> ExchangeResult<DepositAddress> {
        delegate!(await self, fetch_deposit_address(code, params))
    }

    async fn fetch_deposit_addresses(
        &self,
        codes: Option<&[String]>,
        params: &Params,
    ) -> ExchangeResult<Vec<DepositAddress>> {
        delegate!(await self, fetch_deposit_addresses(codes, params))
    }

    async fn fetch_transaction_fee(&self, code: &str, params: &Params) -> ExchangeResult<TransactionFee> {
        delegate!(await self, fetch_transaction_fee(code, params))
    }

    async fn transfer(
        &self,
        code: &str,
        amount: &str,
        from_account: &str,
        to_account: &str,
        params: &Params,
    ) -> ExchangeResult<Transfer> {
        delegate!(await self, transfer(code, amount, from_account, to_account, params))
    }

    async fn set_leverage(&self, leverage: &str, symbol: &str, params: &Params) -> ExchangeResult<Leverage> {
        delegate!(await self, set_leverage(leverage, symbol, params))
    }

    async fn set_margin_mode(&self, mode: &str, symbol: &str, params: &Params) -> ExchangeResult<MarginMode> {
        delegate!(await self, set_margin_mode(mode, symbol, params))
    }

    async fn create_sub_account(&self, name: &str, params: &Params) -> ExchangeResult<Account> {
        delegate!(await self, create_sub_account(name, params))
    }
}

// =============================================================================
// Factory Functions
// =============================================================================

/// All supported exchange adapter ids, aliases included.
pub const SUPPORTED_EXCHANGES: &[&str] = &[
    "pacifica",
    "pacifica-testnet",
    "toobit",
    "indodax",
    "backpack",
    "backpack-exchange",
    "deepwaters",
];

/// Settings layered over the environment-derived config.
///
/// Fields a venue has no use for are ignored. On Pacifica the receive window
/// is the signed action's expiry window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterOverrides {
    pub sandbox: Option<bool>,
    pub recv_window_ms: Option<u64>,
    pub timeout: Option<Duration>,
}

/// Create an adapter from an exchange id, reading credentials from the environment.
pub fn create_adapter(name: &str) -> ExchangeResult<AnyAdapter> {
    create_adapter_with(name, &AdapterOverrides::default())
}

/// Create an adapter from an exchange id with explicit overrides.
pub fn create_adapter_with(name: &str, overrides: &AdapterOverrides) -> ExchangeResult<AnyAdapter> {
    if !SUPPORTED_EXCHANGES.contains(&name) {
        return Err(ExchangeError::NotSupported(format!(
            "Unknown exchange adapter: '{}'. Supported: {}",
            name,
            SUPPORTED_EXCHANGES.join(", ")
        )));
    }
    if overrides.sandbox == Some(true) && matches!(name, "toobit" | "indodax" | "backpack" | "backpack-exchange") {
        tracing::warn!(exchange = %name, phase = "init", "Venue has no sandbox, using production host");
    }

    let adapter = match name {
        "pacifica" | "pacifica-testnet" => {
            let mut config = PacificaConfig::from_env()?;
            if let Some(sandbox) = overrides.sandbox {
                config.sandbox = sandbox;
            }
            if let Some(window) = overrides.recv_window_ms {
                config.expiry_window_ms = window;
            }
            if let Some(timeout) = overrides.timeout {
                config.timeout = timeout;
            }
            if name == "pacifica-testnet" {
                AnyAdapter::Pacifica(PacificaAdapter::with_identity(config, PACIFICA_TESTNET))
            } else {
                AnyAdapter::Pacifica(PacificaAdapter::new(config))
            }
        }
        "toobit" => {
            let mut config = ToobitConfig::from_env()?;
            if let Some(window) = overrides.recv_window_ms {
                config.recv_window_ms = window;
            }
            if let Some(timeout) = overrides.timeout {
                config.timeout = timeout;
            }
            AnyAdapter::Toobit(ToobitAdapter::new(config))
        }
        "indodax" => {
            let mut config = IndodaxConfig::from_env()?;
            if let Some(window) = overrides.recv_window_ms {
                config.recv_window_ms = window;
            }
            if let Some(timeout) = overrides.timeout {
                config.timeout = timeout;
            }
            AnyAdapter::Indodax(IndodaxAdapter::new(config))
        }
        "backpack" | "backpack-exchange" => {
            let mut config = BackpackConfig::from_env()?;
            if let Some(window) = overrides.recv_window_ms {
                config.recv_window_ms = window;
            }
            if let Some(timeout) = overrides.timeout {
                config.timeout = timeout;
            }
            if name == "backpack-exchange" {
                AnyAdapter::Backpack(BackpackAdapter::with_identity(config, BACKPACK_EXCHANGE))
            } else {
                AnyAdapter::Backpack(BackpackAdapter::new(config))
            }
        }
        _ => {
            let mut config = DeepwatersConfig::from_env()?;
            if let Some(sandbox) = overrides.sandbox {
                config.sandbox = sandbox;
            }
            if let Some(timeout) = overrides.timeout {
                config.timeout = timeout;
            }
            AnyAdapter::Deepwaters(DeepwatersAdapter::new(config))
        }
    };
    Ok(adapter)
}
