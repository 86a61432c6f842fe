//! Pacifica Types
//!
//! Identity, REST surface and error table. Pacifica lists every perpetual
//! by its base asset (`BTC`), always margined and settled in USDC.

use crate::adapters::endpoints::EndpointTable;
use crate::adapters::errors::{ErrorKind, ErrorTable};
use crate::adapters::types::ExchangeIdentity;

pub const PACIFICA: ExchangeIdentity = ExchangeIdentity {
    id: "pacifica",
    name: "Pacifica",
    countries: &[],
    version: "v1",
    rate_limit_ms: 50,
    alias_of: None,
};

/// Same adapter pinned to the test host
pub const PACIFICA_TESTNET: ExchangeIdentity = PACIFICA.alias("pacifica-testnet", "Pacifica Testnet");

/// Quote and settlement currency of every market
pub const SETTLE_CURRENCY: &str = "USDC";

/// Cost charged for heavy routes once an API key is attached
pub const HEAVY_COST_WITH_API_KEY: f64 = 3.0;

pub const TAKER_FEE: &str = "0.0004";
pub const MAKER_FEE: &str = "0.00015";

/// Actions one `orders/batch` call may carry
pub const BATCH_ORDERS_MAX: usize = 10;

pub const BATCH_ORDERS_PATH: &str = "orders/batch";

pub const TIMEFRAMES: &[&str] = &["1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "8h", "12h", "1d"];

pub const PACIFICA_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "info" => 1.0,
    Public Get "info/prices" => 1.0,
    Public Get "kline" => 12.0,
    Public Get "book" => 1.0,
    Public Get "trades" => 1.0,
    Public Get "funding_rate/history" => 1.0,
    Private Get "account" => 1.0,
    Private Get "account/settings" => 1.0,
    Private Get "account/balance/history" => 12.0,
    Private Get "positions" => 1.0,
    Private Get "trades/history" => 12.0,
    Private Get "orders" => 1.0,
    Private Get "orders/history" => 12.0,
    Private Get "orders/history_by_id" => 1.0,
    Private Get "funding/history" => 12.0,
    Private Post "orders/create" => 1.0,
    Private Post "orders/create_market" => 1.0,
    Private Post "orders/stop/create" => 1.0,
    Private Post "positions/tpsl" => 1.0,
    Private Post "orders/cancel" => 0.5,
    Private Post "orders/cancel_all" => 0.5,
    Private Post "orders/stop/cancel" => 0.5,
    Private Post "orders/edit" => 1.0,
    Private Post "orders/batch" => 1.0,
    Private Post "account/leverage" => 1.0,
    Private Post "account/margin" => 1.0,
    Private Post "account/withdraw" => 1.0,
    Private Post "account/subaccount/create" => 1.0,
    Private Post "account/subaccount/list" => 1.0,
    Private Post "account/subaccount/transfer" => 1.0,
]);

/// `code` is compared against the exact table, `error` against both.
pub const PACIFICA_ERRORS: ErrorTable = ErrorTable {
    exact: &[
        ("400", ErrorKind::BadRequest),
        ("403", ErrorKind::PermissionDenied),
        ("404", ErrorKind::BadRequest),
        ("409", ErrorKind::Exchange),
        ("422", ErrorKind::Exchange),
        ("429", ErrorKind::RateLimitExceeded),
        ("500", ErrorKind::Exchange),
        ("503", ErrorKind::ExchangeNotAvailable),
        ("504", ErrorKind::RequestTimeout),
    ],
    broad: &[
        ("INSUFFICIENT_BALANCE", ErrorKind::InsufficientFunds),
        ("OVER_WITHDRAWAL", ErrorKind::InsufficientFunds),
        ("ORDER_NOT_FOUND", ErrorKind::OrderNotFound),
        ("INVALID_TICK_LEVEL", ErrorKind::InvalidOrder),
        ("POSITION_TPSL_LIMIT_EXCEEDED", ErrorKind::InvalidOrder),
        ("ACCOUNT_NOT_FOUND", ErrorKind::Exchange),
        ("BOOK_NOT_FOUND", ErrorKind::Exchange),
        ("INVALID_LEVERAGE", ErrorKind::Exchange),
        ("CANNOT_UPDATE_MARGIN", ErrorKind::Exchange),
        ("POSITION_NOT_FOUND", ErrorKind::Exchange),
        ("UNKNOWN", ErrorKind::Exchange),
    ],
};

/// Signed action names, one per write route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    CreateOrder,
    CreateMarketOrder,
    CreateStopOrder,
    SetPositionTpsl,
    CancelOrder,
    CancelStopOrder,
    CancelAllOrders,
    EditOrder,
    UpdateLeverage,
    UpdateMarginMode,
    Withdraw,
    TransferFunds,
    SubaccountInitiate,
    SubaccountConfirm,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateOrder => "create_order",
            ActionType::CreateMarketOrder => "create_market_order",
            ActionType::CreateStopOrder => "create_stop_order",
            ActionType::SetPositionTpsl => "set_position_tpsl",
            ActionType::CancelOrder => "cancel_order",
            ActionType::CancelStopOrder => "cancel_stop_order",
            ActionType::CancelAllOrders => "cancel_all_orders",
            ActionType::EditOrder => "edit_order",
            ActionType::UpdateLeverage => "update_leverage",
            ActionType::UpdateMarginMode => "update_margin_mode",
            ActionType::Withdraw => "withdraw",
            ActionType::TransferFunds => "transfer_funds",
            ActionType::SubaccountInitiate => "subaccount_initiate",
            ActionType::SubaccountConfirm => "subaccount_confirm",
        }
    }

    /// Route the signed action is posted to
    pub fn path(&self) -> &'static str {
        match self {
            ActionType::CreateOrder => "orders/create",
            ActionType::CreateMarketOrder => "orders/create_market",
            ActionType::CreateStopOrder => "orders/stop/create",
            ActionType::SetPositionTpsl => "positions/tpsl",
            ActionType::CancelOrder => "orders/cancel",
            ActionType::CancelStopOrder => "orders/stop/cancel",
            ActionType::CancelAllOrders => "orders/cancel_all",
            ActionType::EditOrder => "orders/edit",
            ActionType::UpdateLeverage => "account/leverage",
            ActionType::UpdateMarginMode => "account/margin",
            ActionType::Withdraw => "account/withdraw",
            ActionType::TransferFunds => "account/subaccount/transfer",
            ActionType::SubaccountInitiate | ActionType::SubaccountConfirm => "account/subaccount/create",
        }
    }
}

pub fn parse_order_status(status: &str) -> String {
    match status {
        "open" | "partially_filled" => "open",
        "filled" => "closed",
        "cancelled" => "canceled",
        "rejected" => "rejected",
        other => other,
    }
    .to_string()
}

/// Trigger order types collapse onto their execution type
pub fn parse_order_type(order_type: &str) -> String {
    match order_type {
        "stop_limit" | "take_profit_limit" | "stop_loss_limit" => "limit",
        "stop_market" | "take_profit_market" | "stop_loss_market" => "market",
        other => other,
    }
    .to_string()
}

/// Unified time-in-force onto the venue's names
pub fn map_time_in_force(tif: &str) -> Option<&'static str> {
    match tif.to_uppercase().as_str() {
        "GTC" => Some("GTC"),
        "IOC" => Some("IOC"),
        "PO" | "POST_ONLY" | "ALO" => Some("ALO"),
        "PO_TOB" | "TOB" => Some("TOB"),
        _ => None,
    }
}

/// Balance event types onto ledger entry types
pub fn parse_ledger_entry_type(event: &str) -> String {
    match event {
        "subaccount_transfer" => "transfer",
        "deposit" | "deposit_release" | "withdraw" => "transaction",
        "trade" | "market_liquidation" | "backstop_liquidation" | "adl_liquidation" => "trade",
        other => other,
    }
    .to_string()
}

/// Position-direction trade sides onto buy/sell
pub fn parse_trade_side(side: &str) -> String {
    match side {
        "open_long" | "close_short" => "buy",
        "open_short" | "close_long" => "sell",
        other => other,
    }
    .to_string()
}
