//! Backpack Types
//!
//! Identity records, REST surface, signing instructions, error table and
//! vendor enum maps.

use crate::adapters::endpoints::EndpointTable;
use crate::adapters::errors::{ErrorKind, ErrorTable};
use crate::adapters::types::{ExchangeIdentity, HttpMethod, MarketType};

/// Sent as `X-Broker-Id` on every private request
pub const BROKER_ID: &str = "1400";

/// Batch order route; its body is a JSON array
pub const BATCH_ORDERS_PATH: &str = "api/v1/orders";

pub const BACKPACK: ExchangeIdentity = ExchangeIdentity {
    id: "backpack",
    name: "Backpack",
    countries: &["JP"],
    version: "v1",
    rate_limit_ms: 50,
    alias_of: None,
};

/// Same venue under its long name
pub const BACKPACK_EXCHANGE: ExchangeIdentity = BACKPACK.alias("backpack-exchange", "Backpack Exchange");

pub const BACKPACK_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "api/v1/assets" => 1.0,
    Public Get "api/v1/collateral" => 1.0,
    Public Get "api/v1/markets" => 1.0,
    Public Get "api/v1/market" => 1.0,
    Public Get "api/v1/ticker" => 1.0,
    Public Get "api/v1/tickers" => 1.0,
    Public Get "api/v1/depth" => 1.0,
    Public Get "api/v1/klines" => 1.0,
    Public Get "api/v1/markPrices" => 1.0,
    Public Get "api/v1/openInterest" => 1.0,
    Public Get "api/v1/fundingRates" => 1.0,
    Public Get "api/v1/status" => 1.0,
    Public Get "api/v1/ping" => 1.0,
    Public Get "api/v1/time" => 1.0,
    Public Get "api/v1/trades" => 1.0,
    Public Get "api/v1/trades/history" => 1.0,
    Private Get "api/v1/account" => 1.0,
    Private Get "api/v1/capital" => 1.0,
    Private Get "api/v1/capital/collateral" => 1.0,
    Private Get "api/v1/position" => 1.0,
    Private Get "api/v1/order" => 1.0,
    Private Get "api/v1/orders" => 1.0,
    Private Get "wapi/v1/capital/deposits" => 1.0,
    Private Get "wapi/v1/capital/deposit/address" => 1.0,
    Private Get "wapi/v1/capital/withdrawals" => 1.0,
    Private Get "wapi/v1/history/fills" => 1.0,
    Private Get "wapi/v1/history/orders" => 1.0,
    Private Get "wapi/v1/history/funding" => 1.0,
    Private Post "api/v1/order" => 1.0,
    Private Post "api/v1/orders" => 1.0,
    Private Post "wapi/v1/capital/withdrawals" => 1.0,
    Private Delete "api/v1/order" => 1.0,
    Private Delete "api/v1/orders" => 1.0,
]);

/// Signing instruction per private route and verb
const INSTRUCTIONS: &[(&str, HttpMethod, &str)] = &[
    ("api/v1/account", HttpMethod::Get, "accountQuery"),
    ("api/v1/capital", HttpMethod::Get, "balanceQuery"),
    ("api/v1/capital/collateral", HttpMethod::Get, "collateralQuery"),
    ("wapi/v1/capital/deposit/address", HttpMethod::Get, "depositAddressQuery"),
    ("wapi/v1/capital/deposits", HttpMethod::Get, "depositQueryAll"),
    ("wapi/v1/history/fills", HttpMethod::Get, "fillHistoryQueryAll"),
    ("wapi/v1/history/funding", HttpMethod::Get, "fundingHistoryQueryAll"),
    ("api/v1/order", HttpMethod::Get, "orderQuery"),
    ("api/v1/order", HttpMethod::Post, "orderExecute"),
    ("api/v1/order", HttpMethod::Delete, "orderCancel"),
    ("api/v1/orders", HttpMethod::Get, "orderQueryAll"),
    ("api/v1/orders", HttpMethod::Post, "orderExecute"),
    ("api/v1/orders", HttpMethod::Delete, "orderCancelAll"),
    ("wapi/v1/history/orders", HttpMethod::Get, "orderHistoryQueryAll"),
    ("api/v1/position", HttpMethod::Get, "positionQuery"),
    ("wapi/v1/capital/withdrawals", HttpMethod::Get, "withdrawalQueryAll"),
    ("wapi/v1/capital/withdrawals", HttpMethod::Post, "withdraw"),
];

pub fn instruction_for(path: &str, method: HttpMethod) -> Option<&'static str> {
    INSTRUCTIONS
        .iter()
        .find(|(p, m, _)| *p == path && *m == method)
        .map(|(_, _, instruction)| *instruction)
}

pub const BACKPACK_ERRORS: ErrorTable = ErrorTable {
    exact: &[
        ("INVALID_CLIENT_REQUEST", ErrorKind::BadRequest),
        ("INVALID_ORDER", ErrorKind::InvalidOrder),
        ("ACCOUNT_LIQUIDATING", ErrorKind::BadRequest),
        ("BORROW_LIMIT", ErrorKind::BadRequest),
        ("BORROW_REQUIRES_LEND_REDEEM", ErrorKind::BadRequest),
        ("FORBIDDEN", ErrorKind::OperationRejected),
        ("INSUFFICIENT_FUNDS", ErrorKind::InsufficientFunds),
        ("INSUFFICIENT_MARGIN", ErrorKind::InsufficientFunds),
        ("INSUFFICIENT_SUPPLY", ErrorKind::InsufficientFunds),
        ("INVALID_ASSET", ErrorKind::BadRequest),
        ("INVALID_MARKET", ErrorKind::BadSymbol),
        ("INVALID_PRICE", ErrorKind::BadRequest),
        ("INVALID_POSITION_ID", ErrorKind::BadRequest),
        ("INVALID_QUANTITY", ErrorKind::BadRequest),
        ("INVALID_RANGE", ErrorKind::BadRequest),
        ("INVALID_SIGNATURE", ErrorKind::Authentication),
        ("INVALID_SOURCE", ErrorKind::BadRequest),
        ("INVALID_SYMBOL", ErrorKind::BadSymbol),
        ("INVALID_TWO_FACTOR_CODE", ErrorKind::BadRequest),
        ("LEND_LIMIT", ErrorKind::BadRequest),
        ("LEND_REQUIRES_BORROW_REPAY", ErrorKind::BadRequest),
        ("MAINTENANCE", ErrorKind::Exchange),
        ("MAX_LEVERAGE_REACHED", ErrorKind::InsufficientFunds),
        ("NOT_IMPLEMENTED", ErrorKind::OperationFailed),
        ("ORDER_LIMIT", ErrorKind::OperationRejected),
        ("POSITION_LIMIT", ErrorKind::OperationRejected),
        ("PRECONDITION_FAILED", ErrorKind::OperationFailed),
        ("RESOURCE_NOT_FOUND", ErrorKind::ExchangeNotAvailable),
        ("SERVER_ERROR", ErrorKind::NetworkError),
        ("TIMEOUT", ErrorKind::RequestTimeout),
        ("TOO_MANY_REQUESTS", ErrorKind::RateLimitExceeded),
        ("TRADING_PAUSED", ErrorKind::ExchangeNotAvailable),
        ("UNAUTHORIZED", ErrorKind::Authentication),
    ],
    broad: &[],
};

/// Unified timeframe -> kline `interval`
pub const TIMEFRAMES: &[(&str, &str)] = &[
    ("1m", "1m"),
    ("3m", "3m"),
    ("5m", "5m"),
    ("15m", "15m"),
    ("30m", "30m"),
    ("1h", "1h"),
    ("2h", "2h"),
    ("4h", "4h"),
    ("6h", "6h"),
    ("8h", "8h"),
    ("12h", "12h"),
    ("1d", "1d"),
    ("3d", "3d"),
    ("1w", "1w"),
    ("1M", "1month"),
];

/// Vendor blockchain name -> unified network code
pub const NETWORKS: &[(&str, &str)] = &[
    ("Solana", "SOL"),
    ("Sui", "SUI"),
    ("Ethereum", "ERC20"),
    ("Story", "STORY"),
    ("Eclipse", "ECLIPSE"),
    ("Arbitrum", "ARB"),
    ("Base", "BASE"),
    ("Optimism", "OPTIMISM"),
    ("Polygon", "MATIC"),
    ("XRP", "XRP"),
    ("Cardano", "ADA"),
    ("Hyperliquid", "HYP"),
    ("Tron", "TRC20"),
    ("Dogecoin", "DOGE"),
    ("Bitcoin", "BTC"),
    ("Berachain", "BERA"),
    ("BSC", "BSC"),
];

pub fn interval_for(timeframe: &str) -> Option<&'static str> {
    TIMEFRAMES
        .iter()
        .find(|(unified, _)| *unified == timeframe)
        .map(|(_, id)| *id)
}

/// Unknown blockchains keep their vendor name, uppercased. Capital history
/// sends the name lowercased, so matching ignores case.
pub fn network_code(blockchain: &str) -> String {
    NETWORKS
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(blockchain))
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| blockchain.to_uppercase())
}

/// Vendor blockchain name for a unified network code
pub fn network_id(code: &str) -> String {
    NETWORKS
        .iter()
        .find(|(_, unified)| unified.eq_ignore_ascii_case(code))
        .map(|(id, _)| id.to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn parse_transaction_status(status: &str) -> String {
    match status {
        "confirmed" => "ok",
        "information required" => "pending",
        other => other,
    }
    .to_string()
}

/// `SPOT` and `PERP` map; anything else passes through
pub fn parse_market_type(market_type: &str) -> MarketType {
    match market_type {
        "SPOT" => MarketType::Spot,
        "PERP" => MarketType::Swap,
        other => MarketType::Other(other.to_string()),
    }
}

pub fn parse_order_status(status: &str) -> String {
    match status {
        "New" | "PartiallyFilled" | "TriggerPending" => "open",
        "Filled" => "closed",
        "Cancelled" => "canceled",
        "Expired" => "expired",
        other => other,
    }
    .to_string()
}

pub fn parse_side(side: &str) -> String {
    match side {
        "Bid" => "buy".to_string(),
        "Ask" => "sell".to_string(),
        other => other.to_lowercase(),
    }
}
