//! Indodax Types
//!
//! Identity, REST surface, error table, currency aliases and status maps.

use crate::adapters::endpoints::EndpointTable;
use crate::adapters::errors::{ErrorKind, ErrorTable};
use crate::adapters::markets::CommonCurrencies;
use crate::adapters::types::ExchangeIdentity;

pub const INDODAX: ExchangeIdentity = ExchangeIdentity {
    id: "indodax",
    name: "INDODAX",
    countries: &["ID"],
    version: "2.0",
    rate_limit_ms: 100,
    alias_of: None,
};

/// Public routes cost 5 (180 req/min); private calls 4, placing an order 1
pub const INDODAX_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "api/server_time" => 5.0,
    Public Get "api/pairs" => 5.0,
    Public Get "api/price_increments" => 5.0,
    Public Get "api/summaries" => 5.0,
    Public Get "api/ticker/{pair}" => 5.0,
    Public Get "api/ticker_all" => 5.0,
    Public Get "api/trades/{pair}" => 5.0,
    Public Get "api/depth/{pair}" => 5.0,
    Public Get "tradingview/history_v2" => 5.0,
    Private Post "getInfo" => 4.0,
    Private Post "transHistory" => 4.0,
    Private Post "trade" => 1.0,
    Private Post "tradeHistory" => 4.0,
    Private Post "openOrders" => 4.0,
    Private Post "orderHistory" => 4.0,
    Private Post "getOrder" => 4.0,
    Private Post "cancelOrder" => 4.0,
    Private Post "withdrawFee" => 4.0,
    Private Post "withdrawCoin" => 4.0,
    Private Post "listDownline" => 4.0,
    Private Post "checkDownline" => 4.0,
    Private Post "createVoucher" => 4.0,
]);

pub const INDODAX_ERRORS: ErrorTable = ErrorTable {
    exact: &[
        ("invalid_pair", ErrorKind::BadSymbol),
        ("Insufficient balance.", ErrorKind::InsufficientFunds),
        ("invalid order.", ErrorKind::OrderNotFound),
        (
            "Invalid credentials. API not found or session has expired.",
            ErrorKind::Authentication,
        ),
        ("Invalid credentials. Bad sign.", ErrorKind::Authentication),
    ],
    broad: &[
        ("Minimum price", ErrorKind::InvalidOrder),
        ("Minimum order", ErrorKind::InvalidOrder),
    ],
};

pub const COMMON_CURRENCIES: CommonCurrencies = &[
    ("STR", "XLM"),
    ("BCHABC", "BCH"),
    ("BCHSV", "BSV"),
    ("DRK", "DASH"),
    ("NEM", "XEM"),
];

/// Unified network code -> deposit network id reported by `getInfo`
pub const NETWORKS: &[(&str, &str)] = &[
    ("XLM", "Stellar Token"),
    ("BSC", "bep20"),
    ("TRC20", "trc20"),
    ("MATIC", "polygon"),
];

/// Unknown ids pass through uppercased
pub fn network_code(network_id: &str) -> String {
    NETWORKS
        .iter()
        .find(|(_, id)| id.eq_ignore_ascii_case(network_id))
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| network_id.to_uppercase())
}

/// Unified timeframe -> `tf` value of `tradingview/history_v2`
pub const TIMEFRAMES: &[(&str, &str)] = &[
    ("1m", "1"),
    ("15m", "15"),
    ("30m", "30"),
    ("1h", "60"),
    ("4h", "240"),
    ("1d", "1D"),
    ("3d", "3D"),
    ("1w", "1W"),
];

/// Candles requested when no limit is given
pub const DEFAULT_OHLCV_LIMIT: usize = 1000;

pub fn timeframe_id(timeframe: &str) -> Option<&'static str> {
    TIMEFRAMES
        .iter()
        .find(|(unified, _)| *unified == timeframe)
        .map(|(_, id)| *id)
}

pub fn parse_order_status(status: &str) -> String {
    match status {
        "open" => "open",
        "filled" => "closed",
        "cancelled" => "canceled",
        other => other,
    }
    .to_string()
}

pub fn parse_transaction_status(status: &str) -> String {
    match status {
        "success" => "ok".to_string(),
        other => other.to_string(),
    }
}
