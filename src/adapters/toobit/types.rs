//! Toobit Types
//!
//! Identity, REST surface, error table and the vendor enum maps.

use crate::adapters::endpoints::EndpointTable;
use crate::adapters::errors::{ErrorKind, ErrorTable};
use crate::adapters::types::ExchangeIdentity;

pub const TOOBIT: ExchangeIdentity = ExchangeIdentity {
    id: "toobit",
    name: "Toobit",
    countries: &["KY"],
    version: "v1",
    rate_limit_ms: 20,
    alias_of: None,
};

pub const TIMEFRAMES: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "1w", "1M",
];

/// Batch placement takes a JSON array; the auth fields move to the query
pub const BATCH_ORDERS_PATH: &str = "api/v1/spot/batchOrders";

pub const TOOBIT_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "api/v1/time" => 1.0,
    Public Get "api/v1/ping" => 1.0,
    Public Get "api/v1/exchangeInfo" => 1.0,
    Public Get "quote/v1/depth" => 1.0,
    Public Get "quote/v1/depth/merged" => 1.0,
    Public Get "quote/v1/trades" => 1.0,
    Public Get "quote/v1/klines" => 1.0,
    Public Get "quote/v1/index/klines" => 1.0,
    Public Get "quote/v1/markPrice/klines" => 1.0,
    Public Get "quote/v1/markPrice" => 1.0,
    Public Get "quote/v1/index" => 1.0,
    Public Get "quote/v1/ticker/24hr" => 1.0,
    Public Get "quote/v1/contract/ticker/24hr" => 1.0,
    Public Get "quote/v1/ticker/price" => 1.0,
    Public Get "quote/v1/ticker/bookTicker" => 1.0,
    Public Get "api/v1/futures/fundingRate" => 1.0,
    Public Get "api/v1/futures/historyFundingRate" => 1.0,
    Private Get "api/v1/account" => 1.0,
    Private Get "api/v1/account/checkApiKey" => 1.0,
    Private Get "api/v1/spot/order" => 1.0,
    Private Get "api/v1/spot/openOrders" => 1.0,
    Private Get "api/v1/spot/tradeOrders" => 1.0,
    Private Get "api/v1/account/trades" => 1.0,
    Private Post "api/v1/spot/orderTest" => 1.0,
    Private Post "api/v1/spot/order" => 1.0,
    Private Post "api/v1/spot/batchOrders" => 1.0,
    Private Delete "api/v1/spot/order" => 1.0,
    Private Delete "api/v1/spot/openOrders" => 1.0,
    Private Delete "api/v1/spot/cancelOrderByIds" => 1.0,
]);

pub const TOOBIT_ERRORS: ErrorTable = ErrorTable {
    exact: &[
        ("-1002", ErrorKind::Authentication),
        ("-1003", ErrorKind::RateLimitExceeded),
        ("-1013", ErrorKind::InvalidOrder),
        ("-1022", ErrorKind::Authentication),
        ("-1121", ErrorKind::BadSymbol),
        ("-1139", ErrorKind::OrderNotFound),
        ("-2010", ErrorKind::InsufficientFunds),
        ("-2011", ErrorKind::OrderNotFound),
        ("-2013", ErrorKind::OrderNotFound),
    ],
    broad: &[
        ("insufficient", ErrorKind::InsufficientFunds),
        ("Too many requests", ErrorKind::RateLimitExceeded),
        ("signature", ErrorKind::Authentication),
    ],
};

pub fn parse_order_status(status: &str) -> String {
    match status {
        "PENDING_NEW" | "NEW" | "PARTIALLY_FILLED" => "open",
        "FILLED" => "closed",
        "PENDING_CANCEL" | "CANCELED" | "REJECTED" => "canceled",
        other => other,
    }
    .to_string()
}

pub fn parse_order_type(order_type: &str) -> String {
    match order_type {
        "MARKET" => "market".to_string(),
        "LIMIT" | "LIMIT_MAKER" => "limit".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::endpoints::ApiTier;
    use crate::adapters::types::HttpMethod;

    #[test]
    fn test_order_status_map() {
        assert_eq!(parse_order_status("PENDING_NEW"), "open");
        assert_eq!(parse_order_status("REJECTED"), "canceled");
        assert_eq!(parse_order_status("FILLED"), "closed");
        assert_eq!(parse_order_status("EXPIRED_IN_MATCH"), "EXPIRED_IN_MATCH");
    }

    #[test]
    fn test_maker_only_is_limit() {
        assert_eq!(parse_order_type("LIMIT_MAKER"), "limit");
        assert_eq!(parse_order_type("STOP"), "STOP");
    }

    #[test]
    fn test_cancel_routes_use_delete() {
        assert!(TOOBIT_ENDPOINTS
            .find(ApiTier::Private, HttpMethod::Delete, "api/v1/spot/openOrders")
            .is_some());
        assert!(TOOBIT_ENDPOINTS
            .find(ApiTier::Private, HttpMethod::Post, "api/v1/spot/openOrders")
            .is_none());
    }
}
