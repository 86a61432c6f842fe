//! Deepwaters Types
//!
//! Identity, REST surface, error table and the vendor enum maps.

use crate::adapters::endpoints::EndpointTable;
use crate::adapters::errors::{ErrorKind, ErrorTable};
use crate::adapters::types::ExchangeIdentity;

pub const DEEPWATERS: ExchangeIdentity = ExchangeIdentity {
    id: "deepwaters",
    name: "Deepwaters",
    countries: &["US"],
    version: "v1",
    rate_limit_ms: 5,
    alias_of: None,
};

/// Prefix every signed path is hashed under, whatever host serves it
pub const SIGNED_PATH_PREFIX: &str = "/rest/v1";

pub const DEEPWATERS_ENDPOINTS: EndpointTable = EndpointTable::new(crate::endpoint_table![
    Public Get "assets" => 1.0,
    Public Get "pairs" => 1.0,
    Public Get "pairs/{pair}/orderbook" => 1.0,
    Public Get "time" => 1.0,
    Private Get "customer" => 1.0,
    Private Get "customer/api-key-status" => 1.0,
    Private Get "orders" => 1.0,
    Private Get "orders/by-venue-order-id/{id}" => 1.0,
    Private Get "orders/by-customer-object-id/{id}" => 1.0,
    Private Get "trades" => 1.0,
    Private Post "orders" => 1.0,
    Private Delete "orders" => 1.0,
    Private Delete "orders/by-customer-object-id/{id}" => 1.0,
    Private Delete "orders/by-venue-order-id/{id}" => 1.0,
]);

pub const DEEPWATERS_ERRORS: ErrorTable = ErrorTable {
    exact: &[
        ("INVALID_NONCE", ErrorKind::InvalidNonce),
        ("UNAUTHORIZED", ErrorKind::Authentication),
        ("INVALID_SIGNATURE", ErrorKind::Authentication),
        ("INSUFFICIENT_FUNDS", ErrorKind::InsufficientFunds),
        ("ORDER_NOT_FOUND", ErrorKind::OrderNotFound),
        ("INVALID_PAIR", ErrorKind::BadSymbol),
        ("RATE_LIMITED", ErrorKind::RateLimitExceeded),
    ],
    broad: &[
        ("nonce", ErrorKind::InvalidNonce),
        ("signature", ErrorKind::Authentication),
        ("insufficient", ErrorKind::InsufficientFunds),
        ("not found", ErrorKind::OrderNotFound),
    ],
};

/// Vendor chain name -> unified network code
const NETWORKS: &[(&str, &str)] = &[
    ("ETHEREUM_MAINNET", "ETH"),
    ("BINANCE_SMART_CHAIN_MAINNET", "BSC"),
    ("POLYGON_MAINNET", "MATIC"),
    ("AVALANCHE_C_CHAIN", "AVAX"),
];

/// Unknown chains keep their vendor name
pub fn network_code(chain_name: &str) -> String {
    NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_name)
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| chain_name.to_string())
}

pub fn parse_order_status(status: &str) -> String {
    match status {
        "ACTIVE" | "PARTIALLY_FILLED" => "open",
        "FILLED" => "closed",
        "CANCELLED" => "canceled",
        "REJECTED" => "rejected",
        "EXPIRED" => "expired",
        other => other,
    }
    .to_string()
}

/// Venue order ids are `0x` hashes; anything else is a customer object id
pub fn is_venue_order_id(id: &str) -> bool {
    id.starts_with("0x")
}

/// `pair` id of a market: `<baseAssetID>-<quoteAssetID>`
pub fn pair_id(base_asset_id: &str, quote_asset_id: &str) -> String {
    format!("{}-{}", base_asset_id, quote_asset_id)
}
