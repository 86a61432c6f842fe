//! Shared normalizers
//!
//! Helpers every adapter composes: symbol construction, ISO-8601 rendering,
//! order book ladders, and completion of derived fields on tickers, trades,
//! orders and balances.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::adapters::precise::{parse_decimal, string_add, string_div, string_mul, string_sub};
use crate::adapters::safe::{safe_string, value_to_string};
use crate::adapters::types::{BalanceEntry, Balances, Order, OrderBook, PriceLevel, Ticker, Trade};

/// `BASE/QUOTE` for spot, `BASE/QUOTE:SETTLE` for derivatives
pub fn build_symbol(base: &str, quote: &str, settle: Option<&str>) -> String {
    match settle {
        Some(settle) => format!("{}/{}:{}", base, quote, settle),
        None => format!("{}/{}", base, quote),
    }
}

/// Millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn iso8601(timestamp_ms: Option<i64>) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp_ms?)?;
    Some(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Parse an ISO-8601 / RFC-3339 string into milliseconds
pub fn parse8601(text: Option<&str>) -> Option<i64> {
    let text = text?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    // Vendors sometimes drop the zone designator or use a space separator
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

// =============================================================================
// Order book
// =============================================================================

/// Shape of one vendor ladder entry
#[derive(Debug, Clone, Copy)]
pub enum LevelLayout {
    /// `[price, amount, ...]`
    Pair,
    /// `{<price>: .., <amount>: ..}`
    Object {
        price: &'static str,
        amount: &'static str,
    },
}

pub fn parse_bid_ask(level: &Value, layout: LevelLayout) -> Option<PriceLevel> {
    let (price, amount) = match layout {
        LevelLayout::Pair => (
            level.get(0).and_then(value_to_string)?,
            level.get(1).and_then(value_to_string)?,
        ),
        LevelLayout::Object { price, amount } => {
            (safe_string(level, price)?, safe_string(level, amount)?)
        }
    };
    Some(PriceLevel::new(price, amount))
}

fn compare_price(a: &PriceLevel, b: &PriceLevel) -> Ordering {
    match (parse_decimal(&a.price), parse_decimal(&b.price)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

pub fn parse_levels(levels: Option<&Value>, layout: LevelLayout) -> Vec<PriceLevel> {
    levels
        .and_then(Value::as_array)
        .map(|rows| rows.iter().filter_map(|row| parse_bid_ask(row, layout)).collect())
        .unwrap_or_default()
}

/// Build an order book from `value[bids_key]` / `value[asks_key]`.
///
/// Bids are sorted best (highest) first, asks best (lowest) first.
pub fn parse_order_book(
    value: &Value,
    symbol: Option<&str>,
    timestamp: Option<i64>,
    bids_key: &str,
    asks_key: &str,
    layout: LevelLayout,
) -> OrderBook {
    let mut bids = parse_levels(value.get(bids_key), layout);
    let mut asks = parse_levels(value.get(asks_key), layout);
    bids.sort_by(|a, b| compare_price(b, a));
    asks.sort_by(compare_price);
    OrderBook {
        symbol: symbol.map(str::to_string),
        bids,
        asks,
        timestamp,
        datetime: iso8601(timestamp),
        nonce: None,
    }
}

// =============================================================================
// Balances
// =============================================================================

/// Derive whichever of free/used/total is missing from the other two
pub fn complete_balance_entry(entry: BalanceEntry) -> BalanceEntry {
    let BalanceEntry { free, used, total } = entry;
    match (free, used, total) {
        (Some(f), Some(u), None) => {
            let total = string_add(Some(&f), Some(&u));
            BalanceEntry::new(Some(f), Some(u), total)
        }
        (None, Some(u), Some(t)) => {
            let free = string_sub(Some(&t), Some(&u));
            BalanceEntry::new(free, Some(u), Some(t))
        }
        (Some(f), None, Some(t)) => {
            let used = string_sub(Some(&t), Some(&f));
            BalanceEntry::new(Some(f), used, Some(t))
        }
        (free, used, total) => BalanceEntry::new(free, used, total),
    }
}

pub fn safe_balance(mut balances: Balances) -> Balances {
    balances.currencies = std::mem::take(&mut balances.currencies)
        .into_iter()
        .map(|(code, entry)| (code, complete_balance_entry(entry)))
        .collect();
    if balances.datetime.is_none() {
        balances.datetime = iso8601(balances.timestamp);
    }
    balances
}

// =============================================================================
// Derived fields
// =============================================================================

pub fn safe_ticker(mut ticker: Ticker) -> Ticker {
    if ticker.last.is_none() {
        ticker.last = ticker.close.clone();
    }
    if ticker.close.is_none() {
        ticker.close = ticker.last.clone();
    }
    if ticker.change.is_none() {
        ticker.change = string_sub(ticker.last.as_deref(), ticker.open.as_deref());
    }
    if ticker.percentage.is_none() {
        let open_nonzero = ticker
            .open
            .as_deref()
            .and_then(parse_decimal)
            .map(|d| !d.is_zero())
            .unwrap_or(false);
        if open_nonzero {
            let ratio = string_div(ticker.change.as_deref(), ticker.open.as_deref());
            ticker.percentage = string_mul(ratio.as_deref(), Some("100"));
        }
    }
    if ticker.average.is_none() {
        let sum = string_add(ticker.open.as_deref(), ticker.last.as_deref());
        ticker.average = string_div(sum.as_deref(), Some("2"));
    }
    if ticker.datetime.is_none() {
        ticker.datetime = iso8601(ticker.timestamp);
    }
    ticker
}

pub fn safe_trade(mut trade: Trade) -> Trade {
    if trade.cost.is_none() {
        trade.cost = string_mul(trade.price.as_deref(), trade.amount.as_deref());
    }
    if trade.datetime.is_none() {
        trade.datetime = iso8601(trade.timestamp);
    }
    trade
}

pub fn safe_order(mut order: Order) -> Order {
    if order.remaining.is_none() {
        order.remaining = string_sub(order.amount.as_deref(), order.filled.as_deref());
    }
    if order.filled.is_none() {
        order.filled = string_sub(order.amount.as_deref(), order.remaining.as_deref());
    }
    if order.cost.is_none() {
        let unit = order.average.as_deref().or(order.price.as_deref());
        order.cost = string_mul(unit, order.filled.as_deref());
    }
    if order.datetime.is_none() {
        order.datetime = iso8601(order.timestamp);
    }
    order
}

/// Length of a unified timeframe (`1m`, `4h`, `1d`, `1w`, `1M`) in seconds
pub fn parse_timeframe(timeframe: &str) -> Option<i64> {
    let unit = timeframe.chars().last()?;
    let amount: i64 = timeframe[..timeframe.len() - unit.len_utf8()].parse().ok()?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        'w' => 604_800,
        'M' => 2_592_000,
        'y' => 31_536_000,
        _ => return None,
    };
    amount.checked_mul(scale)
}

/// Keep items at or after `since`, then the first `limit`
pub fn filter_by_since_limit<T>(
    items: Vec<T>,
    since: Option<i64>,
    limit: Option<usize>,
    timestamp: impl Fn(&T) -> Option<i64>,
) -> Vec<T> {
    let iter = items.into_iter().filter(|item| match since {
        Some(since) => timestamp(item).map(|ts| ts >= since).unwrap_or(false),
        None => true,
    });
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}
