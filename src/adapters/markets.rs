//! Market and currency directories
//!
//! Each adapter instance owns one `MarketDirectory`, filled by `fetch_markets`
//! and consulted when turning vendor ids into unified symbols (and back).
//! Lookups before the first load fall back to the caller's own heuristics.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::{Currency, Market};

/// Vendor-specific spellings of a currency that map onto a common code
pub type CommonCurrencies = &'static [(&'static str, &'static str)];

/// Unified code for a vendor currency id
pub fn safe_currency_code(currency_id: &str, common: CommonCurrencies) -> String {
    let upper = currency_id.to_uppercase();
    common
        .iter()
        .find(|(vendor, _)| *vendor == upper)
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}

/// Vendor spelling for a unified code (inverse of [`safe_currency_code`])
pub fn currency_id_for_code(code: &str, common: CommonCurrencies) -> String {
    common
        .iter()
        .find(|(_, unified)| *unified == code)
        .map(|(vendor, _)| vendor.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[derive(Debug, Default)]
struct Index {
    markets: Vec<Market>,
    by_id: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
    currencies: HashMap<String, Currency>,
}

/// Loaded markets and currencies, keyed by vendor id and unified symbol
#[derive(Debug, Default)]
pub struct MarketDirectory {
    inner: RwLock<Index>,
}

impl MarketDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // Every write replaces whole fields, so a poisoned index is still consistent
    fn read(&self) -> RwLockReadGuard<'_, Index> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Index> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the loaded markets
    pub fn load_markets(&self, markets: Vec<Market>) {
        let mut by_id = HashMap::with_capacity(markets.len());
        let mut by_symbol = HashMap::with_capacity(markets.len());
        for (i, market) in markets.iter().enumerate() {
            by_id.insert(market.id.clone(), i);
            by_symbol.insert(market.symbol.clone(), i);
        }
        let mut index = self.write();
        index.markets = markets;
        index.by_id = by_id;
        index.by_symbol = by_symbol;
    }

    pub fn load_currencies(&self, currencies: Vec<Currency>) {
        self.write().currencies = currencies.into_iter().map(|c| (c.code.clone(), c)).collect();
    }

    pub fn is_loaded(&self) -> bool {
        !self.read().markets.is_empty()
    }

    pub fn markets(&self) -> Vec<Market> {
        self.read().markets.clone()
    }

    pub fn market_by_id(&self, id: &str) -> Option<Market> {
        let index = self.read();
        index.by_id.get(id).and_then(|&i| index.markets.get(i)).cloned()
    }

    pub fn market_by_symbol(&self, symbol: &str) -> Option<Market> {
        let index = self.read();
        index.by_symbol.get(symbol).and_then(|&i| index.markets.get(i)).cloned()
    }

    /// Market for a unified symbol, failing with `BadSymbol` when unknown
    pub fn market(&self, exchange: &str, symbol: &str) -> ExchangeResult<Market> {
        self.market_by_symbol(symbol).ok_or_else(|| {
            ExchangeError::BadSymbol(format!("{} does not have market symbol {}", exchange, symbol))
        })
    }

    /// Unified symbol for a vendor id when the market is known
    pub fn symbol_for_id(&self, id: &str) -> Option<String> {
        self.market_by_id(id).map(|m| m.symbol)
    }

    pub fn currency(&self, code: &str) -> Option<Currency> {
        self.read().currencies.get(code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::types::{MarketLimits, MarketPrecision, MarketType};
    use serde_json::Value;

    const COMMON: CommonCurrencies = &[("STR", "XLM"), ("BCHABC", "BCH")];

    fn market(id: &str, symbol: &str) -> Market {
        Market {
            id: id.into(),
            symbol: symbol.into(),
            base: "BTC".into(),
            quote: "USDC".into(),
            settle: None,
            base_id: "BTC".into(),
            quote_id: "USDC".into(),
            settle_id: None,
            market_type: MarketType::Spot,
            active: Some(true),
            linear: None,
            inverse: None,
            contract_size: None,
            taker: None,
            maker: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
            created: None,
            info: Value::Null,
        }
    }

    #[test]
    fn test_common_currency_mapping() {
        assert_eq!(safe_currency_code("str", COMMON), "XLM");
        assert_eq!(safe_currency_code("btc", COMMON), "BTC");
        assert_eq!(currency_id_for_code("BCH", COMMON), "BCHABC");
        assert_eq!(currency_id_for_code("ETH", COMMON), "ETH");
    }

    #[test]
    fn test_directory_lookups() {
        let directory = MarketDirectory::new();
        assert!(!directory.is_loaded());
        directory.load_markets(vec![market("BTC_USDC", "BTC/USDC")]);
        assert!(directory.is_loaded());
        assert_eq!(directory.symbol_for_id("BTC_USDC").as_deref(), Some("BTC/USDC"));
        assert_eq!(directory.market_by_symbol("BTC/USDC").map(|m| m.id).as_deref(), Some("BTC_USDC"));
        assert!(matches!(
            directory.market("backpack", "ETH/USDC"),
            Err(ExchangeError::BadSymbol(_))
        ));
    }

    #[test]
    fn test_reload_replaces_markets() {
        let directory = MarketDirectory::new();
        directory.load_markets(vec![market("A", "A/B")]);
        directory.load_markets(vec![market("C", "C/D")]);
        assert!(directory.market_by_id("A").is_none());
        assert!(directory.market_by_id("C").is_some());
    }

    #[test]
    fn test_poisoned_index_still_takes_updates() {
        let directory = MarketDirectory::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = directory.inner.write().unwrap();
            panic!("writer died");
        }));
        assert!(directory.inner.is_poisoned());

        directory.load_markets(vec![market("BTC_USDC", "BTC/USDC")]);
        assert!(directory.is_loaded());
        assert_eq!(directory.symbol_for_id("BTC_USDC").as_deref(), Some("BTC/USDC"));
    }
}
