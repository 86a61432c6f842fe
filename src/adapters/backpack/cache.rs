//! Per-instance currency-id cache
//!
//! Backpack market ids are usually `BASE_QUOTE[_PERP]`, but bare
//! concatenations (`SOLUSDC`) also show up. Splitting those needs the list of
//! currency ids, which is fetched once and kept for the life of the adapter.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdapterCache {
    /// Currency ids from the last `api/v1/assets` fetch
    pub resolved_currency_ids: Option<Vec<String>>,
}

/// `AdapterCache` behind a lock; concurrent writers are last-write-wins
#[derive(Debug, Default)]
pub struct SharedCache {
    inner: RwLock<AdapterCache>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, AdapterCache> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AdapterCache> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn currency_ids(&self) -> Option<Vec<String>> {
        self.read().resolved_currency_ids.clone()
    }

    /// Store `ids` only while the cache is still empty
    pub fn fill_currency_ids(&self, ids: Vec<String>) {
        let mut cache = self.write();
        if cache.resolved_currency_ids.is_none() {
            cache.resolved_currency_ids = Some(ids);
        }
    }

    /// Overwrite whatever is cached
    pub fn replace_currency_ids(&self, ids: Vec<String>) {
        self.write().resolved_currency_ids = Some(ids);
    }

    pub fn snapshot(&self) -> AdapterCache {
        self.read().clone()
    }
}

/// Split a concatenated market id using known currency ids.
///
/// The longest base prefix whose remainder is also a known id wins.
pub fn split_concatenated(market_id: &str, currency_ids: &[String]) -> Option<(String, String)> {
    currency_ids
        .iter()
        .filter(|base| market_id.len() > base.len() && market_id.starts_with(base.as_str()))
        .filter(|base| currency_ids.iter().any(|quote| quote == &market_id[base.len()..]))
        .max_by_key(|base| base.len())
        .map(|base| (base.clone(), market_id[base.len()..].to_string()))
}
