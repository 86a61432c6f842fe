//! Exchange adapters for Pacifica, Toobit, Indodax, Backpack, Deepwaters
//!
//! This module provides the shared adapter machinery (endpoint tables,
//! signing primitives, safe accessors, unified shapes) and one submodule per
//! venue implementing the `ExchangeAdapter` capability trait over REST.

pub mod endpoints;
pub mod errors;
pub mod factory;
pub mod markets;
pub mod precise;
pub mod safe;
pub mod signing;
pub mod traits;
pub mod transport;
pub mod types;
pub mod unified;

pub mod backpack;
pub mod deepwaters;
pub mod indodax;
pub mod pacifica;
pub mod toobit;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types for convenience
pub use endpoints::{ApiTier, EndpointTable};
pub use errors::{ExchangeError, ExchangeResult};
pub use factory::{create_adapter, create_adapter_with, AdapterOverrides, AnyAdapter, SUPPORTED_EXCHANGES};
pub use safe::Params;
pub use traits::ExchangeAdapter;
pub use types::{
    Balances, Credentials, ExchangeIdentity, HttpMethod, Market, Order, OrderBook, OrderRequest, OrderSide, OrderType,
    RequestDescriptor, Ticker, Trade,
};

pub use backpack::{BackpackAdapter, BackpackConfig};
pub use deepwaters::{DeepwatersAdapter, DeepwatersConfig};
pub use indodax::{IndodaxAdapter, IndodaxConfig};
pub use pacifica::{PacificaAdapter, PacificaConfig};
pub use toobit::{ToobitAdapter, ToobitConfig};
