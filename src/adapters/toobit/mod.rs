//! Toobit Exchange Adapter
//!
//! Implements the ExchangeAdapter trait for Toobit spot and USDT swaps.
//!
//! This module is organized into submodules:
//! - `config` - Configuration and environment loading
//! - `types` - Identity, routes, error table and status maps
//! - `adapter` - Main ToobitAdapter implementation

mod adapter;
mod config;
mod types;

pub use adapter::ToobitAdapter;
pub use config::ToobitConfig;
pub use types::TOOBIT;
