//! Backpack Exchange Adapter
//!
//! Implements the ExchangeAdapter trait for Backpack (spot and USDC perps).
//!
//! This module is organized into submodules:
//! - `config` - Configuration and environment loading
//! - `types` - Identity records, routes, signing instructions and enum maps
//! - `cache` - Currency ids used to split concatenated market ids
//! - `signing` - Instruction payload construction and ed25519 signing
//! - `adapter` - Main BackpackAdapter implementation

mod adapter;
mod cache;
mod config;
mod signing;
mod types;

pub use adapter::BackpackAdapter;
pub use cache::AdapterCache;
pub use config::BackpackConfig;
pub use types::{BACKPACK, BACKPACK_EXCHANGE};
