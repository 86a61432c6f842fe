//! Indodax Exchange Adapter
//!
//! Implements the ExchangeAdapter trait for Indodax (Indonesian spot exchange).
//!
//! This module is organized into submodules:
//! - `config` - Configuration and environment loading
//! - `types` - Identity, routes, error table and currency aliases
//! - `adapter` - Main IndodaxAdapter implementation

mod adapter;
mod config;
mod types;

pub use adapter::IndodaxAdapter;
pub use config::IndodaxConfig;
pub use types::INDODAX;
