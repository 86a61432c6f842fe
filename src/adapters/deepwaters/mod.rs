//! Deepwaters Exchange Adapter
//!
//! Implements the ExchangeAdapter trait for Deepwaters (spot pairs across
//! EVM chains).
//!
//! This module is organized into submodules:
//! - `config` - Configuration and environment loading
//! - `types` - Identity, routes, error table and status maps
//! - `signing` - Message construction and secp256k1 signing
//! - `adapter` - Main DeepwatersAdapter implementation

mod adapter;
mod config;
mod signing;
mod types;

pub use adapter::DeepwatersAdapter;
pub use config::DeepwatersConfig;
pub use types::DEEPWATERS;
