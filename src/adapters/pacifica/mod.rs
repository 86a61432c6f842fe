//! Pacifica Exchange Adapter
//!
//! Implements the ExchangeAdapter trait for Pacifica (Solana perpetuals).
//! Reads are plain REST; writes are ed25519-signed actions.
//!
//! This module is organized into submodules:
//! - `config` - Configuration and environment loading
//! - `types` - Identity, routes, error table and status maps
//! - `signing` - Action message construction and signing
//! - `adapter` - Main PacificaAdapter implementation

mod adapter;
mod config;
mod signing;
mod types;

pub use adapter::PacificaAdapter;
pub use config::PacificaConfig;
pub use types::{PACIFICA, PACIFICA_TESTNET};
