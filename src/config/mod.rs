//! Configuration module for adapter settings and logging
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `ExchangeSettings`)
//! - YAML loading functionality (`load_config`)
//! - Shared state wrapper (`SharedConfig`)
//! - Tracing subscriber setup (`logging::init_logging`)

pub mod logging;
mod loader;
mod types;

// Re-export types
pub use types::{AppConfig, ExchangeSettings, SharedConfig, MAX_RECV_WINDOW_MS};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};
