//! Exchange Adapters
//!
//! REST adapters that normalize several crypto venues into one unified
//! shape:
//! - Capability trait with per-venue signing and error classification
//! - Decimal strings end to end, missing fields stay `None`
//! - Enum dispatch factory with alias identities

pub mod adapters;
pub mod config;
pub mod error;

pub use error::AppError;
