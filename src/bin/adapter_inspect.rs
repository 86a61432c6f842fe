//! Adapter inspection
//!
//! Builds one adapter through the factory and dumps what its public
//! endpoints return:
//! 1. Markets (count plus the first few entries)
//! 2. Ticker and order book for an optional symbol
//!
//! Usage: `adapter_inspect <exchange> [symbol]`
//!
//! `ADAPTER_CONFIG` may point at a YAML settings file; the entry matching
//! the exchange id supplies sandbox, receive window and timeout.

use std::path::Path;

use anyhow::{bail, Context};
use exchange_adapters::adapters::factory::{create_adapter_with, AdapterOverrides, SUPPORTED_EXCHANGES};
use exchange_adapters::adapters::traits::ExchangeAdapter;
use exchange_adapters::config::{load_config, logging::init_logging};
use tracing::{error, info};

const SHOWN_MARKETS: usize = 5;
const BOOK_DEPTH: usize = 10;

fn overrides_for(exchange: &str) -> anyhow::Result<AdapterOverrides> {
    let Ok(path) = std::env::var("ADAPTER_CONFIG") else {
        return Ok(AdapterOverrides::default());
    };
    let config = load_config(Path::new(&path)).with_context(|| format!("loading {}", path))?;
    Ok(config
        .exchange(exchange)
        .map(|settings| settings.overrides())
        .unwrap_or_default())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    init_logging();

    let mut args = std::env::args().skip(1);
    let Some(exchange) = args.next() else {
        bail!(
            "usage: adapter_inspect <exchange> [symbol]\nsupported: {}",
            SUPPORTED_EXCHANGES.join(", ")
        );
    };
    let symbol = args.next();

    let overrides = overrides_for(&exchange)?;
    let adapter = create_adapter_with(&exchange, &overrides)?;
    info!(exchange = %adapter.exchange_name(), phase = "inspect", "Adapter ready");

    let markets = adapter.load_markets(false).await?;
    info!(exchange = %adapter.exchange_name(), phase = "inspect", count = markets.len(), "Markets fetched");
    let shown: Vec<_> = markets.iter().take(SHOWN_MARKETS).collect();
    println!("{}", serde_json::to_string_pretty(&shown)?);

    let Some(symbol) = symbol else {
        return Ok(());
    };

    match adapter.fetch_ticker(&symbol).await {
        Ok(ticker) => println!("{}", serde_json::to_string_pretty(&ticker)?),
        Err(e) => error!(exchange = %adapter.exchange_name(), symbol = %symbol, error = %e, "Ticker failed"),
    }

    match adapter.fetch_order_book(&symbol, Some(BOOK_DEPTH)).await {
        Ok(book) => println!("{}", serde_json::to_string_pretty(&book)?),
        Err(e) => error!(exchange = %adapter.exchange_name(), symbol = %symbol, error = %e, "Order book failed"),
    }

    Ok(())
}
