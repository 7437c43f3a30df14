//! Cache Pool loader
//!
//! Reads a JSON load request from stdin, commits it to a cache pool as one
//! deferred batch and prints the commit report.

use std::io::{self, Read};

use anyhow::Context;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_pool::engine::MemoryEngine;
use cache_pool::models::LoadRequest;
use cache_pool::{loader, CachePool, Config};

/// Entry point for the loader.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging (stderr)
/// 2. Load and validate configuration from environment variables
/// 3. Create the pool over a memory engine
/// 4. Parse the load request from stdin
/// 5. Stage, commit and roll back if needed
/// 6. Print the report as JSON on stdout
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_pool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    let namespace = config.namespace().to_string();
    info!(
        "Configuration loaded: namespace={}, max_entries={}",
        namespace, config.max_entries
    );

    let mut pool: CachePool<MemoryEngine<Value>> = CachePool::from_config(&config);

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read load request from stdin")?;
    let request: LoadRequest =
        serde_json::from_str(&input).context("failed to parse load request")?;
    info!("Load request parsed: {} entries", request.items.len());

    let report = loader::load(&mut pool, &namespace, request)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
