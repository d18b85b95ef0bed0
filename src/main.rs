//! Aside Cache demo
//!
//! Runs a short read/update/read workload through the cache-aside service
//! over a repository with simulated latency, then prints cache statistics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aside_cache::{CacheAsideService, Config, InMemoryRepository};

const PRODUCT_COUNT: usize = 20;

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache and seed the repository
/// 4. Run the workload and report statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aside_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl={:?}, repo_latency={:?}",
        config.capacity, config.default_ttl, config.repo_latency
    );

    let cache = config
        .build_cache::<String, String>()
        .context("failed to build cache")?;

    let records: HashMap<String, String> = (0..PRODUCT_COUNT)
        .map(|i| (format!("product:{}", i), format!("Product #{}", i)))
        .collect();
    let repository = Arc::new(InMemoryRepository::with_records(records, config.repo_latency));
    let service = CacheAsideService::new(repository.clone(), cache, config.default_ttl);

    let cold = read_all(&service).await?;
    let warm = read_all(&service).await?;
    info!("Cold pass took {:?}, warm pass took {:?}", cold, warm);

    service
        .update("product:0".to_string(), "Product #0 (renamed)".to_string())
        .await
        .context("failed to update product:0")?;
    let renamed = service
        .get_or_load(&"product:0".to_string())
        .await
        .context("failed to reload product:0")?;
    info!("Reloaded after update: {:?}", renamed);

    let missing = service
        .get_or_load(&"product:999".to_string())
        .await
        .context("failed to look up product:999")?;
    info!("Lookup of unknown product: {:?}", missing);

    info!(
        "Repository calls: loads={}, saves={}",
        repository.load_count(),
        repository.save_count()
    );
    let stats = service.cache().stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Hit rate: {:.2}", stats.hit_rate());

    Ok(())
}

/// Reads every product once and returns how long it took.
async fn read_all(
    service: &CacheAsideService<InMemoryRepository<String, String>>,
) -> anyhow::Result<std::time::Duration> {
    let start = Instant::now();
    for i in 0..PRODUCT_COUNT {
        let key = format!("product:{}", i);
        service
            .get_or_load(&key)
            .await
            .with_context(|| format!("failed to load {}", key))?;
    }
    Ok(start.elapsed())
}
