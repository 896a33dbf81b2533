mod config;
mod entries;
mod main_lib;
mod registry;
mod scheduler;

use std::sync::Arc;

use config::Config;
use main_lib::{build_registry, init_tracing};
use scheduler::EntriesWatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let registry = build_registry(&config);

    let mut watcher = EntriesWatcher::new(config.entries_file.clone());
    let entries = watcher.poll()?.unwrap_or_default();
    tracing::info!(
        "Loaded {} entries from {}",
        entries.len(),
        config.entries_file.display()
    );
    {
        let mut registry = registry.lock().await;
        registry.apply(entries).await;
        for (entry_id, status) in registry.statuses() {
            tracing::info!("Entry {}: {:?}", entry_id, status);
        }
        tracing::info!(
            "{} of {} entries loaded, {} pending",
            registry.loaded_count(),
            registry.len(),
            registry.pending_count()
        );
    }

    let scheduler = scheduler::start_registry_scheduler(Arc::clone(&registry), watcher, &config);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    scheduler.abort();
    registry.lock().await.shutdown();
    Ok(())
}
