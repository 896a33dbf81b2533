//! Background scheduler for the instance registry.
//!
//! Watches the entries file for changes and retries deferred setups. Each
//! instance refreshes on its own schedule; this loop only manages the set of
//! instances.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::entries::{load_entries, modified_at, StoredEntry};
use crate::registry::Registry;

/// Detects changes of the entries file by modification time.
pub struct EntriesWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl EntriesWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_modified: None,
        }
    }

    /// Returns the entries if the file changed since the last poll.
    ///
    /// A file that disappeared yields an empty list. A file that fails to
    /// parse is reported once and not re-read until it changes again.
    pub fn poll(&mut self) -> anyhow::Result<Option<Vec<StoredEntry>>> {
        let modified = modified_at(&self.path);
        if modified == self.last_modified {
            return Ok(None);
        }
        self.last_modified = modified;
        load_entries(&self.path).map(Some)
    }
}

/// Starts the background registry scheduler.
pub fn start_registry_scheduler(
    registry: Arc<Mutex<Registry>>,
    mut watcher: EntriesWatcher,
    config: &Config,
) -> JoinHandle<()> {
    let watch_every = config.watch_interval;
    let retry_every = config.setup_retry;

    tokio::spawn(async move {
        info!(
            "Registry scheduler started (watch every {}s, setup retry every {}s)",
            watch_every.as_secs(),
            retry_every.as_secs()
        );

        let mut watch = interval_at(Instant::now() + watch_every, watch_every);
        watch.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut retry = interval_at(Instant::now() + retry_every, retry_every);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = watch.tick() => sync_entries(&registry, &mut watcher).await,
                _ = retry.tick() => retry_pending(&registry).await,
            }
        }
    })
}

/// Applies the entries file if it changed.
pub async fn sync_entries(registry: &Mutex<Registry>, watcher: &mut EntriesWatcher) {
    match watcher.poll() {
        Ok(Some(entries)) => {
            info!("Entries file changed, applying {} entries", entries.len());
            registry.lock().await.apply(entries).await;
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to reload entries file: {:#}", e),
    }
}

async fn retry_pending(registry: &Mutex<Registry>) {
    let mut registry = registry.lock().await;
    if registry.pending_count() == 0 {
        return;
    }
    debug!("Retrying {} pending setups", registry.pending_count());
    registry.retry_pending().await;
}
