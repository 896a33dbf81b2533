//! Fixed-interval refresh task for one poller.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::Poller;

/// Background task that refreshes a [`Poller`] every `interval`.
///
/// The first scheduled refresh happens one interval after spawning; setup
/// already performed the eager refresh. Manual refresh requests are run by
/// the same loop, so two refreshes of one poller never overlap. Dropping the
/// schedule aborts the task.
pub struct RefreshSchedule {
    interval: Duration,
    trigger: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl RefreshSchedule {
    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn spawn(poller: Arc<Poller>, interval: Duration) -> Self {
        let trigger = Arc::new(Notify::new());
        let task_trigger = Arc::clone(&trigger);

        let handle = tokio::spawn(async move {
            info!(
                "Refresh schedule for {} started ({} s interval)",
                poller.isin(),
                interval.as_secs()
            );

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = task_trigger.notified() => {
                        debug!("Manual refresh requested for {}", poller.isin());
                        ticker.reset();
                    }
                }

                if poller.is_shut_down() {
                    break;
                }

                // Failures are recorded and logged by the poller; the next tick retries.
                let _ = poller.refresh().await;
            }

            debug!("Refresh schedule for {} stopped", poller.isin());
        });

        Self {
            interval,
            trigger,
            handle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ask for a refresh as soon as the loop is idle. Requests made while a
    /// refresh is running coalesce into one follow-up refresh.
    pub fn request_refresh(&self) {
        self.trigger.notify_one();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Abort the loop. An in-flight refresh is dropped mid-fetch.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for RefreshSchedule {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
