//! Poller/normalizer for one instrument.
//!
//! The [`Poller`] owns the last published [`InstrumentRecord`], the success
//! flag of the last refresh and the attached listeners. A refresh either
//! publishes a complete new record and notifies every listener, or keeps the
//! previous record and marks the cycle failed.
//!
//! Refreshes are not serialized here; [`RefreshSchedule`] is the only caller
//! in steady state and runs them one after another.

mod listener;
mod schedule;

#[cfg(test)]
mod poller_tests;

pub use listener::{CollectingListener, ListenerId, RefreshListener};
pub use schedule::RefreshSchedule;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ingstocks_market_data::{InstrumentRecord, Isin, QuoteSource};
use log::{debug, warn};

use crate::errors::{Error, Result, SetupError};

/// Consistent view of the poller state at one instant.
#[derive(Clone, Debug, Default)]
pub struct PollerSnapshot {
    pub record: Option<Arc<InstrumentRecord>>,
    pub last_refresh_success: bool,
}

#[derive(Debug, Default)]
struct PollerState {
    record: Option<Arc<InstrumentRecord>>,
    last_refresh_success: bool,
    last_error: Option<String>,
    last_success_at: Option<DateTime<Utc>>,
    shut_down: bool,
}

type Listeners = Vec<(ListenerId, Arc<dyn RefreshListener>)>;

pub struct Poller {
    isin: Isin,
    interval: Duration,
    source: Arc<dyn QuoteSource>,
    state: RwLock<PollerState>,
    listeners: Mutex<Listeners>,
    next_listener_id: AtomicU64,
}

impl Poller {
    pub fn new(isin: Isin, interval: Duration, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            isin,
            interval,
            source,
            state: RwLock::new(PollerState::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn isin(&self) -> &Isin {
        &self.isin
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PollerState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Poller state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PollerState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Poller state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(|poisoned| {
            warn!("Poller listener lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Runs one refresh cycle.
    ///
    /// On success the new record is published and every attached listener is
    /// called with it before this returns. On failure the previous record is
    /// kept, the success flag is cleared and the cause is retained for
    /// [`last_error`](Self::last_error).
    pub async fn refresh(&self) -> Result<Arc<InstrumentRecord>> {
        if self.is_shut_down() {
            return Err(self.shutdown_error());
        }

        match self.source.fetch_record(&self.isin).await {
            Ok(record) => {
                let record = Arc::new(record);
                self.publish(Arc::clone(&record))?;
                debug!(
                    "Refreshed {} from {}: price {:?}",
                    self.isin,
                    self.source.id(),
                    record.price
                );
                self.notify(&record);
                Ok(record)
            }
            Err(err) => {
                let mut state = self.write_state();
                if state.shut_down {
                    return Err(self.shutdown_error());
                }
                state.last_refresh_success = false;
                state.last_error = Some(err.to_string());
                drop(state);

                warn!("Error fetching ING Stocks Plus {} data: {}", self.isin, err);
                Err(err.into())
            }
        }
    }

    /// The eager refresh run at setup.
    ///
    /// Any failure is reported as [`SetupError::NotReady`] so the host defers
    /// setup instead of failing the instance permanently.
    pub async fn first_refresh(&self) -> std::result::Result<Arc<InstrumentRecord>, SetupError> {
        self.refresh()
            .await
            .map_err(|err| SetupError::NotReady(err.to_string()))
    }

    fn publish(&self, record: Arc<InstrumentRecord>) -> Result<()> {
        let mut state = self.write_state();
        if state.shut_down {
            debug!("Discarding refresh result for {}: shut down", self.isin);
            return Err(self.shutdown_error());
        }
        state.record = Some(record);
        state.last_refresh_success = true;
        state.last_error = None;
        state.last_success_at = Some(Utc::now());
        Ok(())
    }

    fn notify(&self, record: &Arc<InstrumentRecord>) {
        let listeners: Vec<Arc<dyn RefreshListener>> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener.on_refresh(record);
        }
    }

    fn shutdown_error(&self) -> Error {
        Error::Shutdown {
            isin: self.isin.to_string(),
        }
    }

    /// Attach a listener; it is called after every successful refresh.
    pub fn attach(&self, listener: Arc<dyn RefreshListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, listener));
        id
    }

    /// Detach a listener. Returns false if it was not attached.
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    /// Stops publishing. A refresh still in flight is discarded when it
    /// completes; listeners are dropped.
    pub fn shutdown(&self) {
        self.write_state().shut_down = true;
        self.lock_listeners().clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.read_state().shut_down
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        let state = self.read_state();
        PollerSnapshot {
            record: state.record.clone(),
            last_refresh_success: state.last_refresh_success,
        }
    }

    /// The last published record, if any.
    pub fn record(&self) -> Option<Arc<InstrumentRecord>> {
        self.read_state().record.clone()
    }

    pub fn last_refresh_success(&self) -> bool {
        self.read_state().last_refresh_success
    }

    /// Cause of the last failed refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.read_state().last_success_at
    }
}
