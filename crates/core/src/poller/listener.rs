//! Refresh listener trait and implementations.

use std::sync::{Arc, Mutex, MutexGuard};

use ingstocks_market_data::InstrumentRecord;

/// Handle returned by [`Poller::attach`](super::Poller::attach).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Trait for receiving freshly published records.
///
/// Called synchronously on the refresh task after every successful publish,
/// never after a failed cycle.
///
/// # Design Rules
///
/// - `on_refresh()` must be fast and non-blocking (no network calls)
/// - The record is the one just published; it will not change afterwards
pub trait RefreshListener: Send + Sync {
    fn on_refresh(&self, record: &Arc<InstrumentRecord>);
}

impl<F> RefreshListener for F
where
    F: Fn(&Arc<InstrumentRecord>) + Send + Sync,
{
    fn on_refresh(&self, record: &Arc<InstrumentRecord>) {
        self(record)
    }
}

/// Collecting listener for testing - keeps every record it is handed.
#[derive(Clone, Default)]
pub struct CollectingListener {
    records: Arc<Mutex<Vec<Arc<InstrumentRecord>>>>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<InstrumentRecord>>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns all collected records.
    pub fn records(&self) -> Vec<Arc<InstrumentRecord>> {
        self.lock().clone()
    }

    /// Returns the number of collected records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl RefreshListener for CollectingListener {
    fn on_refresh(&self, record: &Arc<InstrumentRecord>) {
        self.lock().push(Arc::clone(record));
    }
}
