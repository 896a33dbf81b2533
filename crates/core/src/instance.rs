//! One configured instrument: poller, schedule and views.
//!
//! The host creates an [`Instance`] per stored entry. Setup performs the
//! eager first refresh, so a constructed instance always has a record.

use std::sync::Arc;

use ingstocks_market_data::{InstrumentRecord, QuoteSource};
use log::{debug, info};
use serde::Serialize;

use crate::errors::SetupError;
use crate::poller::{ListenerId, Poller, PollerSnapshot, RefreshListener, RefreshSchedule};
use crate::presentation::{build_views, View, ViewState};
use crate::settings::{InstanceSettings, DOMAIN};

pub const MANUFACTURER: &str = "ING (component-api.wertpapiere.ing.de)";

/// Device grouping all views of one ISIN.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: (String, String),
    pub name: String,
    pub manufacturer: String,
    pub model: String,
}

pub struct Instance {
    entry_id: String,
    settings: InstanceSettings,
    source: Arc<dyn QuoteSource>,
    poller: Arc<Poller>,
    schedule: RefreshSchedule,
    views: Vec<View>,
    display_name: String,
}

impl Instance {
    /// Sets up an instance and starts its refresh schedule.
    ///
    /// A failed first refresh yields [`SetupError::NotReady`]; the host is
    /// expected to retry later. Invalid settings yield [`SetupError::Invalid`].
    pub async fn setup(
        entry_id: impl Into<String>,
        settings: InstanceSettings,
        source: Arc<dyn QuoteSource>,
    ) -> Result<Self, SetupError> {
        let entry_id = entry_id.into();
        settings.validate()?;

        let poller = Arc::new(Poller::new(
            settings.isin.clone(),
            settings.interval(),
            Arc::clone(&source),
        ));
        let record = poller.first_refresh().await?;

        let display_name = settings
            .name
            .clone()
            .or_else(|| record.name.clone())
            .unwrap_or_else(|| settings.title());
        let views = build_views(&settings, Some(&record));
        let schedule = RefreshSchedule::spawn(Arc::clone(&poller), settings.interval());

        info!(
            "Set up {} ({}) with {} views, refreshing every {} min",
            display_name,
            settings.isin,
            views.len(),
            settings.scan_interval_minutes
        );

        Ok(Self {
            entry_id,
            settings,
            source,
            poller,
            schedule,
            views,
            display_name,
        })
    }

    /// Tears the instance down and sets it up again with new settings.
    ///
    /// Listeners attached to the old instance are not carried over.
    pub async fn reload(self, settings: InstanceSettings) -> Result<Self, SetupError> {
        let entry_id = self.entry_id.clone();
        let source = Arc::clone(&self.source);
        debug!("Reloading {}", entry_id);
        self.unload();
        Self::setup(entry_id, settings, source).await
    }

    /// Stops the schedule and shuts the poller down. A refresh still in
    /// flight is never published.
    pub fn unload(self) {
        self.poller.shutdown();
        self.schedule.stop();
        info!("Unloaded {} ({})", self.display_name, self.settings.isin);
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    pub fn unique_id(&self) -> String {
        self.settings.unique_id()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.poller
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn record(&self) -> Option<Arc<InstrumentRecord>> {
        self.poller.record()
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        self.poller.snapshot()
    }

    pub fn read(&self, view: &View) -> ViewState {
        view.read(&self.poller.snapshot())
    }

    /// Reads every view against a single snapshot.
    pub fn read_all(&self) -> Vec<(&View, ViewState)> {
        let snapshot = self.poller.snapshot();
        self.views
            .iter()
            .map(|view| (view, view.read(&snapshot)))
            .collect()
    }

    pub fn attach(&self, listener: Arc<dyn RefreshListener>) -> ListenerId {
        self.poller.attach(listener)
    }

    pub fn detach(&self, id: ListenerId) -> bool {
        self.poller.detach(id)
    }

    /// Queues a refresh on the schedule's loop.
    pub fn request_refresh(&self) {
        self.schedule.request_refresh();
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: (DOMAIN.to_string(), self.settings.isin.to_string()),
            name: self.display_name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: self.settings.isin.to_string(),
        }
    }
}
