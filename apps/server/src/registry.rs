//! Instance registry keyed by entry id.
//!
//! Applies the stored entries to running instances: new entries are set up,
//! changed entries reloaded and removed entries unloaded. Entries whose first
//! refresh failed stay pending and are retried by the scheduler. Entries
//! refused because another entry holds their ISIN are set up again once the
//! entries change.

use std::collections::HashMap;
use std::sync::Arc;

use ingstocks_core::{Instance, InstanceSettings, RefreshListener, SetupError};
use ingstocks_market_data::{InstrumentRecord, QuoteSource};
use tracing::{debug, error, info, warn};

use crate::entries::StoredEntry;

/// Setup state of one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    Loaded,
    /// Setup deferred; retried later.
    NotReady(String),
    /// Setup refused until the entries change.
    Rejected(String),
}

enum SlotState {
    Loaded(Instance),
    NotReady(String),
    Rejected(String),
    /// Unique id held by another entry.
    Conflict(String),
}

struct Slot {
    entry: StoredEntry,
    state: SlotState,
}

impl Slot {
    fn status(&self) -> EntryStatus {
        match &self.state {
            SlotState::Loaded(_) => EntryStatus::Loaded,
            SlotState::NotReady(reason) => EntryStatus::NotReady(reason.clone()),
            SlotState::Rejected(reason) | SlotState::Conflict(reason) => {
                EntryStatus::Rejected(reason.clone())
            }
        }
    }

    /// Unique id claimed by this slot; rejected entries claim nothing.
    fn unique_id(&self) -> Option<String> {
        match &self.state {
            SlotState::Loaded(instance) => Some(instance.unique_id()),
            SlotState::NotReady(_) => resolve(&self.entry).ok().map(|s| s.unique_id()),
            SlotState::Rejected(_) | SlotState::Conflict(_) => None,
        }
    }

    fn unload(self) {
        if let SlotState::Loaded(instance) = self.state {
            instance.unload();
        }
    }
}

pub struct Registry {
    source: Arc<dyn QuoteSource>,
    slots: HashMap<String, Slot>,
}

impl Registry {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            slots: HashMap::new(),
        }
    }

    /// Status of every entry, ordered by entry id.
    pub fn statuses(&self) -> Vec<(String, EntryStatus)> {
        let mut statuses: Vec<(String, EntryStatus)> = self
            .slots
            .iter()
            .map(|(id, slot)| (id.clone(), slot.status()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    #[cfg(test)]
    pub fn status(&self, entry_id: &str) -> Option<EntryStatus> {
        self.slots.get(entry_id).map(Slot::status)
    }

    #[cfg(test)]
    pub fn instance(&self, entry_id: &str) -> Option<&Instance> {
        match self.slots.get(entry_id).map(|slot| &slot.state) {
            Some(SlotState::Loaded(instance)) => Some(instance),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn loaded_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot.state, SlotState::Loaded(_)))
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot.state, SlotState::NotReady(_)))
            .count()
    }

    /// Brings the running instances in line with `entries`.
    pub async fn apply(&mut self, entries: Vec<StoredEntry>) {
        let wanted: Vec<&str> = entries.iter().map(|e| e.entry_id.as_str()).collect();
        let removed: Vec<String> = self
            .slots
            .keys()
            .filter(|id| !wanted.contains(&id.as_str()))
            .cloned()
            .collect();
        for entry_id in removed {
            if let Some(slot) = self.slots.remove(&entry_id) {
                info!("Entry {} removed", entry_id);
                slot.unload();
            }
        }

        // Conflicts go last so that ISINs released by this pass are free.
        let mut conflicted = Vec::new();
        for entry in entries {
            match self.slots.get(&entry.entry_id) {
                Some(slot) if slot.entry == entry => {
                    if matches!(slot.state, SlotState::Conflict(_)) {
                        conflicted.push(entry.entry_id);
                    }
                }
                Some(_) => self.replace(entry).await,
                None => self.setup(entry, None).await,
            }
        }

        for entry_id in conflicted {
            if let Some(slot) = self.slots.remove(&entry_id) {
                debug!("Retrying setup of {} after entries changed", entry_id);
                self.setup(slot.entry, None).await;
            }
        }
    }

    /// Retries every entry whose setup was deferred.
    pub async fn retry_pending(&mut self) {
        let pending: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot.state, SlotState::NotReady(_)))
            .map(|(id, _)| id.clone())
            .collect();

        for entry_id in pending {
            if let Some(slot) = self.slots.remove(&entry_id) {
                debug!("Retrying setup of {}", entry_id);
                self.setup(slot.entry, None).await;
            }
        }
    }

    /// Unloads every instance.
    pub fn shutdown(&mut self) {
        for (_, slot) in self.slots.drain() {
            slot.unload();
        }
    }

    async fn replace(&mut self, entry: StoredEntry) {
        let Some(slot) = self.slots.remove(&entry.entry_id) else {
            return;
        };
        match slot.state {
            SlotState::Loaded(instance) => self.setup(entry, Some(instance)).await,
            _ => self.setup(entry, None).await,
        }
    }

    async fn setup(&mut self, entry: StoredEntry, previous: Option<Instance>) {
        let entry_id = entry.entry_id.clone();

        let state = match self.prepare(&entry) {
            Err(refused) => {
                if let Some(instance) = previous {
                    instance.unload();
                }
                refused
            }
            Ok(settings) => {
                let result = match previous {
                    Some(instance) => instance.reload(settings).await,
                    None => Instance::setup(&entry_id, settings, Arc::clone(&self.source)).await,
                };
                match result {
                    Ok(instance) => {
                        instance.attach(log_listener(&entry_id));
                        SlotState::Loaded(instance)
                    }
                    Err(SetupError::NotReady(reason)) => {
                        warn!("Entry {} not ready, will retry: {}", entry_id, reason);
                        SlotState::NotReady(reason)
                    }
                    Err(err @ SetupError::Invalid(_)) => {
                        error!("Rejected entry {}: {}", entry_id, err);
                        SlotState::Rejected(err.to_string())
                    }
                }
            }
        };

        self.slots.insert(entry_id, Slot { entry, state });
    }

    /// Resolves settings and refuses a unique id claimed by another entry.
    fn prepare(&self, entry: &StoredEntry) -> Result<InstanceSettings, SlotState> {
        let settings = resolve(entry).map_err(|err| {
            error!("Rejected entry {}: {}", entry.entry_id, err);
            SlotState::Rejected(err.to_string())
        })?;
        let unique_id = settings.unique_id();
        let taken = self.slots.iter().any(|(id, slot)| {
            *id != entry.entry_id && slot.unique_id().as_deref() == Some(unique_id.as_str())
        });
        if taken {
            let reason = format!("{} is already configured", settings.isin);
            warn!("Entry {} refused: {}", entry.entry_id, reason);
            return Err(SlotState::Conflict(reason));
        }
        Ok(settings)
    }
}

fn resolve(entry: &StoredEntry) -> ingstocks_core::Result<InstanceSettings> {
    InstanceSettings::resolve(&entry.data, &entry.options)
}

fn log_listener(entry_id: &str) -> Arc<dyn RefreshListener> {
    let entry_id = entry_id.to_string();
    Arc::new(move |record: &Arc<InstrumentRecord>| {
        info!(
            entry_id = %entry_id,
            isin = %record.isin,
            price = ?record.price,
            change_percent = ?record.change_percent,
            "Instrument refreshed"
        );
    })
}
