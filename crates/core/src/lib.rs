//! ING Stocks Core - Polling, normalization and presentation.
//!
//! This crate turns a [`QuoteSource`](ingstocks_market_data::QuoteSource)
//! into a periodically refreshed record and a fixed set of display views.
//! It is host-agnostic: the host owns entry storage and reacts to
//! [`SetupError`] by retrying or rejecting the entry.

pub mod errors;
pub mod instance;
pub mod poller;
pub mod presentation;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use instance::{DeviceInfo, Instance};
pub use poller::{Poller, PollerSnapshot, RefreshListener, RefreshSchedule};
pub use settings::{EntryData, EntryOptions, InstanceSettings, InstrumentTypeSelection};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
pub use errors::SetupError;
