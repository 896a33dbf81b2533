//! ING Stocks Market Data Crate
//!
//! This crate fetches price and key figure data for a single instrument from
//! the ING component API and normalizes it into a canonical record.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |      Isin        |  (validated identifier)
//! +------------------+
//!          |
//!          v
//! +------------------+     GET instrumentheader (mandatory)
//! |   QuoteSource    | --> GET keyfigures       (optional, 404 ok)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | InstrumentRecord |  (normalized, price guaranteed)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Isin`] - Upper-cased instrument identifier
//! - [`InstrumentRecord`] - Canonical record built from both responses
//! - [`FieldKey`] / [`FieldValue`] - Keyed access to record fields
//! - [`QuoteSource`] - Fetch seam implemented by [`IngProvider`]
//! - [`MarketDataError`] - Fetch and normalization failures

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{Endpoint, FetchCause, MarketDataError, RetryClass};

// Re-export all public types from models
pub use models::{
    FieldKey, FieldValue, InstrumentHeaderResponse, InstrumentRecord, Isin, KeyFiguresResponse,
    DEFAULT_CURRENCY,
};

// Re-export provider types
pub use provider::ing::IngProvider;
pub use provider::QuoteSource;
