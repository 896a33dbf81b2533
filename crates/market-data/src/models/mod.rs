//! Market data models
//!
//! This module contains the core data types for instrument polling:
//! - `isin` - Validated instrument identifier (Isin)
//! - `responses` - Raw, loosely-typed provider responses
//! - `record` - Canonical record produced by normalization (InstrumentRecord)

mod isin;
mod record;
mod responses;

pub use isin::Isin;
pub use record::{FieldKey, FieldValue, InstrumentRecord, DEFAULT_CURRENCY};
pub use responses::{InstrumentHeaderResponse, KeyFiguresResponse};
