//! Quote source trait definitions.
//!
//! This module defines the `QuoteSource` trait that sits between the poller
//! and the remote provider. The poller only ever sees this trait, which keeps
//! the HTTP client swappable in tests and in other hosts.

use async_trait::async_trait;
use log::debug;

use crate::errors::MarketDataError;
use crate::models::{InstrumentHeaderResponse, InstrumentRecord, Isin, KeyFiguresResponse};

/// Trait for instrument data sources.
///
/// Implementors provide the two raw fetches; [`fetch_record`](Self::fetch_record)
/// orchestrates them into one canonical record.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use ingstocks_market_data::provider::QuoteSource;
///
/// struct FixedSource;
///
/// #[async_trait]
/// impl QuoteSource for FixedSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     // ... implement the header and key figures fetches
/// }
/// ```
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Identifier used in logs, e.g. "ING".
    fn id(&self) -> &'static str;

    /// Fetch the mandatory instrument header.
    ///
    /// Any non-success status, transport failure, timeout or non-object body
    /// is an error.
    async fn get_instrument_header(
        &self,
        isin: &Isin,
    ) -> Result<InstrumentHeaderResponse, MarketDataError>;

    /// Fetch the optional key figures.
    ///
    /// Returns `Ok(None)` when the provider has no key figures for the
    /// instrument (not found, or a success response that is not a JSON
    /// object). Other failures are errors.
    async fn get_key_figures(
        &self,
        isin: &Isin,
    ) -> Result<Option<KeyFiguresResponse>, MarketDataError>;

    /// Fetch both endpoints in order and normalize the result.
    ///
    /// The calls are sequential: header first, then key figures. A failure
    /// of either aborts the cycle before normalization.
    async fn fetch_record(&self, isin: &Isin) -> Result<InstrumentRecord, MarketDataError> {
        let header = self.get_instrument_header(isin).await?;
        let key_figures = self.get_key_figures(isin).await?;
        if key_figures.is_none() {
            debug!("[{}] No key figures for {}", self.id(), isin);
        }
        InstrumentRecord::normalize(isin, &header, key_figures.as_ref())
    }
}
