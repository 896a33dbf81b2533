//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all fetch and normalization operations
//! - [`Endpoint`] and [`FetchCause`]: Which endpoint failed and why
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use std::fmt;

use thiserror::Error;

/// The two remote endpoints queried per refresh.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Endpoint {
    /// Mandatory price header endpoint.
    InstrumentHeader,
    /// Optional key figures endpoint.
    KeyFigures,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstrumentHeader => "instrumentheader",
            Self::KeyFigures => "keyfigures",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single endpoint request failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchCause {
    /// The server answered with a non-success status code.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Connection, TLS or body transfer failure.
    Transport(String),
    /// The body could not be read as the expected JSON shape.
    MalformedBody(String),
}

impl fmt::Display for FetchCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::Timeout => f.write_str("timed out"),
            Self::Transport(message) => write!(f, "transport error: {}", message),
            Self::MalformedBody(message) => write!(f, "malformed body: {}", message),
        }
    }
}

/// Errors that can occur while fetching or normalizing instrument data.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which tells the caller whether waiting for the next tick can help.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// A request to one of the endpoints failed.
    #[error("{endpoint} {cause}")]
    FetchFailed {
        /// The endpoint that failed
        endpoint: Endpoint,
        /// Status code or transport cause
        cause: FetchCause,
    },

    /// The header response carried no price.
    #[error("No price in instrumentheader for {isin}")]
    MissingPrice {
        /// The instrument that was queried
        isin: String,
    },

    /// The configured identifier is not a usable ISIN.
    #[error("Invalid ISIN: {0}")]
    InvalidIsin(String),
}

impl MarketDataError {
    pub(crate) fn fetch(endpoint: Endpoint, cause: FetchCause) -> Self {
        Self::FetchFailed { endpoint, cause }
    }

    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ingstocks_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::MissingPrice { isin: "DE0007164600".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextTick);
    ///
    /// let error = MarketDataError::InvalidIsin(String::new());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::FetchFailed { .. } | Self::MissingPrice { .. } => RetryClass::NextTick,
            Self::InvalidIsin(_) => RetryClass::Never,
        }
    }

    /// The endpoint involved, if the failure came from a request.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::FetchFailed { endpoint, .. } => Some(*endpoint),
            _ => None,
        }
    }
}
