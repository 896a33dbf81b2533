//! Core error types for the ING Stocks poller.
//!
//! Fetch and normalization failures come from the market-data crate and are
//! wrapped here; setup-time failures are split into "not ready" (the host
//! should retry later) and "invalid" (the configuration must change).

use ingstocks_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the polling core.
#[derive(Error, Debug)]
pub enum Error {
    /// A refresh cycle failed; the message is the human-readable cause.
    #[error("{0}")]
    MarketData(#[from] MarketDataError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The poller was torn down while the refresh was in flight.
    #[error("Poller for {isin} has been shut down")]
    Shutdown { isin: String },
}

/// Validation errors for instance settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Outcome of a failed instance setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// Transient: the eager first refresh failed. Retry setup later.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Fatal: the settings can never work as given.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl SetupError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SetupError::NotReady(_))
    }
}

impl From<Error> for SetupError {
    fn from(err: Error) -> Self {
        match &err {
            Error::MarketData(market) if !market.retry_class().is_transient() => {
                SetupError::Invalid(err.to_string())
            }
            Error::Validation(_) => SetupError::Invalid(err.to_string()),
            _ => SetupError::NotReady(err.to_string()),
        }
    }
}
