//! Quote source abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteSource` trait the poller fetches through
//! - The ING component API implementation

mod traits;

pub mod ing;

// Re-exports
pub use traits::QuoteSource;
