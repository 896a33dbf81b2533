//! Scripted quote source for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ingstocks_market_data::{
    Endpoint, FetchCause, InstrumentHeaderResponse, Isin, KeyFiguresResponse, MarketDataError,
    QuoteSource,
};
use serde_json::Value;
use tokio::sync::Notify;

type Scripted<T> = Result<T, MarketDataError>;

/// Returns whatever responses are currently scripted, as raw JSON.
pub struct FakeSource {
    header: Mutex<Scripted<Value>>,
    key_figures: Mutex<Scripted<Option<Value>>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeSource {
    pub fn new(header: Value) -> Arc<Self> {
        Arc::new(Self {
            header: Mutex::new(Ok(header)),
            key_figures: Mutex::new(Ok(None)),
            calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
        })
    }

    pub fn set_header(&self, header: Scripted<Value>) {
        *self.header.lock().unwrap() = header;
    }

    pub fn set_key_figures(&self, key_figures: Scripted<Option<Value>>) {
        *self.key_figures.lock().unwrap() = key_figures;
    }

    /// Make header fetches wait until the returned handle is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    /// Number of header fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    fn id(&self) -> &'static str {
        "FAKE"
    }

    async fn get_instrument_header(
        &self,
        _isin: &Isin,
    ) -> Result<InstrumentHeaderResponse, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let value = self.header.lock().unwrap().clone()?;
        Ok(serde_json::from_value(value).unwrap())
    }

    async fn get_key_figures(
        &self,
        _isin: &Isin,
    ) -> Result<Option<KeyFiguresResponse>, MarketDataError> {
        let value = self.key_figures.lock().unwrap().clone()?;
        Ok(value.map(|v| serde_json::from_value(v).unwrap()))
    }
}

pub fn header_500() -> MarketDataError {
    MarketDataError::FetchFailed {
        endpoint: Endpoint::InstrumentHeader,
        cause: FetchCause::Status(500),
    }
}
