//! ING component API provider implementation.
//!
//! This provider fetches instrument data from the public, unauthenticated
//! component API behind wertpapiere.ing.de.
//!
//! # API Endpoints
//!
//! - Instrument header: `{BASE_URL}/components/instrumentheader/{isin}`
//! - Key figures: `{BASE_URL}/share-ng/keyfigures/{isin}`
//!
//! The key figures endpoint answers 404 for instruments without key figures
//! (most funds and ETFs); that is not a failure.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use crate::errors::{Endpoint, FetchCause, MarketDataError};
use crate::models::{InstrumentHeaderResponse, Isin, KeyFiguresResponse};
use crate::provider::QuoteSource;

pub const BASE_URL: &str = "https://component-api.wertpapiere.ing.de/api/v1";
const PROVIDER_ID: &str = "ING";

/// Default HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// ING provider for fetching price and key figure data.
///
/// # Example
///
/// ```ignore
/// let provider = IngProvider::new();
/// let record = provider.fetch_record(&Isin::parse("DE0007164600")?).await?;
/// ```
pub struct IngProvider {
    client: Client,
    base_url: String,
}

fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .build()
}

impl IngProvider {
    /// Create a provider against the public API with the default timeout.
    pub fn new() -> Self {
        Self::with_config(BASE_URL, REQUEST_TIMEOUT)
    }

    /// Create a provider against another base URL and/or timeout.
    ///
    /// The client binds to an IPv4 local address; some networks resolve the
    /// API host to IPv6 addresses that never answer.
    pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = build_client(timeout).unwrap_or_else(|e| {
            warn!(
                "Failed to build ING HTTP client ({}), using defaults without timeout",
                e
            );
            Client::new()
        });

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn instrument_header_url(&self, isin: &Isin) -> String {
        format!("{}/components/instrumentheader/{}", self.base_url, isin)
    }

    fn key_figures_url(&self, isin: &Isin) -> String {
        format!("{}/share-ng/keyfigures/{}", self.base_url, isin)
    }

    async fn send(&self, endpoint: Endpoint, url: &str) -> Result<Response, MarketDataError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))
    }

    async fn body(endpoint: Endpoint, response: Response) -> Result<String, MarketDataError> {
        response
            .text()
            .await
            .map_err(|e| transport_error(endpoint, e))
    }
}

impl Default for IngProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(endpoint: Endpoint, error: reqwest::Error) -> MarketDataError {
    let cause = if error.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Transport(error.to_string())
    };
    MarketDataError::fetch(endpoint, cause)
}

/// Parses a header body, which must be a JSON object.
fn parse_instrument_header(body: &str) -> Result<InstrumentHeaderResponse, String> {
    match serde_json::from_str::<Value>(body).map_err(|e| e.to_string())? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        _ => Err("expected a JSON object".to_string()),
    }
}

/// Interprets a key figures body: only a JSON object counts as key figures.
fn parse_key_figures(body: &str) -> Option<KeyFiguresResponse> {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

#[async_trait]
impl QuoteSource for IngProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_instrument_header(
        &self,
        isin: &Isin,
    ) -> Result<InstrumentHeaderResponse, MarketDataError> {
        let endpoint = Endpoint::InstrumentHeader;
        let response = self.send(endpoint, &self.instrument_header_url(isin)).await?;

        if !response.status().is_success() {
            return Err(MarketDataError::fetch(
                endpoint,
                FetchCause::Status(response.status().as_u16()),
            ));
        }

        let body = Self::body(endpoint, response).await?;
        parse_instrument_header(&body)
            .map_err(|cause| MarketDataError::fetch(endpoint, FetchCause::MalformedBody(cause)))
    }

    async fn get_key_figures(
        &self,
        isin: &Isin,
    ) -> Result<Option<KeyFiguresResponse>, MarketDataError> {
        let endpoint = Endpoint::KeyFigures;
        let response = self.send(endpoint, &self.key_figures_url(isin)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No keyfigures for {} (HTTP 404).", isin);
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(MarketDataError::fetch(
                endpoint,
                FetchCause::Status(response.status().as_u16()),
            ));
        }

        let body = Self::body(endpoint, response).await?;
        let key_figures = parse_key_figures(&body);
        if key_figures.is_none() {
            debug!("Keyfigures for {} are not a JSON object, ignoring.", isin);
        }
        Ok(key_figures)
    }
}
