use std::sync::Arc;

use ingstocks_market_data::IngProvider;
use tokio::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::registry::Registry;

pub fn init_tracing() {
    let log_format = std::env::var("INGSTOCKS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_registry(config: &Config) -> Arc<Mutex<Registry>> {
    let provider = IngProvider::with_config(config.base_url.clone(), config.request_timeout);
    tracing::info!(
        "Using quote source at {} ({}s timeout)",
        provider.base_url(),
        config.request_timeout.as_secs()
    );
    Arc::new(Mutex::new(Registry::new(Arc::new(provider))))
}
