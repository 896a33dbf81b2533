use std::path::PathBuf;
use std::time::Duration;

use ingstocks_market_data::provider::ing::{BASE_URL, REQUEST_TIMEOUT};

pub struct Config {
    pub entries_file: PathBuf,
    pub base_url: String,
    pub request_timeout: Duration,
    pub setup_retry: Duration,
    pub watch_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let entries_file = std::env::var("INGSTOCKS_ENTRIES_FILE")
            .unwrap_or_else(|_| "entries.json".into())
            .into();
        let base_url = std::env::var("INGSTOCKS_BASE_URL").unwrap_or_else(|_| BASE_URL.into());
        Self {
            entries_file,
            base_url,
            request_timeout: secs_var("INGSTOCKS_REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT.as_secs()),
            setup_retry: secs_var("INGSTOCKS_SETUP_RETRY_SECS", 60),
            watch_interval: secs_var("INGSTOCKS_WATCH_SECS", 30),
        }
    }
}

/// Reads a duration in whole seconds. Unparsable or zero values use the default.
fn secs_var(name: &str, default: u64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}
