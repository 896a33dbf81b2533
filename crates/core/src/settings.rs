//! Per-instance settings.
//!
//! The host owns the stored entry (creation-time `data` plus editable
//! `options`); the core only resolves and validates it. Any change to the
//! resolved settings is applied by reloading the instance.

use std::time::Duration;

use ingstocks_market_data::Isin;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Integration domain, used for unique ids and device identifiers.
pub const DOMAIN: &str = "ingstocksplus";

pub const DEFAULT_SCAN_INTERVAL_MINUTES: u32 = 15;
pub const MIN_SCAN_INTERVAL_MINUTES: u32 = 1;
pub const MAX_SCAN_INTERVAL_MINUTES: u32 = 360;

/// Instrument-type selection used for the instrument icon.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentTypeSelection {
    /// Detect from the provider's classification fields, then the name.
    #[default]
    Auto,
    Etf,
    Stock,
}

impl InstrumentTypeSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Etf => "etf",
            Self::Stock => "stock",
        }
    }
}

/// Entry data captured when the instance was created.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub isin: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scan_interval: Option<u32>,
    #[serde(default)]
    pub instrument_type: Option<InstrumentTypeSelection>,
}

/// Editable options; each present field overrides [`EntryData`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scan_interval: Option<u32>,
    #[serde(default)]
    pub instrument_type: Option<InstrumentTypeSelection>,
}

/// Resolved settings of one polled instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceSettings {
    pub isin: Isin,
    /// Display-name override; `None` falls back to the provider's name.
    pub name: Option<String>,
    pub scan_interval_minutes: u32,
    /// `None` disables instrument classification entirely.
    pub instrument_type: Option<InstrumentTypeSelection>,
}

impl InstanceSettings {
    /// Settings for an ISIN with the default interval and no overrides.
    pub fn new(isin: &str) -> Result<Self> {
        Ok(Self {
            isin: Isin::parse(isin)?,
            name: None,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            instrument_type: None,
        })
    }

    /// Set the display-name override. Blank names clear it.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = normalize_name(Some(name.into()));
        self
    }

    pub fn scan_interval(mut self, minutes: u32) -> Self {
        self.scan_interval_minutes = minutes;
        self
    }

    pub fn instrument_type(mut self, selection: InstrumentTypeSelection) -> Self {
        self.instrument_type = Some(selection);
        self
    }

    /// Resolve stored entry data and options into validated settings.
    pub fn resolve(data: &EntryData, options: &EntryOptions) -> Result<Self> {
        if data.isin.trim().is_empty() {
            return Err(ValidationError::MissingField("isin".to_string()).into());
        }

        let settings = Self {
            isin: Isin::parse(&data.isin)?,
            name: normalize_name(options.name.clone().or_else(|| data.name.clone())),
            scan_interval_minutes: options
                .scan_interval
                .or(data.scan_interval)
                .unwrap_or(DEFAULT_SCAN_INTERVAL_MINUTES),
            instrument_type: options.instrument_type.or(data.instrument_type),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_SCAN_INTERVAL_MINUTES..=MAX_SCAN_INTERVAL_MINUTES)
            .contains(&self.scan_interval_minutes)
        {
            return Err(ValidationError::OutOfRange {
                field: "scan_interval",
                value: self.scan_interval_minutes,
                min: MIN_SCAN_INTERVAL_MINUTES,
                max: MAX_SCAN_INTERVAL_MINUTES,
            }
            .into());
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.scan_interval_minutes) * 60)
    }

    /// Entry title: the name override, else `ING <ISIN>`.
    pub fn title(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("ING {}", self.isin))
    }

    /// Unique id of the entry; one entry per ISIN.
    pub fn unique_id(&self) -> String {
        format!("{}_{}", DOMAIN, self.isin)
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn data(isin: &str) -> EntryData {
        EntryData {
            isin: isin.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = InstanceSettings::resolve(&data(" ie00b4l5y983 "), &EntryOptions::default())
            .unwrap();

        assert_eq!(settings.isin.as_str(), "IE00B4L5Y983");
        assert_eq!(settings.scan_interval_minutes, DEFAULT_SCAN_INTERVAL_MINUTES);
        assert_eq!(settings.name, None);
        assert_eq!(settings.instrument_type, None);
        assert_eq!(settings.title(), "ING IE00B4L5Y983");
        assert_eq!(settings.unique_id(), "ingstocksplus_IE00B4L5Y983");
    }

    #[test]
    fn test_options_override_data() {
        let data = EntryData {
            isin: "DE0007164600".to_string(),
            name: Some("SAP".to_string()),
            scan_interval: Some(30),
            instrument_type: Some(InstrumentTypeSelection::Auto),
        };
        let options = EntryOptions {
            name: None,
            scan_interval: Some(5),
            instrument_type: Some(InstrumentTypeSelection::Stock),
        };

        let settings = InstanceSettings::resolve(&data, &options).unwrap();

        assert_eq!(settings.name.as_deref(), Some("SAP"));
        assert_eq!(settings.scan_interval_minutes, 5);
        assert_eq!(settings.instrument_type, Some(InstrumentTypeSelection::Stock));
        assert_eq!(settings.interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_blank_option_name_clears_override() {
        let data = EntryData {
            isin: "DE0007164600".to_string(),
            name: Some("SAP".to_string()),
            ..Default::default()
        };
        let options = EntryOptions {
            name: Some("   ".to_string()),
            ..Default::default()
        };

        let settings = InstanceSettings::resolve(&data, &options).unwrap();

        assert_eq!(settings.name, None);
    }

    #[test]
    fn test_interval_bounds() {
        for minutes in [MIN_SCAN_INTERVAL_MINUTES, MAX_SCAN_INTERVAL_MINUTES] {
            let settings = InstanceSettings::new("DE0007164600")
                .unwrap()
                .scan_interval(minutes);
            assert!(settings.validate().is_ok());
        }

        for minutes in [0, MAX_SCAN_INTERVAL_MINUTES + 1] {
            let options = EntryOptions {
                scan_interval: Some(minutes),
                ..Default::default()
            };
            let result = InstanceSettings::resolve(&data("DE0007164600"), &options);
            assert!(matches!(
                result,
                Err(Error::Validation(ValidationError::OutOfRange { .. }))
            ));
        }
    }

    #[test]
    fn test_missing_isin() {
        let result = InstanceSettings::resolve(&data("  "), &EntryOptions::default());
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::MissingField(_)))
        ));
    }

    #[test]
    fn test_builder() {
        let settings = InstanceSettings::new("de0007164600")
            .unwrap()
            .name("  My SAP ")
            .scan_interval(60)
            .instrument_type(InstrumentTypeSelection::Etf);

        assert_eq!(settings.name.as_deref(), Some("My SAP"));
        assert_eq!(settings.title(), "My SAP");
        assert_eq!(settings.instrument_type, Some(InstrumentTypeSelection::Etf));
    }

    #[test]
    fn test_entry_deserialization() {
        let data: EntryData = serde_json::from_str(
            r#"{"isin": "IE00B4L5Y983", "scan_interval": 10, "instrument_type": "etf"}"#,
        )
        .unwrap();

        assert_eq!(data.scan_interval, Some(10));
        assert_eq!(data.instrument_type, Some(InstrumentTypeSelection::Etf));
        assert_eq!(data.name, None);
    }
}
