//! Presentation views derived from the poller's record.
//!
//! A [`View`] is one displayable metric bound to a record field. Views are
//! built once when an instance is set up; reading a view is a pure function
//! of the current [`PollerSnapshot`].

mod attributes;
mod format;
mod icons;

pub use attributes::{ClassificationAttributes, ViewAttributes};
pub use format::{format_value, parse_last_update, round_half_away, to_decimal, DisplayValue};
pub use icons::{
    classify_text, detect_instrument_class, instrument_icon, metric_icon, trend_icon, Icon,
    InstrumentClass,
};

use ingstocks_market_data::{FieldKey, InstrumentRecord, DEFAULT_CURRENCY};
use serde::Serialize;

use crate::poller::PollerSnapshot;
use crate::settings::{InstanceSettings, InstrumentTypeSelection};

const PERCENT: &str = "%";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// A value read from the record, optionally rounded.
    Metric,
    /// The provider's last price change, as a UTC timestamp.
    LastUpdate,
}

/// Static description of a view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewSpec {
    pub key: FieldKey,
    pub kind: ViewKind,
    pub label: &'static str,
    pub unit: Option<String>,
    pub precision: Option<u32>,
    pub monetary: bool,
}

impl ViewSpec {
    fn metric(
        key: FieldKey,
        label: &'static str,
        unit: Option<&str>,
        precision: u32,
        monetary: bool,
    ) -> Self {
        Self {
            key,
            kind: ViewKind::Metric,
            label,
            unit: unit.map(str::to_string),
            precision: Some(precision),
            monetary,
        }
    }

    fn last_update() -> Self {
        Self {
            key: FieldKey::LastUpdate,
            kind: ViewKind::LastUpdate,
            label: "Last update",
            unit: None,
            precision: None,
            monetary: false,
        }
    }

    /// Monetary values and timestamps are not measurements.
    pub fn is_measurement(&self) -> bool {
        self.kind == ViewKind::Metric && !self.monetary
    }
}

/// Per-instance configuration shared by all views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub instrument_type: Option<InstrumentTypeSelection>,
}

/// What a view shows right now.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewState {
    pub value: Option<DisplayValue>,
    pub available: bool,
    pub icon: Icon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ViewAttributes>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub spec: ViewSpec,
    pub unique_id: String,
    pub config: ViewConfig,
}

impl View {
    pub fn new(spec: ViewSpec, settings: &InstanceSettings) -> Self {
        Self {
            unique_id: format!("{}_{}", settings.unique_id(), spec.key),
            spec,
            config: ViewConfig {
                instrument_type: settings.instrument_type,
            },
        }
    }

    pub fn key(&self) -> FieldKey {
        self.spec.key
    }

    pub fn read(&self, snapshot: &PollerSnapshot) -> ViewState {
        let record = snapshot.record.as_deref();
        let available = is_available(snapshot);

        match self.spec.kind {
            ViewKind::LastUpdate => ViewState {
                value: parse_last_update(record.and_then(|r| r.last_update.as_deref()))
                    .map(DisplayValue::Timestamp),
                available,
                icon: Icon::ClockOutline,
                attributes: None,
            },
            ViewKind::Metric => ViewState {
                value: format_value(
                    record.and_then(|r| r.value(self.spec.key)),
                    self.spec.precision,
                ),
                available,
                icon: metric_icon(self.spec.key, record, self.config.instrument_type),
                attributes: Some(ViewAttributes::build(record, self.config.instrument_type)),
            },
        }
    }
}

/// A view is available only after a successful refresh that produced a price.
pub fn is_available(snapshot: &PollerSnapshot) -> bool {
    snapshot.last_refresh_success
        && snapshot
            .record
            .as_ref()
            .is_some_and(|record| record.price.is_some())
}

/// Builds the views for an instance from the record present at setup.
///
/// Key-figure views are only created when that record had key figures;
/// monetary units are fixed to its currency.
pub fn build_views(settings: &InstanceSettings, record: Option<&InstrumentRecord>) -> Vec<View> {
    let currency = record
        .map(|r| r.currency.as_str())
        .unwrap_or(DEFAULT_CURRENCY);

    let mut specs = vec![
        ViewSpec::metric(FieldKey::Price, "Price", Some(currency), 3, true),
        ViewSpec::metric(FieldKey::ChangePercent, "Change %", Some(PERCENT), 2, false),
        ViewSpec::metric(FieldKey::ChangeAbsolute, "Change", Some(currency), 3, true),
        ViewSpec::last_update(),
    ];

    if record.is_some_and(|r| r.keyfigures_available) {
        specs.extend([
            ViewSpec::metric(FieldKey::DividendYield, "Dividend yield", Some(PERCENT), 4, false),
            ViewSpec::metric(FieldKey::PriceEarningsRatio, "P/E ratio", None, 2, false),
            ViewSpec::metric(FieldKey::MarketCapitalization, "Market capitalization", None, 0, false),
            ViewSpec::metric(FieldKey::Week52Low, "52W low", Some(currency), 3, true),
            ViewSpec::metric(FieldKey::Week52High, "52W high", Some(currency), 3, true),
        ]);
    }

    specs
        .into_iter()
        .map(|spec| View::new(spec, settings))
        .collect()
}
