//! Icon selection for views.
//!
//! Icons are Material Design Icon names (`mdi:*`), the vocabulary the host
//! display framework understands.

use std::fmt;

use ingstocks_market_data::{FieldKey, InstrumentRecord};
use serde::{Serialize, Serializer};

use crate::settings::InstrumentTypeSelection;

const FUND_KEYWORDS: [&str; 4] = ["etf", "ucits", "fund", "fonds"];
const EQUITY_KEYWORDS: [&str; 4] = ["stock", "equity", "aktie", "share"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Icon {
    /// Price and equity icon.
    LineChart,
    TrendingUp,
    TrendingDown,
    TrendingNeutral,
    CashPercent,
    CalculatorVariant,
    Bank,
    ArrowExpandVertical,
    Cash,
    /// Fund/ETF icon.
    ChartBoxOutline,
    Finance,
    ClockOutline,
}

impl Icon {
    pub const EQUITY: Icon = Icon::LineChart;
    pub const FUND: Icon = Icon::ChartBoxOutline;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineChart => "mdi:chart-line",
            Self::TrendingUp => "mdi:trending-up",
            Self::TrendingDown => "mdi:trending-down",
            Self::TrendingNeutral => "mdi:trending-neutral",
            Self::CashPercent => "mdi:cash-percent",
            Self::CalculatorVariant => "mdi:calculator-variant",
            Self::Bank => "mdi:bank",
            Self::ArrowExpandVertical => "mdi:arrow-expand-vertical",
            Self::Cash => "mdi:cash",
            Self::ChartBoxOutline => "mdi:chart-box-outline",
            Self::Finance => "mdi:finance",
            Self::ClockOutline => "mdi:clock-outline",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Broad instrument class derived from provider data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Fund,
    Equity,
}

impl InstrumentClass {
    pub fn icon(&self) -> Icon {
        match self {
            Self::Fund => Icon::FUND,
            Self::Equity => Icon::EQUITY,
        }
    }
}

/// Classifies one text by keyword. Fund keywords win over equity keywords.
pub fn classify_text(text: &str) -> Option<InstrumentClass> {
    let lower = text.to_lowercase();
    if FUND_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(InstrumentClass::Fund)
    } else if EQUITY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(InstrumentClass::Equity)
    } else {
        None
    }
}

/// Detects the instrument class of a record.
///
/// Classification fields are scanned in priority order; the first one that
/// matches a keyword decides. Otherwise the name decides: a fund keyword
/// means fund, anything else equity. Without a name nothing is detected.
pub fn detect_instrument_class(record: &InstrumentRecord) -> Option<InstrumentClass> {
    let from_fields = record
        .classification()
        .iter()
        .filter_map(|(_, value)| *value)
        .filter(|value| !value.trim().is_empty())
        .find_map(classify_text);
    if from_fields.is_some() {
        return from_fields;
    }

    let name = record.name.as_deref().filter(|n| !n.is_empty())?;
    match classify_text(name) {
        Some(InstrumentClass::Fund) => Some(InstrumentClass::Fund),
        _ => Some(InstrumentClass::Equity),
    }
}

/// Icon for a change value: direction of the move, neutral when flat or unknown.
pub fn trend_icon(value: Option<f64>) -> Icon {
    match value {
        Some(v) if v > 0.0 => Icon::TrendingUp,
        Some(v) if v < 0.0 => Icon::TrendingDown,
        _ => Icon::TrendingNeutral,
    }
}

/// Icon representing the instrument itself.
///
/// `None` means classification is disabled and yields the generic icon.
pub fn instrument_icon(
    selection: Option<InstrumentTypeSelection>,
    record: Option<&InstrumentRecord>,
) -> Icon {
    match selection {
        Some(InstrumentTypeSelection::Etf) => Icon::FUND,
        Some(InstrumentTypeSelection::Stock) => Icon::EQUITY,
        Some(InstrumentTypeSelection::Auto) => record
            .and_then(detect_instrument_class)
            .map(|class| class.icon())
            .unwrap_or(Icon::Finance),
        None => Icon::Finance,
    }
}

/// Icon for a metric view bound to `key`.
pub fn metric_icon(
    key: FieldKey,
    record: Option<&InstrumentRecord>,
    selection: Option<InstrumentTypeSelection>,
) -> Icon {
    match key {
        FieldKey::Price => Icon::LineChart,
        FieldKey::ChangePercent | FieldKey::ChangeAbsolute => {
            trend_icon(record.and_then(|r| r.value(key)).and_then(|v| v.as_f64()))
        }
        FieldKey::DividendYield => Icon::CashPercent,
        FieldKey::PriceEarningsRatio => Icon::CalculatorVariant,
        FieldKey::MarketCapitalization => Icon::Bank,
        FieldKey::Week52Low | FieldKey::Week52High => Icon::ArrowExpandVertical,
        FieldKey::DividendPerShare => Icon::Cash,
        _ => instrument_icon(selection, record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingstocks_market_data::{InstrumentHeaderResponse, Isin};
    use serde_json::json;

    fn record(header: serde_json::Value) -> InstrumentRecord {
        let header: InstrumentHeaderResponse = serde_json::from_value(header).unwrap();
        InstrumentRecord::normalize(&Isin::parse("DE0007164600").unwrap(), &header, None).unwrap()
    }

    #[test]
    fn test_change_icons() {
        for (change, icon) in [
            (0.0, Icon::TrendingNeutral),
            (-1.5, Icon::TrendingDown),
            (2.0, Icon::TrendingUp),
        ] {
            let r = record(json!({ "price": 10.0, "changePercent": change, "changeAbsolute": change }));
            assert_eq!(metric_icon(FieldKey::ChangePercent, Some(&r), None), icon);
            assert_eq!(metric_icon(FieldKey::ChangeAbsolute, Some(&r), None), icon);
        }
    }

    #[test]
    fn test_change_icon_without_value_is_neutral() {
        let r = record(json!({ "price": 10.0, "changePercent": "n/a" }));
        assert_eq!(
            metric_icon(FieldKey::ChangePercent, Some(&r), None),
            Icon::TrendingNeutral
        );
        assert_eq!(metric_icon(FieldKey::ChangePercent, None, None), Icon::TrendingNeutral);
    }

    #[test]
    fn test_fixed_icons() {
        let r = record(json!({ "price": 10.0 }));
        let cases = [
            (FieldKey::Price, "mdi:chart-line"),
            (FieldKey::DividendYield, "mdi:cash-percent"),
            (FieldKey::PriceEarningsRatio, "mdi:calculator-variant"),
            (FieldKey::MarketCapitalization, "mdi:bank"),
            (FieldKey::Week52Low, "mdi:arrow-expand-vertical"),
            (FieldKey::Week52High, "mdi:arrow-expand-vertical"),
            (FieldKey::DividendPerShare, "mdi:cash"),
        ];
        for (key, icon) in cases {
            let selected = metric_icon(key, Some(&r), Some(InstrumentTypeSelection::Etf));
            assert_eq!(selected.as_str(), icon, "{}", key);
        }
    }

    #[test]
    fn test_category_etf_is_fund_without_fund_name() {
        let r = record(json!({
            "price": 98.1,
            "name": "iShares Core MSCI World",
            "instrumentCategory": "ETF"
        }));
        assert_eq!(detect_instrument_class(&r), Some(InstrumentClass::Fund));
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Auto), Some(&r)),
            Icon::ChartBoxOutline
        );
    }

    #[test]
    fn test_name_without_keyword_defaults_to_equity() {
        let r = record(json!({ "price": 12.0, "name": "Acme Corp" }));
        assert_eq!(detect_instrument_class(&r), Some(InstrumentClass::Equity));
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Auto), Some(&r)),
            Icon::LineChart
        );
    }

    #[test]
    fn test_name_with_fund_keyword() {
        let r = record(json!({ "price": 12.0, "name": "Vanguard FTSE All-World UCITS" }));
        assert_eq!(detect_instrument_class(&r), Some(InstrumentClass::Fund));
    }

    #[test]
    fn test_no_name_and_no_classification_is_finance() {
        let r = record(json!({ "price": 12.0 }));
        assert_eq!(detect_instrument_class(&r), None);
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Auto), Some(&r)),
            Icon::Finance
        );
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Auto), None),
            Icon::Finance
        );
    }

    #[test]
    fn test_field_priority_order() {
        let r = record(json!({
            "price": 12.0,
            "name": "Some Fonds",
            "instrumentType": "Aktie",
            "assetClass": "Fund"
        }));
        assert_eq!(detect_instrument_class(&r), Some(InstrumentClass::Equity));
    }

    #[test]
    fn test_unmatched_fields_fall_through_to_name() {
        let r = record(json!({
            "price": 12.0,
            "name": "Xtrackers DAX",
            "instrumentType": "Derivative",
            "instrumentGroup": "Index"
        }));
        assert_eq!(detect_instrument_class(&r), Some(InstrumentClass::Equity));
    }

    #[test]
    fn test_selection_overrides_detection() {
        let r = record(json!({ "price": 12.0, "instrumentCategory": "ETF" }));
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Stock), Some(&r)),
            Icon::LineChart
        );
        let r = record(json!({ "price": 12.0, "name": "Acme Corp" }));
        assert_eq!(
            instrument_icon(Some(InstrumentTypeSelection::Etf), Some(&r)),
            Icon::ChartBoxOutline
        );
    }

    #[test]
    fn test_classification_disabled_is_finance() {
        let r = record(json!({ "price": 12.0, "instrumentCategory": "ETF" }));
        assert_eq!(metric_icon(FieldKey::Name, Some(&r), None), Icon::Finance);
        assert_eq!(
            metric_icon(FieldKey::Name, Some(&r), Some(InstrumentTypeSelection::Auto)),
            Icon::ChartBoxOutline
        );
    }

    #[test]
    fn test_icon_serializes_as_mdi_name() {
        assert_eq!(
            serde_json::to_string(&Icon::ChartBoxOutline).unwrap(),
            "\"mdi:chart-box-outline\""
        );
    }
}
