//! Raw response shapes of the ING component API.
//!
//! Every field is optional and loosely typed: the provider omits fields
//! freely, occasionally sends numbers as strings, and uses alternate names for
//! the classification fields. Interpretation happens during normalization.
//!
//! Both shapes only deserialize from a JSON object; arrays and scalars are
//! rejected instead of being read positionally.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Response from `/components/instrumentheader/{isin}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct InstrumentHeaderResponse {
    pub name: Option<Value>,
    pub isin: Option<Value>,
    pub currency_sign: Option<Value>,
    pub exchange_name: Option<Value>,
    pub price: Option<Value>,
    pub change_percent: Option<Value>,
    pub change_absolute: Option<Value>,
    pub price_change_date: Option<Value>,

    pub instrument_type: Option<Value>,
    #[serde(rename = "type")]
    pub type_name: Option<Value>,
    pub instrument_category: Option<Value>,
    pub category: Option<Value>,
    pub instrument_group: Option<Value>,
    pub group: Option<Value>,
    pub security_type: Option<Value>,
    pub security_type_name: Option<Value>,
    pub asset_class: Option<Value>,
    pub asset_class_name: Option<Value>,
}

/// Response from `/share-ng/keyfigures/{isin}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct KeyFiguresResponse {
    pub dividend_yield: Option<Value>,
    pub dividend_per_share: Option<Value>,
    pub price_earnings_ratio: Option<Value>,
    pub market_capitalization: Option<Value>,
    pub market_capitalization_currency_iso_code: Option<Value>,
    pub fifty_two_week_low: Option<Value>,
    pub fifty_two_week_high: Option<Value>,
}

impl<'de> Deserialize<'de> for InstrumentHeaderResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        InstrumentHeaderResponse::deserialize(Value::Object(object)).map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for KeyFiguresResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        KeyFiguresResponse::deserialize(Value::Object(object)).map_err(D::Error::custom)
    }
}

/// First candidate that holds a non-empty string.
pub(crate) fn first_text(candidates: &[&Option<Value>]) -> Option<String> {
    candidates.iter().find_map(|candidate| match candidate {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// Numeric reading of a field. Numeric strings are accepted.
pub(crate) fn number(candidate: &Option<Value>) -> Option<f64> {
    match candidate {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
