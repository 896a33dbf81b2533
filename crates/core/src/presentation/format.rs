//! Value formatting: rounding, pass-through and timestamp parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use ingstocks_market_data::FieldValue;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// A derived display value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Number(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Layouts without an offset; interpreted as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Decimal form of a float, using its shortest round-trip representation.
///
/// `12.345_f64` becomes `12.345`, not the binary expansion
/// `12.3449999999999997513`, so rounding acts on the digits the provider sent.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    value
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// Rounds half away from zero to `precision` fractional digits.
pub fn round_half_away(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a record value for display.
///
/// Numbers are rounded when a precision is configured and passed through
/// otherwise; text is passed through; absent stays absent.
pub fn format_value(value: Option<FieldValue>, precision: Option<u32>) -> Option<DisplayValue> {
    match value? {
        FieldValue::Number(n) => {
            let decimal = to_decimal(n)?;
            let decimal = match precision {
                Some(dp) => round_half_away(decimal, dp),
                None => decimal,
            };
            Some(DisplayValue::Number(decimal))
        }
        FieldValue::Text(text) => Some(DisplayValue::Text(text)),
    }
}

/// Parses the provider's last-update string into a UTC instant.
pub fn parse_last_update(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
