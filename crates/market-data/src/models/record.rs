use std::fmt;

use serde::{Deserialize, Serialize};

use super::isin::Isin;
use super::responses::{first_text, number, InstrumentHeaderResponse, KeyFiguresResponse};
use crate::errors::MarketDataError;

/// Currency sign used when the provider omits `currencySign`.
pub const DEFAULT_CURRENCY: &str = "€";

/// Addressable fields of an [`InstrumentRecord`].
///
/// The string form matches the record keys exposed to the host
/// (`price`, `change_percent`, `52w_low`, ...).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    Isin,
    Currency,
    Exchange,
    Price,
    ChangePercent,
    ChangeAbsolute,
    LastUpdate,
    InstrumentType,
    InstrumentCategory,
    InstrumentGroup,
    SecurityType,
    AssetClass,
    DividendYield,
    DividendPerShare,
    PriceEarningsRatio,
    MarketCapitalization,
    MarketCapCurrency,
    #[serde(rename = "52w_low")]
    Week52Low,
    #[serde(rename = "52w_high")]
    Week52High,
}

impl FieldKey {
    /// Classification fields in auto-detection priority order.
    pub const CLASSIFICATION: [FieldKey; 5] = [
        FieldKey::InstrumentType,
        FieldKey::InstrumentCategory,
        FieldKey::InstrumentGroup,
        FieldKey::SecurityType,
        FieldKey::AssetClass,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Isin => "isin",
            Self::Currency => "currency",
            Self::Exchange => "exchange",
            Self::Price => "price",
            Self::ChangePercent => "change_percent",
            Self::ChangeAbsolute => "change_absolute",
            Self::LastUpdate => "last_update",
            Self::InstrumentType => "instrument_type",
            Self::InstrumentCategory => "instrument_category",
            Self::InstrumentGroup => "instrument_group",
            Self::SecurityType => "security_type",
            Self::AssetClass => "asset_class",
            Self::DividendYield => "dividend_yield",
            Self::DividendPerShare => "dividend_per_share",
            Self::PriceEarningsRatio => "price_earnings_ratio",
            Self::MarketCapitalization => "market_capitalization",
            Self::MarketCapCurrency => "market_cap_currency",
            Self::Week52Low => "52w_low",
            Self::Week52High => "52w_high",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value read from a record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

/// Normalized snapshot of one instrument, produced once per successful refresh.
///
/// A published record is never mutated; the next refresh replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub name: Option<String>,
    pub isin: String,
    pub currency: String,
    pub exchange: Option<String>,

    pub price: Option<f64>,
    pub change_percent: Option<f64>,
    pub change_absolute: Option<f64>,
    pub last_update: Option<String>,

    pub instrument_type: Option<String>,
    pub instrument_category: Option<String>,
    pub instrument_group: Option<String>,
    pub security_type: Option<String>,
    pub asset_class: Option<String>,

    pub keyfigures_available: bool,
    pub dividend_yield: Option<f64>,
    pub dividend_per_share: Option<f64>,
    pub price_earnings_ratio: Option<f64>,
    pub market_capitalization: Option<f64>,
    pub market_cap_currency: Option<String>,
    #[serde(rename = "52w_low")]
    pub week_52_low: Option<f64>,
    #[serde(rename = "52w_high")]
    pub week_52_high: Option<f64>,
}

impl InstrumentRecord {
    /// Builds a record from the header and (optional) key figures responses.
    ///
    /// Fails with [`MarketDataError::MissingPrice`] when the header carries no
    /// usable price; nothing else is mandatory.
    pub fn normalize(
        isin: &Isin,
        header: &InstrumentHeaderResponse,
        key_figures: Option<&KeyFiguresResponse>,
    ) -> Result<Self, MarketDataError> {
        let price = number(&header.price);
        if price.is_none() {
            return Err(MarketDataError::MissingPrice {
                isin: isin.to_string(),
            });
        }

        let empty = KeyFiguresResponse::default();
        let kf = key_figures.unwrap_or(&empty);

        Ok(Self {
            name: first_text(&[&header.name]),
            isin: first_text(&[&header.isin]).unwrap_or_else(|| isin.to_string()),
            currency: first_text(&[&header.currency_sign])
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            exchange: first_text(&[&header.exchange_name]),

            price,
            change_percent: number(&header.change_percent),
            change_absolute: number(&header.change_absolute),
            last_update: first_text(&[&header.price_change_date]),

            instrument_type: first_text(&[&header.instrument_type, &header.type_name]),
            instrument_category: first_text(&[&header.instrument_category, &header.category]),
            instrument_group: first_text(&[&header.instrument_group, &header.group]),
            security_type: first_text(&[&header.security_type, &header.security_type_name]),
            asset_class: first_text(&[&header.asset_class, &header.asset_class_name]),

            keyfigures_available: key_figures.is_some(),
            dividend_yield: number(&kf.dividend_yield),
            dividend_per_share: number(&kf.dividend_per_share),
            price_earnings_ratio: number(&kf.price_earnings_ratio),
            market_capitalization: number(&kf.market_capitalization),
            market_cap_currency: first_text(&[&kf.market_capitalization_currency_iso_code]),
            week_52_low: number(&kf.fifty_two_week_low),
            week_52_high: number(&kf.fifty_two_week_high),
        })
    }

    /// Reads a field by key.
    pub fn value(&self, key: FieldKey) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        let num = |v: Option<f64>| v.map(FieldValue::Number);

        match key {
            FieldKey::Name => text(&self.name),
            FieldKey::Isin => Some(FieldValue::Text(self.isin.clone())),
            FieldKey::Currency => Some(FieldValue::Text(self.currency.clone())),
            FieldKey::Exchange => text(&self.exchange),
            FieldKey::Price => num(self.price),
            FieldKey::ChangePercent => num(self.change_percent),
            FieldKey::ChangeAbsolute => num(self.change_absolute),
            FieldKey::LastUpdate => text(&self.last_update),
            FieldKey::InstrumentType => text(&self.instrument_type),
            FieldKey::InstrumentCategory => text(&self.instrument_category),
            FieldKey::InstrumentGroup => text(&self.instrument_group),
            FieldKey::SecurityType => text(&self.security_type),
            FieldKey::AssetClass => text(&self.asset_class),
            FieldKey::DividendYield => num(self.dividend_yield),
            FieldKey::DividendPerShare => num(self.dividend_per_share),
            FieldKey::PriceEarningsRatio => num(self.price_earnings_ratio),
            FieldKey::MarketCapitalization => num(self.market_capitalization),
            FieldKey::MarketCapCurrency => text(&self.market_cap_currency),
            FieldKey::Week52Low => num(self.week_52_low),
            FieldKey::Week52High => num(self.week_52_high),
        }
    }

    /// Classification fields paired with their keys, in detection priority order.
    pub fn classification(&self) -> [(FieldKey, Option<&str>); 5] {
        [
            (FieldKey::InstrumentType, self.instrument_type.as_deref()),
            (FieldKey::InstrumentCategory, self.instrument_category.as_deref()),
            (FieldKey::InstrumentGroup, self.instrument_group.as_deref()),
            (FieldKey::SecurityType, self.security_type.as_deref()),
            (FieldKey::AssetClass, self.asset_class.as_deref()),
        ]
    }
}
