use ingstocks_market_data::InstrumentRecord;
use serde::Serialize;

use crate::settings::InstrumentTypeSelection;

/// Raw provider classification, exposed for diagnosing auto-detection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClassificationAttributes {
    pub instrument_type: Option<String>,
    pub instrument_category: Option<String>,
    pub instrument_group: Option<String>,
    pub security_type: Option<String>,
    pub asset_class: Option<String>,
}

impl ClassificationAttributes {
    pub fn from_record(record: &InstrumentRecord) -> Self {
        Self {
            instrument_type: record.instrument_type.clone(),
            instrument_category: record.instrument_category.clone(),
            instrument_group: record.instrument_group.clone(),
            security_type: record.security_type.clone(),
            asset_class: record.asset_class.clone(),
        }
    }
}

/// Extra attributes of a metric view.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewAttributes {
    pub isin: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_type_selected: Option<InstrumentTypeSelection>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationAttributes>,
}

impl ViewAttributes {
    /// Attributes for the current record. Classification details are only
    /// included when a selection is configured.
    pub fn build(
        record: Option<&InstrumentRecord>,
        selection: Option<InstrumentTypeSelection>,
    ) -> Self {
        let classification = selection.map(|_| {
            record
                .map(ClassificationAttributes::from_record)
                .unwrap_or_default()
        });

        Self {
            isin: record.map(|r| r.isin.clone()),
            exchange: record.and_then(|r| r.exchange.clone()),
            currency: record.map(|r| r.currency.clone()),
            instrument_type_selected: selection,
            classification,
        }
    }
}
